pub mod brief;
pub mod evidence;
pub mod filter;
pub mod pipeline;
pub mod scoring;
pub mod sources;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
