use anyhow::Result;
use async_trait::async_trait;

/// A configured model endpoint that hands out single-shot prompts.
pub trait Agent: Clone + Send + Sync {
    type PromptBuilder: PromptBuilder;

    fn prompt(&self, input: impl Into<String>) -> Self::PromptBuilder;
}

/// One request: an optional system preamble, the user input, and sampling
/// settings. `send` returns the trimmed text of the first choice.
#[async_trait]
pub trait PromptBuilder: Send + Sized {
    fn preamble(self, preamble: impl Into<String>) -> Self;
    fn temperature(self, temperature: f32) -> Self;
    async fn send(self) -> Result<String>;
}
