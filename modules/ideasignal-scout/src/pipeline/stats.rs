use std::collections::BTreeMap;

/// Counters for one pipeline run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub entries_processed: u32,
    pub ideas_built: u32,
    /// Rejections keyed by reason kind.
    pub rejected: BTreeMap<&'static str, u32>,
    pub fetch_failures: u32,
    pub summarizer_fallbacks: u32,
}

impl RunStats {
    pub fn record_rejection(&mut self, kind: &'static str) {
        *self.rejected.entry(kind).or_default() += 1;
    }

    pub fn total_rejected(&self) -> u32 {
        self.rejected.values().sum()
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Idea Run Complete ===")?;
        writeln!(f, "Entries processed:    {}", self.entries_processed)?;
        writeln!(f, "Ideas built:          {}", self.ideas_built)?;
        writeln!(f, "Rejected:             {}", self.total_rejected())?;
        for (kind, count) in &self.rejected {
            writeln!(f, "  {kind}: {count}")?;
        }
        writeln!(f, "Failed fetches:       {}", self.fetch_failures)?;
        write!(f, "Summarizer fallbacks: {}", self.summarizer_fallbacks)
    }
}
