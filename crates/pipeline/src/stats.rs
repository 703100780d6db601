use serde::{Deserialize, Serialize};

/// Statistics about one documentation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Headers documented in this run
    pub files_processed: usize,

    /// Headers skipped because their output already existed
    pub files_skipped: usize,

    /// Headers whose blocks could not all be transformed
    pub files_failed: usize,

    /// Blocks transformed across all documented headers
    pub blocks: usize,

    /// Function links written to the index
    pub functions_indexed: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// One message per failed header
    pub errors: Vec<String>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processed(&mut self, blocks: usize, functions: usize) {
        self.files_processed += 1;
        self.blocks += blocks;
        self.functions_indexed += functions;
    }

    pub fn add_skipped(&mut self) {
        self.files_skipped += 1;
    }

    pub fn add_failure(&mut self, error: String) {
        self.files_failed += 1;
        self.errors.push(error);
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        format!(
            "{} documented, {} skipped, {} failed; {} blocks, {} functions indexed in {} ms",
            self.files_processed,
            self.files_skipped,
            self.files_failed,
            self.blocks,
            self.functions_indexed,
            self.time_ms
        )
    }
}
