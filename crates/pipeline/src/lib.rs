//! # Headerdoc Pipeline
//!
//! Turns a tree of C/C++ headers into per-file documentation pages plus an
//! `index.md` that links every documented function.
//!
//! ## Pipeline
//!
//! ```text
//! Input directory
//!     │
//!     ├──> File Scanner (.h / .hpp, .gitignore aware)
//!     │      └─> header paths (skip those already documented)
//!     │
//!     ├──> Block Extractor
//!     │      └─> CodeBlock[] in source order
//!     │
//!     ├──> Ordered Concurrent Executor (W workers, R attempts per block)
//!     │      └─> Success(outputs by original index) | Failure(first exhausted block)
//!     │
//!     └──> Assembler (Success only)
//!            ├─> files/<rel>.md   (atomic write)
//!            └─> index.md section
//! ```
//!
//! A failed file leaves no output behind and is left out of the index; the run
//! moves on to the next file.
//!
//! ## Example
//!
//! ```no_run
//! use headerdoc_pipeline::{DocProcessor, ExecutorOptions};
//! use headerdoc_transformer::{build_transformer, TransformerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transformer = build_transformer(&TransformerConfig::from_env()?)?;
//!     let processor = DocProcessor::new(transformer, ExecutorOptions::default());
//!     let stats = processor.make_doc("include", "docs").await?;
//!
//!     println!("Documented {} files, {} blocks", stats.files_processed, stats.blocks);
//!     Ok(())
//! }
//! ```

mod assembler;
mod error;
mod executor;
mod limits;
mod processor;
mod run_lock;
mod scanner;
mod stats;

pub use assembler::{index_entries, render_document, write_document, IndexEntry, IndexWriter};
pub use error::{PipelineError, Result};
pub use executor::{
    process_blocks, BlockFailure, BlockResult, ExecutorOptions, FileOutcome, RetryPolicy,
};
pub use limits::{
    concurrency_from_env, parse_bounded, DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_DELAY_MS, MAX_CONCURRENCY,
};
pub use processor::{DocProcessor, FileReport};
pub use scanner::{is_already_processed, FileScanner, OutputLayout, HEADER_EXTENSIONS};
pub use stats::RunStats;
