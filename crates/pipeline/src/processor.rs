use crate::assembler::{index_entries, write_document, IndexEntry, IndexWriter};
use crate::error::{PipelineError, Result};
use crate::executor::{process_blocks, ExecutorOptions, FileOutcome};
use crate::run_lock::acquire_run_lock;
use crate::scanner::{is_already_processed, FileScanner, OutputLayout};
use crate::stats::RunStats;
use headerdoc_block_extractor::{extract_blocks, CodeBlock};
use headerdoc_transformer::Transformer;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// What documenting one header produced
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Extracted blocks in source order
    pub blocks: Vec<CodeBlock>,
}

impl FileReport {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn index_entries(&self, link_path: &str) -> Vec<IndexEntry> {
        index_entries(&self.blocks, link_path)
    }
}

/// Drives headers through extraction, the executor and the assembler.
///
/// The transformer is built once per run and shared by every batch.
pub struct DocProcessor {
    transformer: Arc<dyn Transformer>,
    options: ExecutorOptions,
    ignore_rules: bool,
}

impl DocProcessor {
    pub fn new(transformer: Arc<dyn Transformer>, options: ExecutorOptions) -> Self {
        Self {
            transformer,
            options,
            ignore_rules: false,
        }
    }

    /// Skip hidden and `.gitignore`d headers during discovery
    #[must_use]
    pub fn with_ignore_rules(mut self, enabled: bool) -> Self {
        self.ignore_rules = enabled;
        self
    }

    /// Document one header into `output`.
    ///
    /// Nothing is written unless every block was transformed.
    pub async fn process_file(&self, input: &Path, output: &Path) -> Result<FileReport> {
        let content =
            tokio::fs::read_to_string(input)
                .await
                .map_err(|source| PipelineError::Read {
                    path: input.to_path_buf(),
                    source,
                })?;
        let blocks = extract_blocks(&content);
        if blocks.is_empty() {
            log::debug!("No blocks found in {}", input.display());
        }

        let outcome = process_blocks(
            blocks.clone(),
            Arc::clone(&self.transformer),
            &self.options,
        )
        .await;

        match outcome {
            FileOutcome::Success(outputs) => {
                write_document(output, &outputs).await?;
                Ok(FileReport { blocks })
            }
            FileOutcome::Failure(failure) => Err(PipelineError::BlockExhausted {
                path: input.to_path_buf(),
                failure,
            }),
        }
    }

    /// Document every header under `input_dir` into `output_dir`.
    ///
    /// Files are handled one after another; a file that fails is logged,
    /// counted and left out of the index while the run moves on. Headers that
    /// already have a non-empty output are skipped and not indexed again.
    pub async fn make_doc(
        &self,
        input_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<RunStats> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();
        let start = Instant::now();

        if !input_dir.is_dir() {
            return Err(PipelineError::InvalidPath(format!(
                "input directory {} does not exist",
                input_dir.display()
            )));
        }
        self.options.validate()?;

        let lock = acquire_run_lock(output_dir).await?;
        log::debug!("Holding run lock {}", lock.path().display());
        let layout = OutputLayout::new(input_dir, output_dir);
        let mut index = IndexWriter::create(layout.index_path()).await?;

        let files = FileScanner::new(input_dir)
            .with_ignore_rules(self.ignore_rules)
            .scan();
        let total = files.len();
        let mut stats = RunStats::new();

        for (position, input) in files.iter().enumerate() {
            let output = layout.output_path(input)?;
            if is_already_processed(&output).await {
                log::info!(
                    "Skipping {} ({}/{total}): already documented",
                    input.display(),
                    position + 1
                );
                stats.add_skipped();
                continue;
            }

            log::info!("Processing {} ({}/{total})", input.display(), position + 1);
            match self.process_file(input, &output).await {
                Ok(report) => {
                    let entries = report.index_entries(&layout.link_path(input)?);
                    let stem = input
                        .file_stem()
                        .map(|stem| stem.to_string_lossy())
                        .unwrap_or_default();
                    index.append_section(&stem, &entries).await?;
                    stats.add_processed(report.block_count(), entries.len());
                    log::info!("Wrote {}", output.display());
                }
                Err(err) => {
                    log::error!("Failed to document {}: {err}", input.display());
                    stats.add_failure(err.to_string());
                }
            }
        }

        stats.time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Index written to {} ({} sections)",
            index.path().display(),
            index.sections()
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use headerdoc_transformer::TransformError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    struct Echo;

    #[async_trait]
    impl Transformer for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn transform(&self, text: &str) -> headerdoc_transformer::Result<String> {
            Ok(text.to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl Transformer for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn transform(&self, _text: &str) -> headerdoc_transformer::Result<String> {
            Err(TransformError::EmptyResponse)
        }
    }

    fn quick_options() -> ExecutorOptions {
        let mut options = ExecutorOptions::default();
        options.retry.delay = std::time::Duration::ZERO;
        options
    }

    #[tokio::test]
    async fn empty_header_yields_empty_document() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("empty.h");
        let output = temp.path().join("out").join("empty.md");
        std::fs::write(&input, "#pragma once\n").unwrap();

        let processor = DocProcessor::new(Arc::new(Echo), quick_options());
        let report = processor.process_file(&input, &output).await.unwrap();

        assert_eq!(report.block_count(), 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    }

    #[tokio::test]
    async fn failed_file_writes_nothing() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("math.h");
        let output = temp.path().join("math.md");
        std::fs::write(&input, "int add(int a, int b) { return a + b; }\n").unwrap();

        let processor = DocProcessor::new(Arc::new(Broken), quick_options());
        let err = processor.process_file(&input, &output).await.unwrap_err();

        match err {
            PipelineError::BlockExhausted { failure, .. } => {
                assert_eq!(failure.index, 0);
                assert_eq!(failure.attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn missing_input_dir_is_rejected() {
        let temp = tempdir().unwrap();
        let processor = DocProcessor::new(Arc::new(Echo), quick_options());

        let err = processor
            .make_doc(temp.path().join("nope"), temp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn unreadable_header_is_a_read_error() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("latin1.h");
        std::fs::write(&input, [0xff_u8, 0xfe, 0x00]).unwrap();

        let processor = DocProcessor::new(Arc::new(Echo), quick_options());
        let err = processor
            .process_file(&input, &temp.path().join("latin1.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }
}
