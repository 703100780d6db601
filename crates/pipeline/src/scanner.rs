use crate::error::{PipelineError, Result};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

/// Header extensions documented by default
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp"];

const OUTPUT_FILES_DIR: &str = "files";
const INDEX_FILE_NAME: &str = "index.md";

/// Scanner for finding header files under an input directory
pub struct FileScanner {
    root: PathBuf,
    extensions: Vec<String>,
    ignore_rules: bool,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: HEADER_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect(),
            ignore_rules: false,
        }
    }

    /// Replace the accepted extensions (compared case-insensitively, no dot)
    #[must_use]
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Skip hidden entries and honour `.gitignore`/`.ignore` rules. Off by
    /// default: every matching header under the root is documented.
    #[must_use]
    pub fn with_ignore_rules(mut self, enabled: bool) -> Self {
        self.ignore_rules = enabled;
        self
    }

    /// Scan the root for header files, sorted by path
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let mut builder = WalkBuilder::new(&self.root);
        builder.standard_filters(self.ignore_rules);
        if self.ignore_rules {
            builder.require_git(false);
        }

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }
                    let path = entry.path();
                    if self.is_header(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!("Found {} header files", files.len());
        files
    }

    fn is_header(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
    }
}

/// Maps input headers onto the mirrored output tree.
///
/// `include/net/socket.h` under input root `include` becomes
/// `<out>/files/net/socket.md`, linked from the index as
/// `files/net/socket.html`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    input_root: PathBuf,
    output_root: PathBuf,
}

impl OutputLayout {
    pub fn new(input_root: impl AsRef<Path>, output_root: impl AsRef<Path>) -> Self {
        Self {
            input_root: input_root.as_ref().to_path_buf(),
            output_root: output_root.as_ref().to_path_buf(),
        }
    }

    /// Path of `path` relative to the input root
    pub fn relative(&self, path: &Path) -> Result<PathBuf> {
        let relative = path.strip_prefix(&self.input_root).map_err(|_| {
            PipelineError::InvalidPath(format!(
                "{} is not under {}",
                path.display(),
                self.input_root.display()
            ))
        })?;
        if relative.as_os_str().is_empty() {
            return Err(PipelineError::InvalidPath(format!(
                "{} is the input root itself",
                path.display()
            )));
        }
        Ok(relative.to_path_buf())
    }

    /// `<out>/files/<rel>.md`
    pub fn output_path(&self, path: &Path) -> Result<PathBuf> {
        let relative = self.relative(path)?;
        Ok(self
            .output_root
            .join(OUTPUT_FILES_DIR)
            .join(relative.with_extension("md")))
    }

    /// `files/<rel>.html` with forward slashes, as written into the index
    pub fn link_path(&self, path: &Path) -> Result<String> {
        let relative = self.relative(path)?.with_extension("html");
        let mut parts = vec![OUTPUT_FILES_DIR.to_string()];
        parts.extend(relative.components().filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }));
        Ok(parts.join("/"))
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_root.join(INDEX_FILE_NAME)
    }
}

/// A header counts as documented once its output exists and is non-empty.
pub async fn is_already_processed(output_path: &Path) -> bool {
    tokio::fs::metadata(output_path)
        .await
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}
