use crate::error::Result;
use headerdoc_block_extractor::{function_names, CodeBlock};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// One index link: `- [name](link_path#name)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub link_path: String,
}

impl IndexEntry {
    fn render(&self) -> String {
        format!("- [{0}]({1}#{0})\n", self.name, self.link_path)
    }
}

/// Index entries for the function blocks of one file, in extraction order.
/// Struct blocks are never indexed.
pub fn index_entries(blocks: &[CodeBlock], link_path: &str) -> Vec<IndexEntry> {
    function_names(blocks)
        .map(|name| IndexEntry {
            name: name.to_string(),
            link_path: link_path.to_string(),
        })
        .collect()
}

/// Concatenate ordered outputs, each terminated by a blank line
pub fn render_document<S: AsRef<str>>(outputs: &[S]) -> String {
    let capacity = outputs.iter().map(|o| o.as_ref().len() + 2).sum();
    let mut document = String::with_capacity(capacity);
    for output in outputs {
        document.push_str(output.as_ref());
        document.push_str("\n\n");
    }
    document
}

/// Write the rendered document next to its final location, then rename it
/// into place so a reader never sees a half-written file.
pub async fn write_document<S: AsRef<str>>(path: &Path, outputs: &[S]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = temp_sibling(path);
    tokio::fs::write(&tmp, render_document(outputs)).await?;
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err.into());
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Owns the per-run `index.md`. Created empty at run start, one section is
/// appended per documented file.
pub struct IndexWriter {
    file: File,
    path: PathBuf,
    sections: usize,
}

impl IndexWriter {
    /// Create or truncate the index
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = File::create(&path).await?;
        Ok(Self {
            file,
            path,
            sections: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn sections(&self) -> usize {
        self.sections
    }

    /// Append `## {stem}`, one link per entry and a blank line, then flush.
    pub async fn append_section(&mut self, stem: &str, entries: &[IndexEntry]) -> Result<()> {
        let mut section = format!("## {stem}\n");
        for entry in entries {
            section.push_str(&entry.render());
        }
        section.push('\n');

        self.file.write_all(section.as_bytes()).await?;
        self.file.flush().await?;
        self.sections += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headerdoc_block_extractor::BlockKind;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn block(kind: BlockKind, name: &str, index: usize) -> CodeBlock {
        CodeBlock::new(kind, name.to_string(), String::new(), index, 1, 1)
    }

    #[test]
    fn document_terminates_each_output_with_blank_line() {
        assert_eq!(render_document(&["A", "B"]), "A\n\nB\n\n");
        assert_eq!(render_document::<&str>(&[]), "");
    }

    #[test]
    fn entries_skip_structs() {
        let blocks = vec![
            block(BlockKind::Function, "open_dev", 0),
            block(BlockKind::Struct, "dev", 1),
            block(BlockKind::Function, "close_dev", 2),
        ];
        let entries = index_entries(&blocks, "files/dev.html");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["open_dev", "close_dev"]);
        assert_eq!(entries[0].render(), "- [open_dev](files/dev.html#open_dev)\n");
    }

    #[tokio::test]
    async fn write_document_replaces_atomically() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("files").join("net").join("socket.md");

        write_document(&path, &["first"]).await.unwrap();
        write_document(&path, &["second", "third"]).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "second\n\nthird\n\n"
        );
        assert!(!temp_sibling(&path).exists());
    }

    #[tokio::test]
    async fn index_writer_truncates_and_appends_sections() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("index.md");
        std::fs::write(&path, "stale\n").unwrap();

        let mut writer = IndexWriter::create(&path).await.unwrap();
        let entries = vec![IndexEntry {
            name: "add".to_string(),
            link_path: "files/math.html".to_string(),
        }];
        writer.append_section("math", &entries).await.unwrap();
        writer.append_section("empty", &[]).await.unwrap();
        assert_eq!(writer.sections(), 2);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "## math\n- [add](files/math.html#add)\n\n## empty\n\n"
        );
    }
}
