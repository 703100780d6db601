use crate::error::{Result, TransformError};
use std::path::Path;

/// Instruction sent ahead of every block.
///
/// The `## name {#name}` heading is what makes `index.md` links land on the
/// right section of the generated page.
pub const DEFAULT_PROMPT: &str = "\
Document the following C/C++ SDK definitions (functions, their parameters and structs) as Markdown.
Write every description in Chinese.
Use exactly this layout for each definition:
1. A heading of the form `## function_name {#function_name}`
2. The complete definition in a ```c code block
3. A description, translating what the source comments say into Chinese
4. The parameters as a Markdown table
5. The return value, covering every case

Each following message is one SDK definition. Reply with the Markdown only.";

/// Read a prompt override from `path`. Surrounding whitespace is dropped; an
/// empty file is rejected.
pub fn load_prompt(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|err| {
        TransformError::config(format!("read prompt file {}: {err}", path.display()))
    })?;
    let prompt = raw.trim();
    if prompt.is_empty() {
        return Err(TransformError::config(format!(
            "prompt file {} is empty",
            path.display()
        )));
    }
    Ok(prompt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_prompt_requests_anchor_headings() {
        assert!(DEFAULT_PROMPT.contains("{#function_name}"));
    }

    #[test]
    fn default_prompt_asks_for_chinese_descriptions() {
        assert!(DEFAULT_PROMPT.contains("Write every description in Chinese."));
        assert!(DEFAULT_PROMPT.contains("source comments say into Chinese"));
    }

    #[test]
    fn load_prompt_trims_and_rejects_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("prompt.txt");

        std::fs::write(&path, "\n  Explain this header.  \n").unwrap();
        assert_eq!(load_prompt(&path).unwrap(), "Explain this header.");

        std::fs::write(&path, " \n").unwrap();
        assert!(matches!(load_prompt(&path), Err(TransformError::Config(_))));
    }

    #[test]
    fn load_prompt_reports_missing_file() {
        let temp = tempdir().unwrap();
        let err = load_prompt(temp.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }
}
