use serde::{Deserialize, Serialize};

/// A named unit of header source: a function or struct definition together with
/// the comment run directly above it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeBlock {
    /// What kind of construct the block holds
    pub kind: BlockKind,

    /// Identifier of the function or struct. Not unique; never an ordering key.
    pub name: String,

    /// Verbatim source, comments included, blank edge lines trimmed
    pub text: String,

    /// Position in the file's extraction order
    pub original_index: usize,

    /// First line of `text` in the source (1-indexed)
    pub start_line: usize,

    /// Last line of `text` in the source (1-indexed, inclusive)
    pub end_line: usize,
}

impl CodeBlock {
    #[must_use]
    pub const fn new(
        kind: BlockKind,
        name: String,
        text: String,
        original_index: usize,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        Self {
            kind,
            name,
            text,
            original_index,
            start_line,
            end_line,
        }
    }

    /// Get the number of source lines in this block
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(self.kind, BlockKind::Function)
    }
}

/// Kind of construct a block was matched as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Function definition or declaration
    Function,
    /// `struct name { ... };`
    Struct,
}

impl BlockKind {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Struct => "struct",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
