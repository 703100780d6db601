use crate::error::{ExtractorError, Result};
use crate::types::{BlockKind, CodeBlock};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::path::Path;

/// Run of `//` lines and single-run `/* ... */` comments directly above a block.
///
/// The block-comment arm is the look-around free form of "`/*`, anything that
/// does not close the comment, `*/`".
const COMMENT_RUN: &str = r"(?P<comments>(?:[ \t]*//[^\n]*\n|[ \t]*/\*[^*]*\*+(?:[^/*][^*]*\*+)*/[ \t]*\n)*)";

/// Brace region balanced to depth zero with at most one nested `{ }` level.
const BRACE_BODY: &str = r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}";

/// The return type ends in whitespace or `*`, so `char *name(` matches as well
/// as `int name(`.
static FUNCTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"{COMMENT_RUN}(?P<return_type>[\w*\s]+?[\s*])(?P<name>\w+)\s*\((?P<params>[^)]*)\)\s*(?P<body>{BRACE_BODY}|;)"
    );
    Regex::new(&pattern).unwrap()
});

static STRUCT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"{COMMENT_RUN}struct\s+(?P<name>\w+)\s*(?P<body>{BRACE_BODY})\s*;");
    Regex::new(&pattern).unwrap()
});

struct RawMatch<'a> {
    start: usize,
    kind: BlockKind,
    name: &'a str,
    text: &'a str,
}

/// Extract function and struct blocks from header text, in source order.
///
/// Both passes scan left to right for non-overlapping matches; their results
/// are merged by match start (a function wins a tie). Identical input always
/// yields an identical block list. `\r\n` and lone `\r` line endings are
/// read as `\n`, so block text always uses `\n`.
#[must_use]
pub fn extract_blocks(content: &str) -> Vec<CodeBlock> {
    let content = normalize_line_endings(content);
    let content = content.as_ref();
    let mut raw: Vec<RawMatch<'_>> = Vec::new();
    collect_matches(&FUNCTION_PATTERN, BlockKind::Function, content, &mut raw);
    collect_matches(&STRUCT_PATTERN, BlockKind::Struct, content, &mut raw);

    // Stable: functions were pushed first, so equal starts keep that order.
    raw.sort_by_key(|m| m.start);

    let lines = LineIndex::new(content);
    let blocks: Vec<CodeBlock> = raw
        .into_iter()
        .enumerate()
        .map(|(original_index, m)| {
            let leading = leading_blank_lines(m.text);
            let text = trim_blank_edges(m.text);
            let start_line = lines.line_of(m.start) + leading;
            let end_line = start_line + text.split('\n').count().saturating_sub(1);
            let block = CodeBlock::new(
                m.kind,
                m.name.to_string(),
                text,
                original_index,
                start_line,
                end_line,
            );
            log::trace!(
                "{} {} at lines {}-{} ({} lines)",
                block.kind,
                block.name,
                block.start_line,
                block.end_line,
                block.line_count()
            );
            block
        })
        .collect();

    log::debug!(
        "Extracted {} blocks ({} functions)",
        blocks.len(),
        blocks.iter().filter(|b| b.is_function()).count()
    );
    blocks
}

fn normalize_line_endings(content: &str) -> Cow<'_, str> {
    if content.contains('\r') {
        Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(content)
    }
}

/// Read a header from disk and extract its blocks.
pub fn extract_file(path: impl AsRef<Path>) -> Result<Vec<CodeBlock>> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|err| ExtractorError::read(path, err))?;
    Ok(extract_blocks(&content))
}

/// Names of function blocks in original order. Structs are skipped.
pub fn function_names(blocks: &[CodeBlock]) -> impl Iterator<Item = &str> {
    blocks
        .iter()
        .filter(|block| block.is_function())
        .map(|block| block.name.as_str())
}

/// Drop whitespace-only lines at the start and end of `text`. Interior blank
/// lines are kept.
#[must_use]
pub fn trim_blank_edges(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(first) = lines.iter().position(|line| !line.trim().is_empty()) else {
        return String::new();
    };
    let last = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(first);
    lines[first..=last].join("\n")
}

fn leading_blank_lines(text: &str) -> usize {
    text.split('\n')
        .take_while(|line| line.trim().is_empty())
        .count()
}

fn collect_matches<'a>(
    pattern: &Regex,
    kind: BlockKind,
    content: &'a str,
    out: &mut Vec<RawMatch<'a>>,
) {
    for caps in pattern.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
            continue;
        };
        out.push(RawMatch {
            start: whole.start(),
            kind,
            name: name.as_str(),
            text: whole.as_str(),
        });
    }
}

/// Byte offset → 1-indexed line lookup
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        Self {
            newlines: content
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| (b == b'\n').then_some(i))
                .collect(),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}
