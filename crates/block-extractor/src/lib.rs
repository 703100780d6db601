//! # Headerdoc Block Extractor
//!
//! Splits C/C++ header text into named, self-contained code blocks.
//!
//! ## Approach
//!
//! This is not a C parser. Blocks are found with two structural patterns that
//! understand balanced braces up to one level of nesting:
//!
//! ```text
//! Header text
//!     │
//!     ├──> Function pass  [comments] <return type> name(params) { ... } | ;
//!     │
//!     ├──> Struct pass    [comments] struct name { ... };
//!     │
//!     └──> Merge by match start → CodeBlock[] (original_index = 0..N)
//! ```
//!
//! Bodies nested deeper than one level are not guaranteed to match; that is an
//! accepted approximation, along with the occasional false positive on macro
//! lines that look like a return type.
//!
//! ## Example
//!
//! ```rust
//! use headerdoc_block_extractor::{extract_blocks, BlockKind};
//!
//! let header = "// doubles x\nint add(int a, int b) {\n  return a+b;\n}\n";
//! let blocks = extract_blocks(header);
//!
//! assert_eq!(blocks.len(), 1);
//! assert_eq!(blocks[0].kind, BlockKind::Function);
//! assert_eq!(blocks[0].name, "add");
//! ```

mod error;
mod extractor;
mod types;

pub use error::{ExtractorError, Result};
pub use extractor::{extract_blocks, extract_file, function_names, trim_blank_edges};
pub use types::{BlockKind, CodeBlock};
