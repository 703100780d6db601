//! # Headerdoc Transformer
//!
//! The transformation service seen from the pipeline: an opaque, fallible
//! `text -> text` call. The pipeline only ever talks to [`Transformer`]; which
//! backend sits behind it is decided once per run from [`TransformerConfig`].
//!
//! ## Backends
//!
//! ```text
//! TransformerConfig (env + CLI overrides)
//!     │
//!     ├──> chat  → ChatTransformer  (OpenAI-compatible /chat/completions)
//!     │
//!     └──> stub  → StubTransformer  (offline, deterministic)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use headerdoc_transformer::{build_transformer, TransformerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TransformerConfig::from_env()?;
//!     let transformer = build_transformer(&config)?;
//!     let doc = transformer.transform("int add(int a, int b);").await?;
//!     println!("{doc}");
//!     Ok(())
//! }
//! ```

mod chat;
mod config;
mod error;
mod prompt;
mod stub;

use async_trait::async_trait;
use std::sync::Arc;

pub use chat::ChatTransformer;
pub use config::{TransformMode, TransformerConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{Result, TransformError};
pub use prompt::{load_prompt, DEFAULT_PROMPT};
pub use stub::StubTransformer;

/// A stateless, fallible conversion of one block's source into its documentation.
///
/// Implementations are shared read-only across worker tasks, so a call must not
/// depend on any other in-flight call.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Transform `text`. Every error is treated as transient by callers.
    async fn transform(&self, text: &str) -> Result<String>;
}

/// Build the backend selected by `config`.
pub fn build_transformer(config: &TransformerConfig) -> Result<Arc<dyn Transformer>> {
    config.validate()?;
    let transformer: Arc<dyn Transformer> = match config.mode {
        TransformMode::Chat => Arc::new(ChatTransformer::new(config)?),
        TransformMode::Stub => Arc::new(StubTransformer::new()),
    };
    log::info!(
        "Using {} transformer (model {})",
        transformer.name(),
        config.model
    );
    Ok(transformer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_mode_builds_offline_transformer() {
        let config = TransformerConfig {
            mode: TransformMode::Stub,
            ..TransformerConfig::default()
        };
        let transformer = build_transformer(&config).unwrap();
        assert_eq!(transformer.name(), "stub");
        let out = transformer.transform("void f(void);").await.unwrap();
        assert!(out.contains("void f(void);"));
    }

    #[test]
    fn chat_mode_requires_api_key() {
        let config = TransformerConfig {
            mode: TransformMode::Chat,
            api_key: None,
            ..TransformerConfig::default()
        };
        let err = build_transformer(&config).err().expect("missing key must fail");
        assert!(matches!(err, TransformError::Config(_)));
    }
}
