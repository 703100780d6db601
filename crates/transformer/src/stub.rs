use crate::error::Result;
use crate::Transformer;
use async_trait::async_trait;

/// Offline backend: wraps the block in a fenced code section.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubTransformer;

impl StubTransformer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transformer for StubTransformer {
    fn name(&self) -> &str {
        "stub"
    }

    async fn transform(&self, text: &str) -> Result<String> {
        Ok(format!("```c\n{}\n```", text.trim_end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wraps_block_in_code_fence() {
        let out = StubTransformer::new()
            .transform("struct s {\n    int a;\n};\n")
            .await
            .unwrap();
        assert_eq!(out, "```c\nstruct s {\n    int a;\n};\n```");
    }
}
