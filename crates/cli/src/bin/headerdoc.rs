use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    headerdoc_cli::main_entry().await
}
