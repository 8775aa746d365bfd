use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dirlens_cli::main_entry().await
}
