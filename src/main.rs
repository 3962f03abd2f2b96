use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    groqsh::run().await
}
