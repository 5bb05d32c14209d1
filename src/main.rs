use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    covera::run().await
}
