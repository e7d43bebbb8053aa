#[tokio::main]
async fn main() -> anyhow::Result<()> {
    review_backend::run().await
}
