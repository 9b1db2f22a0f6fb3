#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    linediet::Cli::run().await
}
