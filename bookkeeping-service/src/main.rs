use bookkeeping_service::{config::Config, Application};
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("bookkeeping-service", "info,bookkeeping_service=debug");

    let config = Config::from_env()?;
    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
