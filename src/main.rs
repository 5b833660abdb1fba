use color_eyre::Result;
use tracing::error;

use jsontodo::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_with_dotenv().inspect_err(|err| {
        error!(%err, "invalid configuration");
    })?;

    jsontodo::run(config).await.inspect_err(|err| {
        error!(error = %err, "server failed");
    })
}
