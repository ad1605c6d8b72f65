use eql::{server, settings::Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eql::Result<()> {
    // an explicit settings file may be passed as the only argument
    let path = std::env::args().nth(1);
    let settings = Settings::load(path.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let address = settings.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, "EQL server listening");
    axum::serve(listener, server::router()).await?;
    Ok(())
}
