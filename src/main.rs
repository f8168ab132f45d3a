use anyhow::Result;
use fete_core::{Config, ConfigError};

#[tokio::main]
async fn main() -> Result<()> {
    fete_core::init()?;

    let config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            if let Some(config_error) = e.downcast_ref::<ConfigError>() {
                tracing::error!("{}", config_error.user_message());
            }
            std::process::exit(1);
        }
    };

    tracing::info!("Fete server starting");
    fete_server::serve(config).await?;

    Ok(())
}
