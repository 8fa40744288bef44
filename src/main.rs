use std::sync::Arc;
use log::{error, info, warn};

use mindscribe::config::MindScribeConfig;
use mindscribe::notes::NotesBackend;
use mindscribe::providers::ChatClient;
use mindscribe::router::AiRouter;
use mindscribe::server::{self, AppState};

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    if let Err(e) = run().await
    {   error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), mindscribe::Error>
{   let config = MindScribeConfig::load()?;
    info!(
      "Provider {:?}: light={} heavy={}"
    , config.provider.provider
    , config.provider.light_model
    , config.provider.heavy_model
    );

    let client = ChatClient::from_config(&config.provider)?;
    if !client.has_api_key() && config.provider.provider.requires_api_key()
    {   warn!(
          "{} is not set; AI requests will fail until it is"
        , config.provider.api_key_env()
        );
    }

    let router = AiRouter::new(Arc::new(client), config.limits.clone());
    let notes = NotesBackend::spawn();
    server::serve(&config, AppState::new(router, notes)).await
}
