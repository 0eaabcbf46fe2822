use anyhow::Result;
use lvr_land::{config, fetch};
use reqwest::Client;
use std::{env, process};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let Some(dest) = env::args().nth(1) else {
        error!("Please input result path, e.g. crawler tmp/source/lvr_landcsv.zip");
        process::exit(2);
    };

    let season = config::season_from_env();
    let url = fetch::season_url(&season)?;

    info!("Start downloading {} lvr_land data to {}", season, dest);
    match fetch::download_archive(&Client::new(), &url, &dest).await {
        Ok(bytes) => info!(bytes, "Download completed"),
        Err(e) => {
            error!("Fail to download: {:#}", e);
            process::exit(1);
        }
    }
    Ok(())
}
