use crate::services::client::fetch_text;
use anyhow::Result;
use reqwest::Client;
use url::Url;

/// Default sample script served next to the web page.
pub const DEFAULT_DEMO_SCRIPT: &str = "demo/tomorrow.txt";

pub async fn load_demo_script(client: &Client, url: Url) -> Result<String> {
    log::debug!("Loading demo script from {}", url);
    fetch_text(client, url).await
}

/// What the demo panel shows: the script, or an inline error in its place.
pub fn demo_script_display(result: Result<String>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Demo script unavailable: {:#}", e);
            format!("Error loading demo script: {}", e)
        }
    }
}
