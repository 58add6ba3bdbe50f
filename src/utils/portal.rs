use std::fs;

use anyhow::{anyhow, Context, Result};
use log::info;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use url::Url;

use crate::config::{Config, PageSource};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.3";

// The portal serves every level at once when `level` is left empty.
pub fn transcript_url(base: &str, student_code: &str) -> Result<Url> {
    Url::parse_with_params(base, &[("level", ""), ("stucode", student_code)])
        .with_context(|| format!("Invalid transcript URL: {}", base))
}

// Asynchronously retrieves the transcript fragment for one student.
pub async fn retrieve_transcripts(url: &Url) -> Result<String> {
    let client = Client::builder()
        .build()
        .context("Failed to build the client")?;

    let response = client
        .get(url.clone())
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await
        .context("Failed to send transcript request")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Transcript request failed with status {}", status));
    }

    response.text().await.context("Failed to read response text")
}

// Gets the page either from the portal or from a saved copy, dumping it to
// disk when asked to.
pub async fn load_page(config: &Config) -> Result<String> {
    let html = match &config.source {
        PageSource::File(path) => {
            info!("Reading transcripts from {:?}", path);
            fs::read_to_string(path).with_context(|| format!("Failed to read page {:?}", path))?
        }
        PageSource::Portal { base_url, student_code } => {
            let url = transcript_url(base_url, student_code)?;
            retrieve_transcripts(&url).await?
        }
    };

    if let Some(dump) = &config.html_dump {
        fs::write(dump, &html).with_context(|| format!("Failed to dump page to {:?}", dump))?;
    }

    Ok(html)
}
