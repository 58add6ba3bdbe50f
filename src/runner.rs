use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use log::info;

use crate::config::Config;
use crate::models::Course;
use crate::utils::diff::compare;
use crate::utils::parser::parse_snapshot;
use crate::utils::portal::load_page;
use crate::utils::{store, telegram};

#[derive(Debug, PartialEq)]
pub enum RunOutcome {
    NoUpdates,
    Updated(Vec<Course>),
}

// Fetches, parses and compares the transcripts, then notifies and stores
// the new snapshot when something changed.
pub async fn run(config: &Config) -> Result<RunOutcome> {
    let html = load_page(config).await?;
    info!("Transcripts retrieved successfully");

    process(config, &html, Local::now().naive_local()).await
}

// Everything after the page is in hand. The store is only written once
// the notification went out, so a failed send is detected again next run.
pub async fn process(config: &Config, html: &str, captured_at: NaiveDateTime) -> Result<RunOutcome> {
    let actual = parse_snapshot(html, captured_at).context("Failed to parse transcripts")?;
    info!("Parsed {} transcript(s)", actual.transcripts.len());

    let previous = store::load(&config.data_file);

    let Some(changed) = compare(&previous, &actual) else {
        info!("No new grades found");
        return Ok(RunOutcome::NoUpdates);
    };
    info!("{} new or updated course(s)", changed.len());

    notify(config, &changed).await?;
    store::save(&config.data_file, &actual)?;

    Ok(RunOutcome::Updated(changed))
}

async fn notify(config: &Config, changed: &[Course]) -> Result<()> {
    let message = telegram::new_courses_message(changed);
    match &config.telegram {
        Some(bot) => telegram::send(bot, &message).await,
        None => {
            info!("No Telegram bot configured, notification:\n{}", message);
            Ok(())
        }
    }
}
