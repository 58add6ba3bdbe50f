use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use url::Url;

pub const DEFAULT_TRANSCRIPT_URL: &str = "https://mis.hau.bi/student/loadsingletranscriptforstudent2.php";
pub const DEFAULT_DATA_FILE: &str = "data.json";

// Where the transcript page comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSource {
    Portal { base_url: String, student_code: String },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: i64,
    // Bot API endpoint; the public Telegram API when unset.
    pub api_url: Option<Url>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: PageSource,
    pub html_dump: Option<PathBuf>,
    pub data_file: PathBuf,
    // Without a bot the notification is only logged.
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = match get("TRANSCRIPT_HTML") {
            Some(path) => PageSource::File(PathBuf::from(path)),
            None => PageSource::Portal {
                base_url: get("TRANSCRIPT_URL").unwrap_or_else(|| DEFAULT_TRANSCRIPT_URL.to_string()),
                student_code: get("STUDENT_CODE").context("STUDENT_CODE environment variable not found")?,
            },
        };

        let telegram = match (get("BOT_TOKEN"), get("CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                token,
                chat_id: chat_id
                    .trim()
                    .parse()
                    .with_context(|| format!("CHAT_ID is not a valid chat id: {}", chat_id))?,
                api_url: get("TELEGRAM_API_URL")
                    .map(|raw| Url::parse(&raw).with_context(|| format!("TELEGRAM_API_URL is not a valid URL: {}", raw)))
                    .transpose()?,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(anyhow!("BOT_TOKEN is set but CHAT_ID environment variable not found")),
            (None, Some(_)) => return Err(anyhow!("CHAT_ID is set but BOT_TOKEN environment variable not found")),
        };

        Ok(Config {
            source,
            html_dump: get("HTML_DUMP").map(PathBuf::from),
            data_file: PathBuf::from(get("DATA_FILE").unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())),
            telegram,
        })
    }
}

// Reads `LOG_LEVEL`. An unknown value is handed back so it can be reported
// once the logger is up.
pub fn parse_log_level(raw: Option<&str>) -> std::result::Result<LevelFilter, String> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(LevelFilter::Info),
        Some(value) => value.parse().map_err(|_| value.to_string()),
    }
}
