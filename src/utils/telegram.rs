use anyhow::{Context, Result};
use log::info;
use teloxide::prelude::{ChatId, Requester};
use teloxide::Bot;

use crate::config::TelegramConfig;
use crate::models::{CellValue, Course};

// Longest text Telegram accepts in one message, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

// Constructs a message string listing each new or updated course with its percent.
pub fn new_courses_message(courses: &[Course]) -> String {
    let mut message = String::from("📚 Nouveaux résultats disponibles ! 📚\n\n");
    for course in courses {
        message.push_str(&format!("📖 {} : {}\n", course.title, percent_label(&course.percent)));
    }
    message += "\nBon courage pour la suite ! 🚀";
    message
}

// Whole floats read as "80 %", not the stored "80.0".
fn percent_label(percent: &CellValue) -> String {
    match percent {
        CellValue::Absent => "-".to_string(),
        CellValue::Integer(value) => format!("{} %", value),
        CellValue::Float(value) => format!("{} %", value),
        CellValue::Text(value) => value.clone(),
    }
}

// Splits a message at line breaks into chunks of at most `limit` characters.
// A single line longer than the limit is cut on character boundaries.
pub fn split_message(message: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.split_inclusive('\n') {
        let mut line = line;
        let mut line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        while line_len > limit {
            let cut = line.char_indices().nth(limit).map_or(line.len(), |(i, _)| i);
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
            line_len -= limit;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// Sends the message to the configured chat, one chunk at a time.
pub async fn send(config: &TelegramConfig, message: &str) -> Result<()> {
    let mut bot = Bot::new(&config.token);
    if let Some(api_url) = &config.api_url {
        bot = bot.set_api_url(api_url.clone());
    }

    for chunk in split_message(message, MESSAGE_LIMIT) {
        let sent = bot
            .send_message(ChatId(config.chat_id), chunk)
            .await
            .context("Failed to send Telegram message")?;
        info!("Text message sent successfully {:?}", sent.id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(title: &str, percent: CellValue) -> Course {
        Course {
            code: "C".to_string(),
            title: title.to_string(),
            credits: CellValue::Absent,
            graded: CellValue::Absent,
            grade: CellValue::Absent,
            gp: CellValue::Absent,
            percent,
            credit_points: CellValue::Absent,
            gpa: CellValue::Absent,
        }
    }

    #[test]
    fn message_lists_title_and_percent() {
        let message = new_courses_message(&[
            course("Texte", CellValue::Integer(80)),
            course("Algèbre", CellValue::Float(64.5)),
            course("Anglais", CellValue::Absent),
        ]);
        assert!(message.contains("📖 Texte : 80 %\n"));
        assert!(message.contains("📖 Algèbre : 64.5 %\n"));
        assert!(message.contains("📖 Anglais : -\n"));
    }

    #[test]
    fn whole_float_percent_has_no_trailing_zero() {
        let message = new_courses_message(&[
            course("Texte", CellValue::Float(80.0)),
            course("Stage", CellValue::Text("Validé".to_string())),
        ]);
        assert!(message.contains("📖 Texte : 80 %\n"));
        assert!(message.contains("📖 Stage : Validé\n"));
    }

    #[test]
    fn zero_limit_keeps_the_message_whole() {
        assert_eq!(split_message("a\nb\n", 0), vec!["a\nb\n".to_string()]);
    }

    #[test]
    fn short_message_is_one_chunk() {
        assert_eq!(split_message("a\nb\n", 10), vec!["a\nb\n".to_string()]);
    }

    #[test]
    fn long_message_splits_on_lines() {
        let chunks = split_message("aaaa\nbbbb\ncccc\n", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n".to_string(), "cccc\n".to_string()]);
    }

    #[test]
    fn oversized_line_is_cut() {
        let chunks = split_message("ééééééé", 3);
        assert_eq!(chunks, vec!["ééé".to_string(), "ééé".to_string(), "é".to_string()]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
    }
}
