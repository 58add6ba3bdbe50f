use std::fs;
use std::path::{Path, PathBuf};

use transcript_watch::config::{Config, PageSource, TelegramConfig};
use transcript_watch::runner::{process, run, RunOutcome};
use transcript_watch::utils::store;

fn fixture_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/transcript.html"))
}

fn offline_config(dir: &Path) -> Config {
    Config {
        source: PageSource::File(fixture_path()),
        html_dump: None,
        data_file: dir.join("data.json"),
        telegram: None,
    }
}

fn captured_at() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 4, 3).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

#[tokio::test]
async fn first_run_stores_and_reports_everything() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config(dir.path());
    config.html_dump = Some(dir.path().join("index.html"));

    let outcome = run(&config).await.unwrap();
    match outcome {
        RunOutcome::Updated(courses) => assert_eq!(courses.len(), 5),
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(store::load(&config.data_file).transcripts.len(), 3);
    assert_eq!(
        fs::read_to_string(dir.path().join("index.html")).unwrap(),
        fs::read_to_string(fixture_path()).unwrap()
    );
}

#[tokio::test]
async fn unchanged_page_leaves_the_store_alone() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());
    let html = fs::read_to_string(fixture_path()).unwrap();

    process(&config, &html, captured_at()).await.unwrap();
    let stored = fs::read_to_string(&config.data_file).unwrap();

    let later = captured_at() + chrono::Duration::hours(1);
    assert_eq!(process(&config, &html, later).await.unwrap(), RunOutcome::NoUpdates);
    assert_eq!(fs::read_to_string(&config.data_file).unwrap(), stored);
}

#[tokio::test]
async fn new_grade_is_reported_alone() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());
    let html = fs::read_to_string(fixture_path()).unwrap();
    process(&config, &html, captured_at()).await.unwrap();

    let graded = html.replace(
        "<td>6</td><td>0</td><td></td>\n      <td></td><td></td><td></td><td></td>",
        "<td>6</td><td>6</td><td>B+</td>\n      <td>3.3</td><td>77</td><td>19.8</td><td></td>",
    );
    assert_ne!(graded, html);

    match process(&config, &graded, captured_at()).await.unwrap() {
        RunOutcome::Updated(courses) => {
            assert_eq!(courses.len(), 1);
            assert_eq!(courses[0].title, "Langage C");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(process(&config, &graded, captured_at()).await.unwrap(), RunOutcome::NoUpdates);
}

#[tokio::test]
async fn bad_total_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());
    let html = fs::read_to_string(fixture_path())
        .unwrap()
        .replace("<td>Total semestre 2</td><td>3</td>", "<td>Total semestre 2</td><td>trois</td>");

    let err = process(&config, &html, captured_at()).await.unwrap_err();
    assert!(format!("{:#}", err).contains("credits"));
    assert!(!config.data_file.exists());
}

#[tokio::test]
async fn missing_page_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config(dir.path());
    config.source = PageSource::File(dir.path().join("absent.html"));

    assert!(run(&config).await.is_err());
    assert!(!config.data_file.exists());
}

#[tokio::test]
async fn failed_notification_keeps_the_old_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config(dir.path());
    let html = fs::read_to_string(fixture_path()).unwrap();
    process(&config, &html, captured_at()).await.unwrap();
    let stored = fs::read_to_string(&config.data_file).unwrap();

    // Nothing listens on port 1, so the send is refused.
    config.telegram = Some(TelegramConfig {
        token: "123456:test".to_string(),
        chat_id: 42,
        api_url: Some(url::Url::parse("http://127.0.0.1:1/").unwrap()),
    });
    let graded = html.replace(
        "<td>3.7</td><td>80</td><td>11.1</td><td></td>",
        "<td>3.7</td><td>81</td><td>11.1</td><td></td>",
    );
    assert_ne!(graded, html);

    let err = process(&config, &graded, captured_at()).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Telegram"));
    assert_eq!(fs::read_to_string(&config.data_file).unwrap(), stored);
}
