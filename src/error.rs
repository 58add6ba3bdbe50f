use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    // A semester total cell did not hold the number it is expected to.
    #[error("level {level}: total field `{field}` is not a number: {value:?}")]
    InvalidTotal {
        level: u32,
        field: &'static str,
        value: String,
    },

    #[error("invalid selector: {0}")]
    Selector(String),
}
