use thiserror::Error;

/// Failures at the edges of the analysis core: wire decoding, segment
/// validation and configuration. The analysis passes themselves never fail.
#[derive(Debug, Error)]
pub enum CardioError {
    #[error("PMD frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },
    #[error("unexpected PMD measurement type {0:#04x}")]
    UnexpectedMeasurement(u8),
    #[error("heart rate payload too short ({0} bytes)")]
    HeartRatePayload(usize),
    #[error("segment {index} has start {start} not before end {end}")]
    EmptySegment { index: usize, start: i64, end: i64 },
    #[error("segment {index} spans {span} ms, minimum is {min} ms")]
    SegmentTooShort { index: usize, span: i64, min: i64 },
    #[error("segments {first} and {second} overlap")]
    OverlappingSegments { first: usize, second: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = CardioError> = std::result::Result<T, E>;
