use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotAiError {
    #[error("no training samples could be generated")]
    NoTrainingSamples,
    #[error("sample {row} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        row: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("network produced no output")]
    EmptyOutput,
}
