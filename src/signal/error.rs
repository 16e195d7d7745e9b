use thiserror::Error;
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("invalid CSV layout: {0}")]
    Schema(String),
    #[error("no candidate column contains a numeric value")]
    NoNumericColumn,
    #[error("no row has both a parseable time and value")]
    EmptyDataset,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for SignalError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        SignalError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for SignalError {
    fn from(value: image::ImageError) -> Self {
        SignalError::Plot(value.to_string())
    }
}
