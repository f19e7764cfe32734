pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] limpet_core::Error),

    #[error("a drag gesture is already in progress")]
    DragInProgress,

    #[error("zoom factor must be finite and positive, got {zoom}")]
    InvalidZoom { zoom: f64 },
}
