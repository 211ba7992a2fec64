use thiserror::Error;

/// Failures surfaced by menu operations.
///
/// Chat-service failures are passed through untouched as [`MenuError::Client`];
/// nothing in the menu retries them.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("no page named `{0}` in this menu")]
    PageNotFound(String),
    #[error("page index {index} is out of range for a menu with {len} pages")]
    PageOutOfRange { index: usize, len: usize },
    #[error("a menu needs at least one page")]
    NoPages,
    #[error("the menu message was deleted")]
    Deleted,
    #[error(transparent)]
    Client(#[from] anyhow::Error),
}
