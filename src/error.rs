use thiserror::Error;

use crate::chat::Category;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(String),

    #[error("Scene index {index} out of range (scene count {len})")]
    SceneOutOfRange { index: usize, len: usize },

    #[error("A scene cycler needs at least one scene")]
    NoScenes,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("A reply is still being typed")]
    ReplyPending,

    #[error("No candidate responses for category {0:?}")]
    EmptyResponses(Category),

    #[error("Response book error: {0}")]
    ResponseBook(#[from] serde_json::Error),

    #[error("Contact relay error: {0}")]
    Contact(String),

    #[error("A submission is already in flight")]
    SubmitInFlight,
}

pub type Result<T> = std::result::Result<T, Error>;
