use derive_more::Display;
use super::entities::{ArticleId, CommentId};

// Error type for everything the board entities do.
// Transport failures arrive as eyre reports and are
// flattened to a string here, the full chain is kept
// with the alternate formatter.
#[derive(Debug, Display)]
pub enum BoardError {
  #[display(fmt = "Transport error: {}", _0)]
  Transport(String),
  #[display(fmt = "Unexpected response: {}", _0)]
  BadResponse(String),
  #[display(fmt = "Article {} is unavailable: {}", _0, _1)]
  ArticleUnavailable(ArticleId, String),
  #[display(fmt = "Comment {} not found", _0)]
  CommentNotFound(CommentId),
  #[display(fmt = "Comment {} is a reply, replies cannot be nested", _0)]
  NestedReplies(CommentId),
  #[display(fmt = "No user is signed in")]
  NotSignedIn
}

impl std::error::Error for BoardError {}

pub type Result<T> = std::result::Result<T, BoardError>;

pub fn map_transport_error(e: color_eyre::Report) -> BoardError {
  BoardError::Transport(format!("{:#}", e))
}

pub fn map_response_error(e: serde_json::Error) -> BoardError {
  BoardError::BadResponse(e.to_string())
}

impl BoardError {
  // Only failures that actually went over the wire are
  // worth bothering the user with.
  pub fn is_transport(&self) -> bool {
    matches!(self, BoardError::Transport(_))
  }
}
