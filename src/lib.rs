//! Client-side data layer for the discussion board:
//! articles, their comments and replies, with vote state
//! and cursor pagination kept consistent locally.
//!
//! Build a `ClientState` with a transport, the current
//! user and an error reporter, hand it to an
//! `ArticleStore` and go from there.

pub mod api;
pub mod board;
pub mod config;
pub mod utils;

pub use board::{
  Article,
  ArticleId,
  ArticleStore,
  BoardError,
  ClientState,
  Comment,
  CommentId,
  CommentMut,
  SortOrder,
  UserId,
  Vote
};
