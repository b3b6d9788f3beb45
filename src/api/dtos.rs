use serde::Deserialize;
use crate::board::entities::{CommentId, UserId};
use crate::board::vote::Vote;

// Records as the API sends them. They get turned into
// the board entities once everything needed is there.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
  pub title: String,
  pub content: String,
  pub thumbnail: String,
  pub bp: u32,
  pub gp: u32,
  pub comments: u32,
  pub user_id: UserId
}

// Some endpoints used to send bp/gp/replies instead of
// the long names, accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
  pub id: CommentId,
  pub content: String,
  pub user_id: UserId,
  #[serde(alias = "bp", default)]
  pub bp_count: u32,
  #[serde(alias = "gp", default)]
  pub gp_count: u32,
  #[serde(alias = "replies", default)]
  pub replies_count: u32
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentPage {
  #[serde(default)]
  pub comments: Vec<CommentRecord>
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfVoteState {
  pub vote: Vote
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfVoteRecord {
  pub state: SelfVoteState
}
