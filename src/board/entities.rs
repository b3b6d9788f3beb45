use serde::{Deserialize, Serialize};
use derive_more::{Display, From};
use std::fmt;
use std::str::FromStr;
use crate::utils::serde_utils;

// Identifiers are opaque to us, the server decides
// what they look like. Using newtypes so that an article
// id can't end up where a comment id is expected.

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct ArticleId(
  #[serde(deserialize_with = "serde_utils::string_or_number")]
  String
);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct CommentId(
  #[serde(deserialize_with = "serde_utils::string_or_number")]
  String
);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct UserId(
  #[serde(deserialize_with = "serde_utils::string_or_number")]
  String
);

impl ArticleId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl CommentId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl UserId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for ArticleId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

impl From<&str> for CommentId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

impl From<&str> for UserId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

/**
 * Where a comment hangs in the tree. A comment whose
 * parent is the article is a top-level comment, anything
 * else is a reply. There is no third level.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
  Article(ArticleId),
  Comment(CommentId)
}

impl Parent {
  pub fn is_article(&self) -> bool {
    matches!(self, Parent::Article(_))
  }
}

// The wire values are what the server expects in the
// sortBy query parameter. "gb" isn't a typo on our side,
// it's what the API uses for upvotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
  OldestFirst,
  NewestFirst,
  MostDownvoted,
  MostUpvoted,
  MostReplied
}

impl Default for SortOrder {
  fn default() -> Self {
    SortOrder::NewestFirst
  }
}

impl SortOrder {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortOrder::OldestFirst => "date-sb",
      SortOrder::NewestFirst => "date-bs",
      SortOrder::MostDownvoted => "bp",
      SortOrder::MostUpvoted => "gb",
      SortOrder::MostReplied => "replies"
    }
  }
}

impl fmt::Display for SortOrder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SortOrder {
  type Err = String;

  // Accepts both the wire value and a name people can
  // actually remember (for the CLI and the config).
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "date-sb" | "oldest" => Ok(SortOrder::OldestFirst),
      "date-bs" | "newest" => Ok(SortOrder::NewestFirst),
      "bp" | "most-downvoted" => Ok(SortOrder::MostDownvoted),
      "gb" | "most-upvoted" => Ok(SortOrder::MostUpvoted),
      "replies" | "most-replied" => Ok(SortOrder::MostReplied),
      other => Err(format!("Unknown sort order: {}", other))
    }
  }
}
