use serde::Deserialize;
use derive_more::Display;
use std::convert::TryFrom;

/**
 * The current user's vote on an article or comment.
 * On the wire it's -1, 0 or 1.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Deserialize)]
#[serde(try_from = "i64")]
pub enum Vote {
  #[display(fmt = "-1")]
  Down,
  #[display(fmt = "0")]
  None,
  #[display(fmt = "+1")]
  Up
}

impl TryFrom<i64> for Vote {
  type Error = String;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    match value {
      -1 => Ok(Vote::Down),
      0 => Ok(Vote::None),
      1 => Ok(Vote::Up),
      other => Err(format!("Invalid vote value: {}", other))
    }
  }
}

// The two vote endpoints. Calling one of them toggles
// the vote of that polarity on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum VoteAction {
  #[display(fmt = "bp")]
  Bp,
  #[display(fmt = "gp")]
  Gp
}

impl VoteAction {
  pub fn polarity(&self) -> Vote {
    match self {
      VoteAction::Bp => Vote::Down,
      VoteAction::Gp => Vote::Up
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      VoteAction::Bp => "bp",
      VoteAction::Gp => "gp"
    }
  }
}

/**
 * Vote counters and self vote of an article or a comment.
 * self_vote is None when we never managed to sync it.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteState {
  pub self_vote: Option<Vote>,
  pub bp_count: u32,
  pub gp_count: u32
}

impl VoteState {
  pub fn new(bp_count: u32, gp_count: u32) -> Self {
    Self {
      self_vote: None,
      bp_count,
      gp_count
    }
  }

  // Apply the local effect of a vote the server accepted.
  // Only removing a vote we already had is reflected
  // locally, adding or switching a vote needs a fresh
  // fetch to show up in the counters.
  // Returns true if anything changed.
  pub fn confirm(&mut self, action: VoteAction) -> bool {
    if self.self_vote != Some(action.polarity()) {
      return false;
    }
    self.self_vote = Some(Vote::None);
    match action {
      VoteAction::Bp => self.bp_count = self.bp_count.saturating_sub(1),
      VoteAction::Gp => self.gp_count = self.gp_count.saturating_sub(1)
    }
    true
  }
}
