/*
 * The board entities: the article cache, articles and
 * their two-level comment trees. This is where the vote
 * and pagination state is kept consistent, everything
 * else is delegated to the collaborators in ClientState.
 */

use log::{debug, error};
use serde::de::DeserializeOwned;
use crate::api::{dtos::SelfVoteRecord, routes, ApiRequest, Transport};
pub mod article;
pub mod comment;
pub mod entities;
pub mod error;
pub mod store;
pub mod vote;
#[cfg(test)]
pub mod testing;

pub use article::Article;
pub use comment::{Comment, CommentMut};
pub use entities::{ArticleId, CommentId, Parent, SortOrder, UserId};
pub use error::{BoardError, Result};
pub use store::ArticleStore;
pub use vote::{Vote, VoteAction, VoteState};
use error::{map_response_error, map_transport_error};

// Whoever is signed in. The board never changes it.
pub trait CurrentUser {
  fn user_id(&self) -> Option<UserId>;
}

// Where failed interactions get surfaced to the user
// (dialog, toast, whatever the front has).
pub trait ErrorReporter {
  fn raise_error(&self, title: &str, message: &str);
}

/**
 * A user that never changes for the lifetime of the
 * client. None means anonymous browsing.
 */
#[derive(Debug, Clone, Default)]
pub struct FixedUser(pub Option<UserId>);

impl CurrentUser for FixedUser {
  fn user_id(&self) -> Option<UserId> {
    self.0.clone()
  }
}

// Reporter for when there's no UI, errors end up in
// the logs.
#[derive(Debug, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
  fn raise_error(&self, title: &str, message: &str) {
    error!("{} - {}", title, message);
  }
}

// Declare client state struct, shared through an Rc by
// the store and every article it loads.
pub struct ClientState {
  pub transport: Box<dyn Transport>,
  pub current_user: Box<dyn CurrentUser>,
  pub reporter: Box<dyn ErrorReporter>
}

impl ClientState {

  pub fn new(
    transport: Box<dyn Transport>,
    current_user: Box<dyn CurrentUser>,
    reporter: Box<dyn ErrorReporter>
  ) -> Self {
    Self {
      transport,
      current_user,
      reporter
    }
  }

  pub fn user_id(&self) -> Option<UserId> {
    self.current_user.user_id()
  }

  // Mutating calls all need someone to act as.
  pub fn require_user(&self) -> Result<UserId> {
    self.user_id().ok_or(BoardError::NotSignedIn)
  }

  pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
    let value = self.transport.send(request).await
      .map_err(map_transport_error)?;
    serde_json::from_value(value).map_err(map_response_error)
  }

  // Same as fetch but we don't care about the body.
  pub async fn execute(&self, request: ApiRequest) -> Result<()> {
    self.transport.send(request).await
      .map(|_| ())
      .map_err(map_transport_error)
  }

  // Anonymous users have nothing to sync, their vote is
  // always neutral.
  pub async fn fetch_self_vote(&self, id: &str) -> Result<Vote> {
    match self.user_id() {
      Some(user) => {
        let record: SelfVoteRecord = self.fetch(routes::self_vote(id, &user)).await?;
        Ok(record.state.vote)
      },
      None => {
        debug!("No user signed in, self vote for {} is neutral", id);
        Ok(Vote::None)
      }
    }
  }

  // Called on mutation failures. Anything that isn't a
  // transport failure is only returned to the caller.
  pub fn report_failure(&self, context: &str, e: &BoardError) {
    if e.is_transport() {
      self.reporter.raise_error(
        "Error",
        &format!("Interaction failed: {}\n{}", context, e)
      );
    }
  }

}
