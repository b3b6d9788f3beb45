use std::rc::Rc;
use log::{debug, info, warn};
use crate::api::dtos::{CommentPage, CommentRecord};
use crate::api::routes::{self, Target};
use super::article::Article;
use super::entities::{ArticleId, CommentId, Parent, UserId};
use super::error::{BoardError, Result};
use super::vote::{Vote, VoteAction, VoteState};
use super::ClientState;

/**
 * A top-level comment or a reply, depending on parent.
 * Only top-level comments have replies.
 */
#[derive(Debug, Clone)]
pub struct Comment {
  id: CommentId,
  article_id: ArticleId,
  parent: Parent,
  author_id: UserId,
  content: String,
  votes: VoteState,
  replies_count: u32,
  replies: Vec<CommentId>,
  replies_cursor: Option<CommentId>,
  load_error: bool,
  replies_error: bool
}

impl Comment {

  // Never fails: a comment whose self vote can't be
  // synced is still worth displaying, it just gets
  // flagged and its self vote stays unknown.
  pub async fn create(
    state: &ClientState,
    article_id: ArticleId,
    record: CommentRecord,
    parent: Parent
  ) -> Comment {
    let mut comment = Comment {
      id: record.id,
      article_id,
      parent,
      author_id: record.user_id,
      content: record.content,
      votes: VoteState::new(record.bp_count, record.gp_count),
      replies_count: record.replies_count,
      replies: Vec::new(),
      replies_cursor: None,
      load_error: false,
      replies_error: false
    };
    match state.fetch_self_vote(comment.id.as_str()).await {
      Ok(vote) => comment.votes.self_vote = Some(vote),
      Err(e) => {
        warn!("Could not sync self vote for comment {} - {}", comment.id, e);
        comment.load_error = true;
      }
    }
    comment
  }

  // Where votes and deletes for this comment go.
  fn target(&self) -> Target<'_> {
    match &self.parent {
      Parent::Article(_) => Target::Comment(&self.article_id, &self.id),
      Parent::Comment(parent) => Target::Reply(&self.article_id, parent, &self.id)
    }
  }

  // Replies always go to the top-level comment of the
  // thread, there's no replying to a reply.
  fn thread(&self) -> &CommentId {
    match &self.parent {
      Parent::Article(_) => &self.id,
      Parent::Comment(parent) => parent
    }
  }

  pub fn id(&self) -> &CommentId {
    &self.id
  }

  pub fn article_id(&self) -> &ArticleId {
    &self.article_id
  }

  pub fn parent(&self) -> &Parent {
    &self.parent
  }

  pub fn is_reply(&self) -> bool {
    !self.parent.is_article()
  }

  pub fn author_id(&self) -> &UserId {
    &self.author_id
  }

  pub fn is_authored_by(&self, user: &UserId) -> bool {
    &self.author_id == user
  }

  pub fn content(&self) -> &str {
    &self.content
  }

  pub fn bp_count(&self) -> u32 {
    self.votes.bp_count
  }

  pub fn gp_count(&self) -> u32 {
    self.votes.gp_count
  }

  // None when the sync failed (see load_error).
  pub fn self_vote(&self) -> Option<Vote> {
    self.votes.self_vote
  }

  pub fn replies_count(&self) -> u32 {
    self.replies_count
  }

  pub fn replies(&self) -> &[CommentId] {
    &self.replies
  }

  pub fn replies_cursor(&self) -> Option<&CommentId> {
    self.replies_cursor.as_ref()
  }

  pub fn load_error(&self) -> bool {
    self.load_error
  }

  pub fn replies_error(&self) -> bool {
    self.replies_error
  }

}

/**
 * Mutable handle on one comment of an article, obtained
 * through Article::comment_mut. Holding it borrows the
 * whole article, which is what lets us touch the parent
 * comment or the article counters without back
 * references.
 */
pub struct CommentMut<'a> {
  article: &'a mut Article,
  id: CommentId
}

impl<'a> CommentMut<'a> {

  pub(super) fn new(article: &'a mut Article, id: CommentId) -> Self {
    Self {
      article,
      id
    }
  }

  pub fn id(&self) -> &CommentId {
    &self.id
  }

  fn comment(&self) -> Result<&Comment> {
    self.article.arena.get(&self.id)
      .ok_or_else(|| BoardError::CommentNotFound(self.id.clone()))
  }

  fn comment_mut(&mut self) -> Result<&mut Comment> {
    let id = &self.id;
    self.article.arena.get_mut(id)
      .ok_or_else(|| BoardError::CommentNotFound(id.clone()))
  }

  pub fn get(&self) -> Option<&Comment> {
    self.comment().ok()
  }

  /**
   * Fetches the next page of replies for a top-level
   * comment. Calling it on a reply is an error, replies
   * don't have replies.
   */
  pub async fn fetch_replies(&mut self) -> Result<Vec<CommentId>> {
    let request = {
      let comment = self.comment()?;
      if comment.is_reply() {
        return Err(BoardError::NestedReplies(self.id.clone()));
      }
      routes::replies_page(
        &comment.article_id,
        &comment.id,
        self.article.sort_order,
        comment.replies_cursor.as_ref()
      )
    };
    let state = Rc::clone(&self.article.state);
    let page: CommentPage = match state.fetch(request).await {
      Ok(page) => page,
      Err(e) => {
        warn!("Could not fetch replies for comment {} - {}", self.id, e);
        self.comment_mut()?.replies_error = true;
        return Err(e);
      }
    };
    let (appended, last) = self.article
      .ingest_page(page, Parent::Comment(self.id.clone()))
      .await;
    let comment = self.comment_mut()?;
    comment.replies.extend(appended.iter().cloned());
    if last.is_some() {
      comment.replies_cursor = last;
    }
    comment.replies_error = false;
    debug!("Fetched {} replies for comment {}", appended.len(), self.id);
    Ok(appended)
  }

  pub async fn bp(&mut self) -> Result<()> {
    self.vote(VoteAction::Bp).await
  }

  pub async fn gp(&mut self) -> Result<()> {
    self.vote(VoteAction::Gp).await
  }

  async fn vote(&mut self, action: VoteAction) -> Result<()> {
    let state = Rc::clone(&self.article.state);
    let result = match state.require_user() {
      Ok(user) => {
        let request = routes::vote(self.comment()?.target(), action, &user);
        state.execute(request).await
      },
      Err(e) => Err(e)
    };
    match result {
      Ok(()) => {
        if self.comment_mut()?.votes.confirm(action) {
          debug!("Removed {} vote on comment {}", action, self.id);
        }
        Ok(())
      },
      Err(e) => {
        state.report_failure(&format!("{} on article {}", action, self.id), &e);
        Err(e)
      }
    }
  }

  /**
   * Posts a reply in this comment's thread. From a reply,
   * the new reply goes under the parent comment and the
   * parent's reply counter is bumped. From a top-level
   * comment nothing changes locally until the next fetch.
   */
  pub async fn post_reply(&mut self, content: &str) -> Result<()> {
    let state = Rc::clone(&self.article.state);
    let (request, parent) = {
      let comment = self.comment()?;
      let request = state.require_user()
        .map(|user| routes::post_reply(&comment.article_id, comment.thread(), &user, content));
      (request, comment.parent.clone())
    };
    let result = match request {
      Ok(request) => state.execute(request).await,
      Err(e) => Err(e)
    };
    match result {
      Ok(()) => {
        if let Parent::Comment(parent_id) = &parent {
          if let Some(parent_comment) = self.article.arena.get_mut(parent_id) {
            parent_comment.replies_count += 1;
          }
        }
        info!("Posted a reply from comment {}", self.id);
        Ok(())
      },
      Err(e) => {
        state.report_failure(&format!("post_reply on article {}", self.id), &e);
        Err(e)
      }
    }
  }

  pub fn deletable(&self) -> bool {
    match (self.article.state.user_id(), self.comment()) {
      (Some(user), Ok(comment)) => comment.is_authored_by(&user),
      _ => false
    }
  }

  /**
   * Deletes the comment. A reply decrements its parent's
   * reply counter, a top-level comment decrements the
   * article's comment counter. Either way the comment is
   * dropped from its list right away (with its replies
   * for a top-level one).
   */
  pub async fn delete(self) -> Result<()> {
    let state = Rc::clone(&self.article.state);
    let (request, parent) = {
      let comment = self.comment()?;
      let request = state.require_user()
        .map(|user| routes::delete(comment.target(), &user));
      (request, comment.parent.clone())
    };
    let result = match request {
      Ok(request) => state.execute(request).await,
      Err(e) => Err(e)
    };
    if let Err(e) = result {
      state.report_failure(&format!("delete_comment on article {}", self.id), &e);
      return Err(e);
    }

    let CommentMut { article, id } = self;
    match parent {
      Parent::Comment(parent_id) => {
        if let Some(parent_comment) = article.arena.get_mut(&parent_id) {
          parent_comment.replies_count = parent_comment.replies_count.saturating_sub(1);
          parent_comment.replies.retain(|reply| reply != &id);
        }
      },
      Parent::Article(_) => {
        article.comments_count = article.comments_count.saturating_sub(1);
        article.comments.retain(|comment| comment != &id);
        let replies = article.arena.get(&id)
          .map(|comment| comment.replies.clone())
          .unwrap_or_default();
        for reply in replies {
          article.arena.remove(&reply);
        }
      }
    }
    article.arena.remove(&id);
    info!("Deleted comment {}", id);
    Ok(())
  }

  pub async fn sync_self_vote(&mut self) -> Result<()> {
    let state = Rc::clone(&self.article.state);
    let vote = state.fetch_self_vote(self.id.as_str()).await?;
    let comment = self.comment_mut()?;
    comment.votes.self_vote = Some(vote);
    comment.load_error = false;
    Ok(())
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::executor::block_on;
  use serde_json::json;
  use crate::api::HttpMethod;
  use crate::board::testing::*;

  const COMMENTS: &str = "/articles/a1/comments";
  const C1_REPLIES: &str = "/articles/a1/comments/c1/replies";

  // Article a1 with top-level comment c1 (by u1, 2
  // replies) holding replies r1 (by u1) and r2 (by u2).
  fn thread(
    transport: &FakeTransport,
    reporter: &RecordingReporter,
    user: Option<&str>
  ) -> Article {
    transport.on(HttpMethod::Get, "/articles/a1", article_json(0, 0, 3));
    transport.on(HttpMethod::Get, "/articles/bpgp/a1", vote_json(0));
    transport.on(HttpMethod::Get, COMMENTS, json!({
      "comments": [comment_json("c1", "u1", 1, 4, 2)]
    }));
    transport.on(HttpMethod::Get, C1_REPLIES, json!({
      "comments": [comment_json("r1", "u1", 2, 0, 0), comment_json("r2", "u2", 0, 0, 0)]
    }));
    transport.on(HttpMethod::Get, "/articles/bpgp/c1", vote_json(1));
    transport.on(HttpMethod::Get, "/articles/bpgp/r1", vote_json(-1));
    transport.on(HttpMethod::Get, "/articles/bpgp/r2", vote_json(0));
    let state = client_state(transport, user, reporter);
    let mut article = block_on(Article::load(state, ArticleId::from("a1"))).unwrap();
    block_on(article.fetch_comments()).unwrap();
    block_on(article.comment_mut(&c("c1")).unwrap().fetch_replies()).unwrap();
    article
  }

  fn c(id: &str) -> CommentId {
    CommentId::from(id)
  }

  #[test]
  fn replies_are_rooted_at_their_comment() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let article = thread(&transport, &reporter, Some("u1"));

    let c1 = article.comment(&c("c1")).unwrap();
    assert!(!c1.is_reply());
    assert_eq!(c1.self_vote(), Some(Vote::Up));
    assert_eq!(c1.replies(), &[c("r1"), c("r2")][..]);
    assert_eq!(c1.replies_cursor(), Some(&c("r2")));

    let r1 = article.comment(&c("r1")).unwrap();
    assert!(r1.is_reply());
    assert_eq!(r1.parent(), &Parent::Comment(c("c1")));
    assert_eq!(r1.article_id(), &ArticleId::from("a1"));
    assert_eq!(r1.author_id(), &UserId::from("u1"));
    assert_eq!(r1.content(), "Content of r1");

    let replies: Vec<&str> = article.replies(&c("c1")).map(|r| r.id().as_str()).collect();
    assert_eq!(replies, vec!["r1", "r2"]);
    // Replies aren't top-level comments.
    assert_eq!(article.comments().count(), 1);

    let pages = transport.requests_to(HttpMethod::Get, C1_REPLIES);
    assert_eq!(pages[0].query_value("sortBy"), Some("date-bs"));
    assert_eq!(pages[0].query_value("lastId"), None);
  }

  #[test]
  fn next_reply_page_uses_cursor() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.on(HttpMethod::Get, C1_REPLIES, json!({
      "comments": [comment_json("r3", "u3", 0, 0, 0)]
    }));
    transport.on(HttpMethod::Get, "/articles/bpgp/r3", vote_json(0));

    let appended = block_on(article.comment_mut(&c("c1")).unwrap().fetch_replies()).unwrap();
    assert_eq!(appended, vec![c("r3")]);
    assert_eq!(article.comment(&c("c1")).unwrap().replies().len(), 3);
    let pages = transport.requests_to(HttpMethod::Get, C1_REPLIES);
    assert_eq!(pages[1].query_value("lastId"), Some("r2"));
  }

  #[test]
  fn replies_cannot_have_replies() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    let before = transport.requests().len();

    let result = block_on(article.comment_mut(&c("r1")).unwrap().fetch_replies());
    assert!(matches!(result, Err(BoardError::NestedReplies(_))));
    assert_eq!(transport.requests().len(), before);
  }

  #[test]
  fn failed_reply_page_sets_flag() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.fail(HttpMethod::Get, C1_REPLIES);

    assert!(block_on(article.comment_mut(&c("c1")).unwrap().fetch_replies()).is_err());
    let c1 = article.comment(&c("c1")).unwrap();
    assert!(c1.replies_error());
    assert_eq!(c1.replies().len(), 2);
    assert_eq!(c1.replies_cursor(), Some(&c("r2")));
    assert!(reporter.reported().is_empty());
  }

  #[test]
  fn failed_self_vote_sync_still_gives_a_comment() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.on(HttpMethod::Get, COMMENTS, json!({
      "comments": [comment_json("c2", "u2", 0, 3, 0)]
    }));
    transport.fail(HttpMethod::Get, "/articles/bpgp/c2");

    let appended = block_on(article.fetch_comments()).unwrap();
    assert_eq!(appended, vec![c("c2")]);
    let c2 = article.comment(&c("c2")).unwrap();
    assert!(c2.load_error());
    assert_eq!(c2.self_vote(), None);
    assert_eq!(c2.gp_count(), 3);

    // Unknown self vote: voting can't be applied locally.
    transport.on(HttpMethod::Put, "/articles/a1/comments/c2/gp", json!(null));
    block_on(article.comment_mut(&c("c2")).unwrap().gp()).unwrap();
    assert_eq!(article.comment(&c("c2")).unwrap().gp_count(), 3);

    // A later sync clears the flag.
    transport.on(HttpMethod::Get, "/articles/bpgp/c2", vote_json(1));
    block_on(article.comment_mut(&c("c2")).unwrap().sync_self_vote()).unwrap();
    let c2 = article.comment(&c("c2")).unwrap();
    assert!(!c2.load_error());
    assert_eq!(c2.self_vote(), Some(Vote::Up));
  }

  #[test]
  fn comment_vote_removal_uses_comment_endpoint() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.on(HttpMethod::Put, "/articles/a1/comments/c1/gp", json!(null));

    block_on(article.comment_mut(&c("c1")).unwrap().gp()).unwrap();
    let c1 = article.comment(&c("c1")).unwrap();
    assert_eq!(c1.self_vote(), Some(Vote::None));
    assert_eq!(c1.gp_count(), 3);
    assert_eq!(c1.bp_count(), 1);

    // Upvoting again isn't reflected locally.
    block_on(article.comment_mut(&c("c1")).unwrap().gp()).unwrap();
    assert_eq!(article.comment(&c("c1")).unwrap().gp_count(), 3);
  }

  #[test]
  fn reply_vote_uses_reply_endpoint_under_parent() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.on(HttpMethod::Put, "/articles/a1/comments/c1/replies/r1/bp", json!(null));

    block_on(article.comment_mut(&c("r1")).unwrap().bp()).unwrap();
    let r1 = article.comment(&c("r1")).unwrap();
    assert_eq!(r1.self_vote(), Some(Vote::None));
    assert_eq!(r1.bp_count(), 1);
  }

  #[test]
  fn failed_comment_vote_is_reported() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.fail(HttpMethod::Put, "/articles/a1/comments/c1/replies/r2/bp");

    assert!(block_on(article.comment_mut(&c("r2")).unwrap().bp()).is_err());
    let reported = reporter.reported();
    assert_eq!(reported.len(), 1);
    assert!(reported[0].1.contains("bp on article r2"));
    assert_eq!(article.comment(&c("r2")).unwrap().bp_count(), 0);
  }

  #[test]
  fn reply_to_a_reply_goes_to_the_parent_thread() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.on(HttpMethod::Post, C1_REPLIES, json!({}));

    block_on(article.comment_mut(&c("r2")).unwrap().post_reply("me too")).unwrap();
    let posted = transport.requests_to(HttpMethod::Post, C1_REPLIES);
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].body, Some(json!({"content": "me too"})));
    assert_eq!(posted[0].query_value("user"), Some("u1"));
    assert_eq!(article.comment(&c("c1")).unwrap().replies_count(), 3);
  }

  #[test]
  fn reply_to_a_top_level_comment_changes_nothing_locally() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.on(HttpMethod::Post, C1_REPLIES, json!({}));

    block_on(article.comment_mut(&c("c1")).unwrap().post_reply("first!")).unwrap();
    assert_eq!(transport.requests_to(HttpMethod::Post, C1_REPLIES).len(), 1);
    let c1 = article.comment(&c("c1")).unwrap();
    assert_eq!(c1.replies_count(), 2);
    assert_eq!(c1.replies().len(), 2);
  }

  #[test]
  fn failed_reply_is_reported() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.fail(HttpMethod::Post, C1_REPLIES);

    assert!(block_on(article.comment_mut(&c("r1")).unwrap().post_reply("hm")).is_err());
    assert_eq!(article.comment(&c("c1")).unwrap().replies_count(), 2);
    assert!(reporter.reported()[0].1.contains("post_reply on article r1"));
  }

  #[test]
  fn deleting_a_reply_only_touches_the_parent() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.on(HttpMethod::Delete, "/articles/a1/comments/c1/replies/r1", json!(null));

    assert!(article.comment_mut(&c("r1")).unwrap().deletable());
    block_on(article.comment_mut(&c("r1")).unwrap().delete()).unwrap();
    let c1 = article.comment(&c("c1")).unwrap();
    assert_eq!(c1.replies_count(), 1);
    assert_eq!(c1.replies(), &[c("r2")][..]);
    assert!(article.comment(&c("r1")).is_none());
    assert_eq!(article.comments_count(), 3);
  }

  #[test]
  fn deleting_a_comment_only_touches_the_article() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.on(HttpMethod::Delete, "/articles/a1/comments/c1", json!(null));

    block_on(article.comment_mut(&c("c1")).unwrap().delete()).unwrap();
    assert_eq!(article.comments_count(), 2);
    assert_eq!(article.comments().count(), 0);
    assert!(article.comment(&c("c1")).is_none());
    assert!(article.comment(&c("r1")).is_none());
    assert!(article.comment(&c("r2")).is_none());
    let delete = transport.requests_to(HttpMethod::Delete, "/articles/a1/comments/c1");
    assert_eq!(delete[0].query_value("user"), Some("u1"));
  }

  #[test]
  fn failed_delete_keeps_everything() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u1"));
    transport.fail(HttpMethod::Delete, "/articles/a1/comments/c1/replies/r1");

    assert!(block_on(article.comment_mut(&c("r1")).unwrap().delete()).is_err());
    assert_eq!(article.comment(&c("c1")).unwrap().replies_count(), 2);
    assert!(article.comment(&c("r1")).is_some());
    assert!(reporter.reported()[0].1.contains("delete_comment on article r1"));
  }

  #[test]
  fn deletable_follows_the_author() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, Some("u2"));
    assert!(!article.comment_mut(&c("r1")).unwrap().deletable());
    assert!(article.comment_mut(&c("r2")).unwrap().deletable());
    assert!(article.comment_mut(&c("nope")).is_none());
  }

  #[test]
  fn anonymous_users_cannot_mutate() {
    let transport = FakeTransport::new();
    let reporter = RecordingReporter::new();
    let mut article = thread(&transport, &reporter, None);
    let before = transport.requests().len();

    let mut c1 = article.comment_mut(&c("c1")).unwrap();
    assert!(!c1.deletable());
    assert!(matches!(block_on(c1.bp()), Err(BoardError::NotSignedIn)));
    assert!(matches!(block_on(c1.post_reply("hi")), Err(BoardError::NotSignedIn)));
    assert_eq!(transport.requests().len(), before);
    // Not a transport failure, nothing to show.
    assert!(reporter.reported().is_empty());
  }
}
