use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use log::{debug, info, warn};
use crate::api::dtos::{ArticleRecord, CommentPage};
use crate::api::routes::{self, Target};
use super::comment::{Comment, CommentMut};
use super::entities::{ArticleId, CommentId, Parent, SortOrder, UserId};
use super::error::{BoardError, Result};
use super::vote::{Vote, VoteAction, VoteState};
use super::ClientState;

/**
 * One article with its metadata, vote state and the
 * comments fetched so far. Every comment of the tree,
 * replies included, lives in the arena; the ordered
 * lists only hold ids.
 * There's no way to get a half-loaded Article, load()
 * either gives a complete one or an error.
 */
pub struct Article {
  pub(super) state: Rc<ClientState>,
  id: ArticleId,
  title: String,
  content: String,
  thumbnail: String,
  posted_by: UserId,
  pub(super) votes: VoteState,
  pub(super) comments_count: u32,
  pub(super) sort_order: SortOrder,
  pub(super) comments: Vec<CommentId>,
  cursor: Option<CommentId>,
  comments_error: bool,
  pub(super) arena: HashMap<CommentId, Comment>
}

impl Article {

  pub async fn load(state: Rc<ClientState>, id: ArticleId) -> Result<Article> {
    debug!("Loading article {}", id);
    let record: ArticleRecord = state.fetch(routes::article(&id)).await?;
    // The rest of the metadata is allowed to be empty
    // (no thumbnail for instance), these two aren't.
    if record.title.is_empty() || record.user_id.as_str().is_empty() {
      return Err(BoardError::BadResponse(
        format!("Article {} has no title or no author", id)
      ));
    }
    let self_vote = state.fetch_self_vote(id.as_str()).await?;
    Ok(Article {
      state,
      id,
      title: record.title,
      content: record.content,
      thumbnail: record.thumbnail,
      posted_by: record.user_id,
      votes: VoteState {
        self_vote: Some(self_vote),
        bp_count: record.bp,
        gp_count: record.gp
      },
      comments_count: record.comments,
      sort_order: SortOrder::default(),
      comments: Vec::new(),
      cursor: None,
      comments_error: false,
      arena: HashMap::new()
    })
  }

  pub async fn sync_self_vote(&mut self) -> Result<()> {
    let vote = self.state.fetch_self_vote(self.id.as_str()).await?;
    self.votes.self_vote = Some(vote);
    Ok(())
  }

  /**
   * Fetches the next page of top-level comments, starting
   * after the last one we have. Returns the ids appended
   * by this call only (empty when there's nothing left).
   * A failed fetch leaves the list and cursor as they
   * were.
   */
  pub async fn fetch_comments(&mut self) -> Result<Vec<CommentId>> {
    let request = routes::comments_page(&self.id, self.sort_order, self.cursor.as_ref());
    let page: CommentPage = match self.state.fetch(request).await {
      Ok(page) => page,
      Err(e) => {
        warn!("Could not fetch comments for article {} - {}", self.id, e);
        self.comments_error = true;
        return Err(e);
      }
    };
    let (appended, last) = self.ingest_page(page, Parent::Article(self.id.clone())).await;
    self.comments.extend(appended.iter().cloned());
    if last.is_some() {
      self.cursor = last;
    }
    self.comments_error = false;
    debug!("Fetched {} comments for article {}", appended.len(), self.id);
    Ok(appended)
  }

  // Builds the comments of a page and puts them in the
  // arena. Anything we already hold is skipped so a list
  // can never contain the same id twice. Also gives back
  // the last id of the page, which is the next cursor.
  pub(super) async fn ingest_page(
    &mut self,
    page: CommentPage,
    parent: Parent
  ) -> (Vec<CommentId>, Option<CommentId>) {
    let state = Rc::clone(&self.state);
    let last = page.comments.last().map(|record| record.id.clone());
    let mut appended = Vec::with_capacity(page.comments.len());
    for record in page.comments {
      if self.arena.contains_key(&record.id) {
        warn!("Comment {} was already loaded for article {}, skipping", record.id, self.id);
        continue;
      }
      let comment = Comment::create(&state, self.id.clone(), record, parent.clone()).await;
      appended.push(comment.id().clone());
      self.arena.insert(comment.id().clone(), comment);
    }
    (appended, last)
  }

  pub async fn bp(&mut self) -> Result<()> {
    self.vote(VoteAction::Bp).await
  }

  pub async fn gp(&mut self) -> Result<()> {
    self.vote(VoteAction::Gp).await
  }

  async fn vote(&mut self, action: VoteAction) -> Result<()> {
    match self.send_vote(action).await {
      Ok(()) => {
        if self.votes.confirm(action) {
          debug!("Removed {} vote on article {}", action, self.id);
        }
        Ok(())
      },
      Err(e) => {
        self.state.report_failure(&format!("{} on article {}", action, self.id), &e);
        Err(e)
      }
    }
  }

  async fn send_vote(&self, action: VoteAction) -> Result<()> {
    let user = self.state.require_user()?;
    self.state.execute(routes::vote(Target::Article(&self.id), action, &user)).await
  }

  // The new comment isn't added to the list, it will
  // show up with the next fetch (or not, depending on
  // where the cursor is).
  pub async fn post_comment(&mut self, content: &str) -> Result<()> {
    let result = match self.state.require_user() {
      Ok(user) => self.state.execute(routes::post_comment(&self.id, &user, content)).await,
      Err(e) => Err(e)
    };
    match result {
      Ok(()) => {
        self.comments_count += 1;
        info!("Posted a comment on article {}", self.id);
        Ok(())
      },
      Err(e) => {
        self.state.report_failure(&format!("post_comment on article {}", self.id), &e);
        Err(e)
      }
    }
  }

  pub fn deletable(&self) -> bool {
    self.state.user_id().map_or(false, |user| user == self.posted_by)
  }

  // Does not evict the article from the store, use
  // ArticleStore::delete_article for that.
  pub async fn delete(&self) -> Result<()> {
    let result = match self.state.require_user() {
      Ok(user) => self.state.execute(routes::delete(Target::Article(&self.id), &user)).await,
      Err(e) => Err(e)
    };
    if let Err(e) = &result {
      self.state.report_failure(&format!("delete_article on article {}", self.id), e);
    } else {
      info!("Deleted article {}", self.id);
    }
    result
  }

  // A cursor only means something for one ordering, so
  // changing it starts the comments over.
  pub fn set_sort_order(&mut self, sort_order: SortOrder) {
    if sort_order == self.sort_order {
      return;
    }
    self.sort_order = sort_order;
    self.comments.clear();
    self.arena.clear();
    self.cursor = None;
    self.comments_error = false;
  }

  pub fn id(&self) -> &ArticleId {
    &self.id
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn content(&self) -> &str {
    &self.content
  }

  pub fn thumbnail(&self) -> &str {
    &self.thumbnail
  }

  pub fn posted_by(&self) -> &UserId {
    &self.posted_by
  }

  pub fn bp_count(&self) -> u32 {
    self.votes.bp_count
  }

  pub fn gp_count(&self) -> u32 {
    self.votes.gp_count
  }

  pub fn self_vote(&self) -> Vote {
    self.votes.self_vote.unwrap_or(Vote::None)
  }

  pub fn comments_count(&self) -> u32 {
    self.comments_count
  }

  pub fn sort_order(&self) -> SortOrder {
    self.sort_order
  }

  pub fn cursor(&self) -> Option<&CommentId> {
    self.cursor.as_ref()
  }

  pub fn comments_error(&self) -> bool {
    self.comments_error
  }

  // Top-level comments in fetch order.
  pub fn comments(&self) -> impl Iterator<Item = &Comment> {
    self.comments.iter().filter_map(move |id| self.arena.get(id))
  }

  pub fn replies<'s>(&'s self, id: &CommentId) -> impl Iterator<Item = &'s Comment> + 's {
    self.arena.get(id)
      .map(|comment| comment.replies())
      .unwrap_or(&[])
      .iter()
      .filter_map(move |reply| self.arena.get(reply))
  }

  pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
    self.arena.get(id)
  }

  pub fn comment_mut(&mut self, id: &CommentId) -> Option<CommentMut<'_>> {
    if self.arena.contains_key(id) {
      Some(CommentMut::new(self, id.clone()))
    } else {
      None
    }
  }

}

// ClientState has no Debug and we don't want it in the
// logs anyway.
impl fmt::Debug for Article {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Article")
      .field("id", &self.id)
      .field("title", &self.title)
      .field("posted_by", &self.posted_by)
      .field("votes", &self.votes)
      .field("comments_count", &self.comments_count)
      .field("sort_order", &self.sort_order)
      .field("comments", &self.comments)
      .field("cursor", &self.cursor)
      .field("comments_error", &self.comments_error)
      .finish()
  }
}
