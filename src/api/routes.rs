use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::json;
use super::ApiRequest;
use crate::board::entities::{ArticleId, CommentId, SortOrder, UserId};
use crate::board::vote::VoteAction;

// The REST layout of the board API. Everything lives
// under /articles, comments under their article and
// replies under their top-level comment.

/**
 * What a vote (or a delete) is aimed at. Replies are
 * addressed through their parent comment.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum Target<'a> {
  Article(&'a ArticleId),
  Comment(&'a ArticleId, &'a CommentId),
  Reply(&'a ArticleId, &'a CommentId, &'a CommentId)
}

impl<'a> Target<'a> {
  fn path(&self) -> String {
    match self {
      Target::Article(article) => article_path(article),
      Target::Comment(article, comment) => format!(
        "{}/{}",
        comments_path(article),
        segment(comment.as_str())
      ),
      Target::Reply(article, parent, reply) => format!(
        "{}/{}",
        replies_path(article, parent),
        segment(reply.as_str())
      )
    }
  }
}

// Ids are opaque, a slash or a question mark in one
// must not change the route.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'~');

fn segment(id: &str) -> String {
  utf8_percent_encode(id, SEGMENT).to_string()
}

fn article_path(article: &ArticleId) -> String {
  format!("/articles/{}", segment(article.as_str()))
}

fn comments_path(article: &ArticleId) -> String {
  format!("{}/comments", article_path(article))
}

fn replies_path(article: &ArticleId, comment: &CommentId) -> String {
  format!("{}/{}/replies", comments_path(article), segment(comment.as_str()))
}

// No lastId at all for the first page.
fn with_page(
  request: ApiRequest,
  sort_order: SortOrder,
  last_id: Option<&CommentId>
) -> ApiRequest {
  let request = request.param("sortBy", sort_order.as_str());
  match last_id {
    Some(id) => request.param("lastId", id),
    None => request
  }
}

pub fn article(article: &ArticleId) -> ApiRequest {
  ApiRequest::get(article_path(article))
}

pub fn comments_page(
  article: &ArticleId,
  sort_order: SortOrder,
  last_id: Option<&CommentId>
) -> ApiRequest {
  with_page(ApiRequest::get(comments_path(article)), sort_order, last_id)
}

pub fn replies_page(
  article: &ArticleId,
  comment: &CommentId,
  sort_order: SortOrder,
  last_id: Option<&CommentId>
) -> ApiRequest {
  with_page(ApiRequest::get(replies_path(article, comment)), sort_order, last_id)
}

pub fn vote(target: Target, action: VoteAction, user: &UserId) -> ApiRequest {
  ApiRequest::put(format!("{}/{}", target.path(), action.as_str()))
    .param("user", user)
}

pub fn post_comment(article: &ArticleId, user: &UserId, content: &str) -> ApiRequest {
  ApiRequest::post(comments_path(article))
    .param("user", user)
    .body(json!({ "content": content }))
}

pub fn post_reply(
  article: &ArticleId,
  thread: &CommentId,
  user: &UserId,
  content: &str
) -> ApiRequest {
  ApiRequest::post(replies_path(article, thread))
    .param("user", user)
    .body(json!({ "content": content }))
}

pub fn delete(target: Target, user: &UserId) -> ApiRequest {
  ApiRequest::delete(target.path())
    .param("user", user)
}

// Works for both articles and comments, ids are unique
// across the two.
pub fn self_vote(id: &str, user: &UserId) -> ApiRequest {
  ApiRequest::get(format!("/articles/bpgp/{}", segment(id)))
    .param("user", user)
}
