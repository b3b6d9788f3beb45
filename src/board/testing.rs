// Test doubles for the board collaborators. The fake
// transport answers by method and path, queries are
// only recorded (so tests can check cursors).

use async_trait::async_trait;
use color_eyre::Result;
use eyre::eyre;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use crate::api::{ApiRequest, HttpMethod, Transport};
use super::{ClientState, ErrorReporter, FixedUser, UserId};

struct Queued {
  reply: std::result::Result<Value, String>,
  served: bool
}

#[derive(Default)]
struct FakeInner {
  routes: RefCell<HashMap<String, VecDeque<Queued>>>,
  requests: RefCell<Vec<ApiRequest>>
}

/**
 * Responses queued for a route are served in order,
 * each at least once, and the last one keeps being
 * served until something else is queued behind it.
 */
#[derive(Clone, Default)]
pub struct FakeTransport {
  inner: Rc<FakeInner>
}

fn route_key(method: HttpMethod, path: &str) -> String {
  format!("{} {}", method, path)
}

impl FakeTransport {
  pub fn new() -> Self {
    Self::default()
  }

  fn queue(&self, method: HttpMethod, path: &str, reply: std::result::Result<Value, String>) {
    self.inner.routes.borrow_mut()
      .entry(route_key(method, path))
      .or_insert_with(VecDeque::new)
      .push_back(Queued { reply, served: false });
  }

  pub fn on(&self, method: HttpMethod, path: &str, body: Value) {
    self.queue(method, path, Ok(body));
  }

  pub fn fail(&self, method: HttpMethod, path: &str) {
    self.queue(method, path, Err(format!("{} {} responded with 500", method, path)));
  }

  pub fn requests(&self) -> Vec<ApiRequest> {
    self.inner.requests.borrow().clone()
  }

  pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<ApiRequest> {
    self.inner.requests.borrow().iter()
      .filter(|r| r.method == method && r.path == path)
      .cloned()
      .collect()
  }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
  async fn send(&self, request: ApiRequest) -> Result<Value> {
    let key = route_key(request.method, &request.path);
    self.inner.requests.borrow_mut().push(request);
    let mut routes = self.inner.routes.borrow_mut();
    let queue = match routes.get_mut(&key) {
      Some(queue) => queue,
      None => return Err(eyre!("No fake response for {}", key))
    };
    while queue.len() > 1 && queue.front().map_or(false, |q| q.served) {
      queue.pop_front();
    }
    match queue.front_mut() {
      Some(queued) => {
        queued.served = true;
        match &queued.reply {
          Ok(body) => Ok(body.clone()),
          Err(message) => Err(eyre!("{}", message))
        }
      },
      None => Err(eyre!("No fake response for {}", key))
    }
  }
}

#[derive(Clone, Default)]
pub struct RecordingReporter {
  reported: Rc<RefCell<Vec<(String, String)>>>
}

impl RecordingReporter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn reported(&self) -> Vec<(String, String)> {
    self.reported.borrow().clone()
  }
}

impl ErrorReporter for RecordingReporter {
  fn raise_error(&self, title: &str, message: &str) {
    self.reported.borrow_mut().push((title.to_string(), message.to_string()));
  }
}

pub fn client_state(
  transport: &FakeTransport,
  user: Option<&str>,
  reporter: &RecordingReporter
) -> Rc<ClientState> {
  Rc::new(ClientState::new(
    Box::new(transport.clone()),
    Box::new(FixedUser(user.map(UserId::from))),
    Box::new(reporter.clone())
  ))
}

pub fn article_json(bp: u32, gp: u32, comments: u32) -> Value {
  json!({
    "title": "Title a1",
    "content": "Content",
    "thumbnail": "thumb.png",
    "bp": bp,
    "gp": gp,
    "comments": comments,
    "userId": "author"
  })
}

pub fn comment_json(id: &str, user: &str, bp: u32, gp: u32, replies: u32) -> Value {
  json!({
    "id": id,
    "content": format!("Content of {}", id),
    "userId": user,
    "bpCount": bp,
    "gpCount": gp,
    "repliesCount": replies
  })
}

pub fn page_json(ids: &[&str]) -> Value {
  let comments: Vec<Value> = ids.iter()
    .map(|id| comment_json(id, "u2", 0, 0, 0))
    .collect();
  json!({ "comments": comments })
}

pub fn vote_json(vote: i64) -> Value {
  json!({ "state": { "vote": vote } })
}
