/*
 * Everything that talks to the board REST API: the
 * Transport seam, the route layout, the wire records
 * and the actual HTTP implementation.
 */

use async_trait::async_trait;
use color_eyre::Result;
use derive_more::Display;
use serde_json::Value;
pub mod dtos;
pub mod http;
pub mod routes;

pub use http::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HttpMethod {
  #[display(fmt = "GET")]
  Get,
  #[display(fmt = "PUT")]
  Put,
  #[display(fmt = "POST")]
  Post,
  #[display(fmt = "DELETE")]
  Delete
}

// A request relative to the API root. Paths always
// start with a slash.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: HttpMethod,
  pub path: String,
  pub query: Vec<(&'static str, String)>,
  pub body: Option<Value>
}

impl ApiRequest {
  pub fn new(method: HttpMethod, path: String) -> Self {
    Self {
      method,
      path,
      query: Vec::new(),
      body: None
    }
  }

  pub fn get(path: String) -> Self {
    Self::new(HttpMethod::Get, path)
  }

  pub fn put(path: String) -> Self {
    Self::new(HttpMethod::Put, path)
  }

  pub fn post(path: String) -> Self {
    Self::new(HttpMethod::Post, path)
  }

  pub fn delete(path: String) -> Self {
    Self::new(HttpMethod::Delete, path)
  }

  pub fn param(mut self, name: &'static str, value: impl ToString) -> Self {
    self.query.push((name, value.to_string()));
    self
  }

  pub fn body(mut self, body: Value) -> Self {
    self.body = Some(body);
    self
  }

  pub fn query_value(&self, name: &str) -> Option<&str> {
    self.query.iter()
      .find(|(n, _)| *n == name)
      .map(|(_, v)| v.as_str())
  }
}

/**
 * The only way the board entities reach the server.
 * Implementations return the parsed JSON body, Null
 * when the body was empty, and an error for anything
 * that isn't a 2xx.
 * Futures aren't Send: everything runs on a single
 * threaded runtime.
 */
#[async_trait(?Send)]
pub trait Transport {
  async fn send(&self, request: ApiRequest) -> Result<Value>;
}
