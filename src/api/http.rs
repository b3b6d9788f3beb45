use actix_web::client::Client;
use actix_web::http::Method;
use async_trait::async_trait;
use color_eyre::{Report, Result};
use eyre::{eyre, WrapErr};
use log::debug;
use serde_json::Value;
use std::time::Duration;
use super::{ApiRequest, HttpMethod, Transport};

/**
 * Transport going over actual HTTP, using the Actix
 * client. Has to live inside an Actix system (the CLI
 * uses #[actix_web::main]).
 */
pub struct HttpTransport {
  api_root: String,
  client: Client
}

impl HttpTransport {
  pub fn new(api_root: &str, timeout: Duration) -> Self {
    let client = Client::builder()
      .timeout(timeout)
      .finish();
    Self {
      api_root: api_root.trim_end_matches('/').to_string(),
      client
    }
  }
}

// Actix errors can't be wrapped directly (they're not
// Send), so we keep their message only.
fn failure(message: String) -> Report {
  eyre!("{}", message)
}

fn actix_method(method: HttpMethod) -> Method {
  match method {
    HttpMethod::Get => Method::GET,
    HttpMethod::Put => Method::PUT,
    HttpMethod::Post => Method::POST,
    HttpMethod::Delete => Method::DELETE
  }
}

pub fn request_url(api_root: &str, request: &ApiRequest) -> String {
  format!("{}{}", api_root.trim_end_matches('/'), request.path)
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<Value> {
    let url = request_url(&self.api_root, &request);
    debug!("{} {} {:?}", request.method, url, request.query);

    let mut client_request = self.client
      .request(actix_method(request.method), url.as_str());
    if !request.query.is_empty() {
      client_request = client_request.query(&request.query)
        .map_err(|e| failure(format!("Encoding query string for {} - {}", url, e)))?;
    }

    let sent = match &request.body {
      Some(body) => client_request.send_json(body).await,
      None => client_request.send().await
    };
    let mut response = sent
      .map_err(|e| failure(format!("{} {} failed - {}", request.method, url, e)))?;

    let status = response.status();
    if !status.is_success() {
      return Err(failure(format!("{} {} responded with {}", request.method, url, status)));
    }

    let body = response.body().await
      .map_err(|e| failure(format!("Reading response body from {} - {}", url, e)))?;
    // Vote endpoints don't have to send anything back.
    if body.is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&body)
      .context(format!("Parsing JSON response from {}", url))
  }
}
