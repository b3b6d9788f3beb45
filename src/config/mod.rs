// Adding the context method to errors:
use eyre::WrapErr;
use color_eyre::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
  // Should never have a trailing slash, we trim it
  // anyway.
  pub api_root: String,
  // Seconds.
  pub request_timeout: u64,
  // Acting user, anonymous when absent.
  pub user_id: Option<String>,
  pub default_sort: String
}

impl Config {

  pub fn from_env() -> Result<Config> {
    let mut c = config::Config::new();
    // RUST_LOG is already set in main.rs if it
    // was absent.
    // You have to use lowercase when compared to
    // what's in the .env file.
    c.set_default("api_root", "http://localhost:3000/api")?;
    c.set_default("request_timeout", 10)?;
    c.set_default("default_sort", "date-bs")?;

    c.merge(config::Environment::default())?;
    // The error has to be given a context for
    // color_eyre to work here:
    c.try_into()
      .context("Loading configuration from env")
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout)
  }

}
