use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::{debug, warn};
use ziggy_core::{Result, ZiggyConfig, ZiggyError};

const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

pub struct HttpFetcher {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, retries: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ziggy/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|err| ZiggyError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            retries,
            backoff: DEFAULT_BACKOFF,
        })
    }

    pub fn from_config(config: &ZiggyConfig) -> Result<Self> {
        Self::new(config.timeout, config.connect_retries)
    }

    /// Sends a GET, retrying transport failures. The response is returned
    /// whatever its status; callers decide which stage a bad status fails.
    pub fn get(&self, url: &str) -> Result<Response> {
        retry_connection(self.retries, self.backoff, |attempt| {
            debug!(url, attempt, "GET");
            self.client
                .get(url)
                .send()
                .map_err(|err| ZiggyError::Connection {
                    url: url.to_string(),
                    message: describe_transport_error(&err),
                })
        })
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timed out".to_string()
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        err.to_string()
    }
}

/// Runs `op` once plus up to `retries` more times while it fails with a
/// retryable error, sleeping `backoff * attempt` in between.
pub fn retry_connection<T, F>(retries: u32, backoff: Duration, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Result<T>,
{
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < retries => {
                attempt += 1;
                warn!(attempt, error = %err, "retrying after connection failure");
                thread::sleep(backoff * attempt);
            }
            Err(err) => return Err(err),
        }
    }
}
