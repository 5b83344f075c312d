//! HTTP adapter for the external queue-position service.
//!
//! The service renders the queried position as a `#<position> of #<total>`
//! marker somewhere in the response body; one GET per identifier.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use qtb_core::lookup::{Lookup, LookupClient};

#[derive(Clone, Debug)]
pub struct HttpQueueClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpQueueClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build");
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    async fn fetch_body(&self, identifier: &str) -> Result<String, String> {
        let url = format!("{}{identifier}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("queue request error: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("queue service returned {}", resp.status()));
        }

        resp.text()
            .await
            .map_err(|e| format!("queue response body error: {e}"))
    }
}

#[async_trait]
impl LookupClient for HttpQueueClient {
    async fn lookup(&self, identifier: &str) -> Lookup {
        match self.fetch_body(identifier).await {
            Ok(body) => parse_position(&body),
            Err(reason) => Lookup::Failure(reason),
        }
    }
}

/// Extract the position marker from a response body.
///
/// A well-formed page without the marker means the identifier is not in the
/// queue; that is `NotFound`, not a failure.
fn parse_position(body: &str) -> Lookup {
    static POSITION: OnceLock<Regex> = OnceLock::new();
    let re = POSITION.get_or_init(|| Regex::new(r"#(\d+) of #(\d+)").expect("position regex"));

    let Some(caps) = re.captures(body) else {
        return Lookup::NotFound;
    };

    let (Ok(position), Ok(total)) = (caps[1].parse::<u64>(), caps[2].parse::<u64>()) else {
        return Lookup::Failure("position counters did not fit in u64".to_string());
    };

    Lookup::Found { position, total }
}
