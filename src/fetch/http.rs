use super::JsonTransport;
use crate::error::FetchError;
use serde_json::Value;
use std::time::Duration;

/// `reqwest` blocking client with an explicit timeout.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl JsonTransport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let resp = self.client.get(url).send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let body = resp.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}
