use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cli::config::Session;

/// Thin client for the to-do API that unwraps the response envelope.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_session(session: &Session) -> anyhow::Result<Self> {
        let mut client = Self::new(&session.server_url)?;
        client.token = session.active_token().map(str::to_string);
        Ok(client)
    }

    /// A client for endpoints that need a logged-in session.
    pub fn authenticated(session: &Session) -> anyhow::Result<Self> {
        let client = Self::from_session(session)?;
        if client.token.is_none() {
            return Err(anyhow!("Not logged in; run `todo auth login <username>` first"));
        }
        Ok(client)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> anyhow::Result<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<()> {
        self.send_empty(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.send_empty(self.request(Method::DELETE, path)).await
    }

    /// Whether `/health` answers with a success status.
    pub async fn ping(&self) -> bool {
        match self
            .request(Method::GET, "/health")
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> anyhow::Result<T> {
        let response = builder.send().await.context("request failed")?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let data = body
            .get("data")
            .cloned()
            .ok_or_else(|| anyhow!("response did not contain a data field"))?;
        Ok(serde_json::from_value(data)?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> anyhow::Result<()> {
        let response = builder.send().await.context("request failed")?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(error_from_body(status, &body))
    }
}

fn error_from_body(status: StatusCode, body: &Value) -> anyhow::Error {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"));

    match body.get("code").and_then(Value::as_str) {
        Some(code) => anyhow!("{} ({}, HTTP {})", message, code, status.as_u16()),
        None => anyhow!("{} (HTTP {})", message, status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_prefers_envelope() {
        let err = error_from_body(
            StatusCode::NOT_FOUND,
            &json!({ "success": false, "error": "To-do item 9 not found", "code": "NOT_FOUND" }),
        );
        assert_eq!(err.to_string(), "To-do item 9 not found (NOT_FOUND, HTTP 404)");

        let err = error_from_body(StatusCode::BAD_GATEWAY, &Value::Null);
        assert_eq!(err.to_string(), "Bad Gateway (HTTP 502)");
    }

    #[test]
    fn authenticated_requires_a_token() {
        let session = Session::default();
        assert!(ApiClient::authenticated(&session).is_err());
        assert!(ApiClient::from_session(&session).is_ok());
    }
}
