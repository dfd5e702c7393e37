//! HTTP adapter for the club commands catalog.
//!
//! Every endpoint answers with a `{ "success": bool, "data": ... }` envelope;
//! `success = false` is treated as an error even on HTTP 200.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};

use fitbot_core::{
    errors::Error,
    ports::{CommandsCatalog, RemoteCommand},
    Result,
};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
}

#[derive(Clone, Debug)]
pub struct CommandsApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl CommandsApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("commands api client build error: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/commands/`
    pub async fn get_commands(&self) -> Result<Vec<RemoteCommand>> {
        self.get_json("commands/").await.inspect_err(|e| {
            tracing::error!(error = %e, "commands api request failed");
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = endpoint(&self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::External(format!("commands api request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "commands api {url} failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::External(format!("commands api read error: {e}")))?;
        handle_response(&body)
    }
}

#[async_trait]
impl CommandsCatalog for CommandsApiClient {
    async fn list_commands(&self) -> Result<Vec<RemoteCommand>> {
        self.get_commands().await
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn handle_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(Error::External(
            "commands api answered with success=false".to_string(),
        ));
    }
    envelope
        .data
        .ok_or_else(|| Error::External("commands api envelope has no data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://api.pf-forum.ru/api/v2/", "commands/"),
            "https://api.pf-forum.ru/api/v2/commands/"
        );
        assert_eq!(
            endpoint("http://localhost:8080/api", "/commands/"),
            "http://localhost:8080/api/commands/"
        );
    }

    #[test]
    fn successful_envelope_yields_data() {
        let cmds: Vec<RemoteCommand> = handle_response(
            r#"{"success":true,"data":[{"command":"price","description":"Цены"}]}"#,
        )
        .unwrap();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].command, "price");
    }

    #[test]
    fn unsuccessful_envelope_is_an_error() {
        let err = handle_response::<Vec<RemoteCommand>>(r#"{"success":false,"data":[]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::External(_)));
    }

    #[test]
    fn missing_data_is_an_error() {
        let err = handle_response::<Vec<RemoteCommand>>(r#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, Error::External(_)));
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let err = handle_response::<Vec<RemoteCommand>>("<html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_an_external_error() {
        let client =
            CommandsApiClient::new("http://127.0.0.1:9/api/", Duration::from_millis(500)).unwrap();
        let err = client.list_commands().await.unwrap_err();
        assert!(matches!(err, Error::External(_)));
    }
}
