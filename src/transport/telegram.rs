//! Telegram Bot API transport over `reqwest`.
//!
//! Implements just the calls the bot needs:
//!
//! | Call          | Used for                                  |
//! |---------------|-------------------------------------------|
//! | `getUpdates`  | long polling in [`crate::bot::run`]       |
//! | `getFile`     | resolving a `file_id` to a download path  |
//! | file download | `GET {base}/file/bot{token}/{file_path}`  |
//! | `sendMessage` | text replies                              |
//! | `sendDocument`| multipart PDF upload                      |
//!
//! Every response is wrapped in the Bot API envelope
//! `{ "ok": bool, "result": …, "description": … }`; `ok == false` becomes an
//! error carrying `description`.
//!
//! Request URLs embed the bot token, so `reqwest` errors are stripped of
//! their URL before being turned into messages that may reach logs or chats.

use super::{Attachment, ChatId, InboundMessage, Transport};
use crate::config::BotConfig;
use crate::error::Doc2PdfError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Filename used when Telegram omits one.
const FALLBACK_FILE_NAME: &str = "document";

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// A single entry returned by `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct File {
    #[serde(default)]
    file_path: Option<String>,
}

impl From<Message> for InboundMessage {
    fn from(m: Message) -> Self {
        InboundMessage {
            chat_id: m.chat.id,
            message_id: m.message_id,
            text: m.text,
            attachment: m.document.map(|d| Attachment {
                file_id: d.file_id,
                file_name: d
                    .file_name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string()),
                file_size: d.file_size,
            }),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────────

/// Bot API client implementing [`Transport`].
#[derive(Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn describe(e: reqwest::Error) -> String {
    e.without_url().to_string()
}

/// HTTP timeout for a `getUpdates` call; must outlast the server-side poll.
fn poll_request_timeout(timeout_secs: u64) -> Duration {
    Duration::from_secs(timeout_secs.saturating_add(10))
}

impl TelegramTransport {
    /// Build a client for `base_url` (e.g. `https://api.telegram.org`).
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, Doc2PdfError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Doc2PdfError::Internal(format!("HTTP client: {}", describe(e))))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, Doc2PdfError> {
        Self::new(
            config.token.clone(),
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.base_url, self.token, file_path)
    }

    /// Send a prepared request and unwrap the Bot API envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Doc2PdfError> {
        let fail = |reason: String| Doc2PdfError::Transport {
            method: method.to_string(),
            reason,
        };

        let response = request.send().await.map_err(|e| fail(describe(e)))?;
        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| fail(format!("HTTP {}: {}", status, describe(e))))?;

        if !envelope.ok {
            return Err(fail(
                envelope
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }
        envelope
            .result
            .ok_or_else(|| fail("response has no result".to_string()))
    }

    /// Long-poll for new updates starting at `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, Doc2PdfError> {
        let mut body = serde_json::json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = offset.into();
        }

        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(poll_request_timeout(timeout_secs))
            .json(&body);

        self.call("getUpdates", request).await
    }

    async fn resolve_file_path(&self, file_id: &str) -> Result<String, Doc2PdfError> {
        let request = self
            .client
            .post(self.method_url("getFile"))
            .json(&serde_json::json!({ "file_id": file_id }));
        let file: File = self.call("getFile", request).await?;
        file.file_path.ok_or_else(|| Doc2PdfError::Transport {
            method: "getFile".to_string(),
            reason: "file is not available for download".to_string(),
        })
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn download(&self, attachment: &Attachment, dest: &Path) -> Result<(), Doc2PdfError> {
        let fail = |reason: String| Doc2PdfError::DownloadFailed {
            file_name: attachment.file_name.clone(),
            reason,
        };

        let file_path = self
            .resolve_file_path(&attachment.file_id)
            .await
            .map_err(|e| fail(e.to_string()))?;
        debug!("Downloading {} ({})", attachment.file_name, file_path);

        let response = self
            .client
            .get(self.file_url(&file_path))
            .send()
            .await
            .map_err(|e| fail(describe(e)))?;

        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| fail(describe(e)))?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| fail(format!("could not write {}: {}", dest.display(), e)))?;

        debug!("Saved {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), Doc2PdfError> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }));
        let _: serde_json::Value = self.call("sendMessage", request).await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, path: &Path) -> Result<(), Doc2PdfError> {
        let fail = |reason: String| Doc2PdfError::Transport {
            method: "sendDocument".to_string(),
            reason,
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| fail(format!("could not read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| fail(describe(e)))?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let request = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form);
        let _: serde_json::Value = self.call("sendDocument", request).await?;
        Ok(())
    }
}
