//! Messaging transport seam.
//!
//! [`crate::adapter::DeliveryAdapter`] only needs three things from the chat
//! platform: fetch an attachment to a local path, send text, and send a local
//! file back. [`Transport`] captures exactly that, so the adapter can be driven
//! by [`telegram::TelegramTransport`] in production and by an in-memory fake
//! in tests.

pub mod telegram;

use crate::error::Doc2PdfError;
use async_trait::async_trait;
use std::path::Path;

/// Identifier of the conversation a message arrived in.
pub type ChatId = i64;

/// A document attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Opaque transport identifier used to fetch the bytes.
    pub file_id: String,
    /// Original filename as supplied by the sender.
    pub file_name: String,
    /// Size in bytes, when the transport reports it.
    pub file_size: Option<u64>,
}

/// One inbound chat message, reduced to what the bot acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Outbound and download operations the delivery adapter depends on.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// concurrently running message task.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the attachment's bytes and write them to `dest`.
    ///
    /// Failures are reported as [`Doc2PdfError::DownloadFailed`].
    async fn download(&self, attachment: &Attachment, dest: &Path) -> Result<(), Doc2PdfError>;

    /// Send a plain-text reply to `chat_id`.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), Doc2PdfError>;

    /// Upload the file at `path` to `chat_id` as a document.
    async fn send_document(&self, chat_id: ChatId, path: &Path) -> Result<(), Doc2PdfError>;
}
