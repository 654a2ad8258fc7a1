//! Delivery adapter: turn one inbound message into a reply.
//!
//! ## Per-document flow
//!
//! ```text
//! Start ──(no attachment)──▶ Reject (usage text)
//!   │
//!   ▼
//! Staging ──(download error)──▶ Failed(download)
//!   │
//!   ▼
//! Converting ──(convert error)──▶ Failed(conversion)
//!   │
//!   ▼
//! Delivering ──(upload error)──▶ Failed(conversion)
//!   │
//!   ▼
//! Cleanup  (StagingArea dropped, on every branch above)
//! ```
//!
//! Each request owns one [`StagingArea`]. It wraps a [`TempDir`], so the
//! directory and everything in it is removed when the handler returns,
//! whichever branch it took, and also when the task unwinds from a panic.
//!
//! No error escapes the handlers: every failure becomes a text reply, and a
//! failure to send that reply is only logged.

use crate::config::AdapterConfig;
use crate::convert;
use crate::error::Doc2PdfError;
use crate::replies;
use crate::transport::{Attachment, ChatId, InboundMessage, Transport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

/// Name used when the sender's filename is empty or unusable.
const FALLBACK_FILE_NAME: &str = "document";

/// Converter profile directory inside each staging area.
const PROFILE_DIR_NAME: &str = "lo-profile";

/// A uniquely named, request-scoped temporary directory.
///
/// Removed from disk when dropped.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a fresh directory under `root`, or under the system temp dir.
    pub fn create(root: Option<&Path>) -> Result<Self, Doc2PdfError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("doc2pdf-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| Doc2PdfError::Internal(format!("Failed to create staging directory: {e}")))?;

        debug!("Staging directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where an attachment called `file_name` is stored inside this area.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(sanitize_file_name(file_name))
    }

    /// Private converter profile for this request. Created by the converter.
    pub fn profile_dir(&self) -> PathBuf {
        self.dir.path().join(PROFILE_DIR_NAME)
    }
}

/// Reduce a sender-supplied filename to a single safe path component.
///
/// Keeps the last `/`- or `\`-separated segment and drops NUL bytes, so the
/// staged file always lands directly inside its staging directory.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| *c != '\0').collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        FALLBACK_FILE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `true` for `/start`, `/start@SomeBot` and either followed by arguments.
pub fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split('@').next().unwrap_or_default();
    command == "/start"
}

/// How a document request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// The message carried no attachment; usage text was sent.
    Rejected,
    /// The attachment could not be staged or downloaded.
    DownloadFailed,
    /// Conversion, or sending the result, failed.
    ConversionFailed,
    /// The PDF was sent back.
    Delivered,
}

/// Handles inbound messages on behalf of one bot.
///
/// Cheap to clone; clones share the transport.
pub struct DeliveryAdapter<T: Transport + ?Sized> {
    transport: Arc<T>,
    config: AdapterConfig,
}

impl<T: Transport + ?Sized> Clone for DeliveryAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T: Transport + ?Sized> DeliveryAdapter<T> {
    pub fn new(transport: Arc<T>, config: AdapterConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Route a message to the matching handler.
    pub async fn handle(&self, msg: &InboundMessage) {
        if msg.text.as_deref().is_some_and(is_start_command) {
            self.handle_start(msg).await;
        } else if msg.attachment.is_some() {
            self.handle_document(msg).await;
        } else {
            self.handle_non_document(msg).await;
        }
    }

    /// Reply to `/start` with the usage text.
    pub async fn handle_start(&self, msg: &InboundMessage) {
        self.reply(msg.chat_id, replies::START_MESSAGE).await;
    }

    /// Reply to anything that is not a document.
    pub async fn handle_non_document(&self, msg: &InboundMessage) {
        self.reply(msg.chat_id, replies::NON_DOCUMENT_MESSAGE).await;
    }

    /// Download, convert and return the attached document.
    #[instrument(skip(self, msg), fields(chat_id = msg.chat_id, message_id = msg.message_id))]
    pub async fn handle_document(&self, msg: &InboundMessage) -> DocumentOutcome {
        let Some(attachment) = msg.attachment.as_ref() else {
            self.reply(msg.chat_id, replies::START_MESSAGE).await;
            return DocumentOutcome::Rejected;
        };
        info!(
            "Received '{}' ({} bytes)",
            attachment.file_name,
            attachment
                .file_size
                .map_or_else(|| "?".to_string(), |s| s.to_string())
        );

        // Dropped at the end of this function on every path.
        let (area, staged_path) = match self.stage(attachment).await {
            Ok(staged) => staged,
            Err(e) => {
                warn!("Download of '{}' failed: {}", attachment.file_name, e);
                // The reply already names the file.
                let detail = match e {
                    Doc2PdfError::DownloadFailed { reason, .. } => reason,
                    other => other.to_string(),
                };
                self.reply(
                    msg.chat_id,
                    &replies::download_error(&attachment.file_name, &detail),
                )
                .await;
                return DocumentOutcome::DownloadFailed;
            }
        };

        match self.convert_and_send(msg.chat_id, &staged_path, &area).await {
            Ok(pdf) => {
                info!("Delivered {}", pdf.display());
                DocumentOutcome::Delivered
            }
            Err(e) => {
                if e.is_user_error() {
                    info!("Rejected '{}': {}", attachment.file_name, e);
                } else {
                    warn!("Processing '{}' failed: {}", attachment.file_name, e);
                }
                self.reply(msg.chat_id, &replies::processing_error(&e)).await;
                DocumentOutcome::ConversionFailed
            }
        }
    }

    /// Create the staging area and download the attachment into it.
    async fn stage(&self, attachment: &Attachment) -> Result<(StagingArea, PathBuf), Doc2PdfError> {
        let area = StagingArea::create(self.config.staging_root.as_deref())?;
        let dest = area.file_path(&attachment.file_name);
        self.transport.download(attachment, &dest).await?;
        Ok((area, dest))
    }

    async fn convert_and_send(
        &self,
        chat_id: ChatId,
        staged: &Path,
        area: &StagingArea,
    ) -> Result<PathBuf, Doc2PdfError> {
        let converter = self.config.converter.with_profile_in(&area.profile_dir())?;
        let pdf = convert::convert_async(staged, Some(area.path()), &converter).await?;
        self.transport.send_text(chat_id, replies::SENDING_NOTE).await?;
        self.transport.send_document(chat_id, &pdf).await?;
        Ok(pdf)
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text).await {
            warn!("Failed to reply to chat {}: {}", chat_id, e);
        }
    }
}
