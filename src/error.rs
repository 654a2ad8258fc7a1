//! Error types for the doc2pdf-bot library.
//!
//! A single [`Doc2PdfError`] covers every failure the bot can hit, grouped
//! into two domains:
//!
//! * **Input errors** ([`Doc2PdfError::UnsupportedFormat`],
//!   [`Doc2PdfError::NotFound`]) — the user sent something we cannot convert.
//!   Detected by [`crate::convert::validate`] before any subprocess runs.
//!
//! * **Engine / transport errors** — the download, the external converter or
//!   a Bot API call failed.
//!
//! Every variant is terminal for the current request. The delivery adapter
//! renders them with `Display` straight into the chat, so messages are
//! written for end users.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the doc2pdf-bot library.
#[derive(Debug, Error)]
pub enum Doc2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// File extension is not one of `.doc` / `.docx`.
    #[error("Unsupported file format {extension}. Only .doc and .docx are supported.")]
    UnsupportedFormat { extension: String },

    /// No file exists at the given path.
    #[error("Input file {} does not exist.", .path.display())]
    NotFound { path: PathBuf },

    // ── Engine / transport errors ─────────────────────────────────────────
    /// The messaging transport could not fetch the attachment.
    #[error("Failed to download '{file_name}': {reason}")]
    DownloadFailed { file_name: String, reason: String },

    /// The external converter could not be launched or exited non-zero.
    #[error("Conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A Bot API call other than the download failed.
    #[error("Telegram API call '{method}' failed: {reason}")]
    Transport { method: String, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Doc2PdfError {
    /// `true` when the failure was caused by what the user sent rather than
    /// by the converter or the network.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Doc2PdfError::UnsupportedFormat { .. } | Doc2PdfError::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn unsupported_format_mentions_extension() {
        let e = Doc2PdfError::UnsupportedFormat {
            extension: ".py".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains(".py"), "got: {msg}");
        assert!(msg.contains("Only .doc and .docx are supported."));
    }

    #[test]
    fn not_found_display() {
        let e = Doc2PdfError::NotFound {
            path: PathBuf::from("non_existent_file.doc"),
        };
        assert_eq!(
            e.to_string(),
            "Input file non_existent_file.doc does not exist."
        );
    }

    #[test]
    fn conversion_failed_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such program");
        let e = Doc2PdfError::ConversionFailed {
            reason: "could not launch 'libreoffice'".into(),
            source: Some(io),
        };
        assert!(e.to_string().contains("libreoffice"));
        assert!(e.source().is_some());
    }

    #[test]
    fn user_errors_are_classified() {
        assert!(Doc2PdfError::UnsupportedFormat {
            extension: ".txt".into()
        }
        .is_user_error());
        assert!(Doc2PdfError::NotFound {
            path: PathBuf::from("x.doc")
        }
        .is_user_error());
        assert!(!Doc2PdfError::DownloadFailed {
            file_name: "x.doc".into(),
            reason: "HTTP 404".into()
        }
        .is_user_error());
        assert!(!Doc2PdfError::Internal("boom".into()).is_user_error());
    }
}
