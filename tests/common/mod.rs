//! Shared fixtures for the integration tests.
//!
//! The fake converters are plain `sh` scripts run as `sh <script> …`, so they
//! take the same argument list as LibreOffice:
//! `[-env:UserInstallation=<url>] --headless --convert-to pdf <input> --outdir <dir>`.

#![allow(dead_code)]

use async_trait::async_trait;
use doc2pdf_bot::{Attachment, ChatId, ConverterConfig, Doc2PdfError, InboundMessage, Transport};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Writes `<outdir>/<stem>.pdf` and exits 0.
///
/// When given a user profile, creates it and appends its URL to
/// [`PROFILE_LOG`] next to the script.
pub const CONVERTING_SCRIPT: &str = r#"
in= out= profile=
while [ $# -gt 0 ]; do
  case "$1" in
    -env:UserInstallation=*) profile="${1#-env:UserInstallation=}" ;;
    --convert-to) shift ;;
    --outdir) out="$2"; shift ;;
    --*) ;;
    *) in="$1" ;;
  esac
  shift
done
if [ -n "$profile" ]; then
  mkdir -p "${profile#file://}"
  echo "$profile" >> "$(dirname "$0")/profiles.log"
fi
name=$(basename "$in")
stem="${name%.*}"
printf '%%PDF-1.4\n%% converted from %s\n' "$name" > "$out/$stem.pdf"
"#;

/// File, next to the fake converter, listing the profiles it was given.
pub const PROFILE_LOG: &str = "profiles.log";

/// Prints an error and exits 1 without writing anything.
pub const FAILING_SCRIPT: &str = r#"
echo "Error: source file could not be loaded" >&2
exit 1
"#;

/// Exits 0 without writing anything.
pub const SILENT_SCRIPT: &str = "exit 0\n";

/// A converter config running `script` through `sh`, stored under `dir`.
pub fn fake_converter(dir: &Path, script: &str) -> ConverterConfig {
    let path = dir.join("fake-converter.sh");
    std::fs::write(&path, script).expect("write fake converter");
    ConverterConfig::new("sh").with_args([path.to_string_lossy().into_owned()])
}

/// Profile URLs recorded by [`CONVERTING_SCRIPT`] in `dir`, one per run.
pub fn recorded_profiles(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join(PROFILE_LOG))
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

pub fn text_message(chat_id: ChatId, text: &str) -> InboundMessage {
    InboundMessage {
        chat_id,
        message_id: 1,
        text: Some(text.to_string()),
        attachment: None,
    }
}

pub fn document_message(chat_id: ChatId, file_name: &str) -> InboundMessage {
    InboundMessage {
        chat_id,
        message_id: 2,
        text: None,
        attachment: Some(Attachment {
            file_id: format!("id-{file_name}"),
            file_name: file_name.to_string(),
            file_size: Some(12),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(ChatId, String),
    /// Chat, uploaded file name, uploaded bytes.
    Document(ChatId, String, Vec<u8>),
}

/// In-memory transport that records everything the adapter does.
#[derive(Default)]
pub struct RecordingTransport {
    /// `Some(reason)` makes every download fail.
    pub download_error: Option<String>,
    pub fail_send_text: bool,
    pub fail_send_document: bool,
    pub sent: Mutex<Vec<Sent>>,
    /// Destination of every download attempt.
    pub downloads: Mutex<Vec<PathBuf>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<PathBuf> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(_, t) => Some(t),
                Sent::Document(..) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn download(&self, attachment: &Attachment, dest: &Path) -> Result<(), Doc2PdfError> {
        self.downloads.lock().unwrap().push(dest.to_path_buf());
        if let Some(ref reason) = self.download_error {
            return Err(Doc2PdfError::DownloadFailed {
                file_name: attachment.file_name.clone(),
                reason: reason.clone(),
            });
        }
        tokio::fs::write(dest, format!("content of {}", attachment.file_name))
            .await
            .map_err(|e| Doc2PdfError::DownloadFailed {
                file_name: attachment.file_name.clone(),
                reason: e.to_string(),
            })
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), Doc2PdfError> {
        if self.fail_send_text {
            return Err(Doc2PdfError::Transport {
                method: "sendMessage".into(),
                reason: "chat not found".into(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Text(chat_id, text.to_string()));
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, path: &Path) -> Result<(), Doc2PdfError> {
        if self.fail_send_document {
            return Err(Doc2PdfError::Transport {
                method: "sendDocument".into(),
                reason: "Request Entity Too Large".into(),
            });
        }
        let bytes = tokio::fs::read(path).await.expect("PDF readable at upload time");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Document(chat_id, name, bytes));
        Ok(())
    }
}
