//! # doc2pdf-bot
//!
//! A Telegram bot that converts `.doc` / `.docx` uploads to PDF by shelling
//! out to a headless office suite (LibreOffice by default).
//!
//! ## Pipeline Overview
//!
//! ```text
//! Telegram update
//!  │
//!  ├─ 1. Route     /start, document, or anything else
//!  ├─ 2. Stage     fresh TempDir per request, download the attachment
//!  ├─ 3. Validate  extension allow-list, then existence
//!  ├─ 4. Convert   libreoffice --headless --convert-to pdf (spawn_blocking)
//!  ├─ 5. Deliver   note + PDF back to the same chat
//!  └─ 6. Cleanup   TempDir dropped on every path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2pdf_bot::{convert, ConverterConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Writes report.pdf next to report.docx
//!     let pdf = convert("report.docx", None, &ConverterConfig::default())?;
//!     println!("{}", pdf.display());
//!     Ok(())
//! }
//! ```
//!
//! Running the bot:
//!
//! ```rust,no_run
//! use doc2pdf_bot::BotConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let token = std::env::var("TELEGRAM_BOT_TOKEN")?;
//!     doc2pdf_bot::bot::run(BotConfig::builder(token).build()?).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2pdf` binary (clap + anyhow + dotenvy + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod adapter;
pub mod bot;
pub mod config;
pub mod convert;
pub mod error;
pub mod replies;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use adapter::{DeliveryAdapter, DocumentOutcome, StagingArea};
pub use config::{AdapterConfig, BotConfig, BotConfigBuilder, ConverterConfig};
pub use convert::{convert, convert_async, output_path_for, validate, SUPPORTED_EXTENSIONS};
pub use error::Doc2PdfError;
pub use transport::telegram::TelegramTransport;
pub use transport::{Attachment, ChatId, InboundMessage, Transport};
