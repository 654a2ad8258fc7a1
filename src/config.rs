//! Configuration types for the converter, the delivery adapter and the bot.
//!
//! Everything the bot needs at runtime lives in explicitly constructed values
//! that are passed into constructors; nothing is read from globals after
//! start-up. [`BotConfig`] is built via its [`BotConfigBuilder`] so callers set
//! only the knobs they care about.

use crate::error::Doc2PdfError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default Telegram Bot API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// LibreOffice option selecting the user profile directory.
pub const PROFILE_OPTION: &str = "-env:UserInstallation=";

/// Upper bound for the `getUpdates` long-polling timeout, in seconds.
pub const MAX_POLL_TIMEOUT_SECS: u64 = 3600;

/// Settings for the external document converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Program invoked for conversion. Default: `libreoffice`.
    ///
    /// Must accept `--headless --convert-to pdf <input> --outdir <dir>`.
    /// `soffice` works too on installations that do not ship the wrapper.
    pub program: String,

    /// Arguments placed before `--headless`. Default: none.
    ///
    /// Useful for LibreOffice options such as `--norestore`, or for running a
    /// wrapper script through an interpreter (`sh convert.sh`). The delivery
    /// adapter appends a per-request `-env:UserInstallation=` here unless one
    /// is already present; see [`ConverterConfig::with_profile_in`].
    pub extra_args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::new("libreoffice")
    }
}

impl ConverterConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// A copy that runs the converter with its own user profile in `dir`.
    ///
    /// Headless LibreOffice instances sharing one profile hand their job to
    /// whichever instance holds the lock, or exit 0 without output. Every
    /// concurrent conversion therefore needs a private profile. An explicit
    /// `-env:UserInstallation=` already in `extra_args` wins.
    pub fn with_profile_in(&self, dir: &Path) -> Result<Self, Doc2PdfError> {
        if self.extra_args.iter().any(|a| a.starts_with(PROFILE_OPTION)) {
            return Ok(self.clone());
        }
        let absolute = std::path::absolute(dir).map_err(|e| {
            Doc2PdfError::Internal(format!("Cannot resolve {}: {e}", dir.display()))
        })?;
        let url = reqwest::Url::from_file_path(&absolute).map_err(|()| {
            Doc2PdfError::Internal(format!(
                "Cannot express {} as a file URL",
                absolute.display()
            ))
        })?;
        Ok(self.clone().with_args([format!("{PROFILE_OPTION}{url}")]))
    }
}

/// Settings for [`crate::adapter::DeliveryAdapter`].
#[derive(Debug, Clone, Default)]
pub struct AdapterConfig {
    pub converter: ConverterConfig,

    /// Parent directory for per-request staging directories.
    /// `None` uses the system temp dir.
    pub staging_root: Option<PathBuf>,
}

/// Configuration for the long-polling bot runner.
///
/// Built via [`BotConfig::builder()`].
///
/// # Example
/// ```rust
/// use doc2pdf_bot::BotConfig;
///
/// let config = BotConfig::builder("123456:ABC")
///     .poll_timeout_secs(30)
///     .converter_program("soffice")
///     .build()
///     .unwrap();
/// assert_eq!(config.adapter.converter.program, "soffice");
/// ```
#[derive(Clone)]
pub struct BotConfig {
    /// Bot authentication token issued by @BotFather.
    pub token: String,

    /// Bot API base URL, without trailing slash. Default: [`DEFAULT_API_BASE_URL`].
    pub api_base_url: String,

    /// Long-polling timeout passed to `getUpdates`, in seconds. Default: 30.
    pub poll_timeout_secs: u64,

    /// Pause after a failed `getUpdates` call, in milliseconds. Default: 3000.
    pub poll_retry_delay_ms: u64,

    /// Timeout for non-polling HTTP requests (downloads, uploads). Default: 120.
    pub request_timeout_secs: u64,

    pub adapter: AdapterConfig,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("poll_retry_delay_ms", &self.poll_retry_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("adapter", &self.adapter)
            .finish()
    }
}

impl BotConfig {
    /// Create a new builder with the given bot token.
    pub fn builder(token: impl Into<String>) -> BotConfigBuilder {
        BotConfigBuilder {
            config: Self {
                token: token.into(),
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
                poll_timeout_secs: 30,
                poll_retry_delay_ms: 3000,
                request_timeout_secs: 120,
                adapter: AdapterConfig::default(),
            },
        }
    }
}

/// Builder for [`BotConfig`].
#[derive(Debug)]
pub struct BotConfigBuilder {
    config: BotConfig,
}

impl BotConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn poll_timeout_secs(mut self, secs: u64) -> Self {
        self.config.poll_timeout_secs = secs;
        self
    }

    pub fn poll_retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.poll_retry_delay_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn converter_program(mut self, program: impl Into<String>) -> Self {
        self.config.adapter.converter.program = program.into();
        self
    }

    pub fn converter_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.adapter.converter.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.adapter.staging_root = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BotConfig, Doc2PdfError> {
        let c = &self.config;
        if c.token.trim().is_empty() {
            return Err(Doc2PdfError::InvalidConfig(
                "Bot token is empty. Set TELEGRAM_BOT_TOKEN.".into(),
            ));
        }
        if c.adapter.converter.program.trim().is_empty() {
            return Err(Doc2PdfError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        if c.poll_timeout_secs == 0 || c.poll_timeout_secs > MAX_POLL_TIMEOUT_SECS {
            return Err(Doc2PdfError::InvalidConfig(format!(
                "Poll timeout must be between 1 and {MAX_POLL_TIMEOUT_SECS} seconds"
            )));
        }
        Ok(self.config)
    }
}
