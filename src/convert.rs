//! Conversion service: validate a source document and hand it to the
//! external converter.
//!
//! Validation is a separate, side-effect-free step so callers can pre-check an
//! upload without paying for a subprocess, and so bad input
//! ([`Doc2PdfError::UnsupportedFormat`], [`Doc2PdfError::NotFound`]) stays
//! distinguishable from an engine failure ([`Doc2PdfError::ConversionFailed`]).
//!
//! The converter is invoked as
//!
//! ```text
//! <program> [extra args…] --headless --convert-to pdf <input> --outdir <dir>
//! ```
//!
//! and produces `<dir>/<stem>.pdf`. No timeout is applied; a hung converter
//! blocks the calling task until it exits.

use crate::config::ConverterConfig;
use crate::error::Doc2PdfError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, error, info};

/// Extensions accepted by [`validate`], compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".doc", ".docx"];

/// Dotted, lowercased extension of `path`, or `""` when it has none.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Check that `path` names a supported document that exists.
///
/// The extension check runs first and never touches the filesystem.
pub fn validate(path: impl AsRef<Path>) -> Result<(), Doc2PdfError> {
    let path = path.as_ref();

    let extension = dotted_extension(path);
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        // Report the extension as the user wrote it.
        let original = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        return Err(Doc2PdfError::UnsupportedFormat {
            extension: original,
        });
    }

    if !path.exists() {
        return Err(Doc2PdfError::NotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Path the converter writes for `input` into `output_dir`: same stem, `.pdf`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_os_string();
    name.push(".pdf");
    output_dir.join(name)
}

/// Directory `convert` writes to when the caller gives none.
fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Convert a `.doc`/`.docx` file to PDF.
///
/// # Arguments
/// * `input`      — source document
/// * `output_dir` — where to write the PDF; defaults to the input's directory
/// * `config`     — which converter program to run
///
/// # Returns
/// The path of the produced PDF. Running twice overwrites the same file.
///
/// # Errors
/// Validation errors are returned unchanged. A converter that cannot be
/// launched, exits non-zero, or exits cleanly without writing the PDF yields
/// [`Doc2PdfError::ConversionFailed`].
pub fn convert(
    input: impl AsRef<Path>,
    output_dir: Option<&Path>,
    config: &ConverterConfig,
) -> Result<PathBuf, Doc2PdfError> {
    let input = input.as_ref();
    validate(input)?;

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(input));
    let pdf_path = output_path_for(input, &output_dir);

    info!("Converting {} → {}", input.display(), pdf_path.display());
    debug!(
        "Running {} {:?} --headless --convert-to pdf {} --outdir {}",
        config.program,
        config.extra_args,
        input.display(),
        output_dir.display()
    );

    let output = Command::new(&config.program)
        .args(&config.extra_args)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg(input)
        .arg("--outdir")
        .arg(&output_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Doc2PdfError::ConversionFailed {
            reason: format!("could not launch '{}': {}", config.program, e),
            source: Some(e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        error!("{} failed ({}): {}", config.program, output.status, stderr);
        let reason = if stderr.is_empty() {
            format!("'{}' exited with {}", config.program, output.status)
        } else {
            format!("'{}' exited with {}: {}", config.program, output.status, stderr)
        };
        return Err(Doc2PdfError::ConversionFailed {
            reason,
            source: None,
        });
    }

    if !pdf_path.exists() {
        return Err(Doc2PdfError::ConversionFailed {
            reason: format!(
                "'{}' reported success but {} was not written",
                config.program,
                pdf_path.display()
            ),
            source: None,
        });
    }

    debug!("Converted: {}", pdf_path.display());
    Ok(pdf_path)
}

/// [`convert`] on the blocking thread pool.
///
/// The converter is a blocking subprocess; running it through
/// `spawn_blocking` keeps the Tokio worker threads free while the calling
/// task waits for the process to exit.
pub async fn convert_async(
    input: impl AsRef<Path>,
    output_dir: Option<&Path>,
    config: &ConverterConfig,
) -> Result<PathBuf, Doc2PdfError> {
    let input = input.as_ref().to_path_buf();
    let output_dir = output_dir.map(Path::to_path_buf);
    let config = config.clone();

    tokio::task::spawn_blocking(move || convert(&input, output_dir.as_deref(), &config))
        .await
        .map_err(|e| Doc2PdfError::Internal(format!("Conversion task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension_reported_before_existence() {
        let err = validate("non_supported_file.py").unwrap_err();
        match err {
            Doc2PdfError::UnsupportedFormat { extension } => assert_eq!(extension, ".py"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn missing_extension_is_unsupported() {
        let err = validate("README").unwrap_err();
        assert!(matches!(err, Doc2PdfError::UnsupportedFormat { ref extension } if extension.is_empty()));
    }

    #[test]
    fn lookalike_extensions_rejected() {
        for name in ["a.docm", "a.doc.txt", "a.pdf", "a.odt"] {
            assert!(
                matches!(validate(name), Err(Doc2PdfError::UnsupportedFormat { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = validate("non_existent_file.doc").unwrap_err();
        assert!(matches!(err, Doc2PdfError::NotFound { .. }));
        assert!(err.to_string().contains("non_existent_file.doc"));
    }

    #[test]
    fn supported_extensions_any_case() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["file1.doc", "file2.DOC", "file3.docx", "file4.DOCX", "f.DocX"] {
            let p = dir.path().join(name);
            std::fs::write(&p, b"x").unwrap();
            validate(&p).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(
            output_path_for(Path::new("/in/report.docx"), Path::new("/out")),
            PathBuf::from("/out/report.pdf")
        );
        assert_eq!(
            output_path_for(Path::new("my.report.DOC"), Path::new("o")),
            PathBuf::from("o/my.report.pdf")
        );
    }

    #[test]
    fn default_output_dir_is_input_parent() {
        assert_eq!(default_output_dir(Path::new("/a/b/c.doc")), PathBuf::from("/a/b"));
        assert_eq!(default_output_dir(Path::new("c.doc")), PathBuf::from("."));
    }

    #[test]
    fn convert_propagates_validation_errors() {
        let cfg = ConverterConfig::new("definitely-not-a-real-converter");
        let err = convert("notes.txt", None, &cfg).unwrap_err();
        assert!(matches!(err, Doc2PdfError::UnsupportedFormat { .. }));

        let err = convert("missing.docx", None, &cfg).unwrap_err();
        assert!(matches!(err, Doc2PdfError::NotFound { .. }));
    }

    #[test]
    fn launch_failure_is_conversion_failed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("in.doc");
        std::fs::write(&p, b"x").unwrap();

        let cfg = ConverterConfig::new("definitely-not-a-real-converter");
        let err = convert(&p, None, &cfg).unwrap_err();
        match err {
            Doc2PdfError::ConversionFailed { source, .. } => assert!(source.is_some()),
            other => panic!("expected ConversionFailed, got {other:?}"),
        }
    }
}
