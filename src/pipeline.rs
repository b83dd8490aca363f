use std::path::PathBuf;

use reqwest::Client;

use crate::clipboard::ClipboardSink;
use crate::download::{csv_path_for, resolve_input};
use crate::error::{ExtractError, SyncError, TransportError};
use crate::github::{ContentsClient, DEFAULT_API_BASE, DEFAULT_REMOTE_DIR, UploadOutcome, remote_path_for};
use crate::model::UploadTarget;
use crate::options::ExtractOptions;
use crate::warning::{ExtractWarning, WarningCode};
use crate::{ConversionReport, convert_pdf_to_csv};

pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Local PDF path or HTTP(S) URL.
    pub input: String,
    /// `owner/name` of the destination repository.
    pub repository: String,
    pub branch: String,
    pub token: String,
    pub customer_name: String,
    /// Download directory for remote PDFs.
    pub work_dir: PathBuf,
    pub api_base_url: String,
    pub remote_dir: String,
    /// Overrides the create/update commit message.
    pub commit_message: Option<String>,
    pub extract: ExtractOptions,
}

impl SyncConfig {
    #[must_use]
    pub fn new(
        input: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            repository: repository.into(),
            branch: branch.into(),
            token: token.into(),
            customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
            work_dir: std::env::temp_dir(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            remote_dir: DEFAULT_REMOTE_DIR.to_string(),
            commit_message: None,
            extract: ExtractOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub pdf_path: PathBuf,
    pub csv_path: PathBuf,
    pub conversion: ConversionReport,
    pub summary_line: Option<String>,
    pub upload: UploadOutcome,
}

fn build_http_client() -> Result<Client, TransportError> {
    Client::builder()
        .user_agent(concat!("cfe-bill-sync/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(TransportError::Client)
}

fn copy_summary(
    clipboard: &dyn ClipboardSink,
    line: &str,
    warnings: &mut Vec<ExtractWarning>,
) {
    match clipboard.copy(line) {
        Ok(()) => tracing::info!(summary = line, "summary copied"),
        Err(error) => {
            let warning = ExtractWarning::new(
                WarningCode::ClipboardUnavailable,
                format!("summary not copied: {error}"),
            );
            warning.log();
            warnings.push(warning);
        }
    }
}

/// Download, convert, summarize and upload one bill. Transport failures end
/// the run; row, summary and clipboard problems only produce warnings.
pub async fn run(config: &SyncConfig, clipboard: &dyn ClipboardSink) -> Result<SyncOutcome, SyncError> {
    let http = build_http_client()?;

    let resolved = resolve_input(&http, &config.input, &config.work_dir).await?;
    let csv_path = csv_path_for(&resolved.pdf_path);
    tracing::info!(
        pdf = %resolved.pdf_path.display(),
        csv = %csv_path.display(),
        downloaded = resolved.downloaded,
        "converting PDF"
    );

    let mut conversion = convert_pdf_to_csv(&resolved.pdf_path, &csv_path, &config.extract)?;

    let summary_line = conversion
        .summary
        .as_ref()
        .map(|summary| summary.headline(&config.customer_name));
    if let Some(line) = &summary_line {
        copy_summary(clipboard, line, &mut conversion.warnings);
    }

    let csv_bytes = tokio::fs::read(&csv_path)
        .await
        .map_err(ExtractError::from)?;
    let file_name = csv_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bill.csv".to_string());

    let target = UploadTarget {
        repository: config.repository.clone(),
        branch: config.branch.clone(),
        remote_path: remote_path_for(&config.remote_dir, &file_name),
        existing_content_hash: None,
    };
    let contents = ContentsClient::new(http, config.api_base_url.clone(), config.token.clone());
    let upload = contents
        .upsert(target, config.commit_message.as_deref(), &csv_bytes)
        .await
        .inspect_err(|error| tracing::error!(status = ?error.status(), %error, "upload failed"))?;

    Ok(SyncOutcome {
        pdf_path: resolved.pdf_path,
        csv_path,
        conversion,
        summary_line,
        upload,
    })
}
