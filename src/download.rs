use std::path::{Path, PathBuf};

use reqwest::Client;
use url::Url;

use crate::error::TransportError;

const FALLBACK_FILE_NAME: &str = "bill.pdf";

/// Where the PDF came from once the input argument has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    pub pdf_path: PathBuf,
    pub downloaded: bool,
}

#[must_use]
pub fn is_remote(input: &str) -> bool {
    let lower = input.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Percent-decoded last path segment of `url`, or `bill.pdf` when empty.
#[must_use]
pub fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment)
                .map(std::borrow::Cow::into_owned)
                .unwrap_or_else(|_| segment.to_string())
        })
        .filter(|name| !name.contains(['/', '\\']) && name != ".." && name != ".")
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

/// The CSV sits next to the PDF, with the extension swapped.
#[must_use]
pub fn csv_path_for(pdf_path: &Path) -> PathBuf {
    pdf_path.with_extension("csv")
}

pub async fn fetch_pdf_bytes(client: &Client, pdf_url: &str) -> Result<Vec<u8>, TransportError> {
    let parsed = Url::parse(pdf_url)?;
    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|error| TransportError::request(pdf_url, error))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Http {
            method: "GET",
            url: pdf_url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|error| TransportError::request(pdf_url, error))?;
    if bytes.is_empty() {
        return Err(TransportError::EmptyBody(pdf_url.to_string()));
    }
    Ok(bytes.to_vec())
}

/// Downloads `pdf_url` into `work_dir` under the URL's file name.
pub async fn download_pdf(
    client: &Client,
    pdf_url: &str,
    work_dir: &Path,
) -> Result<PathBuf, TransportError> {
    let url = Url::parse(pdf_url)?;
    let target = work_dir.join(file_name_from_url(&url));
    tracing::info!(url = %url, path = %target.display(), "downloading PDF");

    let bytes = fetch_pdf_bytes(client, pdf_url).await?;
    tokio::fs::create_dir_all(work_dir).await?;
    tokio::fs::write(&target, &bytes).await?;

    tracing::info!(path = %target.display(), bytes = bytes.len(), "PDF downloaded");
    Ok(target)
}

/// URLs are downloaded into `work_dir`; anything else is a local path.
pub async fn resolve_input(
    client: &Client,
    input: &str,
    work_dir: &Path,
) -> Result<ResolvedInput, TransportError> {
    if is_remote(input) {
        let pdf_path = download_pdf(client, input.trim(), work_dir).await?;
        return Ok(ResolvedInput {
            pdf_path,
            downloaded: true,
        });
    }

    Ok(ResolvedInput {
        pdf_path: PathBuf::from(input),
        downloaded: false,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use url::Url;

    use super::{csv_path_for, file_name_from_url, is_remote};

    #[test]
    fn recognizes_http_inputs() {
        assert!(is_remote("https://example.com/bill.pdf"));
        assert!(is_remote("HTTP://example.com/bill.pdf"));
        assert!(!is_remote("/tmp/bill.pdf"));
        assert!(!is_remote("bill.pdf"));
    }

    #[test]
    fn file_name_is_percent_decoded_last_segment() {
        let url = Url::parse("https://example.com/files/recibo%20junio.pdf?x=1").expect("url");
        assert_eq!(file_name_from_url(&url), "recibo junio.pdf");
    }

    #[test]
    fn file_name_falls_back_for_bare_hosts_and_traversal() {
        let url = Url::parse("https://example.com/").expect("url");
        assert_eq!(file_name_from_url(&url), "bill.pdf");
        let url = Url::parse("https://example.com/a/..%2F..%2Fetc").expect("url");
        assert_eq!(file_name_from_url(&url), "bill.pdf");
    }

    #[test]
    fn csv_path_replaces_extension() {
        assert_eq!(
            csv_path_for(Path::new("/tmp/recibo.pdf")),
            Path::new("/tmp/recibo.csv")
        );
        assert_eq!(csv_path_for(Path::new("recibo")), Path::new("recibo.csv"));
    }
}
