//! Scoped artifact downloads.
//!
//! A download lands in its own temporary directory and is yielded to the
//! caller as a [`Download`] handle. Dropping the handle removes the file on
//! every exit path, success or error. This is a scoped resource, not a
//! cache: nothing is ever left behind.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// A downloaded artifact, removed from disk when dropped.
#[derive(Debug)]
pub struct Download {
    path: PathBuf,
    _dir: TempDir,
}

impl Download {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Fetch `url` into a temporary file.
///
/// `cookie` is sent as a `Cookie` header when present; one vendor site
/// requires a license-acceptance cookie before serving its installer.
/// Non-2xx responses and transport failures are fatal.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    cookie: Option<&str>,
) -> Result<Download> {
    let filename = url_filename(url);
    tracing::info!("downloading {} to {}", url, filename);

    let mut request = client.get(url);
    if let Some(cookie) = cookie {
        request = request.header(reqwest::header::COOKIE, cookie);
    }

    let response = request.send().await?.error_for_status()?;

    let dir = TempDir::new()?;
    let path = dir.path().join(&filename);
    let mut file = tokio::fs::File::create(&path).await?;

    let bar = progress_bar(response.content_length());
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        bar.inc(chunk.len() as u64);
    }
    file.flush().await?;
    bar.finish_and_clear();

    Ok(Download { path, _dir: dir })
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{bar:30.cyan/dim} {bytes}/{total_bytes} ({bytes_per_sec})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    }
}

/// Last path segment of the URL, with any query or fragment stripped.
fn url_filename(url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/');
    let name = path.rsplit('/').next().unwrap_or("");
    if name.is_empty() || name.contains(':') {
        "download".to_string()
    } else {
        name.to_string()
    }
}
