use super::Result;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

#[instrument(name = "Download orchid dataset", skip_all, fields(url = %url), level = "info")]
pub fn download_dataset(url: &str) -> Result<NamedTempFile> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let client = Client::new();
        download_to_temp_file(&client, url).await
    })
}

async fn download_to_temp_file(client: &Client, url: &str) -> Result<NamedTempFile> {
    info!(url, "Starting download");
    let response = client.get(url).send().await?.error_for_status()?;

    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    ) {
        pb.set_style(style.progress_chars("█░"));
    }
    pb.set_message(format!(
        "Downloading {}",
        url.split('/').next_back().unwrap_or(url)
    ));

    let temp_file = NamedTempFile::with_suffix(".csv")?;
    let mut dest_file = tokio::fs::File::create(temp_file.path()).await?;

    let mut stream = response.bytes_stream();
    let mut written = 0_u64;
    while let Some(item) = stream.next().await {
        let chunk = item?;
        dest_file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        pb.inc(chunk.len() as u64);
    }
    dest_file.flush().await?;
    pb.finish_and_clear();
    info!(bytes = written, path = ?temp_file.path(), "Download complete");
    Ok(temp_file)
}
