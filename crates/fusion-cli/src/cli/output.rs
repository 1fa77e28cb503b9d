//! Shared terminal output helpers: spinners, status lines, pagination footer,
//! local file loading for uploads.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use console::style;
use fusion_core::pagination::Paginator;
use fusion_types::error::ApiError;
use fusion_types::upload::FileUpload;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Start a spinner with `message`. Call `finish_and_clear` when done.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn success(message: impl std::fmt::Display) {
    println!();
    println!("  {} {}", style("✓").green().bold(), message);
    println!();
}

pub fn notice(message: impl std::fmt::Display) {
    println!();
    println!("  {} {}", style("i").blue().bold(), message);
    println!();
}

pub fn format_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// `Page 2 of 3` plus hints for the neighbouring pages. Nothing is printed
/// when everything fits on one page.
pub fn print_page_footer(paginator: &Paginator, command: &str) {
    if !paginator.shows_controls() {
        return;
    }
    let mut hints = Vec::new();
    if paginator.has_previous() {
        hints.push(format!("previous: {command} --page {}", paginator.current() - 1));
    }
    if paginator.has_next() {
        hints.push(format!("next: {command} --page {}", paginator.current() + 1));
    }
    println!(
        "  {}  {}",
        style(format!("Page {} of {}", paginator.current(), paginator.total_pages())).bold(),
        style(hints.join("  |  ")).dim()
    );
    println!();
}

/// Position a paginator on `page`, refusing pages that do not exist.
pub fn paginate(count: u64, page_size: u32, page: u32) -> Result<Paginator> {
    let mut paginator = Paginator::new(count, page_size);
    if count > 0 && !paginator.go_to(page) {
        anyhow::bail!(
            "Page {page} does not exist (there {} {}).",
            if paginator.total_pages() == 1 { "is" } else { "are" },
            match paginator.total_pages() {
                1 => "1 page".to_string(),
                n => format!("{n} pages"),
            }
        );
    }
    Ok(paginator)
}

/// Map the backend's "Invalid page." 404 for a page past the end to the
/// same message [`paginate`] gives.
pub fn page_request_error(err: ApiError, page: u32) -> anyhow::Error {
    match &err {
        ApiError::Status {
            status: 404,
            message: Some(message),
            ..
        } if message.starts_with("Invalid page") => anyhow::anyhow!("Page {page} does not exist."),
        _ => err.into(),
    }
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => return None,
    };
    Some(mime)
}

/// Read a local file into a multipart upload.
pub async fn read_upload(path: &str) -> Result<FileUpload> {
    let file_path = Path::new(path);
    let bytes = tokio::fs::read(file_path)
        .await
        .with_context(|| format!("Failed to read file: {path}"))?;
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let upload = FileUpload::new(file_name, bytes);
    Ok(match guess_content_type(file_path) {
        Some(mime) => upload.with_content_type(mime),
        None => upload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(guess_content_type(Path::new("mug.PNG")), Some("image/png"));
        assert_eq!(guess_content_type(Path::new("faq.pdf")), Some("application/pdf"));
        assert_eq!(guess_content_type(Path::new("notes")), None);
    }

    #[test]
    fn paginate_refuses_missing_pages() {
        assert_eq!(paginate(13, 6, 3).unwrap().current(), 3);
        let err = paginate(13, 6, 4).unwrap_err().to_string();
        assert!(err.contains("3 pages"), "{err}");
        assert!(paginate(0, 6, 1).is_ok());
    }

    #[test]
    fn invalid_page_404_reads_like_paginate() {
        let err = ApiError::Status {
            status: 404,
            message: Some("Invalid page.".to_string()),
            body: r#"{"detail":"Invalid page."}"#.to_string(),
        };
        assert_eq!(page_request_error(err, 9).to_string(), "Page 9 does not exist.");

        let other = ApiError::Status {
            status: 404,
            message: Some("Not found.".to_string()),
            body: String::new(),
        };
        assert!(page_request_error(other, 9).to_string().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn read_upload_missing_file_errors() {
        let err = read_upload("/definitely/not/here.png").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
