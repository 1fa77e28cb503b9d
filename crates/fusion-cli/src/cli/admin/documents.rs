//! Knowledge-base documents for the support bot.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use crate::cli::output::{format_time, notice, print_json, read_upload, spinner, success};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum DocumentCommand {
    /// List uploaded documents.
    #[command(alias = "ls")]
    List,

    /// Upload a document.
    Upload {
        /// Path to the file.
        path: String,
    },

    /// Delete a document.
    #[command(alias = "rm")]
    Delete {
        /// Document id.
        id: i64,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_document_command(cmd: DocumentCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        DocumentCommand::List => list_documents(state, json).await,
        DocumentCommand::Upload { path } => upload_document(state, &path, json).await,
        DocumentCommand::Delete { id, force } => delete_document(state, id, force, json).await,
    }
}

async fn list_documents(state: &AppState, json: bool) -> Result<()> {
    let spinner = spinner("Loading documents...");
    let result = state.api.list_documents().await;
    spinner.finish_and_clear();
    let documents = result?;

    if json {
        return print_json(&documents);
    }
    if documents.is_empty() {
        notice("No documents uploaded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("File").fg(Color::Cyan),
            Cell::new("Uploaded").fg(Color::Cyan),
            Cell::new("By").fg(Color::Cyan),
        ]);
    for doc in &documents.results {
        table.add_row(vec![
            Cell::new(doc.id),
            Cell::new(&doc.original_filename),
            Cell::new(format_time(&doc.uploaded_at)),
            Cell::new(&doc.user_email).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style(format!("{} document(s)", documents.count)).dim()
    );
    println!();
    Ok(())
}

async fn upload_document(state: &AppState, path: &str, json: bool) -> Result<()> {
    let file = read_upload(path).await?;
    let spinner = spinner(&format!("Uploading {}...", file.file_name));
    let result = state.api.upload_document(file).await;
    spinner.finish_and_clear();
    let document = result?;

    if json {
        return print_json(&document);
    }
    success(format!(
        "Uploaded {} (id {})",
        style(&document.original_filename).cyan(),
        document.id
    ));
    Ok(())
}

async fn delete_document(state: &AppState, id: i64, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete document {id}?"))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.api.delete_document(id).await?;

    if json {
        return print_json(&serde_json::json!({ "deleted": true, "id": id }));
    }
    success(format!("Deleted document {id}"));
    Ok(())
}
