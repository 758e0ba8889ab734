//! Command-line composition root for quire.
//!
//! Loads `.env` and `QUIRE_*` configuration, starts file logging, opens the
//! store and runs one resolver operation, printing its result as pretty JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use quire_api::{
    DocumentsArgs, NewAttachment, NewDocument, NewTag, Resolver, UpdateAttachment,
    UpdateDocument, UpdateTag,
};
use quire_core::{init_logging, open_db_with, CmsConfig};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Manage tags, documents and attachments in a quire store")]
#[command(version)]
struct Cli {
    /// Database file (overrides QUIRE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tags
    Tags,
    /// Create a tag
    TagCreate { title: String },
    /// Rename a tag
    TagUpdate { id: String, title: String },
    /// Soft-delete a tag
    TagDelete { id: String },
    /// List documents, optionally filtered by tags
    Documents(ListArgs),
    /// Show one document
    Document { id: String },
    /// Create a document
    DocumentCreate {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        #[command(flatten)]
        links: LinkArgs,
    },
    /// Update a document; omitted fields are kept
    DocumentUpdate {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[command(flatten)]
        links: LinkArgs,
    },
    /// Soft-delete a document
    DocumentDelete { id: String },
    /// Show one attachment
    Attachment { id: String },
    /// Register an attachment URL
    AttachmentCreate {
        url: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Change an attachment URL and optionally its title
    AttachmentUpdate {
        id: String,
        url: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Soft-delete an attachment
    AttachmentDelete { id: String },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    offset: Option<u32>,
    /// created_at, updated_at, title or body
    #[arg(long)]
    sort_by: Option<String>,
    /// Sort ascending instead of newest first
    #[arg(long, default_value_t = false)]
    asc: bool,
    /// Only documents carrying any of these tag ids
    #[arg(long = "tag")]
    tags: Vec<String>,
}

#[derive(Args)]
struct LinkArgs {
    /// Tag id to link (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// Attachment id to link (repeatable)
    #[arg(long = "attachment")]
    attachments: Vec<String>,
}

impl LinkArgs {
    fn into_ids(self) -> (Option<Vec<String>>, Option<Vec<String>>) {
        (non_empty(self.tags), non_empty(self.attachments))
    }
}

fn non_empty(ids: Vec<String>) -> Option<Vec<String>> {
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = CmsConfig::from_env().context("failed to load configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_logging(&config.log_level, &config.log_dir).context("failed to initialize logging")?;
    info!(
        "event=cli_start module=cli status=ok migrate_db={}",
        config.migrate_db
    );

    let conn = open_db_with(&config.db_path, config.migrate_db).with_context(|| {
        format!("failed to open database `{}`", config.db_path.display())
    })?;
    let resolver = Resolver::new(&conn).context("failed to build resolver")?;

    run(&resolver, cli.command)
}

fn run(resolver: &Resolver<'_>, command: Commands) -> Result<()> {
    match command {
        Commands::Tags => print_json(&resolver.tags()?),
        Commands::TagCreate { title } => print_json(&resolver.create_tag(NewTag { title })?),
        Commands::TagUpdate { id, title } => {
            print_json(&resolver.update_tag(UpdateTag { id, title })?)
        }
        Commands::TagDelete { id } => print_json(&resolver.delete_tag(&id)?),
        Commands::Documents(list) => {
            let args = DocumentsArgs {
                limit: list.limit,
                offset: list.offset,
                sort_by: list.sort_by,
                sort_descending: Some(!list.asc),
            };
            if list.tags.is_empty() {
                print_json(&resolver.documents(args)?)
            } else {
                print_json(&resolver.documents_by_tag(&list.tags, args)?)
            }
        }
        Commands::Document { id } => print_json(&resolver.document(&id)?),
        Commands::DocumentCreate { title, body, links } => {
            let (tag_ids, attachment_ids) = links.into_ids();
            print_json(&resolver.create_document(NewDocument {
                title,
                body,
                tag_ids,
                attachment_ids,
            })?)
        }
        Commands::DocumentUpdate {
            id,
            title,
            body,
            links,
        } => {
            let (tag_ids, attachment_ids) = links.into_ids();
            print_json(&resolver.update_document(UpdateDocument {
                id,
                title,
                body,
                tag_ids,
                attachment_ids,
            })?)
        }
        Commands::DocumentDelete { id } => print_json(&resolver.delete_document(&id)?),
        Commands::Attachment { id } => print_json(&resolver.attachment(&id)?),
        Commands::AttachmentCreate { url, title } => {
            print_json(&resolver.create_attachment(NewAttachment { url, title })?)
        }
        Commands::AttachmentUpdate { id, url, title } => {
            print_json(&resolver.update_attachment(UpdateAttachment { id, url, title })?)
        }
        Commands::AttachmentDelete { id } => print_json(&resolver.delete_attachment(&id)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn documents_accepts_repeated_tag_filter() {
        let cli = Cli::try_parse_from([
            "quire", "documents", "--limit", "2", "--asc", "--tag", "a", "--tag", "b",
        ])
        .expect("parse");
        match cli.command {
            Commands::Documents(list) => {
                assert_eq!(list.limit, Some(2));
                assert!(list.asc);
                assert_eq!(list.tags, vec!["a", "b"]);
            }
            _ => panic!("expected documents subcommand"),
        }
    }

    #[test]
    fn document_update_without_links_keeps_sets() {
        let cli = Cli::try_parse_from(["quire", "document-update", "id-1", "--body", "text"])
            .expect("parse");
        match cli.command {
            Commands::DocumentUpdate { body, links, .. } => {
                assert_eq!(body.as_deref(), Some("text"));
                assert_eq!(links.into_ids(), (None, None));
            }
            _ => panic!("expected document-update subcommand"),
        }
    }
}
