use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Book service base URL (default: $BOOKCASE_BASE_URL or http://127.0.0.1:5000).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (default: $BOOKCASE_TIMEOUT_SECS or 30).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    List(ListArgs),
    Add(AddArgs),
    Edit(EditArgs),
    Delete(DeleteArgs),
    /// Interactive landing view reading commands from stdin.
    Shell,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show books whose title or author contains every word.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub published_year: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Id of the book to change.
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// New publication year; an empty value clears it.
    #[arg(long)]
    pub published_year: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[arg(long)]
    pub id: String,
}
