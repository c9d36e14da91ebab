use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;

use bookcase::auth::LocalSession;
use bookcase::cli::{Cli, Command};
use bookcase::config::Config;
use bookcase::pending::RequestQueue;
use bookcase::shell::Shell;
use bookcase::store::{BookStore, HttpBookStore};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bookcase::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = Config::from_env(cli.base_url.as_deref(), cli.timeout_secs)
        .context("load configuration")?;
    tracing::debug!(base_url = %config.base_url, "using book service");
    let store = HttpBookStore::new(&config.base_url, config.timeout).context("build book store")?;

    let output = match cli.command {
        Command::List(args) => bookcase::commands::list(args, &store).await.context("list")?,
        Command::Add(args) => bookcase::commands::add(args, &store).await.context("add")?,
        Command::Edit(args) => bookcase::commands::edit(args, &store).await.context("edit")?,
        Command::Delete(args) => bookcase::commands::delete(args, &store)
            .await
            .context("delete")?,
        Command::Shell => {
            let store: Arc<dyn BookStore> = Arc::new(store);
            let (queue, completions) = RequestQueue::new(store, config.max_in_flight);
            let mut session = LocalSession::signed_in();
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            Shell::new(queue, completions, &mut session, std::io::stdout())
                .run(stdin)
                .await
                .context("shell")?;
            String::new()
        }
    };

    print!("{output}");
    Ok(())
}
