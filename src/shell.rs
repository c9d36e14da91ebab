use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};
use tokio::sync::mpsc;

use crate::auth::AuthContext;
use crate::catalog::Catalog;
use crate::model::BookField;
use crate::pending::{Completion, Request, RequestQueue};
use crate::view;

pub const HELP: &str = "\
commands:
  list                      show the (filtered) book list
  search <query>            filter by title/author; empty query shows all
  title|author|year <value> fill in the new-book form
  add                       submit the new-book form
  edit <id>                 open a book for editing
  set title|author|year <v> change the book being edited
  save | cancel             save or discard the edit
  delete <id>               delete a book
  refresh                   re-fetch the list
  wait                      wait for in-flight requests
  logout | quit | help
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Search(String),
    Draft(BookField, String),
    Add,
    Edit(String),
    Set(BookField, String),
    Save,
    Cancel,
    Delete(String),
    Refresh,
    Wait,
    Logout,
    Help,
    Quit,
}

impl ShellCommand {
    /// Blank lines parse to `None`.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => Self::List,
            "search" => Self::Search(rest.to_owned()),
            "title" | "author" | "year" => Self::Draft(BookField::parse(word)?, rest.to_owned()),
            "add" => Self::Add,
            "edit" => Self::Edit(required_id(rest, "edit")?),
            "set" => {
                let (field, value) = match rest.split_once(char::is_whitespace) {
                    Some((field, value)) => (field, value.trim()),
                    None => (rest, ""),
                };
                if field.is_empty() {
                    anyhow::bail!("usage: set title|author|year <value>");
                }
                Self::Set(BookField::parse(field)?, value.to_owned())
            }
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(required_id(rest, "delete")?),
            "refresh" => Self::Refresh,
            "wait" => Self::Wait,
            "logout" => Self::Logout,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => anyhow::bail!("unknown command: {other} (try `help`)"),
        };
        Ok(Some(command))
    }
}

fn required_id(rest: &str, command: &str) -> anyhow::Result<String> {
    if rest.is_empty() {
        anyhow::bail!("usage: {command} <id>");
    }
    Ok(rest.to_owned())
}

enum Flow {
    Continue,
    Exit,
}

/// Interactive landing view.
///
/// User lines and store completions are handled one at a time on this task,
/// in the order they arrive. The list is fetched once on start. On `quit` or
/// end of input the shell waits for in-flight requests before returning.
pub struct Shell<'a, W: Write> {
    catalog: Catalog,
    queue: RequestQueue,
    completions: mpsc::UnboundedReceiver<Completion>,
    session: &'a mut dyn AuthContext,
    out: W,
    in_flight: usize,
}

impl<'a, W: Write> Shell<'a, W> {
    pub fn new(
        queue: RequestQueue,
        completions: mpsc::UnboundedReceiver<Completion>,
        session: &'a mut dyn AuthContext,
        out: W,
    ) -> Self {
        Self {
            catalog: Catalog::new(),
            queue,
            completions,
            session,
            out,
            in_flight: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> anyhow::Result<()> {
        if !self.session.authenticated() {
            tracing::info!("not signed in; nothing to show");
            return Ok(());
        }

        self.submit(Request::FetchAll);
        let mut lines = input.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if let Flow::Exit = self.handle_line(&line).await? {
                        break;
                    }
                }
                Some(completion) = self.completions.recv(), if self.in_flight > 0 => {
                    self.complete(completion)?;
                }
            }
        }

        self.drain().await
    }

    async fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        let command = match ShellCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(err) => {
                writeln!(self.out, "{err:#}")?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?command, "shell command");

        match command {
            ShellCommand::List => self.render()?,
            ShellCommand::Search(query) => {
                self.catalog.set_search_query(&query);
                self.render()?;
            }
            ShellCommand::Draft(field, value) => self.catalog.set_draft_field(field, &value),
            ShellCommand::Add => {
                let request = self.catalog.create_request();
                self.submit(request);
            }
            ShellCommand::Edit(raw) => {
                let id = self.catalog.resolve_id(&raw);
                if self.catalog.open_edit(&id) {
                    writeln!(self.out, "editing [{id}]")?;
                } else {
                    writeln!(self.out, "no book with id {id}")?;
                }
            }
            ShellCommand::Set(field, value) => {
                if !self.catalog.edit_field(field, &value) {
                    writeln!(self.out, "no book open for editing")?;
                }
            }
            ShellCommand::Save => match self.catalog.save_request() {
                Some(request) => self.submit(request),
                None => writeln!(self.out, "no book open for editing")?,
            },
            ShellCommand::Cancel => self.catalog.cancel_edit(),
            ShellCommand::Delete(raw) => {
                let id = self.catalog.resolve_id(&raw);
                self.submit(Request::Remove(id));
            }
            ShellCommand::Refresh => self.submit(Request::FetchAll),
            ShellCommand::Wait => self.drain().await?,
            ShellCommand::Logout => {
                self.session.logout();
                return Ok(Flow::Exit);
            }
            ShellCommand::Help => self.out.write_all(HELP.as_bytes())?,
            ShellCommand::Quit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn submit(&mut self, request: Request) {
        self.in_flight += 1;
        self.queue.submit(request);
    }

    fn complete(&mut self, completion: Completion) -> anyhow::Result<()> {
        self.in_flight = self.in_flight.saturating_sub(1);
        let operation = completion.operation();
        let created_or_updated = match &completion {
            Completion::Created(Ok(book)) | Completion::Updated(Ok(book)) => Some(book.id.clone()),
            _ => None,
        };

        if !self.catalog.apply(completion) {
            writeln!(self.out, "{operation} failed")?;
            return Ok(());
        }
        let saved = created_or_updated
            .and_then(|id| self.catalog.find(&id).map(view::book_line));
        match saved {
            Some(line) => writeln!(self.out, "{operation} ok: {line}")?,
            None => writeln!(self.out, "{operation} ok")?,
        }
        Ok(())
    }

    async fn drain(&mut self) -> anyhow::Result<()> {
        while self.in_flight > 0 {
            let Some(completion) = self.completions.recv().await else {
                break;
            };
            self.complete(completion)?;
        }
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        if let Some(rendered) = view::landing(&*self.session, &self.catalog) {
            self.out.write_all(rendered.as_bytes())?;
        }
        Ok(())
    }
}
