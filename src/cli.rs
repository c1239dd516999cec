use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::AppError;
use crate::models::{Completion, Revision, Todo};
use crate::services::TodoStore;

#[derive(Debug, Parser)]
#[command(name = "todo")]
#[command(about = "Simple command-line todo list")]
#[command(version)]
pub struct Cli {
    /// Todo file to use (defaults to $TODO_FILE, then ~/.claude_todos.json)
    ///
    /// Give it before the description of `add`/`update`; anything after the
    /// first description word is part of the description.
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a new todo
    Add {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// List todos (--all shows completed)
    List {
        #[arg(short, long)]
        all: bool,
    },
    /// Mark a todo as completed
    Complete {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Delete a todo
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Update a todo's description
    Update {
        #[arg(allow_negative_numbers = true)]
        id: i64,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// Clear all completed todos
    Clear,
}

/// A validated command, ready to run against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Add(String),
    List { all: bool },
    Complete(u64),
    Delete(u64),
    Update(u64, String),
    Clear,
}

impl TryFrom<Command> for Request {
    type Error = AppError;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        Ok(match command {
            Command::Add { description } => Request::Add(join_description(description)?),
            Command::List { all } => Request::List { all },
            Command::Complete { id } => Request::Complete(todo_id(id)?),
            Command::Delete { id } => Request::Delete(todo_id(id)?),
            Command::Update { id, description } => {
                Request::Update(todo_id(id)?, join_description(description)?)
            }
            Command::Clear => Request::Clear,
        })
    }
}

/// Ids are never negative, so a negative one names no todo.
fn todo_id(id: i64) -> Result<u64, AppError> {
    u64::try_from(id).map_err(|_| AppError::UnknownId(id))
}

fn join_description(words: Vec<String>) -> Result<String, AppError> {
    let description = words.join(" ");
    if description.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Please provide a description".to_string(),
        ));
    }
    Ok(description)
}

/// Run the parsed command line and return the text to print.
pub async fn run(cli: Cli) -> Result<String, AppError> {
    let Some(command) = cli.command else {
        return Ok(Cli::command().render_help().to_string());
    };
    let request = Request::try_from(command)?;

    let config = match cli.file {
        Some(path) => StoreConfig::new(path),
        None => StoreConfig::new_from_env()?,
    };
    debug!("using todo file {}", config.path.display());

    let mut store = TodoStore::open(config.path).await;
    execute(&mut store, request).await
}

pub async fn execute(store: &mut TodoStore, request: Request) -> Result<String, AppError> {
    match request {
        Request::Add(description) => {
            let todo = store.add(description).await?;
            Ok(format!("✅ Added todo #{}: {}", todo.id, todo.description))
        }
        Request::List { all } => Ok(render_list(store.is_empty(), &store.list(all))),
        Request::Complete(id) => Ok(render_completion(&store.complete(id).await?)),
        Request::Delete(id) => {
            let todo = store.delete(id).await?;
            Ok(format!("🗑️  Deleted todo #{}: {}", todo.id, todo.description))
        }
        Request::Update(id, description) => Ok(render_revision(&store.update(id, description).await?)),
        Request::Clear => Ok(render_cleared(store.clear_completed().await?)),
    }
}

pub fn render_list(store_empty: bool, todos: &[&Todo]) -> String {
    if store_empty {
        return "No todos found. Add one with: add <description>".to_string();
    }
    if todos.is_empty() {
        return "No pending todos! 🎉".to_string();
    }

    let mut lines = vec![
        format!("{:<6} {:<12} {}", "ID", "Status", "Description"),
        "-".repeat(60),
    ];
    for todo in todos {
        let status = if todo.completed { "✓ Completed" } else { "○ Pending" };
        lines.push(format!(
            "#{:<5} {:<12} {}",
            todo.id, status, todo.description
        ));
    }
    lines.join("\n")
}

pub fn render_completion(completion: &Completion) -> String {
    match completion {
        Completion::Completed(todo) => {
            format!("✅ Completed todo #{}: {}", todo.id, todo.description)
        }
        Completion::AlreadyCompleted(todo) => format!("Todo #{} is already completed", todo.id),
    }
}

pub fn render_revision(revision: &Revision) -> String {
    format!(
        "✏️  Updated todo #{}\n   Old: {}\n   New: {}",
        revision.todo.id, revision.previous, revision.todo.description
    )
}

pub fn render_cleared(count: usize) -> String {
    if count == 0 {
        "No completed todos to clear".to_string()
    } else {
        format!("🗑️  Cleared {} completed todo(s)", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("todo").chain(args.iter().copied()))
    }

    fn request(args: &[&str]) -> Result<Request, AppError> {
        let command = parse(args).expect("Failed to parse").command.expect("no command");
        Request::try_from(command)
    }

    #[test]
    fn test_add_joins_words() {
        assert_eq!(
            request(&["add", "Write", "the", "docs"]).unwrap(),
            Request::Add("Write the docs".to_string())
        );
    }

    #[test]
    fn test_add_accepts_hyphen_words() {
        assert_eq!(
            request(&["add", "fix", "-v", "flag"]).unwrap(),
            Request::Add("fix -v flag".to_string())
        );
    }

    #[test]
    fn test_add_requires_description() {
        assert!(parse(&["add"]).is_err());
        assert!(matches!(request(&["add", " "]), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_list_flags() {
        assert_eq!(request(&["list"]).unwrap(), Request::List { all: false });
        assert_eq!(request(&["list", "--all"]).unwrap(), Request::List { all: true });
        assert_eq!(request(&["list", "-a"]).unwrap(), Request::List { all: true });
    }

    #[test]
    fn test_id_must_be_a_number() {
        assert_eq!(request(&["complete", "3"]).unwrap(), Request::Complete(3));
        assert_eq!(request(&["delete", "12"]).unwrap(), Request::Delete(12));
        assert!(parse(&["complete", "three"]).is_err());
        assert!(parse(&["update", "x", "text"]).is_err());
    }

    #[test]
    fn test_negative_id_is_not_found() {
        for args in [
            &["complete", "-1"][..],
            &["delete", "-1"][..],
            &["update", "-1", "text"][..],
        ] {
            let err = request(args).unwrap_err();
            assert!(matches!(err, AppError::UnknownId(-1)));
            assert_eq!(err.to_string(), "Todo #-1 not found");
            assert_eq!(err.status(), 1);
        }
    }

    #[test]
    fn test_update_takes_id_then_description() {
        assert_eq!(
            request(&["update", "3", "Write", "better", "docs"]).unwrap(),
            Request::Update(3, "Write better docs".to_string())
        );
        assert!(parse(&["update", "3"]).is_err());
    }

    #[test]
    fn test_no_command_and_unknown_command() {
        assert!(parse(&[]).unwrap().command.is_none());
        assert!(parse(&["frobnicate"]).is_err());
    }

    #[test]
    fn test_global_file_flag() {
        let cli = parse(&["--file", "/tmp/t.json", "clear"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/t.json")));

        let cli = parse(&["list", "--file", "/tmp/t.json"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/t.json")));
    }

    #[test]
    fn test_file_flag_after_description_is_text() {
        let cli = parse(&["add", "Buy", "milk", "--file", "x"]).unwrap();
        assert_eq!(cli.file, None);
        assert_eq!(
            Request::try_from(cli.command.unwrap()).unwrap(),
            Request::Add("Buy milk --file x".to_string())
        );

        let cli = parse(&["--file", "x", "update", "2", "new", "text"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("x")));
    }

    #[test]
    fn test_render_list_messages() {
        assert_eq!(
            render_list(true, &[]),
            "No todos found. Add one with: add <description>"
        );
        assert_eq!(render_list(false, &[]), "No pending todos! 🎉");
    }

    #[test]
    fn test_render_list_table() {
        let pending = Todo::new(1, "Write docs");
        let mut done = Todo::new(12, "Ship it");
        done.completed = true;

        let out = render_list(false, &[&pending, &done]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID     Status       Description");
        assert_eq!(lines[1], "-".repeat(60));
        assert_eq!(lines[2], "#1     ○ Pending    Write docs");
        assert_eq!(lines[3], "#12    ✓ Completed  Ship it");
    }

    #[test]
    fn test_render_messages() {
        assert_eq!(render_cleared(0), "No completed todos to clear");
        assert_eq!(render_cleared(2), "🗑️  Cleared 2 completed todo(s)");

        let revision = Revision {
            previous: "A".to_string(),
            todo: Todo::new(1, "A revised"),
        };
        assert_eq!(
            render_revision(&revision),
            "✏️  Updated todo #1\n   Old: A\n   New: A revised"
        );

        let todo = Todo::new(4, "Done");
        assert_eq!(
            render_completion(&Completion::AlreadyCompleted(todo.clone())),
            "Todo #4 is already completed"
        );
        assert_eq!(
            render_completion(&Completion::Completed(todo)),
            "✅ Completed todo #4: Done"
        );
    }
}
