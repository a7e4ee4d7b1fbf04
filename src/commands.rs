use crate::models::{Category, StatusKind};
use crate::types::DashboardError;

/// A line typed by the user on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    SelectCategory(Category),
    StatusFilter(Option<StatusKind>),
    NodeFilter(Option<String>),
    Reload,
    List,
    Quit,
}

pub const HELP: &str = "commands: cat <name> | status <success|warning|danger|info|other|any> | node [substring] | list | reload | quit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<UserCommand>, DashboardError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "cat" | "category" => {
            if rest.is_empty() {
                return Err(DashboardError::InvalidCommand(
                    "`cat` needs a category name".to_string(),
                ));
            }
            UserCommand::SelectCategory(rest.to_string())
        }
        "status" => match rest {
            "" | "any" => UserCommand::StatusFilter(None),
            name => UserCommand::StatusFilter(Some(name.parse()?)),
        },
        "node" => UserCommand::NodeFilter(Some(rest.to_string()).filter(|node| !node.is_empty())),
        "reload" => UserCommand::Reload,
        "list" | "ls" => UserCommand::List,
        "quit" | "exit" | "q" => UserCommand::Quit,
        other => {
            return Err(DashboardError::InvalidCommand(format!(
                "unknown command `{other}`"
            )))
        }
    };
    Ok(Some(command))
}
