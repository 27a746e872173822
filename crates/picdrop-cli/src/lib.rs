use std::path::PathBuf;

/// A line entered in an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select(PathBuf),
    Upload,
    Clear,
    Status,
    Help,
    Quit,
}

pub const SESSION_HELP: &str = "\
commands:
  select <path>   choose the image to upload (replaces the current one)
  upload          upload the selected image
  clear           drop the current selection
  status          show the selection and the last uploaded URL
  help            show this message
  quit            leave the session";

/// Parse one session line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "select" | "open" => {
            if rest.is_empty() {
                return Err("usage: select <path>".to_string());
            }
            SessionCommand::Select(PathBuf::from(rest))
        }
        "upload" | "submit" => SessionCommand::Upload,
        "clear" => SessionCommand::Clear,
        "status" => SessionCommand::Status,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };

    Ok(Some(command))
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_with_spaces_in_path() {
        assert_eq!(
            parse_command("select  ~/Pictures/my cat.jpg ").unwrap(),
            Some(SessionCommand::Select(PathBuf::from("~/Pictures/my cat.jpg")))
        );
    }

    #[test]
    fn select_requires_path() {
        assert!(parse_command("select").is_err());
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("UPLOAD").unwrap(), Some(SessionCommand::Upload));
        assert_eq!(parse_command("clear").unwrap(), Some(SessionCommand::Clear));
        assert_eq!(parse_command("status").unwrap(), Some(SessionCommand::Status));
        assert_eq!(parse_command("exit").unwrap(), Some(SessionCommand::Quit));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("rm -rf").is_err());
    }
}
