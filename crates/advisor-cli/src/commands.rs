//! REPL input parsing.

use advisor_core::FilterKind;

pub const COMMANDS: &[&str] = &["/filters", "/set", "/options", "/reset", "/history", "/help"];

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Filters,
    Options(FilterKind),
    Set { kind: FilterKind, value: String },
    Reset,
    History,
    /// Plain text for the advisor.
    Message(String),
    /// A slash command that could not be parsed; holds a usage hint.
    Invalid(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Self::Quit;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (name, args) = split_word(rest);
        match name.to_ascii_lowercase().as_str() {
            "help" => Self::Help,
            "filters" => Self::Filters,
            "reset" => Self::Reset,
            "history" => Self::History,
            "quit" | "exit" => Self::Quit,
            "options" => match args.parse::<FilterKind>() {
                Ok(kind) => Self::Options(kind),
                Err(_) => Self::Invalid(format!("usage: /options <{}>", filter_names())),
            },
            "set" => {
                let (filter, value) = split_word(args);
                match filter.parse::<FilterKind>() {
                    Ok(kind) if !value.is_empty() => Self::Set {
                        kind,
                        value: value.to_string(),
                    },
                    _ => Self::Invalid(format!("usage: /set <{}> <value>", filter_names())),
                }
            }
            other => Self::Invalid(format!("unknown command: /{other} (try /help)")),
        }
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (input, ""),
    }
}

fn filter_names() -> String {
    use strum::IntoEnumIterator;

    FilterKind::iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            Command::parse("  Which GMT under $5k? "),
            Command::Message("Which GMT under $5k?".into())
        );
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_quit_variants() {
        for input in ["quit", "EXIT", "/quit"] {
            assert_eq!(Command::parse(input), Command::Quit);
        }
    }

    #[test]
    fn test_set_keeps_multi_word_value() {
        assert_eq!(
            Command::parse("/set type GMT/Travel Time"),
            Command::Set {
                kind: FilterKind::WatchType,
                value: "GMT/Travel Time".into()
            }
        );
        assert_eq!(
            Command::parse("/set case-size small"),
            Command::Set {
                kind: FilterKind::CaseSize,
                value: "small".into()
            }
        );
    }

    #[test]
    fn test_set_without_value_is_invalid() {
        assert!(matches!(Command::parse("/set gender"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/set colour red"), Command::Invalid(_)));
    }

    #[test]
    fn test_options_and_unknown() {
        assert_eq!(
            Command::parse("/options movement"),
            Command::Options(FilterKind::Movement)
        );
        assert!(matches!(Command::parse("/nope"), Command::Invalid(_)));
    }
}
