use advisor_application::{AdvisorService, ChatSession};
use advisor_core::{CallResult, FilterKind, TurnRole};
use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;

use crate::commands::Command;
use crate::helper::CliHelper;

pub async fn run(service: AdvisorService) -> Result<()> {
    let mut session = service.start_session();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Watch Collection Advisor ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a question, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();
    print_history(&session);

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let command = Command::parse(&line);
                if !matches!(command, Command::Empty) {
                    let _ = rl.add_history_entry(line.trim());
                }

                match command {
                    Command::Empty => continue,
                    Command::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Command::Help => print_help(),
                    Command::Filters => print_filters(&session),
                    Command::Options(kind) => print_options(kind),
                    Command::Set { kind, value } => {
                        let applied = service.update_filter(&mut session, kind, &value);
                        println!("{}", format!("{}: {applied}", kind.title()).green());
                    }
                    Command::Reset => {
                        service.reset(&mut session);
                        println!("{}", "Conversation cleared.".bright_black());
                        print_history(&session);
                    }
                    Command::History => print_history(&session),
                    Command::Invalid(hint) => println!("{}", hint.yellow()),
                    Command::Message(text) => {
                        println!("{}", "Thinking...".bright_black());
                        match service.submit(&mut session, &text).await {
                            Ok(result) => print_result(&result),
                            Err(err) => eprintln!("{}", format!("Error: {err}").red()),
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}

fn print_result(result: &CallResult) {
    let text = result.display_text();
    let colored_line = |line: &str| match result {
        CallResult::Success { .. } => line.bright_blue(),
        CallResult::Blocked { .. } => line.yellow(),
        CallResult::Failure { .. } => line.red(),
    };
    for line in text.lines() {
        println!("{}", colored_line(line));
    }
    println!();
}

fn print_history(session: &ChatSession) {
    for turn in session.conversation().visible_turns() {
        match turn.role() {
            TurnRole::User => println!("{}", format!("> {}", turn.text()).green()),
            _ => {
                for line in turn.text().lines() {
                    println!("{}", line.bright_blue());
                }
            }
        }
        println!();
    }
}

fn print_filters(session: &ChatSession) {
    println!("{}", "Current filters:".bright_yellow());
    for (kind, label) in session.filters().entries() {
        println!("  {:<26} {}", kind.title(), label.cyan());
    }
}

fn print_options(kind: FilterKind) {
    println!("{}", format!("{} options:", kind.title()).bright_yellow());
    for option in kind.options() {
        println!("  - {option}");
    }
}

fn print_help() {
    let rows = [
        ("/filters", "show the current filters"),
        ("/options <filter>", "list the values a filter accepts"),
        ("/set <filter> <value>", "set a filter (label or keyword)"),
        ("/reset", "clear the conversation, keep filters"),
        ("/history", "show the conversation so far"),
        ("quit", "exit"),
    ];
    for (command, description) in rows {
        println!("  {:<24} {}", command.bright_cyan(), description);
    }
    println!(
        "{}",
        "Filters: gender, price, size, type, movement".bright_black()
    );
}
