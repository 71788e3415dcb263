use std::borrow::Cow::{self, Borrowed, Owned};

use advisor_core::FilterKind;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use strum::IntoEnumIterator;

use crate::commands::COMMANDS;

/// Rustyline helper for command and filter-name completion.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    filters: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
            filters: FilterKind::iter().map(|kind| kind.to_string()).collect(),
        }
    }

    fn pairs<'a>(candidates: impl Iterator<Item = &'a String>, prefix: &str) -> Vec<Pair> {
        candidates
            .filter(|candidate| candidate.starts_with(prefix))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate.clone(),
            })
            .collect()
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        match line.split_once(' ') {
            None => Ok((0, Self::pairs(self.commands.iter(), line))),
            // Second word of /set and /options is a filter name.
            Some((command, arg)) if matches!(command, "/set" | "/options") && !arg.contains(' ') => {
                let start = command.len() + 1;
                Ok((start, Self::pairs(self.filters.iter(), arg)))
            }
            Some(_) => Ok((0, vec![])),
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}
