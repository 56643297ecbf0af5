//! Interactive rule editor.
//!
//! The session is a small state machine: it renders the classified
//! transaction names and the bucket menu, waits for one command line,
//! dispatches it, and either loops back to rendering or terminates. Input and
//! output are generic so the whole loop can be driven from a script.

use std::io::{BufRead, Write};

use colored::{ColoredString, Colorize};
use thiserror::Error;

use crate::buckets::{BucketRegistry, BucketStore};
use crate::error::Result;
use crate::matcher::{apply_rule_change, MatchIndex, MatchStatus, RuleChange};

const NAME_WIDTH: usize = 34;
const BUCKET_WIDTH: usize = 15;
const BUCKETS_PER_ROW: usize = 6;
const UNRESOLVED_SHOWN: usize = 10;
pub const DEFAULT_COLUMNS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Find(String),
    AddRule { bucket: usize, rule: String },
    RemoveRule { bucket: usize, rule: String },
    Save,
    Done,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid command.")]
    Invalid,

    #[error("Invalid command: expected `{0} ADD <rule>` or `{0} RM <rule>`.")]
    BadRuleCommand(usize),

    #[error("No bucket at index {index} ({count} buckets defined).")]
    NoSuchBucket { index: usize, count: usize },
}

/// How many name columns fit in a terminal `width` characters wide.
pub fn columns_for_width(width: usize) -> usize {
    ((width + 3) / (NAME_WIDTH + 3)).max(1)
}

/// Text after the first `skip` whitespace-separated tokens, trimmed.
fn rest_after(line: &str, skip: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..skip {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest.trim_end()
}

pub fn parse_command(line: &str) -> std::result::Result<Command, CommandError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return Err(CommandError::Invalid);
    };

    match first {
        "FIND" => Ok(Command::Find(rest_after(line, 1).to_string())),
        "SAVE" if tokens.len() == 1 => Ok(Command::Save),
        "DONE" if tokens.len() == 1 => Ok(Command::Done),
        _ if first.chars().all(|c| c.is_ascii_digit()) => {
            let bucket: usize = first.parse().map_err(|_| CommandError::Invalid)?;
            if tokens.len() < 3 {
                return Err(CommandError::BadRuleCommand(bucket));
            }
            let rule = rest_after(line, 2).to_string();
            match tokens[1] {
                "ADD" => Ok(Command::AddRule { bucket, rule }),
                "RM" => Ok(Command::RemoveRule { bucket, rule }),
                _ => Err(CommandError::BadRuleCommand(bucket)),
            }
        }
        _ => Err(CommandError::Invalid),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// `DONE` with every transaction matched exactly once.
    Done,
    /// Input closed before `DONE` succeeded.
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Rendering,
    AwaitingCommand,
    Dispatching(Command),
    Terminating(Exit),
}

fn paint(name: &str, status: MatchStatus) -> ColoredString {
    match status {
        MatchStatus::Unmatched => name.yellow(),
        MatchStatus::Matched => name.green(),
        MatchStatus::Conflict => name.red(),
    }
}

pub struct Session<'a, S: BucketStore> {
    registry: BucketRegistry,
    index: MatchIndex,
    store: &'a S,
    filter: String,
    columns: usize,
}

impl<'a, S: BucketStore> Session<'a, S> {
    pub fn new(registry: BucketRegistry, index: MatchIndex, store: &'a S) -> Self {
        Self {
            registry,
            index,
            store,
            filter: String::new(),
            columns: DEFAULT_COLUMNS,
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    #[allow(dead_code)]
    pub fn registry(&self) -> &BucketRegistry {
        &self.registry
    }

    pub fn index(&self) -> &MatchIndex {
        &self.index
    }

    pub fn into_registry(self) -> BucketRegistry {
        self.registry
    }

    /// Transaction names containing the current filter, sorted.
    pub fn visible_names(&self) -> Vec<&str> {
        self.index
            .iter()
            .map(|(name, _)| name)
            .filter(|name| name.contains(self.filter.as_str()))
            .collect()
    }

    /// Drive the loop until it terminates, then persist the buckets.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<Exit> {
        let mut state = EditorState::Rendering;
        let exit = loop {
            if let EditorState::Terminating(exit) = state {
                break exit;
            }
            state = self.step(state, input, out)?;
        };
        self.registry.save(self.store)?;
        writeln!(out, "Bucket rules saved to storage dir.")?;
        tracing::info!(?exit, "rule editor finished");
        Ok(exit)
    }

    pub fn step<R: BufRead, W: Write>(
        &mut self,
        state: EditorState,
        input: &mut R,
        out: &mut W,
    ) -> Result<EditorState> {
        let next = match state {
            EditorState::Rendering => {
                self.render(out)?;
                EditorState::AwaitingCommand
            }
            EditorState::AwaitingCommand => {
                write!(out, "What do you think? ")?;
                out.flush()?;
                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    writeln!(out)?;
                    EditorState::Terminating(Exit::EndOfInput)
                } else {
                    match parse_command(&line) {
                        Ok(command) => EditorState::Dispatching(command),
                        Err(e) => {
                            writeln!(out, "{}", e.to_string().red())?;
                            EditorState::Rendering
                        }
                    }
                }
            }
            EditorState::Dispatching(command) => self.dispatch(command, out)?,
            EditorState::Terminating(exit) => EditorState::Terminating(exit),
        };
        Ok(next)
    }

    fn bucket_name(&self, index: usize) -> std::result::Result<String, CommandError> {
        self.registry
            .get(index)
            .map(|b| b.name.clone())
            .ok_or(CommandError::NoSuchBucket {
                index,
                count: self.registry.len(),
            })
    }

    fn dispatch<W: Write>(&mut self, command: Command, out: &mut W) -> Result<EditorState> {
        tracing::debug!(?command, "dispatching");
        match command {
            Command::Find(filter) => {
                self.filter = filter;
            }
            Command::AddRule { bucket, rule } => {
                let name = match self.bucket_name(bucket) {
                    Ok(name) => name,
                    Err(e) => {
                        writeln!(out, "{}", e.to_string().red())?;
                        return Ok(EditorState::Rendering);
                    }
                };
                self.registry.add_rule(bucket, &rule);
                let touched = apply_rule_change(&mut self.index, &rule, bucket, RuleChange::Add);
                writeln!(out, "Added rule '{rule}' to {name} ({touched} matching names).")?;
            }
            Command::RemoveRule { bucket, rule } => {
                let name = match self.bucket_name(bucket) {
                    Ok(name) => name,
                    Err(e) => {
                        writeln!(out, "{}", e.to_string().red())?;
                        return Ok(EditorState::Rendering);
                    }
                };
                if self.registry.remove_rule(bucket, &rule) {
                    apply_rule_change(&mut self.index, &rule, bucket, RuleChange::Remove);
                    writeln!(out, "Removed rule '{rule}' from {name}.")?;
                }
            }
            Command::Save => match self.registry.save(self.store) {
                Ok(()) => writeln!(out, "Bucket rules saved to storage dir.")?,
                Err(e) => {
                    tracing::error!(error = %e, "saving buckets failed");
                    writeln!(out, "{}", format!("Could not save buckets: {e}").red())?;
                }
            },
            Command::Done => {
                let unresolved = self.index.unresolved();
                if unresolved.is_empty() {
                    return Ok(EditorState::Terminating(Exit::Done));
                }
                writeln!(
                    out,
                    "{}",
                    format!(
                        "Not all transactions are properly matched ({} left).",
                        unresolved.len()
                    )
                    .yellow()
                )?;
                let buckets = self.registry.buckets();
                for (name, count) in unresolved.iter().take(UNRESOLVED_SHOWN) {
                    let detail = match self.index.assigned_bucket(name, buckets) {
                        Some(last) if *count > 1 => format!("{count} matches, last in {last}"),
                        _ => "no bucket".to_string(),
                    };
                    writeln!(out, "  {name} ({detail})")?;
                }
                if unresolved.len() > UNRESOLVED_SHOWN {
                    writeln!(out, "  ... and {} more", unresolved.len() - UNRESOLVED_SHOWN)?;
                }
            }
        }
        Ok(EditorState::Rendering)
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut column = 0usize;
        for name in self.visible_names() {
            let status = self
                .index
                .get(name)
                .map(|e| e.status())
                .unwrap_or(MatchStatus::Unmatched);
            let pad = NAME_WIDTH.saturating_sub(name.chars().count());
            write!(out, "{}{}", paint(name, status), " ".repeat(pad))?;
            column += 1;
            if column == self.columns {
                writeln!(out)?;
                column = 0;
            } else {
                write!(out, "   ")?;
            }
        }
        writeln!(out)?;
        writeln!(out)?;

        for (i, bucket) in self.registry.buckets().iter().enumerate() {
            let label = format!("{i}: {}", bucket.name);
            let pad = BUCKET_WIDTH.saturating_sub(label.chars().count());
            write!(out, "{label}{}  ", " ".repeat(pad))?;
            if (i + 1) % BUCKETS_PER_ROW == 0 {
                writeln!(out)?;
            }
        }
        writeln!(out)?;
        writeln!(out)?;

        writeln!(
            out,
            "{} means already in a bucket, {} means not in a bucket, {} means in multiple buckets.",
            "Green".green(),
            "Yellow".yellow(),
            "Red".red()
        )?;
        if !self.filter.is_empty() {
            writeln!(out, "Showing names containing '{}'.", self.filter)?;
        }
        writeln!(out, "Available commands:")?;
        writeln!(
            out,
            "bucket_# ADD bucket_rule | bucket_# RM bucket_rule | FIND tentative_bucket_rule | SAVE | DONE"
        )?;
        Ok(())
    }
}
