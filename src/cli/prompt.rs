use std::io::{BufRead, Write};

use crate::buckets::{parse_balance, BucketRegistry};
use crate::error::{BucketError, Result};
use crate::models::Bucket;

/// Print `prompt` and read one trimmed line. `None` means input is closed.
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<bool> {
    let answer = ask(input, out, prompt)?;
    Ok(matches!(answer.as_deref(), Some("y") | Some("Y") | Some("yes")))
}

/// Prompt for new buckets until the user types `done` at any field or input
/// ends. Returns how many buckets were added.
pub fn define_buckets<R: BufRead, W: Write>(
    registry: &mut BucketRegistry,
    input: &mut R,
    out: &mut W,
) -> Result<usize> {
    writeln!(out, "Enter 'done' to exit:")?;
    let mut added = 0usize;
    loop {
        let Some(name) = ask(input, out, "\tNew bucket name: ")? else { break };
        if name == "done" {
            break;
        }
        if name.is_empty() {
            writeln!(out, "\t\tBucket name cannot be empty.")?;
            continue;
        }
        let Some(description) = ask(input, out, "\tNew bucket description: ")? else { break };
        if description == "done" {
            break;
        }
        let Some(raw_balance) = ask(input, out, "\tBucket initial balance: ")? else { break };
        if raw_balance == "done" {
            break;
        }
        let balance = match parse_balance(&raw_balance) {
            Ok(b) => b,
            Err(_) => {
                writeln!(out, "\t\tNot a decimal amount, please try again.")?;
                continue;
            }
        };
        match registry.add_bucket(Bucket::new(&name, &description, balance)) {
            Ok(()) => {
                added += 1;
                writeln!(out, "\tBucket Saved.")?;
            }
            Err(BucketError::DuplicateBucket(name)) => {
                writeln!(out, "\t\tA bucket named '{name}' already exists.")?;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(added)
}
