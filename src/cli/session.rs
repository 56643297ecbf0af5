use std::io::{BufRead, Write};

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::accounts::AccountNames;
use crate::aggregator::aggregate_balances;
use crate::buckets::{BucketRegistry, JsonBucketStore};
use crate::cli::prompt::{ask, confirm, define_buckets};
use crate::editor::{self, Exit, Session};
use crate::error::{BucketError, Result};
use crate::fmt::money;
use crate::importer::{flatten, load_statements};
use crate::matcher::compute_matches;
use crate::settings::Settings;

fn terminal_columns() -> usize {
    crossterm::terminal::size()
        .map(|(width, _)| editor::columns_for_width(width as usize))
        .unwrap_or(editor::DEFAULT_COLUMNS)
}

pub fn run(settings: &Settings) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with(settings, &mut stdin.lock(), &mut stdout.lock(), terminal_columns())
}

/// The whole batch-then-interactive run: import, name accounts, define
/// buckets, classify, edit rules, then total the buckets.
pub fn run_with<R: BufRead, W: Write>(
    settings: &Settings,
    input: &mut R,
    out: &mut W,
    columns: usize,
) -> Result<()> {
    let statements = load_statements(&settings.statements_path())?;
    if statements.is_empty() {
        return Err(BucketError::NoStatements);
    }
    let (accounts, transactions) = flatten(statements);
    tracing::info!(
        accounts = accounts.len(),
        transactions = transactions.len(),
        "statements imported"
    );

    // Account names
    let names_path = settings.account_name_map_path();
    let (mut names, found) = AccountNames::load_or_default(&names_path);
    if found {
        writeln!(out, "Found existing accounts.")?;
    } else {
        writeln!(out, "No existing accounts found.")?;
    }
    names.name_new_accounts(&accounts, |account| {
        let prompt = format!(
            "Name account {} ({}, balance {}): ",
            account.account_num,
            account.account_type,
            money(account.balance)
        );
        Ok(ask(input, out, &prompt)?.unwrap_or_else(|| account.account_num.to_string()))
    })?;
    names.save(&names_path)?;
    writeln!(out, "Accounts saved to storage.")?;

    // Buckets
    let store = JsonBucketStore::new(settings.bucket_list_path());
    let (mut registry, found) = BucketRegistry::load_or_default(&store);
    if found {
        writeln!(out, "Found existing buckets.")?;
    } else {
        writeln!(out, "No buckets found.")?;
    }
    writeln!(out, "You have defined the following buckets:")?;
    for (i, bucket) in registry.buckets().iter().enumerate() {
        writeln!(out, "  {i}: {}", bucket.name)?;
    }
    if confirm(input, out, "Would you like to define new buckets? [y/(n)] ")? {
        define_buckets(&mut registry, input, out)?;
    }
    registry.save(&store)?;
    writeln!(out, "Buckets saved to storage dir.")?;

    // Classification
    writeln!(out, "Matching bucket rules and transactions:")?;
    let outcome = compute_matches(&transactions, registry.buckets());
    for conflict in &outcome.conflicts {
        tracing::warn!(
            transaction = %conflict.transaction,
            previous = %conflict.previous_bucket,
            new = %conflict.new_bucket,
            "rule conflict"
        );
        writeln!(
            out,
            "\t{}",
            format!(
                "Transaction rule conflict for transaction {}: {} vs {}",
                conflict.transaction, conflict.previous_bucket, conflict.new_bucket
            )
            .yellow()
        )?;
    }

    writeln!(out, "Defining bucket rules.\n")?;
    let mut session = Session::new(registry, outcome.index, &store).with_columns(columns);
    let exit = session.run(input, out)?;
    if exit == Exit::EndOfInput {
        let left = session.index().unresolved().len();
        if left > 0 {
            let msg = format!("Input closed with {left} names not matched exactly once.");
            writeln!(out, "{}", msg.yellow())?;
        }
    }
    let mut registry = session.into_registry();

    // Balances
    writeln!(out, "Calculating bucket balances...")?;
    let totals = aggregate_balances(registry.buckets_mut(), &transactions);
    let mut table = Table::new();
    table.set_header(vec!["Bucket", "Transactions", "Change", "Balance"]);
    for total in &totals {
        table.add_row(vec![
            Cell::new(&total.name),
            Cell::new(total.transactions),
            Cell::new(money(total.added)),
            Cell::new(money(total.balance)),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}
