use crate::accounts::AccountNames;
use crate::buckets::{BucketRegistry, JsonBucketStore};
use crate::error::{BucketError, Result};
use crate::importer::{flatten, load_statements};
use crate::matcher::compute_matches;
use crate::settings::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    println!("Data dir:      {}", settings.data_dir);
    println!("Import dir:    {}", settings.statements_path().display());

    let statements = load_statements(&settings.statements_path())?;
    if statements.is_empty() {
        return Err(BucketError::NoStatements);
    }
    let statement_count = statements.len();
    let (accounts, transactions) = flatten(statements);
    let (names, _) = AccountNames::load_or_default(&settings.account_name_map_path());
    let unnamed = accounts
        .iter()
        .filter(|a| names.get(a.account_num).is_none())
        .count();

    let store = JsonBucketStore::new(settings.bucket_list_path());
    let (registry, _) = BucketRegistry::load_or_default(&store);
    let rules: usize = registry
        .buckets()
        .iter()
        .map(|b| b.transaction_rules.len())
        .sum();

    let outcome = compute_matches(&transactions, registry.buckets());
    let tally = outcome.index.tally();

    println!();
    println!("Statements:    {statement_count}");
    println!("Unnamed accts: {unnamed}");
    println!("Transactions:  {}", transactions.len());
    println!("Buckets:       {}", registry.len());
    println!("Rules:         {rules}");
    println!();
    println!("Names:         {}", outcome.index.len());
    println!("  Matched:     {}", tally.matched);
    println!("  Unmatched:   {}", tally.unmatched);
    println!("  Conflicted:  {}", tally.conflicted);
    Ok(())
}
