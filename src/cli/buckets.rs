use comfy_table::{Cell, Table};

use crate::buckets::{BucketRegistry, JsonBucketStore};
use crate::cli::prompt::define_buckets;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::Settings;

pub fn add(settings: &Settings) -> Result<()> {
    let store = JsonBucketStore::new(settings.bucket_list_path());
    let (mut registry, _) = BucketRegistry::load_or_default(&store);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let added = define_buckets(&mut registry, &mut stdin.lock(), &mut stdout.lock())?;
    registry.save(&store)?;
    println!("Added {added} bucket(s). Buckets saved to {}", store.path().display());
    Ok(())
}

pub fn list(settings: &Settings) -> Result<()> {
    let store = JsonBucketStore::new(settings.bucket_list_path());
    let (registry, found) = BucketRegistry::load_or_default(&store);
    if !found || registry.is_empty() {
        println!("No buckets found. Run `bucketeer buckets add` to define some.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Description", "Balance", "Rules"]);
    for (i, bucket) in registry.buckets().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i),
            Cell::new(&bucket.name),
            Cell::new(&bucket.description),
            Cell::new(money(bucket.balance)),
            Cell::new(bucket.transaction_rules.join("\n")),
        ]);
    }
    println!("Buckets\n{table}");
    Ok(())
}
