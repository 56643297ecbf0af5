use comfy_table::{Cell, Table};

use crate::accounts::AccountNames;
use crate::error::Result;
use crate::settings::Settings;

pub fn list(settings: &Settings) -> Result<()> {
    let (names, _) = AccountNames::load_or_default(&settings.account_name_map_path());
    if names.entries().is_empty() {
        println!("No accounts named yet. They are named on the first `bucketeer run`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Account", "Name"]);
    for entry in names.entries() {
        table.add_row(vec![
            Cell::new(entry.account_num),
            Cell::new(&entry.account_name),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
