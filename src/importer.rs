use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Account, Statement, Transaction};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return Decimal::from_str(inner.trim()).ok().map(|d| -d);
    }
    Decimal::from_str(s).ok()
}

/// Posting year from `YYYY-MM-DD`, `MM/DD/YYYY` or an OFX-style
/// `YYYYMMDD[HHMMSS...]` stamp.
pub fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.year());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Some(d.year());
    }
    let stamp = raw.get(..8)?;
    if !stamp.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok().map(|d| d.year())
}

// ---------------------------------------------------------------------------
// Flat statement export
// ---------------------------------------------------------------------------

/// One row of a flat statement export. Account columns repeat on every row.
#[derive(Debug, Deserialize)]
struct ExportRow {
    account_type: String,
    account_num: String,
    #[serde(default)]
    balance: String,
    #[serde(rename = "type", default)]
    txn_type: String,
    posted: String,
    amount: String,
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    memo: String,
}

fn row_to_parts(row: ExportRow) -> Option<(Account, Transaction)> {
    let account_num = row.account_num.trim().parse::<u64>().ok()?;
    let amount = parse_amount(&row.amount)?;
    let datetime = parse_year(&row.posted)?;
    let name = row.name.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let account = Account {
        account_type: row.account_type.trim().to_string(),
        account_num,
        balance: parse_amount(&row.balance).unwrap_or_default(),
    };
    let transaction = Transaction {
        id: row.id.trim().to_string(),
        name,
        memo: row.memo.trim().to_string(),
        amount,
        datetime,
        txn_type: row.txn_type.trim().to_string(),
    };
    Some((account, transaction))
}

/// Parse one export file into statements, one per account number in the
/// order accounts first appear.
pub fn parse_statement_file(file_path: &Path) -> Result<Vec<Statement>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(file_path)?;
    let mut statements: Vec<Statement> = Vec::new();

    for (line, result) in rdr.deserialize::<ExportRow>().enumerate() {
        let Some((account, transaction)) = result.ok().and_then(row_to_parts) else {
            tracing::warn!(file = %file_path.display(), line = line + 2, "skipping malformed row");
            continue;
        };
        match statements
            .iter_mut()
            .find(|s| s.account.account_num == account.account_num)
        {
            Some(statement) => statement.transactions.push(transaction),
            None => statements.push(Statement {
                account,
                transactions: vec![transaction],
            }),
        }
    }
    Ok(statements)
}

fn export_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Every statement found in `dir`, files taken in path order. A missing
/// directory yields no statements.
pub fn load_statements(dir: &Path) -> Result<Vec<Statement>> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "statements directory not found");
        return Ok(Vec::new());
    }
    let mut statements = Vec::new();
    for file in export_files(dir)? {
        let parsed = parse_statement_file(&file)?;
        tracing::info!(file = %file.display(), statements = parsed.len(), "imported statement file");
        statements.extend(parsed);
    }
    Ok(statements)
}

/// Split statements into the account list and one flat transaction list.
pub fn flatten(statements: Vec<Statement>) -> (Vec<Account>, Vec<Transaction>) {
    let mut accounts = Vec::with_capacity(statements.len());
    let mut transactions = Vec::new();
    for statement in statements {
        accounts.push(statement.account);
        transactions.extend(statement.transactions);
    }
    (accounts, transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "account_type,account_num,balance,type,posted,amount,id,name,memo\n";

    fn write_export(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut content = HEADER.to_string();
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("-52.10"), Some(Decimal::new(-5210, 2)));
        assert_eq!(parse_amount("$9.99"), Some(Decimal::new(999, 2)));
        assert_eq!(parse_amount("(1,500.00)"), Some(Decimal::new(-150000, 2)));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2024-03-15"), Some(2024));
        assert_eq!(parse_year("03/15/2023"), Some(2023));
        assert_eq!(parse_year("20220115120000.000[-5:EST]"), Some(2022));
        assert_eq!(parse_year("20221315"), None);
        assert_eq!(parse_year("yesterday"), None);
    }

    #[test]
    fn test_groups_rows_by_account() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(
            dir.path(),
            "march.csv",
            &[
                "CHECKING,1234,1000.00,DEBIT,2024-03-01,-52.10,F1,WHOLE FOODS #4012,WHOLE FOODS #4012 groceries",
                "CREDITLINE,9876,-250.00,DEBIT,2024-03-02,-9.99,F2,UNKNOWN MERCHANT,",
                "CHECKING,1234,1000.00,DEBIT,2024-03-03,-1500.00,F3,LANDLORD CO,rent",
            ],
        );
        let statements = parse_statement_file(&path).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].account.account_num, 1234);
        assert_eq!(statements[0].account.balance, Decimal::new(100000, 2));
        assert_eq!(statements[0].transactions.len(), 2);
        assert_eq!(statements[0].transactions[1].name, "LANDLORD CO");
        assert_eq!(statements[0].transactions[0].memo, "WHOLE FOODS #4012 groceries");
        assert_eq!(statements[1].account.account_type, "CREDITLINE");
        assert_eq!(statements[1].transactions[0].datetime, 2024);
    }

    #[test]
    fn test_skips_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(
            dir.path(),
            "bad.csv",
            &[
                "CHECKING,notanumber,0,DEBIT,2024-03-01,-1.00,F1,A,",
                "CHECKING,1234,0,DEBIT,someday,-1.00,F2,B,",
                "CHECKING,1234,0,DEBIT,2024-03-01,lots,F3,C,",
                "CHECKING,1234,0,DEBIT,2024-03-01,-1.00,F4,,",
                "CHECKING,1234,0,DEBIT,2024-03-01,-4.00,F5,GOOD ROW,",
            ],
        );
        let statements = parse_statement_file(&path).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].transactions.len(), 1);
        assert_eq!(statements[0].transactions[0].name, "GOOD ROW");
    }

    #[test]
    fn test_load_statements_reads_csv_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_export(dir.path(), "b.csv", &["SAVINGS,2,0,CREDIT,2024-01-01,5.00,X,INTEREST,"]);
        write_export(dir.path(), "a.CSV", &["CHECKING,1,0,DEBIT,2024-01-01,-5.00,Y,FEE,"]);
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let statements = load_statements(dir.path()).unwrap();
        let nums: Vec<u64> = statements.iter().map(|s| s.account.account_num).collect();
        assert_eq!(nums, vec![1, 2]);

        let (accounts, transactions) = flatten(statements);
        assert_eq!(accounts.len(), 2);
        let names: Vec<&str> = transactions.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["FEE", "INTEREST"]);
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let statements = load_statements(&dir.path().join("statements")).unwrap();
        assert!(statements.is_empty());
    }
}
