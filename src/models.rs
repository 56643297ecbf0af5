use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub account_type: String,
    pub account_num: u64,
    pub balance: Decimal,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Institution-assigned id. Not unique across institutions.
    pub id: String,
    pub name: String,
    pub memo: String,
    pub amount: Decimal,
    /// Posting year.
    pub datetime: i32,
    pub txn_type: String,
}

/// One account's transaction history from an import batch.
#[derive(Debug, Clone)]
pub struct Statement {
    pub account: Account,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub transaction_rules: Vec<String>,
}

impl Bucket {
    pub fn new(name: &str, description: &str, balance: Decimal) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            balance,
            transaction_rules: Vec::new(),
        }
    }

    /// True when any of this bucket's rules is a substring of `name`.
    pub fn claims(&self, name: &str) -> bool {
        self.transaction_rules.iter().any(|rule| name.contains(rule.as_str()))
    }
}
