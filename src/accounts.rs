use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Account;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountName {
    pub account_num: u64,
    pub account_name: String,
}

/// Account number to display name, in the order names were given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountNames {
    entries: Vec<AccountName>,
}

impl AccountNames {
    pub fn load(path: &Path) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path)?;
        let entries = rdr
            .deserialize()
            .collect::<std::result::Result<Vec<AccountName>, _>>()?;
        Ok(Self { entries })
    }

    /// Load the map, starting empty when the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> (Self, bool) {
        match Self::load(path) {
            Ok(names) => (names, true),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "account names unavailable, starting empty");
                (Self::default(), false)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(path)?;
        for entry in &self.entries {
            wtr.serialize(entry)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn get(&self, account_num: u64) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.account_num == account_num)
            .map(|e| e.account_name.as_str())
    }

    pub fn insert(&mut self, account_num: u64, account_name: &str) {
        match self.entries.iter_mut().find(|e| e.account_num == account_num) {
            Some(entry) => entry.account_name = account_name.to_string(),
            None => self.entries.push(AccountName {
                account_num,
                account_name: account_name.to_string(),
            }),
        }
    }

    pub fn entries(&self) -> &[AccountName] {
        &self.entries
    }

    /// Ask `prompt` for a name for every account not yet in the map.
    /// Returns how many names were added.
    pub fn name_new_accounts<F>(&mut self, accounts: &[Account], mut prompt: F) -> Result<usize>
    where
        F: FnMut(&Account) -> Result<String>,
    {
        let mut added = 0usize;
        for account in accounts {
            if self.get(account.account_num).is_some() {
                continue;
            }
            let name = prompt(account)?;
            self.insert(account.account_num, name.trim());
            added += 1;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn account(num: u64) -> Account {
        Account {
            account_type: "CHECKING".to_string(),
            account_num: num,
            balance: Decimal::ZERO,
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage").join("account_name_map.csv");
        let mut names = AccountNames::default();
        names.insert(1234, "Checking");
        names.insert(98765, "Visa, rewards");
        names.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("account_num,account_name\n"));

        let loaded = AccountNames::load(&path).unwrap();
        assert_eq!(loaded, names);
        assert_eq!(loaded.get(98765), Some("Visa, rewards"));
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (names, found) = AccountNames::load_or_default(&dir.path().join("missing.csv"));
        assert!(!found);
        assert!(names.entries().is_empty());
    }

    #[test]
    fn test_prompts_only_for_unknown_accounts() {
        let mut names = AccountNames::default();
        names.insert(1, "Checking");
        let mut asked = Vec::new();
        let added = names
            .name_new_accounts(&[account(1), account(2), account(3)], |a| {
                asked.push(a.account_num);
                Ok(format!(" acct {} ", a.account_num))
            })
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(asked, vec![2, 3]);
        assert_eq!(names.get(2), Some("acct 2"));
        assert_eq!(names.entries().len(), 3);
    }

    #[test]
    fn test_same_account_twice_prompts_once() {
        let mut names = AccountNames::default();
        let mut calls = 0;
        names
            .name_new_accounts(&[account(7), account(7)], |_| {
                calls += 1;
                Ok("Savings".to_string())
            })
            .unwrap();
        assert_eq!(calls, 1);
    }
}
