use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{BucketError, Result};
use crate::models::Bucket;

/// Where the bucket list is kept between runs.
pub trait BucketStore {
    fn load(&self) -> Result<Vec<Bucket>>;
    fn save(&self, buckets: &[Bucket]) -> Result<()>;
}

/// Bucket list stored as a JSON array.
pub struct JsonBucketStore {
    path: PathBuf,
}

impl JsonBucketStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BucketStore for JsonBucketStore {
    fn load(&self) -> Result<Vec<Bucket>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, buckets: &[Bucket]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(buckets)?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        tracing::debug!(path = %self.path.display(), count = buckets.len(), "saved buckets");
        Ok(())
    }
}

/// The ordered bucket list. Position in the list is the bucket's index in
/// the editor menu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketRegistry {
    buckets: Vec<Bucket>,
}

impl BucketRegistry {
    pub fn new(buckets: Vec<Bucket>) -> Self {
        Self { buckets }
    }

    /// Load from the store, falling back to an empty registry when the file
    /// is missing or unreadable.
    pub fn load_or_default(store: &impl BucketStore) -> (Self, bool) {
        match store.load() {
            Ok(buckets) => (Self::new(buckets), true),
            Err(e) => {
                tracing::warn!(error = %e, "bucket list unavailable, starting empty");
                (Self::default(), false)
            }
        }
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn buckets_mut(&mut self) -> &mut [Bucket] {
        &mut self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bucket> {
        self.buckets.get(index)
    }

    pub fn add_bucket(&mut self, bucket: Bucket) -> Result<()> {
        if self.buckets.iter().any(|b| b.name == bucket.name) {
            return Err(BucketError::DuplicateBucket(bucket.name));
        }
        self.buckets.push(bucket);
        Ok(())
    }

    /// Append `rule` to the bucket at `index`. Returns false when there is no
    /// such bucket.
    pub fn add_rule(&mut self, index: usize, rule: &str) -> bool {
        match self.buckets.get_mut(index) {
            Some(bucket) => {
                bucket.transaction_rules.push(rule.to_string());
                true
            }
            None => false,
        }
    }

    /// Remove the first rule equal to `rule` from the bucket at `index`.
    /// Returns false when the bucket or the rule does not exist.
    pub fn remove_rule(&mut self, index: usize, rule: &str) -> bool {
        let Some(bucket) = self.buckets.get_mut(index) else {
            return false;
        };
        match bucket.transaction_rules.iter().position(|r| r == rule) {
            Some(pos) => {
                bucket.transaction_rules.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn save(&self, store: &impl BucketStore) -> Result<()> {
        store.save(&self.buckets)
    }
}

/// Parse a user-entered starting balance such as `1200`, `-35.50` or
/// `$1,200.00`.
pub fn parse_balance(raw: &str) -> Result<Decimal> {
    let s = raw.trim().replace(',', "").replace('$', "");
    Ok(Decimal::from_str(&s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(name: &str, rules: &[&str]) -> Bucket {
        let mut b = Bucket::new(name, &format!("{name} spending"), Decimal::new(1050, 2));
        b.transaction_rules = rules.iter().map(|r| r.to_string()).collect();
        b
    }

    #[test]
    fn test_roundtrip_preserves_order_and_rules() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonBucketStore::new(dir.path().join("storage").join("bucket_list.json"));
        let registry = BucketRegistry::new(vec![
            bucket("rent", &["LANDLORD", "PROPERTY MGMT"]),
            bucket("groceries", &["WHOLE FOODS", "TRADER JOE", "SAFEWAY #"]),
            bucket("savings", &[]),
        ]);
        registry.save(&store).unwrap();
        let (loaded, found) = BucketRegistry::load_or_default(&store);
        assert!(found);
        assert_eq!(loaded, registry);
    }

    #[test]
    fn test_missing_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonBucketStore::new(dir.path().join("nope.json"));
        let (registry, found) = BucketRegistry::load_or_default(&store);
        assert!(!found);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bucket_list.json");
        std::fs::write(&path, "{not json").unwrap();
        let (registry, found) = BucketRegistry::load_or_default(&JsonBucketStore::new(path));
        assert!(!found);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_loads_float_balances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bucket_list.json");
        std::fs::write(
            &path,
            r#"[{"name": "fun", "description": "", "balance": 25.5, "transaction_rules": ["STEAM"]}]"#,
        )
        .unwrap();
        let buckets = JsonBucketStore::new(path).load().unwrap();
        assert_eq!(buckets[0].balance, Decimal::new(255, 1));
        assert_eq!(buckets[0].transaction_rules, vec!["STEAM".to_string()]);
    }

    #[test]
    fn test_remove_rule_absent_is_noop() {
        let mut registry = BucketRegistry::new(vec![bucket("rent", &["LANDLORD"])]);
        let before = registry.clone();
        assert!(!registry.remove_rule(0, "MORTGAGE"));
        assert_eq!(registry, before);
    }

    #[test]
    fn test_remove_rule_removes_first_occurrence() {
        let mut registry = BucketRegistry::new(vec![bucket("rent", &["A", "B", "A"])]);
        assert!(registry.remove_rule(0, "A"));
        assert_eq!(registry.get(0).unwrap().transaction_rules, vec!["B", "A"]);
    }

    #[test]
    fn test_rule_edits_out_of_range() {
        let mut registry = BucketRegistry::new(vec![bucket("rent", &[])]);
        assert!(!registry.add_rule(3, "X"));
        assert!(!registry.remove_rule(3, "X"));
        assert!(registry.add_rule(0, "X"));
        assert_eq!(registry.get(0).unwrap().transaction_rules, vec!["X"]);
    }

    #[test]
    fn test_duplicate_bucket_rejected() {
        let mut registry = BucketRegistry::new(vec![bucket("rent", &[])]);
        let err = registry.add_bucket(bucket("rent", &[])).unwrap_err();
        assert!(matches!(err, BucketError::DuplicateBucket(name) if name == "rent"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_parse_balance() {
        assert_eq!(parse_balance("1200").unwrap(), Decimal::new(1200, 0));
        assert_eq!(parse_balance(" -35.50 ").unwrap(), Decimal::new(-3550, 2));
        assert_eq!(parse_balance("$1,200.00").unwrap(), Decimal::new(120000, 2));
        assert!(parse_balance("lots").is_err());
        assert!(parse_balance("").is_err());
    }
}
