use std::collections::BTreeMap;

use crate::models::{Bucket, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Unmatched,
    Matched,
    Conflict,
}

/// Match state of one distinct transaction name.
///
/// `bucket_hits` tallies matching rules per bucket position, so the assigned
/// bucket can be maintained incrementally: it is always the highest position
/// with a nonzero tally, which is the last matching bucket in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchEntry {
    pub match_count: usize,
    bucket_hits: BTreeMap<usize, usize>,
}

impl MatchEntry {
    pub fn assigned_bucket(&self) -> Option<usize> {
        self.bucket_hits.keys().next_back().copied()
    }

    pub fn status(&self) -> MatchStatus {
        match self.match_count {
            0 => MatchStatus::Unmatched,
            1 => MatchStatus::Matched,
            _ => MatchStatus::Conflict,
        }
    }

    fn hit(&mut self, bucket: usize) {
        self.match_count += 1;
        *self.bucket_hits.entry(bucket).or_insert(0) += 1;
    }

    fn unhit(&mut self, bucket: usize) {
        self.match_count = self.match_count.saturating_sub(1);
        if let Some(hits) = self.bucket_hits.get_mut(&bucket) {
            *hits -= 1;
            if *hits == 0 {
                self.bucket_hits.remove(&bucket);
            }
        }
    }
}

/// A transaction name claimed by more than one (bucket, rule) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub transaction: String,
    pub previous_bucket: String,
    pub new_bucket: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleChange {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub unmatched: usize,
    pub matched: usize,
    pub conflicted: usize,
}

/// Match counts keyed by distinct transaction name, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchIndex {
    entries: BTreeMap<String, MatchEntry>,
}

impl MatchIndex {
    fn from_transactions(transactions: &[Transaction]) -> Self {
        let entries = transactions
            .iter()
            .map(|t| (t.name.clone(), MatchEntry::default()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&MatchEntry> {
        self.entries.get(name)
    }

    #[allow(dead_code)]
    pub fn match_count(&self, name: &str) -> Option<usize> {
        self.entries.get(name).map(|e| e.match_count)
    }

    pub fn assigned_bucket<'a>(&self, name: &str, buckets: &'a [Bucket]) -> Option<&'a str> {
        let pos = self.entries.get(name)?.assigned_bucket()?;
        buckets.get(pos).map(|b| b.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatchEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names whose match count is not exactly one.
    pub fn unresolved(&self) -> Vec<(&str, usize)> {
        self.iter()
            .filter(|(_, e)| e.match_count != 1)
            .map(|(name, e)| (name, e.match_count))
            .collect()
    }

    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for (_, entry) in self.iter() {
            match entry.status() {
                MatchStatus::Unmatched => tally.unmatched += 1,
                MatchStatus::Matched => tally.matched += 1,
                MatchStatus::Conflict => tally.conflicted += 1,
            }
        }
        tally
    }
}

pub struct MatchOutcome {
    pub index: MatchIndex,
    pub conflicts: Vec<Conflict>,
}

/// Classify every distinct transaction name against every bucket rule.
///
/// A rule matches when it is a case-sensitive substring of the transaction
/// name. Buckets and rules are visited in registry order, so the last
/// matching bucket wins the assignment. Each hit on an already-matched name
/// is reported as a conflict.
pub fn compute_matches(transactions: &[Transaction], buckets: &[Bucket]) -> MatchOutcome {
    let mut index = MatchIndex::from_transactions(transactions);
    let mut conflicts = Vec::new();

    for (pos, bucket) in buckets.iter().enumerate() {
        for rule in &bucket.transaction_rules {
            for (name, entry) in index.entries.iter_mut() {
                if !name.contains(rule.as_str()) {
                    continue;
                }
                if let Some(prev) = entry.assigned_bucket() {
                    conflicts.push(Conflict {
                        transaction: name.clone(),
                        previous_bucket: buckets[prev].name.clone(),
                        new_bucket: bucket.name.clone(),
                    });
                }
                entry.hit(pos);
            }
        }
    }

    tracing::debug!(
        names = index.len(),
        conflicts = conflicts.len(),
        "computed match index"
    );
    MatchOutcome { index, conflicts }
}

/// Patch the index after `rule` was added to or removed from the bucket at
/// position `bucket`. Returns how many names the rule touches.
pub fn apply_rule_change(
    index: &mut MatchIndex,
    rule: &str,
    bucket: usize,
    change: RuleChange,
) -> usize {
    let mut touched = 0usize;
    for (name, entry) in index.entries.iter_mut() {
        if !name.contains(rule) {
            continue;
        }
        match change {
            RuleChange::Add => entry.hit(bucket),
            RuleChange::Remove => entry.unhit(bucket),
        }
        touched += 1;
    }
    tracing::debug!(rule, bucket, ?change, touched, "patched match index");
    touched
}
