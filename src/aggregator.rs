use rust_decimal::Decimal;

use crate::models::{Bucket, Transaction};

pub struct BucketTotal {
    pub name: String,
    pub added: Decimal,
    pub transactions: usize,
    pub balance: Decimal,
}

/// Fold matched transaction amounts into each bucket's balance.
///
/// A transaction counts toward a bucket when any of the bucket's rules is a
/// substring of its name. It is summed at most once per bucket, however many
/// of that bucket's rules match it.
pub fn aggregate_balances(buckets: &mut [Bucket], transactions: &[Transaction]) -> Vec<BucketTotal> {
    buckets
        .iter_mut()
        .map(|bucket| {
            let mut added = Decimal::ZERO;
            let mut count = 0usize;
            for txn in transactions.iter().filter(|t| bucket.claims(&t.name)) {
                added += txn.amount;
                count += 1;
            }
            bucket.balance += added;
            tracing::debug!(bucket = %bucket.name, %added, count, "aggregated bucket");
            BucketTotal {
                name: bucket.name.clone(),
                added,
                transactions: count,
                balance: bucket.balance,
            }
        })
        .collect()
}
