//! # Permit Number Generation
//!
//! Numbers have the form `{prefix}-{YYYYMMDD}-{sequence:06}`. The date is
//! informational; uniqueness comes from the sequence, a process-wide
//! monotonic counter that is never reset. At start-up the counter is moved
//! past the highest sequence already persisted, so a restart cannot reissue
//! a number.

use std::sync::atomic::{AtomicU64, Ordering};

use ptw_core::{PermitNumber, Timestamp};

/// Default number prefix.
pub const DEFAULT_PREFIX: &str = "PTW";

/// Monotonic permit number source.
#[derive(Debug)]
pub struct PermitNumberGenerator {
    prefix: String,
    next: AtomicU64,
}

impl PermitNumberGenerator {
    /// A generator whose first number has sequence 1.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Ensure every future sequence is strictly greater than `sequence`.
    pub fn seed_past(&self, sequence: u64) {
        self.next.fetch_max(sequence.saturating_add(1), Ordering::SeqCst);
    }

    /// Issue the next number, dated `issued`.
    pub fn next(&self, issued: Timestamp) -> PermitNumber {
        let sequence = self.next.fetch_add(1, Ordering::SeqCst);
        PermitNumber::compose(&self.prefix, issued, sequence)
    }
}

impl Default for PermitNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_format() {
        let gen = PermitNumberGenerator::default();
        let issued = Timestamp::parse("2026-10-19T08:00:00Z").unwrap();
        assert_eq!(gen.next(issued).as_str(), "PTW-20261019-000001");
        assert_eq!(gen.next(issued).as_str(), "PTW-20261019-000002");
    }

    #[test]
    fn test_seed_past_never_moves_backwards() {
        let gen = PermitNumberGenerator::new("SITE");
        gen.seed_past(41);
        gen.seed_past(3);
        let number = gen.next(Timestamp::now());
        assert_eq!(number.sequence(), Some(42));
        assert!(number.as_str().starts_with("SITE-"));
    }

    #[test]
    fn test_unique_across_threads() {
        let gen = Arc::new(PermitNumberGenerator::default());
        let issued = Timestamp::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gen = Arc::clone(&gen);
                std::thread::spawn(move || {
                    (0..250).map(|_| gen.next(issued)).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for number in handle.join().unwrap() {
                assert!(seen.insert(number), "duplicate permit number");
            }
        }
        assert_eq!(seen.len(), 2000);
    }
}
