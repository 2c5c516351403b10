//! Unique integer allocation for MACs and device ids.
//!
//! Each resolution run owns one allocator per domain. An allocator starts
//! with `0` already taken, so the first fallback value handed out is `1`.

use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// Numeric seed of a device name: every ASCII digit in the name, concatenated
/// left to right and read as base 10.
///
/// `"h1"` gives 1, `"leaf2-port10"` gives 210. Names without digits, or whose
/// digits overflow a `u64`, have no seed.
pub fn device_seed(name: &str) -> Option<u64> {
    let digits: String = DIGIT_RUNS.find_iter(name).map(|m| m.as_str()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Tracks the values already handed out in one allocation domain
#[derive(Debug, Clone)]
pub struct IdAllocator {
    domain: &'static str,
    used: BTreeSet<u64>,
    limit: u64,
}

impl IdAllocator {
    /// Create an allocator accepting values in `1..=limit`
    pub fn new(domain: &'static str, limit: u64) -> Self {
        IdAllocator {
            domain,
            used: BTreeSet::from([0]),
            limit,
        }
    }

    pub fn is_taken(&self, value: u64) -> bool {
        self.used.contains(&value)
    }

    /// Claim `candidate` if it is free and in range, otherwise fall back to
    /// [`IdAllocator::reallocate_on_conflict`]. Always returns a value that
    /// was not handed out before in this domain.
    pub fn claim(&mut self, owner: &str, candidate: Option<u64>) -> u64 {
        let value = match candidate {
            Some(value) if value <= self.limit && !self.is_taken(value) => value,
            _ => self.reallocate_on_conflict(owner, candidate),
        };
        self.used.insert(value);
        debug!("{} {} assigned to {}", self.domain, value, owner);
        value
    }

    /// Collision policy: a missing, out-of-range or taken candidate is
    /// silently replaced with the next value above everything allocated.
    fn reallocate_on_conflict(&self, owner: &str, candidate: Option<u64>) -> u64 {
        let value = self.next_free();
        if let Some(rejected) = candidate {
            warn!(
                "{} {} for {} is unavailable, using {} instead",
                self.domain, rejected, owner, value
            );
        }
        value
    }

    fn next_free(&self) -> u64 {
        let max = self.used.last().copied().unwrap_or(0);
        if max < self.limit {
            return max + 1;
        }
        // Top of the range is taken, fill the lowest gap instead
        (1..=self.limit)
            .find(|v| !self.used.contains(v))
            .unwrap_or(self.limit)
    }
}
