//! Deterministic Allocation Fingerprint
//!
//! SHA-256 over a canonical encoding of an allocation so that two runs can be
//! checked for identical output without comparing floats field by field.
//!
//! # Canonicalization
//!
//! - Version tag first, then strategy name
//! - Floats are converted to fixed-point integers (value * 1e8, rounded)
//! - Channels are sorted by id before hashing

use crate::allocation::plan::Allocation;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Fingerprint version string - increment when the encoding changes.
pub const FINGERPRINT_VERSION: &str = "ALLOCFP_V1";

/// Scale factor for converting money amounts to fixed-point integers.
const AMOUNT_SCALE: f64 = 1e8;

#[inline]
fn to_fixed(value: f64) -> i128 {
    (value * AMOUNT_SCALE).round() as i128
}

/// Hex-encoded SHA-256 digest of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationFingerprint(pub String);

impl AllocationFingerprint {
    pub fn compute(allocation: &Allocation) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_VERSION.as_bytes());
        hasher.update(allocation.strategy.as_str().as_bytes());
        hasher.update(to_fixed(allocation.total_budget).to_le_bytes());
        hasher.update(to_fixed(allocation.unallocated_budget).to_le_bytes());

        let mut channels: Vec<_> = allocation.channels.iter().collect();
        channels.sort_by(|a, b| a.channel.cmp(&b.channel));

        for c in channels {
            hasher.update((c.channel.len() as u64).to_le_bytes());
            hasher.update(c.channel.as_bytes());
            hasher.update(to_fixed(c.spend).to_le_bytes());
            hasher.update(to_fixed(c.expected_value).to_le_bytes());
        }

        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for AllocationFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::plan::{AllocationStrategy, ChannelAllocation};

    fn allocation(spend_a: f64) -> Allocation {
        Allocation {
            strategy: AllocationStrategy::Optimal,
            total_budget: 100.0,
            channels: vec![
                ChannelAllocation {
                    channel: "a".to_string(),
                    spend: spend_a,
                    min_spend: 0.0,
                    max_spend: 100.0,
                    value_per_dollar: 2.0,
                    expected_value: spend_a * 2.0,
                },
                ChannelAllocation {
                    channel: "b".to_string(),
                    spend: 100.0 - spend_a,
                    min_spend: 0.0,
                    max_spend: 100.0,
                    value_per_dollar: 1.0,
                    expected_value: 100.0 - spend_a,
                },
            ],
            unallocated_budget: 0.0,
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = AllocationFingerprint::compute(&allocation(60.0));
        let b = AllocationFingerprint::compute(&allocation(60.0));
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(a.short().len(), 12);
    }

    #[test]
    fn test_fingerprint_ignores_channel_order() {
        let forward = allocation(60.0);
        let mut reversed = forward.clone();
        reversed.channels.reverse();

        assert_eq!(
            AllocationFingerprint::compute(&forward),
            AllocationFingerprint::compute(&reversed)
        );
    }

    #[test]
    fn test_fingerprint_changes_with_spend_and_strategy() {
        let base = allocation(60.0);
        let moved = allocation(61.0);
        let mut relabeled = base.clone();
        relabeled.strategy = AllocationStrategy::Baseline;

        let fp = AllocationFingerprint::compute(&base);
        assert_ne!(fp, AllocationFingerprint::compute(&moved));
        assert_ne!(fp, AllocationFingerprint::compute(&relabeled));
    }
}
