//! Baseline vs optimal comparison.
//!
//! Pairs two allocations over the same channel set, computes per-channel
//! value lift and tags each channel with a qualitative rationale.

use crate::allocation::error::AllocationError;
use crate::allocation::plan::Allocation;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Optimal spend above `baseline * INCREASE_RATIO` counts as increased.
pub const INCREASE_RATIO: f64 = 1.2;
/// Optimal spend below `baseline * REDUCE_RATIO` counts as reduced.
pub const REDUCE_RATIO: f64 = 0.8;

/// Why a channel's spend moved between baseline and optimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rationale {
    Increased,
    Reduced,
    Stable,
}

impl Rationale {
    /// Classify a spend change. Boundary values fall into `Stable`.
    pub fn classify(baseline_spend: f64, optimal_spend: f64) -> Self {
        if optimal_spend > baseline_spend * INCREASE_RATIO {
            Self::Increased
        } else if optimal_spend < baseline_spend * REDUCE_RATIO {
            Self::Reduced
        } else {
            Self::Stable
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Increased => "increased: strong incremental value per dollar",
            Self::Reduced => "reduced: weak incremental value despite surface metrics",
            Self::Stable => "stable: consistent with baseline",
        }
    }
}

impl std::fmt::Display for Rationale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One channel's baseline and optimal allocation side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub channel: String,
    pub baseline_spend: f64,
    pub optimal_spend: f64,
    pub baseline_value: f64,
    pub optimal_value: f64,
    /// `optimal_value - baseline_value`
    pub value_lift: f64,
    /// Percent change in spend, `None` when baseline spend is zero.
    pub spend_change_pct: Option<f64>,
    pub rationale: Rationale,
    /// Human-readable form of `rationale`, e.g. "stable: consistent with baseline".
    pub rationale_tag: String,
}

/// Headline totals for a pair of allocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub baseline_value: f64,
    pub optimal_value: f64,
    pub value_lift: f64,
    /// Lift relative to baseline, `None` when baseline value is zero.
    pub lift_pct: Option<f64>,
    pub baseline_unallocated: f64,
    pub optimal_unallocated: f64,
}

impl ComparisonSummary {
    pub fn from_allocations(baseline: &Allocation, optimal: &Allocation) -> Self {
        let baseline_value = baseline.total_expected_value();
        let optimal_value = optimal.total_expected_value();
        let value_lift = optimal_value - baseline_value;
        let lift_pct = (baseline_value != 0.0).then(|| value_lift / baseline_value * 100.0);

        Self {
            baseline_value,
            optimal_value,
            value_lift,
            lift_pct,
            baseline_unallocated: baseline.unallocated_budget,
            optimal_unallocated: optimal.unallocated_budget,
        }
    }
}

/// Stateless comparator over two finished allocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationComparator;

impl AllocationComparator {
    pub fn new() -> Self {
        Self
    }

    /// Rows ordered by value lift descending, ties by channel id.
    pub fn compare(
        &self,
        baseline: &Allocation,
        optimal: &Allocation,
    ) -> Result<Vec<ComparisonRow>, AllocationError> {
        ensure_same_channels(baseline, optimal)?;

        let mut rows: Vec<ComparisonRow> = baseline
            .channels
            .iter()
            .filter_map(|b| {
                let o = optimal.get(&b.channel)?;
                let value_lift = o.expected_value - b.expected_value;
                let spend_change_pct =
                    (b.spend > 0.0).then(|| (o.spend - b.spend) / b.spend * 100.0);
                let rationale = Rationale::classify(b.spend, o.spend);
                Some(ComparisonRow {
                    channel: b.channel.clone(),
                    baseline_spend: b.spend,
                    optimal_spend: o.spend,
                    baseline_value: b.expected_value,
                    optimal_value: o.expected_value,
                    value_lift,
                    spend_change_pct,
                    rationale,
                    rationale_tag: rationale.tag().to_string(),
                })
            })
            .collect();

        rows.sort_by(|a, b| match b.value_lift.total_cmp(&a.value_lift) {
            Ordering::Equal => a.channel.cmp(&b.channel),
            other => other,
        });

        Ok(rows)
    }
}

fn ensure_same_channels(baseline: &Allocation, optimal: &Allocation) -> Result<(), AllocationError> {
    let b: BTreeSet<&str> = baseline.channel_ids().collect();
    let o: BTreeSet<&str> = optimal.channel_ids().collect();

    // Equal sets with different lengths means a duplicated id.
    if b == o && b.len() == baseline.len() && o.len() == optimal.len() {
        return Ok(());
    }

    Err(AllocationError::ChannelSetMismatch {
        missing_from_baseline: o.difference(&b).map(|s| s.to_string()).collect(),
        missing_from_optimal: b.difference(&o).map(|s| s.to_string()).collect(),
    })
}
