//! Allocation result types.

use crate::allocation::validation::{AllocationProblem, ChannelSpec};
use serde::{Deserialize, Serialize};

/// Which allocator produced an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Equal-intent water-filling, no optimization.
    Baseline,
    /// Value-maximizing greedy fill.
    Optimal,
}

impl AllocationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Optimal => "optimal",
        }
    }
}

impl std::fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spend assigned to one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAllocation {
    pub channel: String,
    pub spend: f64,
    pub min_spend: f64,
    pub max_spend: f64,
    pub value_per_dollar: f64,
    /// `spend * value_per_dollar`
    pub expected_value: f64,
}

impl ChannelAllocation {
    pub(crate) fn from_spec(spec: &ChannelSpec, spend: f64) -> Self {
        Self {
            channel: spec.channel.clone(),
            spend,
            min_spend: spec.min_spend,
            max_spend: spec.max_spend,
            value_per_dollar: spec.value_per_dollar,
            expected_value: spend * spec.value_per_dollar,
        }
    }
}

/// Immutable snapshot of one allocator's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub strategy: AllocationStrategy,
    pub total_budget: f64,
    /// In the same order as the channels were supplied.
    pub channels: Vec<ChannelAllocation>,
    /// Budget left over because every channel sits at `max_spend`.
    pub unallocated_budget: f64,
}

impl Allocation {
    /// Build from per-channel spend aligned with `problem.channels()`.
    pub(crate) fn from_spend(
        strategy: AllocationStrategy,
        problem: &AllocationProblem,
        spend: &[f64],
        unallocated_budget: f64,
    ) -> Self {
        let channels = problem
            .channels()
            .iter()
            .zip(spend)
            .map(|(spec, &s)| ChannelAllocation::from_spec(spec, s))
            .collect();

        Self {
            strategy,
            total_budget: problem.total_budget(),
            channels,
            unallocated_budget,
        }
    }

    pub fn total_spend(&self) -> f64 {
        self.channels.iter().map(|c| c.spend).sum()
    }

    pub fn total_expected_value(&self) -> f64 {
        self.channels.iter().map(|c| c.expected_value).sum()
    }

    pub fn get(&self, channel: &str) -> Option<&ChannelAllocation> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    pub fn channel_ids(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.channel.as_str())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// True when every channel sits inside its bounds, allowing `tolerance` of slack.
    pub fn respects_bounds(&self, tolerance: f64) -> bool {
        self.channels
            .iter()
            .all(|c| c.spend >= c.min_spend - tolerance && c.spend <= c.max_spend + tolerance)
    }
}
