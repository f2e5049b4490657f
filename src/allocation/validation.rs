//! Eager input validation.
//!
//! All channels are checked in a single pass and every issue is reported at
//! once, before any allocation work starts.

use crate::allocation::economics::{ChannelEconomics, SpendBounds};
use crate::allocation::error::{AllocationError, BoundsIssue};
use std::collections::{HashMap, HashSet};

/// Relative tolerance used for budget comparisons.
pub const BUDGET_TOLERANCE: f64 = 1e-9;

/// Absolute slack for a given budget scale.
#[inline]
pub fn budget_epsilon(total_budget: f64) -> f64 {
    BUDGET_TOLERANCE * total_budget.abs().max(1.0)
}

/// One validated channel: economics joined with its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpec {
    pub channel: String,
    pub incremental_ltv: f64,
    pub avg_cost: f64,
    pub value_per_dollar: f64,
    pub min_spend: f64,
    pub max_spend: f64,
}

/// Validated, immutable input for one allocation run.
///
/// Channels keep the caller's input order.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationProblem {
    channels: Vec<ChannelSpec>,
    total_budget: f64,
}

impl AllocationProblem {
    pub fn channels(&self) -> &[ChannelSpec] {
        &self.channels
    }

    pub fn total_budget(&self) -> f64 {
        self.total_budget
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn min_spend_total(&self) -> f64 {
        self.channels.iter().map(|c| c.min_spend).sum()
    }

    pub fn max_spend_total(&self) -> f64 {
        self.channels.iter().map(|c| c.max_spend).sum()
    }

    /// Fails with `InfeasibleBudget` when the floors cannot be paid for.
    pub fn ensure_feasible(&self) -> Result<(), AllocationError> {
        let required = self.min_spend_total();
        if required > self.total_budget + budget_epsilon(self.total_budget) {
            return Err(AllocationError::InfeasibleBudget {
                required_min_spend: required,
                total_budget: self.total_budget,
            });
        }
        Ok(())
    }
}

/// Join economics with bounds and check every channel.
pub fn validate(
    channels: &[ChannelEconomics],
    bounds: &[SpendBounds],
    total_budget: f64,
) -> Result<AllocationProblem, AllocationError> {
    let mut issues = Vec::new();

    if !total_budget.is_finite() || total_budget < 0.0 {
        issues.push(BoundsIssue::InvalidBudget { total_budget });
    }

    let mut bounds_by_channel: HashMap<&str, &SpendBounds> = HashMap::with_capacity(bounds.len());
    for b in bounds {
        if bounds_by_channel.insert(b.channel.as_str(), b).is_some() {
            issues.push(BoundsIssue::DuplicateChannel {
                channel: b.channel.clone(),
            });
        }
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(channels.len());
    let mut specs = Vec::with_capacity(channels.len());

    for econ in channels {
        let name = econ.channel.as_str();
        if !seen.insert(name) {
            issues.push(BoundsIssue::DuplicateChannel {
                channel: econ.channel.clone(),
            });
            continue;
        }

        let before = issues.len();

        if !econ.incremental_ltv.is_finite() {
            issues.push(BoundsIssue::NonFiniteInput {
                channel: econ.channel.clone(),
                field: "incremental_ltv",
            });
        } else if econ.incremental_ltv < 0.0 {
            issues.push(BoundsIssue::NegativeLtv {
                channel: econ.channel.clone(),
                incremental_ltv: econ.incremental_ltv,
            });
        }

        if !econ.avg_cost.is_finite() {
            issues.push(BoundsIssue::NonFiniteInput {
                channel: econ.channel.clone(),
                field: "avg_cost",
            });
        } else if econ.avg_cost <= 0.0 {
            issues.push(BoundsIssue::NonPositiveCost {
                channel: econ.channel.clone(),
                avg_cost: econ.avg_cost,
            });
        }

        let Some(b) = bounds_by_channel.get(name) else {
            issues.push(BoundsIssue::MissingBounds {
                channel: econ.channel.clone(),
            });
            continue;
        };

        if !b.min_spend.is_finite() {
            issues.push(BoundsIssue::NonFiniteInput {
                channel: econ.channel.clone(),
                field: "min_spend",
            });
        }
        if !b.max_spend.is_finite() {
            issues.push(BoundsIssue::NonFiniteInput {
                channel: econ.channel.clone(),
                field: "max_spend",
            });
        }
        if b.min_spend.is_finite() && b.max_spend.is_finite() {
            if b.min_spend < 0.0 {
                issues.push(BoundsIssue::NegativeSpend {
                    channel: econ.channel.clone(),
                    min_spend: b.min_spend,
                });
            }
            if b.min_spend > b.max_spend {
                issues.push(BoundsIssue::MinExceedsMax {
                    channel: econ.channel.clone(),
                    min_spend: b.min_spend,
                    max_spend: b.max_spend,
                });
            }
        }

        if issues.len() == before {
            specs.push(ChannelSpec {
                channel: econ.channel.clone(),
                incremental_ltv: econ.incremental_ltv,
                avg_cost: econ.avg_cost,
                // + 0.0 turns -0.0 into 0.0 so it ties with zero-value channels
                value_per_dollar: econ.value_per_dollar() + 0.0,
                min_spend: b.min_spend,
                max_spend: b.max_spend,
            });
        }
    }

    for b in bounds {
        if !seen.contains(b.channel.as_str()) {
            issues.push(BoundsIssue::UnknownChannel {
                channel: b.channel.clone(),
            });
        }
    }

    if !issues.is_empty() {
        return Err(AllocationError::InvalidBounds { issues });
    }

    Ok(AllocationProblem {
        channels: specs,
        total_budget,
    })
}
