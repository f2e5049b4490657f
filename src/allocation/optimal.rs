//! Value-Maximizing Allocator
//!
//! Solves
//!
//! ```text
//! maximize   Σ spend_c * value_per_dollar_c
//! subject to min_spend_c <= spend_c <= max_spend_c
//!            Σ spend_c <= total_budget
//! ```
//!
//! A linear objective with box bounds and one coupling constraint is a
//! fractional knapsack, so the exact LP optimum is the greedy fill:
//! pay every floor, then raise channels toward their caps in descending
//! value-per-dollar order until the budget runs out. Ties rank by channel id.

use crate::allocation::error::AllocationError;
use crate::allocation::plan::{Allocation, AllocationStrategy};
use crate::allocation::validation::{budget_epsilon, AllocationProblem, ChannelSpec};
use crate::allocation::Allocator;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Greedy fractional-knapsack allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimalAllocator;

impl OptimalAllocator {
    pub fn new() -> Self {
        Self
    }
}

/// Channel indices ordered by value per dollar descending, then channel id.
pub fn priority_order(specs: &[ChannelSpec]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..specs.len()).collect();
    order.sort_by(|&a, &b| {
        let (ca, cb) = (&specs[a], &specs[b]);
        match cb.value_per_dollar.total_cmp(&ca.value_per_dollar) {
            Ordering::Equal => ca.channel.cmp(&cb.channel),
            other => other,
        }
    });
    order
}

impl Allocator for OptimalAllocator {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::Optimal
    }

    fn allocate_problem(&self, problem: &AllocationProblem) -> Result<Allocation, AllocationError> {
        problem.ensure_feasible()?;

        let budget = problem.total_budget();
        let specs = problem.channels();

        let mut spend: Vec<f64> = specs.iter().map(|c| c.min_spend).collect();
        let mut remaining = (budget - problem.min_spend_total()).max(0.0);

        for idx in priority_order(specs) {
            if remaining <= 0.0 {
                break;
            }
            let spec = &specs[idx];
            let headroom = spec.max_spend - spend[idx];
            let take = headroom.min(remaining);
            if take <= 0.0 {
                continue;
            }
            // min + (max - min) can round one ulp past max
            spend[idx] = if take >= headroom {
                spec.max_spend
            } else {
                (spend[idx] + take).min(spec.max_spend)
            };
            remaining -= take;
            debug!(
                channel = %spec.channel,
                value_per_dollar = spec.value_per_dollar,
                spend = spend[idx],
                remaining,
                "Filled channel"
            );
        }

        let unallocated = if remaining > budget_epsilon(budget) {
            remaining
        } else {
            0.0
        };

        let allocation =
            Allocation::from_spend(AllocationStrategy::Optimal, problem, &spend, unallocated);

        info!(
            channels = allocation.len(),
            budget,
            spend = allocation.total_spend(),
            value = allocation.total_expected_value(),
            "Optimal allocation complete"
        );
        if unallocated > 0.0 {
            warn!(
                unallocated,
                "All channels at max spend, optimal allocation leaves budget unallocated"
            );
        }

        Ok(allocation)
    }
}
