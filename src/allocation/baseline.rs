//! Feasible Baseline Allocator
//!
//! Equal-intent reference allocation with no optimization:
//!
//! 1. Every channel starts at `total_budget / channel_count`.
//! 2. Spend is clamped into `[min_spend, max_spend]`.
//! 3. Whatever the clamp freed (or over-consumed) is redistributed by
//!    water-filling: proportional to remaining headroom `max_spend - spend`
//!    when budget is left, proportional to slack `spend - min_spend` when the
//!    floors pushed the total above budget.
//! 4. The redistribution re-clamps and repeats until the remainder is within
//!    tolerance or no channel can absorb it. At most `channel_count + 1` passes.
//!
//! Total spend ends at `min(total_budget, sum(max_spend))`. Any excess over the
//! caps is reported as `unallocated_budget`.

use crate::allocation::error::AllocationError;
use crate::allocation::plan::{Allocation, AllocationStrategy};
use crate::allocation::validation::{budget_epsilon, AllocationProblem, ChannelSpec};
use crate::allocation::Allocator;
use tracing::{debug, info, warn};

/// Equal-share water-filling allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineAllocator;

impl BaselineAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl Allocator for BaselineAllocator {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::Baseline
    }

    fn allocate_problem(&self, problem: &AllocationProblem) -> Result<Allocation, AllocationError> {
        problem.ensure_feasible()?;

        let budget = problem.total_budget();
        let specs = problem.channels();

        if specs.is_empty() {
            warn!(budget, "No channels supplied, entire budget unallocated");
            return Ok(Allocation::from_spend(
                AllocationStrategy::Baseline,
                problem,
                &[],
                budget,
            ));
        }

        let equal_share = budget / specs.len() as f64;
        let mut spend: Vec<f64> = specs
            .iter()
            .map(|c| equal_share.clamp(c.min_spend, c.max_spend))
            .collect();

        let remaining = water_fill(specs, &mut spend, budget);
        let unallocated = if remaining > budget_epsilon(budget) {
            remaining
        } else {
            0.0
        };

        let allocation =
            Allocation::from_spend(AllocationStrategy::Baseline, problem, &spend, unallocated);

        info!(
            channels = allocation.len(),
            budget,
            spend = allocation.total_spend(),
            value = allocation.total_expected_value(),
            "Baseline allocation complete"
        );
        if unallocated > 0.0 {
            warn!(
                unallocated,
                "Channel caps below total budget, baseline leaves budget unallocated"
            );
        }

        Ok(allocation)
    }
}

/// Redistribute `budget - sum(spend)` until it is within tolerance or no
/// channel can move. Returns the final signed remainder.
fn water_fill(specs: &[ChannelSpec], spend: &mut [f64], budget: f64) -> f64 {
    let eps = budget_epsilon(budget);
    let max_passes = specs.len() + 1;
    let mut remaining = budget - spend.iter().sum::<f64>();

    for pass in 0..max_passes {
        if remaining.abs() <= eps {
            break;
        }

        // Room each channel has in the direction we need to move.
        let room: Vec<f64> = specs
            .iter()
            .zip(spend.iter())
            .map(|(c, &s)| {
                if remaining > 0.0 {
                    (c.max_spend - s).max(0.0)
                } else {
                    (s - c.min_spend).max(0.0)
                }
            })
            .collect();
        let total_room: f64 = room.iter().sum();

        if total_room <= eps {
            debug!(pass, remaining, "No channel has room left");
            break;
        }

        for ((s, c), r) in spend.iter_mut().zip(specs).zip(&room) {
            if *r <= 0.0 {
                continue;
            }
            *s = (*s + remaining * r / total_room).clamp(c.min_spend, c.max_spend);
        }

        remaining = budget - spend.iter().sum::<f64>();
        debug!(pass, remaining, total_room, "Water-filling pass");
    }

    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::economics::{ChannelEconomics, SpendBounds};
    use crate::allocation::error::BoundsIssue;

    fn run(
        channels: &[(&str, f64, f64, f64, f64)],
        budget: f64,
    ) -> Result<Allocation, AllocationError> {
        let econ: Vec<_> = channels
            .iter()
            .map(|(n, ltv, cost, _, _)| ChannelEconomics::new(*n, *ltv, *cost))
            .collect();
        let bounds: Vec<_> = channels
            .iter()
            .map(|(n, _, _, min, max)| SpendBounds::new(*n, *min, *max))
            .collect();
        BaselineAllocator::new().allocate(&econ, &bounds, budget)
    }

    #[test]
    fn test_equal_split_when_unconstrained() {
        let alloc = run(
            &[("a", 10.0, 2.0, 0.0, 100.0), ("b", 3.0, 1.0, 0.0, 100.0)],
            50.0,
        )
        .unwrap();

        assert_eq!(alloc.get("a").unwrap().spend, 25.0);
        assert_eq!(alloc.get("b").unwrap().spend, 25.0);
        assert_eq!(alloc.total_expected_value(), 25.0 * 5.0 + 25.0 * 3.0);
        assert_eq!(alloc.unallocated_budget, 0.0);
    }

    #[test]
    fn test_capped_channel_frees_budget_proportionally() {
        // Equal share 100 each; "a" capped at 40, the freed 60 goes to b and c
        // in proportion to their headroom (200 and 100).
        let alloc = run(
            &[
                ("a", 1.0, 1.0, 0.0, 40.0),
                ("b", 1.0, 1.0, 0.0, 300.0),
                ("c", 1.0, 1.0, 0.0, 200.0),
            ],
            300.0,
        )
        .unwrap();

        assert_eq!(alloc.get("a").unwrap().spend, 40.0);
        assert!((alloc.get("b").unwrap().spend - 140.0).abs() < 1e-9);
        assert!((alloc.get("c").unwrap().spend - 120.0).abs() < 1e-9);
        assert!((alloc.total_spend() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_floor_claws_back_from_other_channels() {
        // Equal share 50; "a" floor 90 pushes the clamped total to 140.
        let alloc = run(
            &[("a", 1.0, 1.0, 90.0, 100.0), ("b", 1.0, 1.0, 0.0, 100.0)],
            100.0,
        )
        .unwrap();

        assert_eq!(alloc.get("a").unwrap().spend, 90.0);
        assert!((alloc.get("b").unwrap().spend - 10.0).abs() < 1e-9);
        assert!((alloc.total_spend() - 100.0).abs() < 1e-9);
        assert!(alloc.respects_bounds(0.0));
    }

    #[test]
    fn test_caps_below_budget_report_unallocated() {
        let alloc = run(
            &[
                ("a", 1.0, 1.0, 0.0, 150_000.0),
                ("b", 1.0, 1.0, 0.0, 150_000.0),
                ("c", 1.0, 1.0, 0.0, 100_000.0),
            ],
            500_000.0,
        )
        .unwrap();

        assert_eq!(alloc.total_spend(), 400_000.0);
        assert_eq!(alloc.unallocated_budget, 100_000.0);
    }

    #[test]
    fn test_infeasible_floors() {
        let err = run(
            &[
                ("a", 1.0, 1.0, 300_000.0, 400_000.0),
                ("b", 1.0, 1.0, 300_000.0, 400_000.0),
            ],
            500_000.0,
        )
        .unwrap_err();

        assert!(matches!(err, AllocationError::InfeasibleBudget { .. }));
    }

    #[test]
    fn test_non_finite_bounds_rejected_before_clamping() {
        let err = run(
            &[("a", 1.0, 1.0, 0.0, f64::INFINITY), ("b", 1.0, 1.0, f64::NAN, 10.0)],
            100.0,
        )
        .unwrap_err();

        let issues = match err {
            AllocationError::InvalidBounds { issues } => issues,
            other => panic!("expected InvalidBounds, got {:?}", other),
        };
        assert!(issues.contains(&BoundsIssue::NonFiniteInput {
            channel: "a".to_string(),
            field: "max_spend"
        }));
        assert!(issues.contains(&BoundsIssue::NonFiniteInput {
            channel: "b".to_string(),
            field: "min_spend"
        }));
    }

    #[test]
    fn test_empty_channel_set() {
        let alloc = run(&[], 1_000.0).unwrap();
        assert!(alloc.is_empty());
        assert_eq!(alloc.unallocated_budget, 1_000.0);
    }
}
