//! Allocation Scenarios
//!
//! Drives one full run from the boundary tuples: resolve fractional bounds,
//! validate once, run both allocators in parallel, then compare. Also sweeps
//! a range of budgets so callers can see how lift scales with spend.

use crate::allocation::baseline::BaselineAllocator;
use crate::allocation::comparator::{AllocationComparator, ComparisonRow, ComparisonSummary};
use crate::allocation::economics::{resolve_channels, ChannelConfig};
use crate::allocation::error::AllocationError;
use crate::allocation::fingerprint::AllocationFingerprint;
use crate::allocation::optimal::OptimalAllocator;
use crate::allocation::plan::Allocation;
use crate::allocation::validation::validate;
use crate::allocation::Allocator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

/// Everything produced by one allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub total_budget: f64,
    pub baseline: Allocation,
    pub optimal: Allocation,
    /// Ordered by value lift descending.
    pub rows: Vec<ComparisonRow>,
    pub summary: ComparisonSummary,
    pub baseline_fingerprint: AllocationFingerprint,
    pub optimal_fingerprint: AllocationFingerprint,
}

/// One allocation run over a fixed channel table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationRun {
    baseline: BaselineAllocator,
    optimal: OptimalAllocator,
    comparator: AllocationComparator,
}

impl AllocationRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(
        &self,
        configs: &[ChannelConfig],
        total_budget: f64,
    ) -> Result<AllocationReport, AllocationError> {
        let span = info_span!("allocation_run", total_budget, channels = configs.len());
        let _guard = span.enter();

        let (economics, bounds) = resolve_channels(configs, total_budget);
        let problem = validate(&economics, &bounds, total_budget)?;

        let (baseline, optimal) = rayon::join(
            || self.baseline.allocate_problem(&problem),
            || self.optimal.allocate_problem(&problem),
        );
        let (baseline, optimal) = (baseline?, optimal?);

        let rows = self.comparator.compare(&baseline, &optimal)?;
        let summary = ComparisonSummary::from_allocations(&baseline, &optimal);
        let baseline_fingerprint = AllocationFingerprint::compute(&baseline);
        let optimal_fingerprint = AllocationFingerprint::compute(&optimal);

        info!(
            baseline_value = summary.baseline_value,
            optimal_value = summary.optimal_value,
            value_lift = summary.value_lift,
            baseline_fp = baseline_fingerprint.short(),
            optimal_fp = optimal_fingerprint.short(),
            "Allocation run complete"
        );

        Ok(AllocationReport {
            total_budget,
            baseline,
            optimal,
            rows,
            summary,
            baseline_fingerprint,
            optimal_fingerprint,
        })
    }
}

/// Inclusive budget range to sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSweep {
    #[serde(default = "default_sweep_min")]
    pub min_budget: f64,
    #[serde(default = "default_sweep_max")]
    pub max_budget: f64,
    #[serde(default = "default_sweep_step")]
    pub step: f64,
}

/// Upper bound on the number of budgets one sweep may evaluate.
pub const MAX_SWEEP_POINTS: usize = 10_000;

fn default_sweep_min() -> f64 {
    100_000.0
}
fn default_sweep_max() -> f64 {
    2_000_000.0
}
fn default_sweep_step() -> f64 {
    50_000.0
}

impl Default for BudgetSweep {
    fn default() -> Self {
        Self {
            min_budget: default_sweep_min(),
            max_budget: default_sweep_max(),
            step: default_sweep_step(),
        }
    }
}

impl BudgetSweep {
    /// Number of budgets in the sweep, or `None` when the range or step is
    /// unusable or the sweep would exceed `MAX_SWEEP_POINTS`.
    pub fn point_count(&self) -> Option<usize> {
        if !(self.step > 0.0) || !self.min_budget.is_finite() || !self.max_budget.is_finite() {
            return None;
        }
        if self.max_budget < self.min_budget {
            return None;
        }
        let intervals = ((self.max_budget - self.min_budget) / self.step + 1e-9).floor();
        if !intervals.is_finite() || intervals >= MAX_SWEEP_POINTS as f64 {
            return None;
        }
        Some(intervals as usize + 1)
    }

    /// Budgets in ascending order. Empty when `point_count` rejects the sweep.
    pub fn budgets(&self) -> Vec<f64> {
        let Some(count) = self.point_count() else {
            warn!(
                min_budget = self.min_budget,
                max_budget = self.max_budget,
                step = self.step,
                max_points = MAX_SWEEP_POINTS,
                "Unusable budget sweep, no points generated"
            );
            return Vec::new();
        };
        // Index-based so accumulated float error never drops the last point.
        (0..count)
            .map(|i| self.min_budget + self.step * i as f64)
            .collect()
    }
}

/// Result of one budget in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub total_budget: f64,
    /// `None` when the run failed, see `error`.
    pub summary: Option<ComparisonSummary>,
    pub error: Option<String>,
}

/// Run every budget in `sweep` in parallel. Output is ordered by budget.
pub fn sweep_budgets(configs: &[ChannelConfig], sweep: &BudgetSweep) -> Vec<SweepPoint> {
    let run = AllocationRun::new();
    let budgets = sweep.budgets();

    info!(points = budgets.len(), "Starting budget sweep");

    budgets
        .par_iter()
        .map(|&total_budget| match run.execute(configs, total_budget) {
            Ok(report) => SweepPoint {
                total_budget,
                summary: Some(report.summary),
                error: None,
            },
            Err(e) => {
                warn!(total_budget, error = %e, "Sweep point failed");
                SweepPoint {
                    total_budget,
                    summary: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::comparator::Rationale;

    fn channels() -> Vec<ChannelConfig> {
        vec![
            ChannelConfig::new("paid_search", 42.0, 14.0, 0.04, 0.40),
            ChannelConfig::new("social_ads", 21.0, 9.0, 0.02, 0.30),
            ChannelConfig::new("affiliate", 30.0, 8.0, 0.01, 0.20),
            ChannelConfig::new("referral", 95.0, 12.0, 0.01, 0.16),
            ChannelConfig::new("organic", 25.0, 2.0, 0.00, 0.10),
        ]
    }

    #[test]
    fn test_execute_produces_consistent_report() {
        let report = AllocationRun::new().execute(&channels(), 500_000.0).unwrap();

        assert_eq!(report.rows.len(), 5);
        assert!(report.summary.optimal_value >= report.summary.baseline_value);
        assert!((report.optimal.total_spend() - 500_000.0).abs() < 1e-3);
        assert!((report.baseline.total_spend() - 500_000.0).abs() < 1e-3);

        // organic has the best value per dollar and fills its 10% cap.
        let organic = report.optimal.get("organic").unwrap();
        assert!((organic.spend - 50_000.0).abs() < 1e-6);

        // social_ads ranks last and only absorbs what the others leave.
        let social = report.optimal.get("social_ads").unwrap();
        assert!((social.spend - 70_000.0).abs() < 1e-6);
        let row = report.rows.iter().find(|r| r.channel == "social_ads").unwrap();
        assert_eq!(row.rationale, Rationale::Reduced);
    }

    #[test]
    fn test_execute_is_deterministic() {
        let run = AllocationRun::new();
        let a = run.execute(&channels(), 750_000.0).unwrap();
        let b = run.execute(&channels(), 750_000.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.optimal_fingerprint, b.optimal_fingerprint);
    }

    #[test]
    fn test_execute_surfaces_validation_errors() {
        let mut bad = channels();
        bad[0].avg_cost = 0.0;
        let err = AllocationRun::new().execute(&bad, 500_000.0).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidBounds { .. }));
    }

    #[test]
    fn test_budget_sweep_points() {
        assert_eq!(BudgetSweep::default().budgets().len(), 39);
        let sweep = BudgetSweep {
            min_budget: 100.0,
            max_budget: 300.0,
            step: 100.0,
        };
        assert_eq!(sweep.budgets(), vec![100.0, 200.0, 300.0]);
        let empty = BudgetSweep {
            min_budget: 100.0,
            max_budget: 300.0,
            step: 0.0,
        };
        assert!(empty.budgets().is_empty());
    }

    #[test]
    fn test_budget_sweep_rejects_excessive_points() {
        let tiny_step = BudgetSweep {
            min_budget: 0.0,
            max_budget: 1.0,
            step: 1e-300,
        };
        assert_eq!(tiny_step.point_count(), None);
        assert!(tiny_step.budgets().is_empty());

        let dense = BudgetSweep {
            min_budget: 0.0,
            max_budget: 1_000_000.0,
            step: 0.001,
        };
        assert_eq!(dense.point_count(), None);
        assert!(dense.budgets().is_empty());

        let at_cap = BudgetSweep {
            min_budget: 0.0,
            max_budget: (MAX_SWEEP_POINTS - 1) as f64,
            step: 1.0,
        };
        assert_eq!(at_cap.point_count(), Some(MAX_SWEEP_POINTS));
        assert_eq!(at_cap.budgets().len(), MAX_SWEEP_POINTS);
    }

    #[test]
    fn test_sweep_ordered_and_reports_failures() {
        let sweep = BudgetSweep {
            min_budget: 100_000.0,
            max_budget: 300_000.0,
            step: 100_000.0,
        };
        let points = sweep_budgets(&channels(), &sweep);
        assert_eq!(points.len(), 3);
        assert!(points.windows(2).all(|w| w[0].total_budget < w[1].total_budget));
        assert!(points.iter().all(|p| p.summary.is_some()));

        let mut infeasible = channels();
        infeasible[0].min_spend_fraction = 1.5;
        let points = sweep_budgets(&infeasible, &sweep);
        assert!(points.iter().all(|p| p.error.is_some() && p.summary.is_none()));
    }
}
