//! Budget Allocation Engine
//!
//! Splits a fixed acquisition budget across channels given per-channel
//! economics and spend bounds.
//!
//! # Architecture
//!
//! ```text
//!            ChannelConfig[] + total_budget
//!                          │
//!                          ▼
//!              resolve_channels → validate
//!                          │
//!                  AllocationProblem
//!                          │
//!        ┌─────────────────┴─────────────────┐
//!        ▼                                   ▼
//! ┌───────────────────┐             ┌───────────────────┐
//! │ BaselineAllocator │             │ OptimalAllocator  │
//! │ (water-filling)   │             │ (greedy knapsack) │
//! └─────────┬─────────┘             └─────────┬─────────┘
//!           └─────────────────┬───────────────┘
//!                             ▼
//!                  ┌──────────────────────┐
//!                  │ AllocationComparator │
//!                  │ (lift + rationale)   │
//!                  └──────────────────────┘
//! ```
//!
//! # Determinism Guarantees
//!
//! - Allocators are pure functions of their inputs, no shared state
//! - Ranking ties break on channel id
//! - Output channel order follows input order

pub mod baseline;
pub mod comparator;
pub mod economics;
pub mod error;
pub mod fingerprint;
pub mod optimal;
pub mod plan;
pub mod scenario;
pub mod validation;


pub use baseline::BaselineAllocator;
pub use comparator::{AllocationComparator, ComparisonRow, ComparisonSummary, Rationale};
pub use economics::{resolve_channels, Channel, ChannelConfig, ChannelEconomics, SpendBounds};
pub use error::{AllocationError, BoundsIssue};
pub use fingerprint::AllocationFingerprint;
pub use optimal::OptimalAllocator;
pub use plan::{Allocation, AllocationStrategy, ChannelAllocation};
pub use scenario::{
    sweep_budgets, AllocationReport, AllocationRun, BudgetSweep, SweepPoint, MAX_SWEEP_POINTS,
};
pub use validation::{validate, AllocationProblem, ChannelSpec};

/// A budget allocation policy.
pub trait Allocator: Send + Sync {
    /// Which policy this allocator implements.
    fn strategy(&self) -> AllocationStrategy;

    /// Allocate over already-validated input.
    fn allocate_problem(&self, problem: &AllocationProblem) -> Result<Allocation, AllocationError>;

    /// Validate raw inputs, then allocate.
    fn allocate(
        &self,
        channels: &[ChannelEconomics],
        bounds: &[SpendBounds],
        total_budget: f64,
    ) -> Result<Allocation, AllocationError> {
        let problem = validate(channels, bounds, total_budget)?;
        self.allocate_problem(&problem)
    }
}
