//! Allocation error taxonomy.
//!
//! Every error is terminal for the run that produced it. No partial
//! allocation is ever returned alongside an error.

use serde::Serialize;

/// A single problem found while validating allocation inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BoundsIssue {
    /// `min_spend > max_spend` for a channel.
    MinExceedsMax {
        channel: String,
        min_spend: f64,
        max_spend: f64,
    },
    /// `avg_cost <= 0`, value per dollar is undefined.
    NonPositiveCost { channel: String, avg_cost: f64 },
    /// Incremental LTV below zero.
    NegativeLtv { channel: String, incremental_ltv: f64 },
    /// A spend bound below zero.
    NegativeSpend { channel: String, min_spend: f64 },
    /// NaN or infinite value in a channel's inputs.
    NonFiniteInput { channel: String, field: &'static str },
    /// Channel id appears more than once.
    DuplicateChannel { channel: String },
    /// Economics were supplied but no bounds.
    MissingBounds { channel: String },
    /// Bounds were supplied for a channel with no economics.
    UnknownChannel { channel: String },
    /// Total budget is negative or not finite.
    InvalidBudget { total_budget: f64 },
}

impl std::fmt::Display for BoundsIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinExceedsMax {
                channel,
                min_spend,
                max_spend,
            } => write!(
                f,
                "{}: min_spend {:.2} exceeds max_spend {:.2}",
                channel, min_spend, max_spend
            ),
            Self::NonPositiveCost { channel, avg_cost } => {
                write!(f, "{}: avg_cost {} must be positive", channel, avg_cost)
            }
            Self::NegativeLtv {
                channel,
                incremental_ltv,
            } => write!(
                f,
                "{}: incremental_ltv {} must be non-negative",
                channel, incremental_ltv
            ),
            Self::NegativeSpend { channel, min_spend } => {
                write!(f, "{}: min_spend {:.2} must be non-negative", channel, min_spend)
            }
            Self::NonFiniteInput { channel, field } => {
                write!(f, "{}: {} is not a finite number", channel, field)
            }
            Self::DuplicateChannel { channel } => write!(f, "{}: duplicate channel", channel),
            Self::MissingBounds { channel } => write!(f, "{}: no spend bounds supplied", channel),
            Self::UnknownChannel { channel } => {
                write!(f, "{}: bounds supplied for unknown channel", channel)
            }
            Self::InvalidBudget { total_budget } => {
                write!(f, "total budget {} must be a non-negative number", total_budget)
            }
        }
    }
}

/// Errors raised by the allocators and the comparator.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationError {
    /// Mandatory minimum spend cannot be covered by the budget.
    InfeasibleBudget {
        required_min_spend: f64,
        total_budget: f64,
    },
    /// Inputs failed validation. Carries every issue found in one pass.
    InvalidBounds { issues: Vec<BoundsIssue> },
    /// Two allocations were computed over different channel sets.
    ChannelSetMismatch {
        missing_from_baseline: Vec<String>,
        missing_from_optimal: Vec<String>,
    },
}

impl AllocationError {
    /// True for errors caused by caller input rather than by pairing results.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InfeasibleBudget { .. } | Self::InvalidBounds { .. })
    }
}

impl std::fmt::Display for AllocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InfeasibleBudget {
                required_min_spend,
                total_budget,
            } => write!(
                f,
                "Infeasible budget: minimum spend {:.2} exceeds total budget {:.2}",
                required_min_spend, total_budget
            ),
            Self::InvalidBounds { issues } => {
                write!(f, "Invalid allocation inputs ({} issue(s))", issues.len())?;
                for issue in issues {
                    write!(f, "; {}", issue)?;
                }
                Ok(())
            }
            Self::ChannelSetMismatch {
                missing_from_baseline,
                missing_from_optimal,
            } => write!(
                f,
                "Channel set mismatch: missing from baseline {:?}, missing from optimal {:?}",
                missing_from_baseline, missing_from_optimal
            ),
        }
    }
}

impl std::error::Error for AllocationError {}
