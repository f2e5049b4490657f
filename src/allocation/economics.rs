//! Channel economics and spend bounds.
//!
//! Per-channel inputs are produced upstream (uplift and survival-based LTV
//! models). This module only holds them and resolves fractional bounds into
//! absolute spend for a given budget.

use serde::{Deserialize, Serialize};

/// Channel identifier, unique within one allocation run.
pub type Channel = String;

/// Per-channel unit economics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEconomics {
    pub channel: Channel,
    /// Expected incremental lifetime value of one acquired user.
    pub incremental_ltv: f64,
    /// Average acquisition cost per user. Must be positive.
    pub avg_cost: f64,
}

impl ChannelEconomics {
    pub fn new(channel: impl Into<Channel>, incremental_ltv: f64, avg_cost: f64) -> Self {
        Self {
            channel: channel.into(),
            incremental_ltv,
            avg_cost,
        }
    }

    /// Incremental value generated per dollar of spend.
    ///
    /// Only meaningful when `avg_cost > 0`; validation rejects anything else
    /// before an allocator sees it.
    #[inline]
    pub fn value_per_dollar(&self) -> f64 {
        self.incremental_ltv / self.avg_cost
    }
}

/// Absolute spend bounds for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendBounds {
    pub channel: Channel,
    pub min_spend: f64,
    pub max_spend: f64,
}

impl SpendBounds {
    pub fn new(channel: impl Into<Channel>, min_spend: f64, max_spend: f64) -> Self {
        Self {
            channel: channel.into(),
            min_spend,
            max_spend,
        }
    }

    /// Spend that can be added above the mandatory floor.
    #[inline]
    pub fn capacity(&self) -> f64 {
        self.max_spend - self.min_spend
    }
}

/// Boundary input tuple: economics plus bounds as fractions of total budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub channel: Channel,
    pub incremental_ltv: f64,
    pub avg_cost: f64,
    #[serde(default)]
    pub min_spend_fraction: f64,
    #[serde(default = "default_max_spend_fraction")]
    pub max_spend_fraction: f64,
}

fn default_max_spend_fraction() -> f64 {
    1.0
}

impl ChannelConfig {
    pub fn new(
        channel: impl Into<Channel>,
        incremental_ltv: f64,
        avg_cost: f64,
        min_spend_fraction: f64,
        max_spend_fraction: f64,
    ) -> Self {
        Self {
            channel: channel.into(),
            incremental_ltv,
            avg_cost,
            min_spend_fraction,
            max_spend_fraction,
        }
    }

    pub fn economics(&self) -> ChannelEconomics {
        ChannelEconomics::new(self.channel.clone(), self.incremental_ltv, self.avg_cost)
    }

    pub fn bounds_for(&self, total_budget: f64) -> SpendBounds {
        SpendBounds::new(
            self.channel.clone(),
            total_budget * self.min_spend_fraction,
            total_budget * self.max_spend_fraction,
        )
    }
}

/// Resolve fractional bounds into absolute spend for `total_budget`.
///
/// Output preserves input order. No validation happens here.
pub fn resolve_channels(
    configs: &[ChannelConfig],
    total_budget: f64,
) -> (Vec<ChannelEconomics>, Vec<SpendBounds>) {
    configs
        .iter()
        .map(|c| (c.economics(), c.bounds_for(total_budget)))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_per_dollar() {
        let a = ChannelEconomics::new("a", 10.0, 2.0);
        let b = ChannelEconomics::new("b", 3.0, 1.0);
        assert_eq!(a.value_per_dollar(), 5.0);
        assert_eq!(b.value_per_dollar(), 3.0);
    }

    #[test]
    fn test_resolve_channels_scales_fractions() {
        let configs = vec![
            ChannelConfig::new("paid_search", 42.0, 12.5, 0.04, 0.40),
            ChannelConfig::new("organic", 18.0, 1.5, 0.0, 0.10),
        ];

        let (economics, bounds) = resolve_channels(&configs, 500_000.0);

        assert_eq!(economics.len(), 2);
        assert_eq!(economics[0].channel, "paid_search");
        assert_eq!(bounds[0].min_spend, 20_000.0);
        assert_eq!(bounds[0].max_spend, 200_000.0);
        assert_eq!(bounds[1].min_spend, 0.0);
        assert_eq!(bounds[1].max_spend, 50_000.0);
        assert_eq!(bounds[1].capacity(), 50_000.0);
    }

    #[test]
    fn test_channel_config_fraction_defaults() {
        let cfg: ChannelConfig = toml::from_str(
            r#"
            channel = "referral"
            incremental_ltv = 55.0
            avg_cost = 20.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.min_spend_fraction, 0.0);
        assert_eq!(cfg.max_spend_fraction, 1.0);
    }
}
