use std::str::FromStr;

use crate::config::PricingConfig;
use crate::error::Result;
use crate::models::{Budget, PriceAnalysis};

/// Named fraction/ceiling pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingPreset {
    /// 60% of the budget, capped at R$ 12,50
    Standard,
    /// 70% of the budget, capped at R$ 15,50
    Generous,
}

impl PricingPreset {
    pub const fn fraction(&self) -> f64 {
        match self {
            PricingPreset::Standard => 0.6,
            PricingPreset::Generous => 0.7,
        }
    }

    pub const fn ceiling(&self) -> f64 {
        match self {
            PricingPreset::Standard => 12.50,
            PricingPreset::Generous => 15.50,
        }
    }
}

impl FromStr for PricingPreset {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "default" => Ok(PricingPreset::Standard),
            "generous" => Ok(PricingPreset::Generous),
            other => Err(format!("unknown pricing preset: {other}")),
        }
    }
}

/// Budget-bounded cost estimation.
///
/// The breakdown is a fixed reference list and is not rescaled to the total.
#[derive(Debug, Clone)]
pub struct PriceEstimator {
    config: PricingConfig,
}

impl PriceEstimator {
    /// Rejects a fraction outside (0, 1] or a negative ceiling, either of which
    /// would let an estimate exceed its budget.
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Estimate the cost of a snack for `budget`.
    ///
    /// `total_cost = min(budget * fraction, ceiling)`, which never exceeds the budget.
    /// Negative or non-finite budgets are rejected.
    pub fn estimate(&self, budget: f64) -> Result<PriceAnalysis> {
        let budget = Budget::new(budget)?;
        let total_cost = (budget.amount() * self.config.fraction).min(self.config.ceiling);
        let savings = (budget.amount() - total_cost).max(0.0);
        tracing::info!(
            "Estimated R$ {:.2} of R$ {:.2} (fraction={}, ceiling={})",
            total_cost,
            budget.amount(),
            self.config.fraction,
            self.config.ceiling
        );
        Ok(PriceAnalysis {
            budget,
            total_cost,
            breakdown: self.config.breakdown.clone(),
            savings,
            vendors: self.config.vendors.clone(),
        })
    }
}

/// Saving advice shown next to the budget
pub fn savings_tip(budget: &Budget) -> &'static str {
    if budget.amount() > 30.0 {
        "Que tal usar ingredientes que já tem em casa? Pode economizar até 70%!"
    } else {
        "Ótimo orçamento! Você pode fazer um lanche delicioso e ainda sobrar dinheiro."
    }
}
