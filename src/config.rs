use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ChefError, Result};
use crate::models::PriceItem;
use crate::pricing::PricingPreset;

/// Main configuration structure for the snack assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assistant: AssistantConfig,
    pub pricing: PricingConfig,
    pub catalog: CatalogConfig,
    pub matcher: MatcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub name: String,
    /// Pause before each agent reply, in milliseconds. Zero disables it.
    pub thinking_delay_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Chef Inteligente da Maju".to_string(),
            thinking_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Share of the budget the estimate may use (0.0-1.0)
    pub fraction: f64,
    /// Absolute cap on the estimate
    pub ceiling: f64,
    /// Named fraction/ceiling pair; applied after every other override
    pub preset: Option<String>,
    pub breakdown: Vec<PriceItem>,
    pub vendors: Vec<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fraction: PricingPreset::Standard.fraction(),
            ceiling: PricingPreset::Standard.ceiling(),
            preset: None,
            breakdown: vec![
                PriceItem::new("Pão integral", 4.50),
                PriceItem::new("Queijo branco", 6.00),
                PriceItem::new("Tomate", 2.00),
            ],
            vendors: vec![
                "Atacadão".to_string(),
                "Feira do bairro".to_string(),
                "Mercado Dia".to_string(),
            ],
        }
    }
}

impl PricingConfig {
    /// Holds whenever an estimate could exceed the budget it was given
    pub fn validate(&self) -> Result<()> {
        if !(self.fraction > 0.0 && self.fraction <= 1.0) {
            return Err(ChefError::Config(format!(
                "pricing.fraction must be in (0.0, 1.0], got {}",
                self.fraction
            )));
        }
        if !self.ceiling.is_finite() || self.ceiling < 0.0 {
            return Err(ChefError::Config(format!(
                "pricing.ceiling must be a non-negative amount, got {}",
                self.ceiling
            )));
        }
        if let Some(item) = self
            .breakdown
            .iter()
            .find(|i| !i.price.is_finite() || i.price < 0.0)
        {
            return Err(ChefError::Config(format!(
                "pricing.breakdown item '{}' has invalid price {}",
                item.item, item.price
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// YAML recipe file; the built-in catalog is used when unset
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Seed for the fallback recipe picker; entropy-seeded when unset
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = [".env", "../.env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path = env::var("CHEF_CONFIG_PATH").unwrap_or_else(|_| "chef.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match Self::from_yaml_str(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        // Preset goes last so it wins over explicit fraction/ceiling values
        config.apply_pricing_preset();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - falling back to default pricing", e);
            config.repair_pricing();
        }

        config
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key/value source (the process environment in production)
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("CHEF_ASSISTANT_NAME") {
            self.assistant.name = name;
        }
        if let Some(delay) = lookup("CHEF_THINKING_DELAY_MS") {
            if let Ok(ms) = delay.parse() {
                self.assistant.thinking_delay_ms = ms;
            }
        }

        if let Some(fraction) = lookup("CHEF_PRICING_FRACTION") {
            if let Ok(v) = fraction.parse() {
                self.pricing.fraction = v;
            }
        }
        if let Some(ceiling) = lookup("CHEF_PRICING_CEILING") {
            if let Ok(v) = ceiling.parse() {
                self.pricing.ceiling = v;
            }
        }
        if let Some(preset) = lookup("CHEF_PRICING_PRESET") {
            self.pricing.preset = Some(preset);
        }

        if let Some(path) = lookup("CHEF_CATALOG_PATH") {
            self.catalog.path = Some(path);
        }
        if let Some(seed) = lookup("CHEF_RNG_SEED") {
            if let Ok(v) = seed.parse() {
                self.matcher.seed = Some(v);
            }
        }
    }

    fn apply_pricing_preset(&mut self) {
        if let Some(ref raw) = self.pricing.preset {
            match raw.parse::<PricingPreset>() {
                Ok(preset) => {
                    self.pricing.fraction = preset.fraction();
                    self.pricing.ceiling = preset.ceiling();
                    tracing::info!(
                        "Applied pricing preset '{}': fraction={}, ceiling={}",
                        raw,
                        self.pricing.fraction,
                        self.pricing.ceiling
                    );
                }
                Err(e) => {
                    tracing::warn!("{} - keeping fraction/ceiling as configured", e);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.pricing.validate()
    }

    /// Reset only the pricing values that fail validation
    fn repair_pricing(&mut self) {
        let defaults = PricingConfig::default();
        self.pricing.fraction = defaults.fraction;
        self.pricing.ceiling = defaults.ceiling;
        if let Err(e) = self.pricing.validate() {
            tracing::warn!("{} - falling back to the default breakdown", e);
            self.pricing.breakdown = defaults.breakdown;
        }
    }

    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.assistant.thinking_delay_ms)
    }
}
