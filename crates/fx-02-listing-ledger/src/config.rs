//! # Marketplace Configuration
//!
//! Listing rules, fee rate and record limits. Loaded from environment
//! variables with defaults for everything except the two identities.
//!
//! `MIN_PRICE_WEI` and `MIN_DURATION_SECS` are defaults. A deployment may
//! lower either floor but never switch it off: zero is rejected.

use crate::domain::fractions::FractionLimits;
use crate::domain::value_objects::{
    Address, FEE_DIVISOR, MIN_DURATION_SECS, MIN_PRICE_WEI, U256,
};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    /// A variable could not be parsed.
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    /// A loaded value breaks a configuration rule.
    #[error("invalid configuration: {0}")]
    Rule(&'static str),
}

/// Marketplace configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketplaceConfig {
    /// Address the asset registry sees as the operator moving listed assets.
    pub registry_address: Address,
    /// Identity allowed to withdraw platform fees. Fixed after construction.
    pub admin: Address,
    /// Minimum listing price in wei. Must be positive.
    pub min_price: U256,
    /// Minimum seconds between creation and deadline. Must be positive.
    pub min_duration_secs: u64,
    /// Fee is `value / fee_divisor`.
    pub fee_divisor: u64,
    /// Most shares one `create_fractions` call may mint.
    pub max_shares_per_mint: u64,
    /// Most fraction records one listing may accumulate.
    pub max_fraction_records: u64,
}

impl MarketplaceConfig {
    /// Default rules for the given identities.
    #[must_use]
    pub fn new(registry_address: Address, admin: Address) -> Self {
        let limits = FractionLimits::default();
        Self {
            registry_address,
            admin,
            min_price: U256::from(MIN_PRICE_WEI),
            min_duration_secs: MIN_DURATION_SECS,
            fee_divisor: FEE_DIVISOR,
            max_shares_per_mint: limits.max_shares_per_mint,
            max_fraction_records: limits.max_fraction_records,
        }
    }

    /// Loads configuration from `FX_*` environment variables.
    ///
    /// `FX_REGISTRY_ADDRESS` and `FX_ADMIN` are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let registry_address = required::<Address>("FX_REGISTRY_ADDRESS")?;
        let admin = required::<Address>("FX_ADMIN")?;
        let mut config = Self::new(registry_address, admin);

        if let Some(raw) = optional("FX_MIN_PRICE_WEI") {
            config.min_price = U256::from_dec_str(raw.trim()).map_err(|_| ConfigError::Invalid {
                name: "FX_MIN_PRICE_WEI",
                value: raw.clone(),
            })?;
        }
        if let Some(value) = parsed::<u64>("FX_MIN_DURATION_SECS")? {
            config.min_duration_secs = value;
        }
        if let Some(value) = parsed::<u64>("FX_FEE_DIVISOR")? {
            config.fee_divisor = value;
        }
        if let Some(value) = parsed::<u64>("FX_MAX_SHARES_PER_MINT")? {
            config.max_shares_per_mint = value;
        }
        if let Some(value) = parsed::<u64>("FX_MAX_FRACTION_RECORDS")? {
            config.max_fraction_records = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.is_zero() {
            return Err(ConfigError::Rule("admin must not be the zero address"));
        }
        if self.registry_address.is_zero() {
            return Err(ConfigError::Rule(
                "registry address must not be the zero address",
            ));
        }
        if self.min_price.is_zero() {
            return Err(ConfigError::Rule("minimum price must be positive"));
        }
        if self.min_duration_secs == 0 {
            return Err(ConfigError::Rule("minimum listing duration must be positive"));
        }
        if self.fee_divisor == 0 {
            return Err(ConfigError::Rule("fee divisor must be positive"));
        }
        if self.max_shares_per_mint == 0 || self.max_fraction_records == 0 {
            return Err(ConfigError::Rule("fraction limits must be positive"));
        }
        Ok(())
    }

    /// Record limits for the fraction ledger.
    #[must_use]
    pub fn fraction_limits(&self) -> FractionLimits {
        FractionLimits {
            max_shares_per_mint: self.max_shares_per_mint,
            max_fraction_records: self.max_fraction_records,
        }
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    optional(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid { name, value: raw })
        })
        .transpose()
}

fn required<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    parsed(name)?.ok_or(ConfigError::Missing(name))
}
