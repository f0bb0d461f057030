use crate::datasource::{DEFAULT_SOL_PRICE_URL, FALLBACK_SOL_PRICE_USD};
use crate::domain::protocol::{account_discriminator, SOL_DECIMALS, TOKEN_DECIMALS};
use crate::domain::Wallet;
use crate::engine::CurveLayout;
use crate::execution::BuyTuning;
use solana_sdk::system_instruction::MAX_PERMITTED_DATA_LENGTH;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rpc_url: String,
    /// Signing wallet; `None` leaves the bot read-only.
    pub wallet: Option<Wallet>,
    pub position_file: String,
    pub sol_price_url: String,
    pub sol_price_fallback: f64,
    pub sol_price_timeout: Duration,
    pub poll_interval: Duration,
    pub stop_timeout: Duration,
    pub curve_layout: CurveLayout,
    pub buy_tuning: BuyTuning,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(&env_map, "PORT", 10_000u16, "must be a valid u16")?;

        let rpc_url = env_map
            .get("RPC_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let wallet = match env_map.get("PRIVATE_KEY").map(|s| s.trim()) {
            None | Some("") => None,
            Some(secret) => Some(Wallet::from_base58(secret).map_err(|e| {
                ConfigError::InvalidValue("PRIVATE_KEY".to_string(), e.to_string())
            })?),
        };

        let position_file = env_map
            .get("POSITION_FILE")
            .cloned()
            .unwrap_or_else(|| "position.json".to_string());

        let sol_price_url = env_map
            .get("SOL_PRICE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SOL_PRICE_URL.to_string());

        let sol_price_fallback = parse_or(
            &env_map,
            "SOL_PRICE_FALLBACK",
            FALLBACK_SOL_PRICE_USD,
            "must be a number",
        )?;
        if !sol_price_fallback.is_finite() || sol_price_fallback <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "SOL_PRICE_FALLBACK".to_string(),
                "must be positive".to_string(),
            ));
        }

        let sol_price_timeout = Duration::from_secs(parse_or(
            &env_map,
            "SOL_PRICE_TIMEOUT_SECS",
            10u64,
            "must be a whole number of seconds",
        )?);

        let poll_interval = Duration::from_millis(parse_or(
            &env_map,
            "POLL_INTERVAL_MS",
            5_000u64,
            "must be a whole number of milliseconds",
        )?);
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "POLL_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let stop_timeout = Duration::from_millis(parse_or(
            &env_map,
            "STOP_TIMEOUT_MS",
            2_000u64,
            "must be a whole number of milliseconds",
        )?);

        let check_discriminator = match env_map
            .get("CURVE_CHECK_DISCRIMINATOR")
            .map(|s| s.as_str())
            .unwrap_or("true")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CURVE_CHECK_DISCRIMINATOR".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let curve_layout = CurveLayout {
            discriminator: check_discriminator.then(|| account_discriminator("BondingCurve")),
            token_reserves_offset: parse_or(
                &env_map,
                "CURVE_TOKEN_RESERVES_OFFSET",
                8usize,
                "must be a byte offset",
            )?,
            sol_reserves_offset: parse_or(
                &env_map,
                "CURVE_SOL_RESERVES_OFFSET",
                16usize,
                "must be a byte offset",
            )?,
            token_decimals: parse_or(
                &env_map,
                "CURVE_TOKEN_DECIMALS",
                TOKEN_DECIMALS,
                "must be a valid u32",
            )?,
            sol_decimals: SOL_DECIMALS,
        };
        for (key, offset) in [
            ("CURVE_TOKEN_RESERVES_OFFSET", curve_layout.token_reserves_offset),
            ("CURVE_SOL_RESERVES_OFFSET", curve_layout.sol_reserves_offset),
        ] {
            if (offset as u64).saturating_add(8) > MAX_PERMITTED_DATA_LENGTH {
                return Err(ConfigError::InvalidValue(
                    key.to_string(),
                    format!(
                        "must leave room for a u64 within {} bytes",
                        MAX_PERMITTED_DATA_LENGTH
                    ),
                ));
            }
        }
        if curve_layout
            .token_reserves_offset
            .abs_diff(curve_layout.sol_reserves_offset)
            < 8
        {
            return Err(ConfigError::InvalidValue(
                "CURVE_SOL_RESERVES_OFFSET".to_string(),
                "reserve fields overlap".to_string(),
            ));
        }

        let defaults = BuyTuning::default();
        let buy_tuning = BuyTuning {
            slippage_bps: parse_or(
                &env_map,
                "SLIPPAGE_BPS",
                defaults.slippage_bps,
                "must be basis points",
            )?,
            compute_unit_limit: parse_or(
                &env_map,
                "COMPUTE_UNIT_LIMIT",
                defaults.compute_unit_limit,
                "must be a valid u32",
            )?,
            compute_unit_price: parse_or(
                &env_map,
                "COMPUTE_UNIT_PRICE",
                defaults.compute_unit_price,
                "must be micro-lamports as a valid u64",
            )?,
        };

        Ok(Config {
            port,
            rpc_url,
            wallet,
            position_file,
            sol_price_url,
            sol_price_fallback,
            sol_price_timeout,
            poll_interval,
            stop_timeout,
            curve_layout,
            buy_tuning,
        })
    }
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    reason: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), reason.to_string())),
    }
}
