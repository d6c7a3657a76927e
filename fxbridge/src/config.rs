use chrono::TimeDelta;
use fxbridge_data::BarConfig;
use fxbridge_instrument::{InstrumentRegistry, InstrumentSpec, RegistryError};
use fxbridge_integration::protocol::fix::{FIX_4_4, SessionHeader};
use fxbridge_strategy::TradingHours;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{
    fmt::{Debug, Formatter},
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

/// Environment variable consulted for the config path when no CLI argument is provided.
pub const CONFIG_PATH_ENV: &str = "FXBRIDGE_CONFIG";

/// Config path used when neither a CLI argument nor [`CONFIG_PATH_ENV`] is provided.
pub const DEFAULT_CONFIG_PATH: &str = "fxbridge.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {error}")]
    Read {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid instruments: {0}")]
    Registry(#[from] RegistryError),
}

/// Top-level configuration for the quote & trade sessions, instruments and strategy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SystemConfig {
    #[serde(default = "default_begin_string")]
    pub begin_string: SmolStr,

    pub quote: SessionConfig,

    pub trade: SessionConfig,

    /// HeartBtInt (108) sent on logon, also the outbound heartbeat cadence.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    pub instruments: Vec<InstrumentSpec>,

    #[serde(default)]
    pub trading_hours: TradingHours,

    /// OrderQty (38) of every New Order Single.
    #[serde(default = "default_order_quantity")]
    pub order_quantity: Decimal,

    #[serde(default)]
    pub telegram: Option<TelegramConfig>,

    #[serde(default)]
    pub timing: TimingConfig,
}

fn default_begin_string() -> SmolStr {
    SmolStr::new_static(FIX_4_4)
}

fn default_heartbeat_interval_secs() -> u64 {
    10
}

fn default_order_quantity() -> Decimal {
    fxbridge_execution::order::request::DEFAULT_ORDER_QUANTITY
}

/// Gateway address & credentials of a single FIX session.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub sender_comp_id: SmolStr,
    pub target_comp_id: SmolStr,
    pub sender_sub_id: SmolStr,
    /// Username (553).
    #[serde(alias = "username")]
    pub account: SmolStr,
    /// Password (554).
    pub password: SmolStr,
}

impl Debug for SessionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender_comp_id", &self.sender_comp_id)
            .field("target_comp_id", &self.target_comp_id)
            .field("sender_sub_id", &self.sender_sub_id)
            .field("account", &self.account)
            .field("password", &"****")
            .finish()
    }
}

impl SessionConfig {
    pub fn header(&self, begin_string: &SmolStr) -> SessionHeader {
        SessionHeader {
            begin_string: begin_string.clone(),
            sender_comp_id: self.sender_comp_id.clone(),
            target_comp_id: self.target_comp_id.clone(),
            sender_sub_id: self.sender_sub_id.clone(),
        }
    }

    fn validate(&self, role: &str) -> Result<(), ConfigError> {
        let required = [
            ("host", self.host.as_str()),
            ("sender_comp_id", self.sender_comp_id.as_str()),
            ("target_comp_id", self.target_comp_id.as_str()),
            ("sender_sub_id", self.sender_sub_id.as_str()),
            ("account", self.account.as_str()),
            ("password", self.password.as_str()),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(ConfigError::Invalid(format!(
                "{role} session {field} must not be empty"
            ))),
            None if self.port == 0 => Err(ConfigError::Invalid(format!(
                "{role} session port must not be 0"
            ))),
            None => Ok(()),
        }
    }
}

/// Telegram bot used to deliver signal & exit notifications.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub bot_token: SmolStr,
    pub chat_id: SmolStr,
}

impl Debug for TelegramConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"****")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Timeouts, cadences & bar windowing, all in seconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub reconnect_backoff_secs: u64,
    /// Quote session heartbeat check cadence.
    pub quote_tick_secs: u64,
    /// Quote session bar rolling, signal detection & exit check cadence.
    pub quote_process_secs: u64,
    /// Trade session heartbeat check & dispatch queue drain cadence.
    pub trade_tick_secs: u64,
    pub exit_poll_secs: u64,
    pub bar_width_secs: u64,
    pub bar_history: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            read_timeout_secs: 15,
            reconnect_backoff_secs: 5,
            quote_tick_secs: 1,
            quote_process_secs: 60,
            trade_tick_secs: 5,
            exit_poll_secs: 1,
            bar_width_secs: 4 * 60 * 60,
            bar_history: 3,
        }
    }
}

impl TimingConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    pub fn quote_tick(&self) -> Duration {
        Duration::from_secs(self.quote_tick_secs)
    }

    pub fn quote_process(&self) -> Duration {
        Duration::from_secs(self.quote_process_secs)
    }

    pub fn trade_tick(&self) -> Duration {
        Duration::from_secs(self.trade_tick_secs)
    }

    pub fn exit_poll(&self) -> Duration {
        Duration::from_secs(self.exit_poll_secs)
    }

    pub fn bar_config(&self) -> BarConfig {
        BarConfig {
            width: i64::try_from(self.bar_width_secs)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .unwrap_or_else(TimeDelta::zero),
            history: self.bar_history,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let cadences = [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("read_timeout_secs", self.read_timeout_secs),
            ("quote_tick_secs", self.quote_tick_secs),
            ("quote_process_secs", self.quote_process_secs),
            ("trade_tick_secs", self.trade_tick_secs),
            ("exit_poll_secs", self.exit_poll_secs),
            ("bar_width_secs", self.bar_width_secs),
        ];

        if let Some((field, _)) = cadences.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::Invalid(format!("timing {field} must be positive")));
        }

        self.bar_config()
            .validate()
            .map(|_| ())
            .map_err(|error| ConfigError::Invalid(error.to_string()))
    }
}

impl SystemConfig {
    /// Resolve the config path from the first CLI argument, else [`CONFIG_PATH_ENV`], else
    /// [`DEFAULT_CONFIG_PATH`].
    pub fn path<Args>(mut args: Args) -> PathBuf
    where
        Args: Iterator<Item = String>,
    {
        args.nth(1)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH))
            .into()
    }

    /// Read, parse & [`validate`](Self::validate) the JSON config at the provided path.
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;

        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str::<Self>(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that could never produce a working system, before any session starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.begin_string.trim().is_empty() {
            return Err(ConfigError::Invalid(String::from(
                "begin_string must not be empty",
            )));
        }

        self.quote.validate("quote")?;
        self.trade.validate("trade")?;

        if self.heartbeat_interval_secs == 0 {
            return Err(ConfigError::Invalid(String::from(
                "heartbeat_interval_secs must be positive",
            )));
        }

        if self.order_quantity <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "order_quantity must be positive, found: {}",
                self.order_quantity
            )));
        }

        for spec in &self.instruments {
            if spec.params.pip_value <= Decimal::ZERO {
                return Err(ConfigError::Invalid(format!(
                    "{} pip_value must be positive, found: {}",
                    spec.name, spec.params.pip_value
                )));
            }
        }

        self.trading_hours
            .validate()
            .map_err(|error| ConfigError::Invalid(error.to_string()))?;

        self.timing.validate()?;

        self.registry().map(|_| ())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Construct the [`InstrumentRegistry`], rejecting zero instruments & duplicate names or
    /// symbol ids.
    pub fn registry(&self) -> Result<InstrumentRegistry, ConfigError> {
        InstrumentRegistry::new(self.instruments.iter().cloned()).map_err(ConfigError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "quote": {
            "host": "demo-uk-eqx-01.p.c-trader.com",
            "port": 5211,
            "sender_comp_id": "demo.broker.1234",
            "target_comp_id": "cServer",
            "sender_sub_id": "QUOTE",
            "account": "1234",
            "password": "secret"
        },
        "trade": {
            "host": "demo-uk-eqx-01.p.c-trader.com",
            "port": 5212,
            "sender_comp_id": "demo.broker.1234",
            "target_comp_id": "cServer",
            "sender_sub_id": "TRADE",
            "username": "1234",
            "password": "secret"
        },
        "instruments": [
            {
                "name": "GBP_JPY",
                "symbol": 7,
                "params": {
                    "tolerance": 29.8,
                    "sl_pips": 49.01,
                    "tp_pips": 149.35,
                    "pip_value": 0.01,
                    "slippage": 0.02,
                    "spread": 0.02,
                    "commission": 0.5
                }
            }
        ]
    }"#;

    #[test]
    fn test_system_config_from_json_defaults() {
        let config = SystemConfig::from_json(CONFIG).unwrap();

        assert_eq!(config.begin_string, "FIX.4.4");
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(10));
        assert_eq!(config.order_quantity, Decimal::new(1, 2));
        assert_eq!(config.trading_hours, TradingHours::default());
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.timing.bar_config(), BarConfig::default());
        assert_eq!(config.trade.account, "1234");
        assert!(config.telegram.is_none());
        assert_eq!(config.registry().unwrap().len(), 1);
    }

    #[test]
    fn test_system_config_validate() {
        struct TestCase {
            mutate: fn(&mut SystemConfig),
            expected_ok: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: valid
                mutate: |_| {},
                expected_ok: true,
            },
            TestCase {
                // TC1: empty quote password
                mutate: |config| config.quote.password = SmolStr::default(),
                expected_ok: false,
            },
            TestCase {
                // TC2: empty trade host
                mutate: |config| config.trade.host = String::from(" "),
                expected_ok: false,
            },
            TestCase {
                // TC3: zero instruments
                mutate: |config| config.instruments.clear(),
                expected_ok: false,
            },
            TestCase {
                // TC4: duplicate instrument
                mutate: |config| {
                    let duplicate = config.instruments[0].clone();
                    config.instruments.push(duplicate);
                },
                expected_ok: false,
            },
            TestCase {
                // TC5: non-positive pip value
                mutate: |config| config.instruments[0].params.pip_value = Decimal::ZERO,
                expected_ok: false,
            },
            TestCase {
                // TC6: out of range trading hours
                mutate: |config| config.trading_hours.start_hour = 24,
                expected_ok: false,
            },
            TestCase {
                // TC7: zero heartbeat interval
                mutate: |config| config.heartbeat_interval_secs = 0,
                expected_ok: false,
            },
            TestCase {
                // TC8: bar history too short
                mutate: |config| config.timing.bar_history = 1,
                expected_ok: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut config = serde_json::from_str::<SystemConfig>(CONFIG).unwrap();
            (test.mutate)(&mut config);
            assert_eq!(config.validate().is_ok(), test.expected_ok, "TC{} failed", index);
        }
    }

    #[test]
    fn test_system_config_path() {
        let args = ["fxbridge", "/etc/fxbridge/live.json"].map(String::from);
        assert_eq!(
            SystemConfig::path(args.into_iter()),
            PathBuf::from("/etc/fxbridge/live.json")
        );
    }

    #[test]
    fn test_session_config_debug_masks_password() {
        let config = SystemConfig::from_json(CONFIG).unwrap();
        let debug = format!("{:?}", config.quote);

        assert!(!debug.contains("secret"));
        assert!(debug.contains("****"));
    }
}
