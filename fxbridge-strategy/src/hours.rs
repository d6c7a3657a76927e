use crate::error::StrategyError;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// UTC hour range `[start_hour, end_hour)` in which no new signals are generated.
///
/// A range where `start_hour > end_hour` wraps past midnight, eg/ 22..2. Equal hours disable
/// the restriction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct TradingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            start_hour: 21,
            end_hour: 23,
        }
    }
}

impl TradingHours {
    pub fn validate(self) -> Result<Self, StrategyError> {
        if self.start_hour > 23 || self.end_hour > 24 {
            return Err(StrategyError::TradingHours(format!(
                "hours out of range: {}..{}",
                self.start_hour, self.end_hour
            )));
        }
        Ok(self)
    }

    pub fn is_restricted(&self, time: DateTime<Utc>) -> bool {
        let hour = time.hour();
        match self.start_hour.cmp(&self.end_hour) {
            std::cmp::Ordering::Less => self.start_hour <= hour && hour < self.end_hour,
            std::cmp::Ordering::Greater => hour >= self.start_hour || hour < self.end_hour,
            std::cmp::Ordering::Equal => false,
        }
    }

    pub fn is_trading_allowed(&self, time: DateTime<Utc>) -> bool {
        !self.is_restricted(time)
    }
}
