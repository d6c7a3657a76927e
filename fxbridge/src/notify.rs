use crate::config::TelegramConfig;
use fxbridge_execution::{PositionExited, order::request::OrderRequestOpen, round_price};
use rust_decimal::Decimal;
use serde::Serialize;
use smol_str::SmolStr;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};
use tracing::{debug, info, warn};

/// Decimal places the realised pips are reported with.
const PIPS_PRECISION: u32 = 1;

/// Best-effort delivery of a human readable message.
///
/// Delivery never blocks the caller and failures are logged and swallowed.
pub trait Notifier
where
    Self: Debug + Send + Sync,
{
    fn notify(&self, message: String);
}

/// Construct the configured [`Notifier`], falling back to the [`LogNotifier`].
pub fn notifier(config: Option<&TelegramConfig>) -> Arc<dyn Notifier> {
    match config {
        Some(config) => Arc::new(TelegramNotifier::new(config)),
        None => Arc::new(LogNotifier),
    }
}

/// [`Notifier`] that only logs each message.
#[derive(Debug, Copy, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: String) {
        info!(%message, "notification");
    }
}

/// [`Notifier`] posting Markdown messages to a Telegram chat via the bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    url: String,
    chat_id: SmolStr,
}

impl Debug for TelegramNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct SendMessage {
    chat_id: SmolStr,
    text: String,
    parse_mode: &'static str,
}

impl TelegramNotifier {
    pub const BASE_URL: &'static str = "https://api.telegram.org";

    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/bot{}/sendMessage", Self::BASE_URL, config.bot_token),
            chat_id: config.chat_id.clone(),
        }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, message: String) {
        let request = self.client.post(&self.url).json(&SendMessage {
            chat_id: self.chat_id.clone(),
            text: message,
            parse_mode: "Markdown",
        });

        tokio::spawn(async move {
            match request.send().await.and_then(|response| response.error_for_status()) {
                Ok(response) => debug!(status = %response.status(), "telegram message sent"),
                Err(error) => warn!(?error, "failed to send telegram message"),
            }
        });
    }
}

/// Format a price with the provided number of decimal places, rounding half away from zero.
fn format_decimal(value: Decimal, precision: u32) -> String {
    format!("{:.*}", precision as usize, round_price(value, precision))
}

/// Message announcing a submitted order, eg/ `*GBP_JPY Signal*\nBUY\nEntry: ...\nSL: ...\nTP: ...`
pub fn signal_message(request: &OrderRequestOpen) -> String {
    format!(
        "*{} Signal*\n{}\nEntry: {}\nSL: {}\nTP: {}",
        request.instrument,
        request.side,
        format_decimal(request.price_fill, request.precision),
        format_decimal(request.stop_loss, request.precision),
        format_decimal(request.take_profit, request.precision),
    )
}

/// Message announcing a closed position, eg/ `*GBP_JPY Closed*\nBUY\n...\nPips: -49.0`
pub fn exit_message(exited: &PositionExited) -> String {
    let position = &exited.position;
    format!(
        "*{} Closed*\n{}\nEntry: {}\nExit: {} ({})\nPips: {}",
        position.instrument,
        position.side,
        format_decimal(position.entry_price, position.precision),
        format_decimal(exited.price_exit, position.precision),
        exited.reason,
        format_decimal(exited.pips, PIPS_PRECISION),
    )
}
