use crate::order::{id::ClientOrderId, request::OrderRequestOpen};
use fxbridge_instrument::{InstrumentParams, InstrumentSpec, Side};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

/// Direction the configured slippage is applied in for a single fill.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlippageSign {
    Positive,
    Negative,
}

impl SlippageSign {
    pub fn apply(self, slippage: Decimal) -> Decimal {
        match self {
            SlippageSign::Positive => slippage,
            SlippageSign::Negative => -slippage,
        }
    }
}

/// Injectable source of [`SlippageSign`]s.
pub trait SlippageSource {
    fn next_sign(&mut self) -> SlippageSign;
}

/// [`SlippageSource`] choosing each sign uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomSlippage<R = StdRng> {
    rng: R,
}

impl RandomSlippage {
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl<R> RandomSlippage<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R> SlippageSource for RandomSlippage<R>
where
    R: Rng,
{
    fn next_sign(&mut self) -> SlippageSign {
        if self.rng.random_bool(0.5) {
            SlippageSign::Positive
        } else {
            SlippageSign::Negative
        }
    }
}

/// [`SlippageSource`] cycling through a fixed sequence of signs.
///
/// Useful for deterministic fills.
#[derive(Debug, Clone)]
pub struct ScriptedSlippage {
    signs: Vec<SlippageSign>,
    cursor: usize,
}

impl ScriptedSlippage {
    pub fn new(signs: Vec<SlippageSign>) -> Self {
        Self { signs, cursor: 0 }
    }

    pub fn always(sign: SlippageSign) -> Self {
        Self::new(vec![sign])
    }
}

impl SlippageSource for ScriptedSlippage {
    fn next_sign(&mut self) -> SlippageSign {
        let Some(sign) = self.signs.get(self.cursor % self.signs.len().max(1)) else {
            return SlippageSign::Positive;
        };
        self.cursor = self.cursor.wrapping_add(1);
        *sign
    }
}

/// Commission is quoted per 0.01 lot and converted into a fixed price offset.
const COMMISSION_PRICE_FACTOR: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Approximates a real fill price from a reference price.
#[derive(Debug, Clone)]
pub struct ExecutionSimulator<Source = RandomSlippage> {
    source: Source,
}

impl<Source> ExecutionSimulator<Source>
where
    Source: SlippageSource,
{
    pub fn new(source: Source) -> Self {
        Self { source }
    }

    /// Apply slippage of random sign, then spread (added for buys, subtracted for sells), then
    /// the commission offset, rounding the result to `precision` decimal places.
    pub fn adjust_price(
        &mut self,
        reference_price: Decimal,
        side: Side,
        params: &InstrumentParams,
        precision: u32,
    ) -> Decimal {
        let slippage = self.source.next_sign().apply(params.slippage);

        let adjusted = match side {
            Side::Buy => reference_price + params.spread + slippage,
            Side::Sell => reference_price - params.spread + slippage,
        };

        round_price(adjusted + params.commission * COMMISSION_PRICE_FACTOR, precision)
    }

    /// Construct the market [`OrderRequestOpen`] for a signal on the provided instrument,
    /// computing the simulated fill price and the stop loss & take profit levels around it.
    ///
    /// Only the fill price is rounded, the levels are exact offsets from it.
    pub fn open_request(
        &mut self,
        spec: &InstrumentSpec,
        side: Side,
        reference_price: Decimal,
        quantity: Decimal,
    ) -> OrderRequestOpen {
        let precision = spec.price_precision;
        let price_fill = self.adjust_price(reference_price, side, &spec.params, precision);

        let stop_loss_distance = spec.params.stop_loss_distance();
        let take_profit_distance = spec.params.take_profit_distance();
        let (stop_loss, take_profit) = match side {
            Side::Buy => (
                price_fill - stop_loss_distance,
                price_fill + take_profit_distance,
            ),
            Side::Sell => (
                price_fill + stop_loss_distance,
                price_fill - take_profit_distance,
            ),
        };

        debug!(
            instrument = %spec.name,
            %side,
            %reference_price,
            %price_fill,
            "simulated fill price"
        );

        OrderRequestOpen {
            cid: ClientOrderId::random(),
            instrument: spec.name.clone(),
            symbol: spec.symbol,
            currency: spec.currency.clone(),
            side,
            quantity,
            price_fill,
            stop_loss,
            take_profit,
            precision,
        }
    }
}

/// Round half away from zero to `precision` decimal places.
pub fn round_price(price: Decimal, precision: u32) -> Decimal {
    price.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}
