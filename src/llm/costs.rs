//! Per-token pricing for known models (USD).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Per-million-token prices: (model prefix, input, output).
///
/// Longer prefixes must come first so `gpt-4o-mini` does not match `gpt-4o`.
const PRICES_PER_MILLION: &[(&str, Decimal, Decimal)] = &[
    ("gpt-4o-mini", dec!(0.15), dec!(0.60)),
    ("gpt-4o", dec!(2.50), dec!(10.00)),
    ("gpt-4.1-mini", dec!(0.40), dec!(1.60)),
    ("gpt-4.1", dec!(2.00), dec!(8.00)),
    ("claude-3-5-haiku", dec!(0.80), dec!(4.00)),
    ("claude-3-5-sonnet", dec!(3.00), dec!(15.00)),
    ("claude-sonnet-4", dec!(3.00), dec!(15.00)),
    ("claude-opus-4", dec!(15.00), dec!(75.00)),
];

/// Look up (input, output) cost per token for a model.
///
/// Unknown models cost zero; usage is still reported.
pub fn model_cost(model: &str) -> (Decimal, Decimal) {
    PRICES_PER_MILLION
        .iter()
        .find(|(prefix, _, _)| model.starts_with(prefix))
        .map(|(_, input, output)| (*input / dec!(1_000_000), *output / dec!(1_000_000)))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO))
}
