use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce any JSON value into an amount. Anything that is not a number, or a
/// string holding one, becomes zero.
pub fn parse_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_text(&n.to_string())
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or_default(),
        Value::String(s) => parse_text(s).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

fn parse_text(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// serde adapter for [`parse_amount`]; pair with `#[serde(default)]` so a
/// missing field is zero too.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(parse_amount).unwrap_or_default())
}
