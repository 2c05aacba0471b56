//! Fixed-point money amount with two fraction digits.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A price stored as integer cents.
///
/// JSON accepts `12.5`, `12` or `"12.50"` and always renders as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

/// Lowest price a product may have.
pub const MIN_PRICE: Price = Price(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceParseError(String);

impl fmt::Display for PriceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid price '{}'", self.0)
    }
}

impl std::error::Error for PriceParseError {}

impl Price {
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || PriceParseError(raw.to_owned());
        let s = raw.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }
        // Extra fraction digits are only accepted when they are zeros.
        if frac.len() > 2 && frac[2..].bytes().any(|b| b != b'0') {
            return Err(err());
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| err())? };
        let frac_cents: i64 = match frac.get(..2).unwrap_or(frac) {
            "" => 0,
            f if f.len() == 1 => f.parse::<i64>().map_err(|_| err())? * 10,
            f => f.parse().map_err(|_| err())?,
        };
        let cents = whole.checked_mul(100).and_then(|c| c.checked_add(frac_cents)).ok_or_else(err)?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal price as number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        v.checked_mul(100).map(Price).ok_or_else(|| E::custom("price out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Price)
            .ok_or_else(|| E::custom("price out of range"))
    }

    /// Goes through the shortest decimal text of `v`, so `10.005` is rejected like `"10.005"`.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        if !v.is_finite() {
            return Err(E::custom("price out of range"));
        }
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }
}
