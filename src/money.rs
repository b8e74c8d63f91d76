//! Fixed-point monetary amounts and fee rates.
//!
//! Amounts are stored as `i64` millionths so that a one-decimal percentage fee
//! applied to a three-decimal amount is exact. Display always rounds to three
//! fractional digits.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Why a decimal literal could not become [`Money`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount '{0}'")]
    Malformed(String),

    #[error("amount '{0}' is out of range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const SCALE: i64 = 1_000_000; // 6 decimal places
    pub const TARGET_DECIMALS: u32 = 6;
    pub const DISPLAY_DECIMALS: u32 = 3;
    pub const ZERO: Money = Money(0);

    /// Raw millionths
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole currency units, e.g. `Money::from_units(100)` is `$100.000`.
    ///
    /// # Panics
    ///
    /// Panics if `units` does not fit at the stored precision (about
    /// ±9.2 trillion). Use [`Money::checked_from_units`] for untrusted input.
    pub fn from_units(units: i64) -> Self {
        match Self::checked_from_units(units) {
            Some(money) => money,
            None => panic!("{} units overflow Money", units),
        }
    }

    pub fn checked_from_units(units: i64) -> Option<Self> {
        units.checked_mul(Self::SCALE).map(Self)
    }

    /// Get raw millionths
    pub fn as_minor(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// The fee charged on this amount at `rate`, rounded half-to-even at the
    /// stored precision.
    pub fn fee_at(self, rate: FeeRate) -> Option<Money> {
        // amount * tenths / 1000 == amount * percent / 100
        let value = i128::from(self.0) * i128::from(rate.tenths());
        Money::from_scaled_i128(value, Self::TARGET_DECIMALS + 3)
    }

    /// The amount left after taking the fee at `rate`.
    pub fn net_of_fee(self, rate: FeeRate) -> Option<Money> {
        self.checked_sub(self.fee_at(rate)?)
    }

    pub fn from_scaled_i128(value: i128, scale: u32) -> Option<Self> {
        if scale == Self::TARGET_DECIMALS {
            return i64::try_from(value).ok().map(Self);
        }
        if scale < Self::TARGET_DECIMALS {
            let factor = 10i128.checked_pow(Self::TARGET_DECIMALS - scale)?;
            let widened = value.checked_mul(factor)?;
            return i64::try_from(widened).ok().map(Self);
        }
        // scale > TARGET_DECIMALS: need rounding
        let factor = 10i128.checked_pow(scale - Self::TARGET_DECIMALS)?;
        let div = value / factor; // truncated toward zero
        let rem = value % factor;
        let half = factor / 2;
        let abs_rem = rem.abs();
        let mut adjusted = div;
        if abs_rem > half || (abs_rem == half && div & 1 != 0) {
            // tie -> bankers (round half to even)
            adjusted += if value.is_negative() { -1 } else { 1 };
        }
        i64::try_from(adjusted).ok().map(Self)
    }

    /// Parse a plain decimal literal (`"12"`, `"-0.5"`, `".25"`).
    ///
    /// Digits beyond the stored precision are rounded half-to-even, however
    /// many there are. A well-formed literal whose value does not fit is
    /// [`AmountError::OutOfRange`], not [`AmountError::Malformed`].
    pub fn parse_decimal(s: &str) -> Result<Self, AmountError> {
        let literal = s.trim();
        let malformed = || AmountError::Malformed(literal.to_string());
        let out_of_range = || AmountError::OutOfRange(literal.to_string());

        let (neg, body) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal),
        };
        let (int_part, frac) = match body.split_once('.') {
            Some((int_part, frac)) => (int_part, frac),
            None => (body, ""),
        };
        if int_part.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !int_part.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        // One guard digit plus a sticky digit keep half-to-even exact.
        let keep = Self::TARGET_DECIMALS as usize + 1;
        let frac: String = if frac.len() > keep + 1 {
            let sticky = frac[keep..].bytes().any(|b| b != b'0');
            format!("{}{}", &frac[..keep], if sticky { '1' } else { '0' })
        } else {
            frac.to_string()
        };

        let int_val: i128 = match int_part.trim_start_matches('0') {
            "" => 0,
            digits => digits.parse().map_err(|_| out_of_range())?,
        };
        let scale = frac.len() as u32;
        let raw = if frac.is_empty() {
            int_val
        } else {
            let frac_val: i128 = frac.parse().map_err(|_| malformed())?;
            int_val
                .checked_mul(10i128.pow(scale))
                .and_then(|v| v.checked_add(frac_val))
                .ok_or_else(out_of_range)?
        };
        let signed = if neg { -raw } else { raw };
        Money::from_scaled_i128(signed, scale).ok_or_else(out_of_range)
    }

    pub fn from_decimal_str(s: &str) -> Option<Self> {
        Money::parse_decimal(s).ok()
    }

    /// Three-digit rendering without the currency prefix, rounding half away
    /// from zero.
    pub fn to_display_string(&self) -> String {
        let step = i128::from(Self::SCALE / 10i64.pow(Self::DISPLAY_DECIMALS));
        let abs = i128::from(self.0).abs();
        let rounded = (abs + step / 2) / step;
        let unit = 10i128.pow(Self::DISPLAY_DECIMALS);
        let sign = if self.0 < 0 && rounded != 0 { "-" } else { "" };
        format!("{}{}.{:03}", sign, rounded / unit, rounded % unit)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "${}", self.to_display_string())
    }
}

impl FromStr for Money {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_decimal(s)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_display_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::parse_decimal(&s).map_err(serde::de::Error::custom)
    }
}

/// Percentage fee in tenths of a percent (`15` is 1.5%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeeRate(u32);

impl FeeRate {
    pub const fn from_tenths(tenths: u32) -> Self {
        FeeRate(tenths)
    }

    /// Get rate in tenths of a percent
    pub fn tenths(&self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for FeeRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for FeeRate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
