// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-point decimal used for both native big decimals and the structured
//! `DECIMAL(p, s)` column type.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Largest supported precision (digits).
pub const MAX_PRECISION: u8 = 38;

/// Signed fixed-point number: `unscaled * 10^-scale`.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    unscaled: i128,
    scale: u8,
}

fn pow10(exp: u8) -> Option<i128> {
    10i128.checked_pow(u32::from(exp))
}

impl Decimal {
    /// Build from an unscaled integer and a scale.
    pub const fn new(unscaled: i128, scale: u8) -> Self {
        Self { unscaled, scale }
    }

    /// Integral decimal (scale 0).
    pub const fn from_i128(value: i128) -> Self {
        Self::new(value, 0)
    }

    /// Unscaled integer.
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// Number of fractional digits.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Number of significant digits of the unscaled value (at least 1).
    pub fn precision(&self) -> u8 {
        let mut digits = 1u8;
        let mut rest = self.unscaled.unsigned_abs() / 10;
        while rest > 0 {
            digits += 1;
            rest /= 10;
        }
        digits
    }

    /// Change the scale, rounding half away from zero when digits are dropped.
    /// Returns `None` if the result does not fit in 128 bits.
    pub fn rescale(&self, scale: u8) -> Option<Self> {
        match scale.cmp(&self.scale) {
            Ordering::Equal => Some(*self),
            Ordering::Greater => {
                let factor = pow10(scale - self.scale)?;
                Some(Self::new(self.unscaled.checked_mul(factor)?, scale))
            }
            Ordering::Less => {
                let factor = pow10(self.scale - scale)?;
                let quotient = self.unscaled / factor;
                let remainder = (self.unscaled % factor).unsigned_abs();
                let half = factor.unsigned_abs() / 2;
                let rounded = if remainder >= half && remainder > 0 {
                    quotient + self.unscaled.signum()
                } else {
                    quotient
                };
                Some(Self::new(rounded, scale))
            }
        }
    }

    /// Rescale and check the result fits `DECIMAL(precision, scale)`.
    pub fn to_precision(&self, precision: u8, scale: u8) -> Option<Self> {
        let rescaled = self.rescale(scale)?;
        (rescaled.precision() <= precision).then_some(rescaled)
    }

    /// Drop trailing fractional zeros.
    pub fn normalized(&self) -> Self {
        let mut out = *self;
        while out.scale > 0 && out.unscaled % 10 == 0 {
            out.unscaled /= 10;
            out.scale -= 1;
        }
        out
    }

    /// Integral part if the value has no fractional digits.
    pub fn to_integer(&self) -> Option<i128> {
        let normalized = self.normalized();
        (normalized.scale == 0).then_some(normalized.unscaled)
    }
}

impl PartialEq for Decimal {
    /// Numeric equality: `1.50 == 1.5`.
    fn eq(&self, other: &Self) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.unscaled == b.unscaled && a.scale == b.scale
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let scale = self.scale.max(other.scale);
        let a = self.rescale(scale)?;
        let b = other.rescale(scale)?;
        Some(a.unscaled.cmp(&b.unscaled))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.unsigned_abs().to_string();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let scale = usize::from(self.scale);
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}

impl FromStr for Decimal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("invalid decimal literal: {:?}", s));
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid decimal literal: {:?}", s));
        }
        let scale = u8::try_from(frac_part.len())
            .ok()
            .filter(|scale| *scale <= MAX_PRECISION)
            .ok_or_else(|| format!("too many fractional digits: {:?}", s))?;
        let joined = format!("{}{}", int_part, frac_part);
        let magnitude: i128 = if joined.is_empty() {
            0
        } else {
            joined
                .parse()
                .map_err(|e| format!("invalid decimal literal {:?}: {}", s, e))?
        };
        Ok(Self::new(if negative { -magnitude } else { magnitude }, scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(dec("12.340").to_string(), "12.340");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec("7").to_string(), "7");
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("abc".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_numeric_equality_ignores_trailing_zeros() {
        assert_eq!(dec("1.50"), dec("1.5"));
        assert_ne!(dec("1.51"), dec("1.5"));
    }

    #[test]
    fn test_rescale_rounds_half_away_from_zero() {
        assert_eq!(dec("2.345").rescale(2).map(|d| d.to_string()), Some("2.35".into()));
        assert_eq!(dec("-2.345").rescale(2).map(|d| d.to_string()), Some("-2.35".into()));
        assert_eq!(dec("2.344").rescale(2).map(|d| d.to_string()), Some("2.34".into()));
        assert_eq!(dec("1.5").rescale(4).map(|d| d.unscaled()), Some(15000));
    }

    #[test]
    fn test_precision_check() {
        assert_eq!(dec("123.45").precision(), 5);
        assert!(dec("123.45").to_precision(5, 2).is_some());
        assert!(dec("123.45").to_precision(4, 2).is_none());
        assert_eq!(Decimal::from_i128(0).precision(), 1);
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(dec("42.000").to_integer(), Some(42));
        assert_eq!(dec("42.5").to_integer(), None);
    }
}
