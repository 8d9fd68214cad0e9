//! Conversion between base units (wei) and display units (ether).

use rust_decimal::Decimal;

/// Decimals of the native asset: 1 ether = 10^18 wei.
pub const NATIVE_DECIMALS: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueConverter {
    decimals: u32,
    scale: u128,
}

impl Default for ValueConverter {
    fn default() -> Self {
        Self::new(NATIVE_DECIMALS)
    }
}

impl ValueConverter {
    /// `decimals` is capped at 28, the most a `Decimal` can carry after the point.
    pub fn new(decimals: u32) -> Self {
        let decimals = decimals.min(28);
        Self {
            decimals,
            scale: 10u128.pow(decimals),
        }
    }

    /// Scale a base-unit amount down to display units.
    ///
    /// Saturates at `Decimal::MAX` when the whole part needs more than 96 bits,
    /// which only happens with fewer than 10 decimals.
    pub fn to_display_units(&self, raw: u128) -> Decimal {
        let frac = (raw % self.scale) as i128;
        let whole = match i128::try_from(raw / self.scale)
            .ok()
            .and_then(|whole| Decimal::try_from_i128_with_scale(whole, 0).ok())
        {
            Some(whole) => whole,
            None => return Decimal::MAX,
        };
        whole
            .checked_add(Decimal::from_i128_with_scale(frac, self.decimals))
            .unwrap_or(Decimal::MAX)
    }

    /// Smallest base-unit amount whose display value is `>= amount`.
    ///
    /// Returns `None` when that amount does not fit in `u128`, i.e. nothing can reach it.
    pub fn to_base_units_ceil(&self, amount: Decimal) -> Option<u128> {
        if amount.is_sign_negative() || amount.is_zero() {
            return Some(0);
        }

        let mantissa = u128::try_from(amount.mantissa()).ok()?;
        let scale = amount.scale();

        if scale <= self.decimals {
            mantissa.checked_mul(10u128.pow(self.decimals - scale))
        } else {
            let divisor = 10u128.pow(scale - self.decimals);
            let quotient = mantissa / divisor;
            if mantissa % divisor == 0 {
                Some(quotient)
            } else {
                quotient.checked_add(1)
            }
        }
    }
}
