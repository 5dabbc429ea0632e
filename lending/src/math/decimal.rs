//! unsigned fixed-point number with 18 fractional decimal digits, stored in
//! a 192-bit integer. one whole unit is `WAD` (10^18) scaled units, matching
//! the on-chain representation of borrowed amounts and cumulative rates.

use crate::error::LendingError;
use crate::math::uint::U192;
use std::fmt;

/// scale constant, 10^18
pub const WAD: u64 = 1_000_000_000_000_000_000;

/// number of fractional decimal digits carried
pub const SCALE: usize = 18;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal(pub U192);

impl Decimal {
    pub fn zero() -> Self {
        Self(U192::zero())
    }

    pub fn one() -> Self {
        Self(Self::wad())
    }

    fn wad() -> U192 {
        U192::from(WAD)
    }

    fn half_wad() -> U192 {
        U192::from(WAD / 2)
    }

    /// whole percent, e.g. `from_percent(85)` is 0.85
    pub fn from_percent(percent: u8) -> Self {
        Self(U192::from(percent as u64 * (WAD / 100)))
    }

    /// wrap an already wad-scaled raw value, e.g. a `borrowed_amount_wads`
    /// field read straight from an account buffer
    pub fn from_scaled_val(scaled_val: u128) -> Self {
        Self(U192::from(scaled_val))
    }

    pub fn to_scaled_val(&self) -> Result<u128, LendingError> {
        u128::try_from(self.0).map_err(|_| LendingError::MathOverflow)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn try_floor_u64(&self) -> Result<u64, LendingError> {
        let val = self
            .0
            .checked_div(Self::wad())
            .ok_or(LendingError::MathOverflow)?;
        u64::try_from(val).map_err(|_| LendingError::MathOverflow)
    }

    pub fn try_round_u64(&self) -> Result<u64, LendingError> {
        let val = Self::half_wad()
            .checked_add(self.0)
            .ok_or(LendingError::MathOverflow)?
            .checked_div(Self::wad())
            .ok_or(LendingError::MathOverflow)?;
        u64::try_from(val).map_err(|_| LendingError::MathOverflow)
    }

    pub fn try_add(self, rhs: Decimal) -> Result<Decimal, LendingError> {
        Ok(Self(
            self.0.checked_add(rhs.0).ok_or(LendingError::MathOverflow)?,
        ))
    }

    pub fn try_sub(self, rhs: Decimal) -> Result<Decimal, LendingError> {
        Ok(Self(
            self.0.checked_sub(rhs.0).ok_or(LendingError::MathOverflow)?,
        ))
    }

    pub fn try_mul(self, rhs: Decimal) -> Result<Decimal, LendingError> {
        Ok(Self(
            self.0
                .checked_mul(rhs.0)
                .ok_or(LendingError::MathOverflow)?
                .checked_div(Self::wad())
                .ok_or(LendingError::MathOverflow)?,
        ))
    }

    pub fn try_div(self, rhs: Decimal) -> Result<Decimal, LendingError> {
        Ok(Self(
            self.0
                .checked_mul(Self::wad())
                .ok_or(LendingError::MathOverflow)?
                .checked_div(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl From<u64> for Decimal {
    fn from(val: u64) -> Self {
        Self(Self::wad() * U192::from(val))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled = self.0.to_string();
        if scaled.len() <= SCALE {
            let zeros = "0".repeat(SCALE - scaled.len());
            scaled.insert_str(0, &zeros);
            scaled.insert_str(0, "0.");
        } else {
            scaled.insert(scaled.len() - SCALE, '.');
        }
        f.write_str(&scaled)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scaling_round_trip() {
        let dec = Decimal::from(5u64);
        assert_eq!(dec.to_scaled_val().unwrap(), 5 * WAD as u128);
        assert_eq!(Decimal::from_scaled_val(5 * WAD as u128), dec);
    }

    #[test]
    fn test_from_percent() {
        assert_eq!(
            Decimal::from_percent(100).to_scaled_val().unwrap(),
            WAD as u128
        );
        assert_eq!(
            Decimal::from_percent(85),
            Decimal::from(85u64).try_div(Decimal::from(100u64)).unwrap()
        );
        assert!(Decimal::from_percent(0).is_zero());
    }

    #[test]
    fn test_mul_div() {
        let a = Decimal::from(150u64);
        let b = Decimal::from_percent(80);
        assert_eq!(a.try_mul(b).unwrap(), Decimal::from(120u64));
        assert_eq!(
            Decimal::from(140u64).try_div(Decimal::from(7u64)).unwrap(),
            Decimal::from(20u64)
        );
    }

    #[test]
    fn test_floor_and_round() {
        let dec = Decimal::from_scaled_val(WAD as u128 + WAD as u128 / 2);
        assert_eq!(dec.try_floor_u64().unwrap(), 1);
        assert_eq!(dec.try_round_u64().unwrap(), 2);
    }

    #[test]
    fn test_sub_underflow() {
        let err = Decimal::zero().try_sub(Decimal::one());
        assert_eq!(err, Err(LendingError::MathOverflow));
    }

    #[test]
    fn test_display_pads_fraction() {
        assert_eq!(Decimal::from_percent(50).to_string(), "0.500000000000000000");
        assert_eq!(Decimal::from(2u64).to_string(), "2.000000000000000000");
    }
}
