//! obligation account decoding

use arrayref::{array_ref, array_refs};
use solana_sdk::pubkey::Pubkey;

use crate::error::LendingError;
use crate::math::Decimal;
use crate::state::{unpack_bool, unpack_decimal, LastUpdate, PROGRAM_VERSION};

/// fixed byte length of an obligation account
pub const OBLIGATION_LEN: usize = 1300;

/// max combined deposit and borrow entries
pub const MAX_OBLIGATION_RESERVES: usize = 10;

const OBLIGATION_COLLATERAL_LEN: usize = 88;
const OBLIGATION_LIQUIDITY_LEN: usize = 112;
const OBLIGATION_DATA_FLAT_LEN: usize = 1096;

/// a borrower's position against a lending market: deposited collateral
/// plus borrowed liquidity
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Obligation {
    pub version: u8,
    pub last_update: LastUpdate,
    pub lending_market: Pubkey,
    pub owner: Pubkey,
    pub deposits: Vec<ObligationCollateral>,
    pub borrows: Vec<ObligationLiquidity>,
    /// market values as of the obligation's last on-chain refresh, stale
    /// between refreshes. the health calculator recomputes them instead of
    /// trusting these.
    pub deposited_value: Decimal,
    pub borrowed_value: Decimal,
    pub allowed_borrow_value: Decimal,
    pub unhealthy_borrow_value: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObligationCollateral {
    pub deposit_reserve: Pubkey,
    pub deposited_amount: u64,
    pub market_value: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObligationLiquidity {
    pub borrow_reserve: Pubkey,
    /// interest accumulator snapshot taken when this borrow last accrued
    pub cumulative_borrow_rate_wads: Decimal,
    pub borrowed_amount_wads: Decimal,
    pub market_value: Decimal,
}

impl Obligation {
    /// decode an obligation from raw account data. fails unless the buffer
    /// is exactly [`OBLIGATION_LEN`] bytes with a supported version byte and
    /// coherent deposit/borrow counts.
    pub fn unpack(input: &[u8]) -> Result<Obligation, LendingError> {
        if input.len() != OBLIGATION_LEN {
            return Err(LendingError::InvalidAccountSize {
                expected: OBLIGATION_LEN,
                actual: input.len(),
            });
        }
        let input = array_ref![input, 0, OBLIGATION_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            version,
            last_update_slot,
            last_update_stale,
            lending_market,
            owner,
            deposited_value,
            borrowed_value,
            allowed_borrow_value,
            unhealthy_borrow_value,
            _padding,
            deposits_len,
            borrows_len,
            data_flat,
        ) = array_refs![
            input,
            1,
            8,
            1,
            32,
            32,
            16,
            16,
            16,
            16,
            64,
            1,
            1,
            OBLIGATION_DATA_FLAT_LEN
        ];

        let version = version[0];
        if version != PROGRAM_VERSION {
            return Err(LendingError::UnsupportedVersion(version));
        }

        let deposits_len = deposits_len[0] as usize;
        let borrows_len = borrows_len[0] as usize;
        let flat_len =
            deposits_len * OBLIGATION_COLLATERAL_LEN + borrows_len * OBLIGATION_LIQUIDITY_LEN;
        if deposits_len + borrows_len > MAX_OBLIGATION_RESERVES
            || flat_len > OBLIGATION_DATA_FLAT_LEN
        {
            return Err(LendingError::InvalidAccountSize {
                expected: OBLIGATION_DATA_FLAT_LEN,
                actual: flat_len,
            });
        }

        let mut offset = 0;
        let mut deposits = Vec::with_capacity(deposits_len);
        for _ in 0..deposits_len {
            let entry = array_ref![data_flat, offset, OBLIGATION_COLLATERAL_LEN];
            #[allow(clippy::ptr_offset_with_cast)]
            let (deposit_reserve, deposited_amount, market_value, _entry_padding) =
                array_refs![entry, 32, 8, 16, 32];
            deposits.push(ObligationCollateral {
                deposit_reserve: Pubkey::new_from_array(*deposit_reserve),
                deposited_amount: u64::from_le_bytes(*deposited_amount),
                market_value: unpack_decimal(market_value),
            });
            offset += OBLIGATION_COLLATERAL_LEN;
        }

        let mut borrows = Vec::with_capacity(borrows_len);
        for _ in 0..borrows_len {
            let entry = array_ref![data_flat, offset, OBLIGATION_LIQUIDITY_LEN];
            #[allow(clippy::ptr_offset_with_cast)]
            let (
                borrow_reserve,
                cumulative_borrow_rate_wads,
                borrowed_amount_wads,
                market_value,
                _entry_padding,
            ) = array_refs![entry, 32, 16, 16, 16, 32];
            borrows.push(ObligationLiquidity {
                borrow_reserve: Pubkey::new_from_array(*borrow_reserve),
                cumulative_borrow_rate_wads: unpack_decimal(cumulative_borrow_rate_wads),
                borrowed_amount_wads: unpack_decimal(borrowed_amount_wads),
                market_value: unpack_decimal(market_value),
            });
            offset += OBLIGATION_LIQUIDITY_LEN;
        }

        Ok(Obligation {
            version,
            last_update: LastUpdate {
                slot: u64::from_le_bytes(*last_update_slot),
                stale: unpack_bool(last_update_stale),
            },
            lending_market: Pubkey::new_from_array(*lending_market),
            owner: Pubkey::new_from_array(*owner),
            deposits,
            borrows,
            deposited_value: unpack_decimal(deposited_value),
            borrowed_value: unpack_decimal(borrowed_value),
            allowed_borrow_value: unpack_decimal(allowed_borrow_value),
            unhealthy_borrow_value: unpack_decimal(unhealthy_borrow_value),
        })
    }

    /// reserves backing the deposited collateral, in deposit order
    pub fn deposit_reserves(&self) -> Vec<Pubkey> {
        self.deposits
            .iter()
            .map(|deposit| deposit.deposit_reserve)
            .collect()
    }

    /// reserves the liquidity was borrowed from, in borrow order
    pub fn borrow_reserves(&self) -> Vec<Pubkey> {
        self.borrows
            .iter()
            .map(|borrow| borrow.borrow_reserve)
            .collect()
    }

    /// every reserve this obligation references, deduped
    pub fn distinct_reserves(&self) -> Vec<Pubkey> {
        let mut reserves = Vec::with_capacity(self.deposits.len() + self.borrows.len());
        reserves.extend(self.deposit_reserves());
        reserves.extend(self.borrow_reserves());
        reserves.sort_unstable();
        reserves.dedup();
        reserves
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// builds a raw obligation buffer for decode tests
    pub(crate) fn obligation_buffer(obligation: &Obligation) -> Vec<u8> {
        let mut buf = vec![0u8; OBLIGATION_LEN];
        buf[0] = obligation.version;
        buf[1..9].copy_from_slice(&obligation.last_update.slot.to_le_bytes());
        buf[9] = obligation.last_update.stale as u8;
        buf[10..42].copy_from_slice(obligation.lending_market.as_ref());
        buf[42..74].copy_from_slice(obligation.owner.as_ref());
        buf[74..90]
            .copy_from_slice(&obligation.deposited_value.to_scaled_val().unwrap().to_le_bytes());
        buf[90..106]
            .copy_from_slice(&obligation.borrowed_value.to_scaled_val().unwrap().to_le_bytes());
        buf[106..122].copy_from_slice(
            &obligation
                .allowed_borrow_value
                .to_scaled_val()
                .unwrap()
                .to_le_bytes(),
        );
        buf[122..138].copy_from_slice(
            &obligation
                .unhealthy_borrow_value
                .to_scaled_val()
                .unwrap()
                .to_le_bytes(),
        );
        buf[202] = obligation.deposits.len() as u8;
        buf[203] = obligation.borrows.len() as u8;

        let mut offset = 204;
        for deposit in obligation.deposits.iter() {
            buf[offset..offset + 32].copy_from_slice(deposit.deposit_reserve.as_ref());
            buf[offset + 32..offset + 40].copy_from_slice(&deposit.deposited_amount.to_le_bytes());
            buf[offset + 40..offset + 56]
                .copy_from_slice(&deposit.market_value.to_scaled_val().unwrap().to_le_bytes());
            offset += OBLIGATION_COLLATERAL_LEN;
        }
        for borrow in obligation.borrows.iter() {
            buf[offset..offset + 32].copy_from_slice(borrow.borrow_reserve.as_ref());
            buf[offset + 32..offset + 48].copy_from_slice(
                &borrow
                    .cumulative_borrow_rate_wads
                    .to_scaled_val()
                    .unwrap()
                    .to_le_bytes(),
            );
            buf[offset + 48..offset + 64].copy_from_slice(
                &borrow
                    .borrowed_amount_wads
                    .to_scaled_val()
                    .unwrap()
                    .to_le_bytes(),
            );
            buf[offset + 64..offset + 80]
                .copy_from_slice(&borrow.market_value.to_scaled_val().unwrap().to_le_bytes());
            offset += OBLIGATION_LIQUIDITY_LEN;
        }
        buf
    }

    pub(crate) fn sample_obligation() -> Obligation {
        Obligation {
            version: PROGRAM_VERSION,
            last_update: LastUpdate {
                slot: 9000,
                stale: true,
            },
            lending_market: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            deposits: vec![ObligationCollateral {
                deposit_reserve: Pubkey::new_unique(),
                deposited_amount: 150_000_000,
                market_value: Decimal::from(150u64),
            }],
            borrows: vec![ObligationLiquidity {
                borrow_reserve: Pubkey::new_unique(),
                cumulative_borrow_rate_wads: Decimal::one(),
                borrowed_amount_wads: Decimal::from(140u64),
                market_value: Decimal::from(140u64),
            }],
            deposited_value: Decimal::from(150u64),
            borrowed_value: Decimal::from(140u64),
            allowed_borrow_value: Decimal::from(120u64),
            unhealthy_borrow_value: Decimal::from_scaled_val(127_500_000_000_000_000_000),
        }
    }

    #[test]
    fn test_unpack_round_trip() {
        let obligation = sample_obligation();
        let buf = obligation_buffer(&obligation);
        assert_eq!(buf.len(), OBLIGATION_LEN);
        let unpacked = Obligation::unpack(&buf).unwrap();
        assert_eq!(unpacked, obligation);
    }

    #[test]
    fn test_unpack_rejects_wrong_size() {
        let buf = obligation_buffer(&sample_obligation());
        assert_eq!(
            Obligation::unpack(&buf[..100]),
            Err(LendingError::InvalidAccountSize {
                expected: OBLIGATION_LEN,
                actual: 100,
            })
        );
    }

    #[test]
    fn test_unpack_rejects_unknown_version() {
        let mut obligation = sample_obligation();
        obligation.version = 0;
        let buf = obligation_buffer(&obligation);
        assert_eq!(
            Obligation::unpack(&buf),
            Err(LendingError::UnsupportedVersion(0))
        );
    }

    #[test]
    fn test_unpack_rejects_excess_entry_counts() {
        let mut buf = obligation_buffer(&sample_obligation());
        buf[203] = 11;
        assert!(matches!(
            Obligation::unpack(&buf),
            Err(LendingError::InvalidAccountSize { .. })
        ));
    }

    #[test]
    fn test_distinct_reserves_dedupes() {
        let mut obligation = sample_obligation();
        let shared = obligation.deposits[0].deposit_reserve;
        obligation.borrows[0].borrow_reserve = shared;
        assert_eq!(obligation.distinct_reserves(), vec![shared]);

        let obligation = sample_obligation();
        assert_eq!(obligation.distinct_reserves().len(), 2);
    }
}
