//! byte-exact encoding of the lending program's wire instructions.
//!
//! opcode values, field widths, field order and account ordering are a
//! compatibility contract with the on-chain program. every instruction's
//! data length is fixed by its kind: the refresh instructions carry a lone
//! opcode byte, the amount-carrying instructions append a little-endian u64.
//! account keys are taken as already resolved; nothing here validates that
//! they exist.

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::sysvar;

use crate::error::LendingError;

/// instruction data payloads, tagged by the program's opcodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LendingInstruction {
    /// opcode 3
    RefreshReserve,
    /// opcode 5
    RedeemReserveCollateral { collateral_amount: u64 },
    /// opcode 7
    RefreshObligation,
    /// opcode 12
    LiquidateObligation { liquidity_amount: u64 },
}

impl LendingInstruction {
    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.packed_len());
        match *self {
            Self::RefreshReserve => data.push(3),
            Self::RedeemReserveCollateral { collateral_amount } => {
                data.push(5);
                data.extend_from_slice(&collateral_amount.to_le_bytes());
            }
            Self::RefreshObligation => data.push(7),
            Self::LiquidateObligation { liquidity_amount } => {
                data.push(12);
                data.extend_from_slice(&liquidity_amount.to_le_bytes());
            }
        }
        data
    }

    /// encoded byte length, fully determined by the instruction kind
    pub const fn packed_len(&self) -> usize {
        match self {
            Self::RefreshReserve | Self::RefreshObligation => 1,
            Self::RedeemReserveCollateral { .. } | Self::LiquidateObligation { .. } => 9,
        }
    }

    /// decode instruction data. any length other than the kind's fixed size,
    /// or an opcode outside the four supported kinds, is rejected.
    pub fn unpack(input: &[u8]) -> Result<Self, LendingError> {
        let (&opcode, rest) = input
            .split_first()
            .ok_or(LendingError::InvalidInstructionData)?;
        match opcode {
            3 if rest.is_empty() => Ok(Self::RefreshReserve),
            5 => Ok(Self::RedeemReserveCollateral {
                collateral_amount: unpack_amount(rest)?,
            }),
            7 if rest.is_empty() => Ok(Self::RefreshObligation),
            12 => Ok(Self::LiquidateObligation {
                liquidity_amount: unpack_amount(rest)?,
            }),
            _ => Err(LendingError::InvalidInstructionData),
        }
    }
}

fn unpack_amount(rest: &[u8]) -> Result<u64, LendingError> {
    let bytes: [u8; 8] = rest
        .try_into()
        .map_err(|_| LendingError::InvalidInstructionData)?;
    Ok(u64::from_le_bytes(bytes))
}

/// returns a new instruction used to refresh the given reserve against its
/// price oracle
pub fn new_refresh_reserve_ix(program_id: Pubkey, reserve: Pubkey, oracle: Pubkey) -> Instruction {
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(reserve, false),
            AccountMeta::new_readonly(oracle, false),
            AccountMeta::new_readonly(sysvar::clock::id(), false),
        ],
        data: LendingInstruction::RefreshReserve.pack(),
    }
}

/// returns a new instruction used to refresh the given obligation. deposit
/// reserves come before borrow reserves and both keep their input order.
pub fn new_refresh_obligation_ix(
    program_id: Pubkey,
    obligation: Pubkey,
    deposit_reserves: &[Pubkey],
    borrow_reserves: &[Pubkey],
) -> Instruction {
    let mut accounts = Vec::with_capacity(deposit_reserves.len() + borrow_reserves.len() + 2);
    accounts.push(AccountMeta::new(obligation, false));
    accounts.extend(
        deposit_reserves
            .iter()
            .chain(borrow_reserves.iter())
            .map(|reserve| AccountMeta::new_readonly(*reserve, false)),
    );
    accounts.push(AccountMeta::new_readonly(sysvar::clock::id(), false));

    Instruction {
        program_id,
        accounts,
        data: LendingInstruction::RefreshObligation.pack(),
    }
}

/// returns a new instruction used to repay part of an unhealthy obligation's
/// borrow and seize a matching share of its collateral.
///
/// `liquidity_amount` is the amount of borrowed liquidity to repay, with
/// u64::MAX acting as the repay-everything sentinel enforced on-chain.
#[allow(clippy::too_many_arguments)]
pub fn new_liquidate_obligation_ix(
    program_id: Pubkey,
    liquidity_amount: u64,
    source_liquidity_account: Pubkey,
    destination_collateral_account: Pubkey,
    repay_reserve: Pubkey,
    repay_reserve_liquidity_supply: Pubkey,
    withdraw_reserve: Pubkey,
    withdraw_reserve_collateral_supply: Pubkey,
    obligation: Pubkey,
    lending_market: Pubkey,
    lending_market_authority: Pubkey,
    transfer_authority: Pubkey,
) -> Instruction {
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(source_liquidity_account, false),
            AccountMeta::new(destination_collateral_account, false),
            AccountMeta::new(repay_reserve, false),
            AccountMeta::new(repay_reserve_liquidity_supply, false),
            AccountMeta::new_readonly(withdraw_reserve, false),
            AccountMeta::new(withdraw_reserve_collateral_supply, false),
            AccountMeta::new(obligation, false),
            AccountMeta::new_readonly(lending_market, false),
            AccountMeta::new_readonly(lending_market_authority, false),
            AccountMeta::new_readonly(transfer_authority, true),
            AccountMeta::new_readonly(sysvar::clock::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: LendingInstruction::LiquidateObligation { liquidity_amount }.pack(),
    }
}

/// returns a new instruction used to redeem seized collateral tokens for the
/// underlying liquidity
#[allow(clippy::too_many_arguments)]
pub fn new_redeem_reserve_collateral_ix(
    program_id: Pubkey,
    collateral_amount: u64,
    source_collateral_account: Pubkey,
    destination_liquidity_account: Pubkey,
    reserve: Pubkey,
    reserve_collateral_mint: Pubkey,
    reserve_liquidity_supply: Pubkey,
    lending_market: Pubkey,
    lending_market_authority: Pubkey,
    transfer_authority: Pubkey,
) -> Instruction {
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(source_collateral_account, false),
            AccountMeta::new(destination_liquidity_account, false),
            AccountMeta::new(reserve, false),
            AccountMeta::new(reserve_collateral_mint, false),
            AccountMeta::new(reserve_liquidity_supply, false),
            AccountMeta::new_readonly(lending_market, false),
            AccountMeta::new_readonly(lending_market_authority, false),
            AccountMeta::new_readonly(transfer_authority, true),
            AccountMeta::new_readonly(sysvar::clock::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: LendingInstruction::RedeemReserveCollateral { collateral_amount }.pack(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pack_sizes_are_fixed() {
        for ix in [
            LendingInstruction::RefreshReserve,
            LendingInstruction::RefreshObligation,
            LendingInstruction::RedeemReserveCollateral {
                collateral_amount: 1,
            },
            LendingInstruction::LiquidateObligation {
                liquidity_amount: u64::MAX,
            },
        ] {
            assert_eq!(ix.pack().len(), ix.packed_len());
        }
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        for ix in [
            LendingInstruction::RefreshReserve,
            LendingInstruction::RefreshObligation,
            LendingInstruction::RedeemReserveCollateral {
                collateral_amount: 123_456_789,
            },
            LendingInstruction::LiquidateObligation {
                liquidity_amount: u64::MAX,
            },
        ] {
            assert_eq!(LendingInstruction::unpack(&ix.pack()), Ok(ix));
        }
    }

    #[test]
    fn test_opcodes_and_amount_encoding() {
        assert_eq!(LendingInstruction::RefreshReserve.pack(), vec![3]);
        assert_eq!(LendingInstruction::RefreshObligation.pack(), vec![7]);

        let data = LendingInstruction::LiquidateObligation {
            liquidity_amount: 0x0102_0304_0506_0708,
        }
        .pack();
        assert_eq!(data[0], 12);
        // little-endian amount
        assert_eq!(data[1..], [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);

        let data = LendingInstruction::RedeemReserveCollateral {
            collateral_amount: 1,
        }
        .pack();
        assert_eq!(data[0], 5);
        assert_eq!(data[1..], [1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unpack_rejects_malformed_data() {
        // empty
        assert_eq!(
            LendingInstruction::unpack(&[]),
            Err(LendingError::InvalidInstructionData)
        );
        // unknown opcode
        assert_eq!(
            LendingInstruction::unpack(&[4]),
            Err(LendingError::InvalidInstructionData)
        );
        // truncated amount
        assert_eq!(
            LendingInstruction::unpack(&[12, 1, 2, 3]),
            Err(LendingError::InvalidInstructionData)
        );
        // trailing bytes on a refresh
        assert_eq!(
            LendingInstruction::unpack(&[3, 0]),
            Err(LendingError::InvalidInstructionData)
        );
        // oversized amount
        assert_eq!(
            LendingInstruction::unpack(&[5, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(LendingError::InvalidInstructionData)
        );
    }

    #[test]
    fn test_refresh_reserve_accounts() {
        let program_id = Pubkey::new_unique();
        let reserve = Pubkey::new_unique();
        let oracle = Pubkey::new_unique();
        let ix = new_refresh_reserve_ix(program_id, reserve, oracle);

        assert_eq!(ix.program_id, program_id);
        assert_eq!(ix.data, vec![3]);
        assert_eq!(ix.accounts.len(), 3);
        assert_eq!(ix.accounts[0].pubkey, reserve);
        assert!(ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, oracle);
        assert!(!ix.accounts[1].is_writable);
        assert_eq!(ix.accounts[2].pubkey, sysvar::clock::id());
        assert!(ix.accounts.iter().all(|meta| !meta.is_signer));
    }

    #[test]
    fn test_refresh_obligation_preserves_reserve_order() {
        let program_id = Pubkey::new_unique();
        let obligation = Pubkey::new_unique();
        let deposits = [Pubkey::new_unique(), Pubkey::new_unique()];
        let borrows = [Pubkey::new_unique()];
        let ix = new_refresh_obligation_ix(program_id, obligation, &deposits, &borrows);

        assert_eq!(ix.data, vec![7]);
        assert_eq!(ix.accounts.len(), 5);
        assert_eq!(ix.accounts[0].pubkey, obligation);
        assert!(ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, deposits[0]);
        assert_eq!(ix.accounts[2].pubkey, deposits[1]);
        assert_eq!(ix.accounts[3].pubkey, borrows[0]);
        assert!(!ix.accounts[3].is_writable);
        assert_eq!(ix.accounts[4].pubkey, sysvar::clock::id());
    }

    #[test]
    fn test_liquidate_obligation_layout() {
        let keys: Vec<Pubkey> = (0..10).map(|_| Pubkey::new_unique()).collect();
        let program_id = Pubkey::new_unique();
        let ix = new_liquidate_obligation_ix(
            program_id, u64::MAX, keys[0], keys[1], keys[2], keys[3], keys[4], keys[5], keys[6],
            keys[7], keys[8], keys[9],
        );

        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[0], 12);
        assert_eq!(ix.accounts.len(), 12);
        // liquidity-moving accounts are writable
        for idx in [0, 1, 2, 3, 5, 6] {
            assert!(ix.accounts[idx].is_writable, "account {idx} not writable");
        }
        // reference accounts are read-only
        for idx in [4, 7, 8, 9, 10, 11] {
            assert!(!ix.accounts[idx].is_writable, "account {idx} writable");
        }
        // transfer authority is the only signer
        assert!(ix.accounts[9].is_signer);
        assert_eq!(
            ix.accounts.iter().filter(|meta| meta.is_signer).count(),
            1
        );
        assert_eq!(ix.accounts[10].pubkey, sysvar::clock::id());
        assert_eq!(ix.accounts[11].pubkey, spl_token::id());
    }

    #[test]
    fn test_redeem_reserve_collateral_layout() {
        let keys: Vec<Pubkey> = (0..9).map(|_| Pubkey::new_unique()).collect();
        let program_id = Pubkey::new_unique();
        let ix = new_redeem_reserve_collateral_ix(
            program_id, 42, keys[0], keys[1], keys[2], keys[3], keys[4], keys[5], keys[6], keys[7],
        );

        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[0], 5);
        assert_eq!(ix.accounts.len(), 10);
        for idx in 0..5 {
            assert!(ix.accounts[idx].is_writable);
        }
        for idx in 5..10 {
            assert!(!ix.accounts[idx].is_writable);
        }
        assert!(ix.accounts[7].is_signer);
        assert_eq!(ix.accounts[7].pubkey, keys[7]);
    }
}
