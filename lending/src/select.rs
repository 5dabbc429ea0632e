//! picks the repay/withdraw pair that maximizes liquidation value

use crate::health::{BorrowValuation, DepositValuation, ObligationHealth};

/// choose the borrow to repay and the deposit to seize: the entry with the
/// strictly greatest market value on each side. ties keep the first entry in
/// input order, so selection is deterministic for a given evaluation.
///
/// returns `None` when the obligation has no borrows or no deposits to work
/// with; such an obligation cannot be liquidated and must be skipped, not
/// retried.
pub fn select_liquidation(
    health: &ObligationHealth,
) -> Option<(&BorrowValuation, &DepositValuation)> {
    let repay = health
        .borrows
        .iter()
        .reduce(|best, borrow| {
            if borrow.market_value > best.market_value {
                borrow
            } else {
                best
            }
        })?;
    let withdraw = health
        .deposits
        .iter()
        .reduce(|best, deposit| {
            if deposit.market_value > best.market_value {
                deposit
            } else {
                best
            }
        })?;
    Some((repay, withdraw))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Decimal;
    use solana_sdk::pubkey::Pubkey;

    fn borrow(value: u64) -> BorrowValuation {
        BorrowValuation {
            borrow_reserve: Pubkey::new_unique(),
            borrowed_amount_wads: Decimal::from(value),
            market_value: Decimal::from(value),
            symbol: "BOR".to_string(),
            mint_address: Pubkey::new_unique(),
        }
    }

    fn deposit(value: u64) -> DepositValuation {
        DepositValuation {
            deposit_reserve: Pubkey::new_unique(),
            deposited_amount: value,
            market_value: Decimal::from(value),
            symbol: "DEP".to_string(),
            mint_address: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_selects_greatest_market_value() {
        let health = ObligationHealth {
            borrows: vec![borrow(10), borrow(50), borrow(30)],
            deposits: vec![deposit(5), deposit(7), deposit(90)],
            ..ObligationHealth::default()
        };
        let (repay, withdraw) = select_liquidation(&health).unwrap();
        assert_eq!(repay.market_value, Decimal::from(50u64));
        assert_eq!(withdraw.market_value, Decimal::from(90u64));
    }

    #[test]
    fn test_ties_keep_first_entry() {
        let health = ObligationHealth {
            borrows: vec![borrow(50), borrow(50)],
            deposits: vec![deposit(90), deposit(90)],
            ..ObligationHealth::default()
        };
        let (repay, withdraw) = select_liquidation(&health).unwrap();
        assert_eq!(repay.borrow_reserve, health.borrows[0].borrow_reserve);
        assert_eq!(withdraw.deposit_reserve, health.deposits[0].deposit_reserve);
    }

    #[test]
    fn test_empty_sides_yield_none() {
        let no_borrows = ObligationHealth {
            deposits: vec![deposit(1)],
            ..ObligationHealth::default()
        };
        assert!(select_liquidation(&no_borrows).is_none());

        let no_deposits = ObligationHealth {
            borrows: vec![borrow(1)],
            ..ObligationHealth::default()
        };
        assert!(select_liquidation(&no_deposits).is_none());
    }
}
