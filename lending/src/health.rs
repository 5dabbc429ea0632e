//! recomputes an obligation's collateral/debt valuation off-chain, without
//! waiting for the program's own refresh to land. mirrors the on-chain
//! refresh math: deposit values weighted by loan-to-value and liquidation
//! threshold, borrow values compounded by the reserve's cumulative rate.

use std::collections::HashMap;

use solana_sdk::pubkey::Pubkey;

use crate::error::LendingError;
use crate::math::Decimal;
use crate::oracle::TokenOracle;
use crate::state::{Obligation, Reserve};

/// per-obligation valuation produced by [`evaluate_obligation`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObligationHealth {
    pub deposited_value: Decimal,
    pub borrowed_value: Decimal,
    /// max borrow value at the deposits' weighted loan-to-value ratio
    pub allowed_borrow_value: Decimal,
    /// borrow value beyond which the position is liquidatable
    pub unhealthy_borrow_value: Decimal,
    /// borrowed/deposited as a percent, zero when nothing is deposited
    pub utilization_ratio: Decimal,
    pub deposits: Vec<DepositValuation>,
    pub borrows: Vec<BorrowValuation>,
    /// non-fatal interest-rate anomalies observed while accruing; the
    /// caller should surface these at warning level
    pub anomalies: Vec<RateAnomaly>,
}

impl ObligationHealth {
    /// boundary inclusive: a position sitting exactly on the unhealthy
    /// borrow value requires no action
    pub fn is_healthy(&self) -> bool {
        self.borrowed_value <= self.unhealthy_borrow_value
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepositValuation {
    pub deposit_reserve: Pubkey,
    pub deposited_amount: u64,
    pub market_value: Decimal,
    pub symbol: String,
    pub mint_address: Pubkey,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BorrowValuation {
    pub borrow_reserve: Pubkey,
    /// stored amount before interest accrual
    pub borrowed_amount_wads: Decimal,
    pub market_value: Decimal,
    pub symbol: String,
    pub mint_address: Pubkey,
}

/// a reserve's cumulative borrow rate was observed below the obligation's
/// stored snapshot. rates never decrease, so this marks corrupt or stale
/// reserve data; the stored amount is kept unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct RateAnomaly {
    pub borrow_reserve: Pubkey,
    pub reserve_cumulative_rate: Decimal,
    pub obligation_cumulative_rate: Decimal,
}

/// revalue an obligation against current reserve state and oracle prices.
///
/// fails for this obligation only: a missing oracle or reserve entry returns
/// a typed error and leaves every other obligation unaffected. anomalous
/// interest rates do not fail the evaluation, they are reported through
/// [`ObligationHealth::anomalies`].
pub fn evaluate_obligation(
    obligation: &Obligation,
    reserves: &HashMap<Pubkey, Reserve>,
    oracles: &HashMap<Pubkey, TokenOracle>,
) -> Result<ObligationHealth, LendingError> {
    let mut health = ObligationHealth::default();

    for deposit in obligation.deposits.iter() {
        let reserve_key = deposit.deposit_reserve;
        let oracle = oracles
            .get(&reserve_key)
            .ok_or(LendingError::MissingOracle(reserve_key))?;
        let reserve = reserves
            .get(&reserve_key)
            .ok_or(LendingError::MissingReserve(reserve_key))?;

        // the deposited collateral amount is valued directly; conversion
        // through the collateral exchange rate is intentionally not applied
        let market_value = Decimal::from(deposit.deposited_amount)
            .try_mul(oracle.price)?
            .try_div(ten_pow(oracle.decimals)?)?;

        health.deposited_value = health.deposited_value.try_add(market_value)?;
        health.allowed_borrow_value = health
            .allowed_borrow_value
            .try_add(market_value.try_mul(reserve.loan_to_value_rate())?)?;
        health.unhealthy_borrow_value = health
            .unhealthy_borrow_value
            .try_add(market_value.try_mul(reserve.liquidation_threshold_rate())?)?;

        health.deposits.push(DepositValuation {
            deposit_reserve: reserve_key,
            deposited_amount: deposit.deposited_amount,
            market_value,
            symbol: oracle.symbol.clone(),
            mint_address: oracle.mint_address,
        });
    }

    for borrow in obligation.borrows.iter() {
        let reserve_key = borrow.borrow_reserve;
        let oracle = oracles
            .get(&reserve_key)
            .ok_or(LendingError::MissingOracle(reserve_key))?;
        let reserve = reserves
            .get(&reserve_key)
            .ok_or(LendingError::MissingReserve(reserve_key))?;

        let accrued_amount_wads = accrue_interest(
            reserve.liquidity.cumulative_borrow_rate_wads,
            borrow.cumulative_borrow_rate_wads,
            borrow.borrowed_amount_wads,
            reserve_key,
            &mut health.anomalies,
        )?;
        let market_value = accrued_amount_wads
            .try_mul(oracle.price)?
            .try_div(ten_pow(oracle.decimals)?)?;

        health.borrowed_value = health.borrowed_value.try_add(market_value)?;

        health.borrows.push(BorrowValuation {
            borrow_reserve: reserve_key,
            borrowed_amount_wads: borrow.borrowed_amount_wads,
            market_value,
            symbol: oracle.symbol.clone(),
            mint_address: oracle.mint_address,
        });
    }

    health.utilization_ratio = if health.deposited_value.is_zero() {
        Decimal::zero()
    } else {
        health
            .borrowed_value
            .try_div(health.deposited_value)?
            .try_mul(Decimal::from(100u64))?
    };

    Ok(health)
}

/// compound a stored borrow amount forward to the reserve's current
/// cumulative rate. equal rates accrue nothing; a reserve rate below the
/// stored snapshot is recorded as an anomaly and leaves the amount alone.
fn accrue_interest(
    reserve_cumulative_rate: Decimal,
    obligation_cumulative_rate: Decimal,
    borrowed_amount_wads: Decimal,
    borrow_reserve: Pubkey,
    anomalies: &mut Vec<RateAnomaly>,
) -> Result<Decimal, LendingError> {
    use std::cmp::Ordering;

    match reserve_cumulative_rate.cmp(&obligation_cumulative_rate) {
        Ordering::Less => {
            anomalies.push(RateAnomaly {
                borrow_reserve,
                reserve_cumulative_rate,
                obligation_cumulative_rate,
            });
            Ok(borrowed_amount_wads)
        }
        Ordering::Equal => Ok(borrowed_amount_wads),
        Ordering::Greater => {
            let compounded_rate = reserve_cumulative_rate.try_div(obligation_cumulative_rate)?;
            borrowed_amount_wads.try_mul(compounded_rate)
        }
    }
}

fn ten_pow(decimals: u8) -> Result<Decimal, LendingError> {
    let multiplier = 10u64
        .checked_pow(decimals as u32)
        .ok_or(LendingError::MathOverflow)?;
    Ok(Decimal::from(multiplier))
}
