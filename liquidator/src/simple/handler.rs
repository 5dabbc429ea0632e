use super::SimpleLiquidator;
use anyhow::{anyhow, Result};
use config::markets::Market;
use lending::health::evaluate_obligation;
use lending::instruction::{
    new_liquidate_obligation_ix, new_redeem_reserve_collateral_ix, new_refresh_obligation_ix,
    new_refresh_reserve_ix,
};
use lending::math::Decimal;
use lending::oracle::TokenOracle;
use lending::select::select_liquidation;
use lending::state::{Obligation, Reserve};
use log::{debug, error, info, warn};
use solana_sdk::signature::Keypair;
use solana_sdk::{pubkey::Pubkey, signer::Signer, transaction::Transaction};
use spl_associated_token_account::get_associated_token_address;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

impl SimpleLiquidator {
    /// revalues one obligation and, when it is underwater, repays its most
    /// valuable borrow to seize its most valuable collateral
    pub fn handle_obligation(
        self: &Arc<Self>,
        market: &Market,
        obligation_key: Pubkey,
        obligation: &Obligation,
        reserves: &HashMap<Pubkey, Reserve>,
        oracles: &HashMap<Pubkey, TokenOracle>,
    ) -> Result<()> {
        let health = evaluate_obligation(obligation, reserves, oracles)?;
        for anomaly in health.anomalies.iter() {
            warn!(
                "obligation {} borrow against {}: reserve cumulative rate {} below stored snapshot {}, amount left unchanged",
                obligation_key,
                anomaly.borrow_reserve,
                anomaly.reserve_cumulative_rate,
                anomaly.obligation_cumulative_rate,
            );
        }

        if health.is_healthy() {
            debug!("obligation {} is healthy", obligation_key);
            return Ok(());
        }
        info!(
            "obligation {} is underwater. owner {}, borrowed {}, deposited {}, allowed {}, unhealthy {}, utilization {}%",
            obligation_key,
            obligation.owner,
            health.borrowed_value,
            health.deposited_value,
            health.allowed_borrow_value,
            health.unhealthy_borrow_value,
            health.utilization_ratio,
        );

        let (repay, withdraw) = match select_liquidation(&health) {
            Some(pair) => pair,
            None => {
                // toxic oracle data can leave an underwater obligation with
                // nothing to repay or seize; skip it, never retry
                info!(
                    "no liquidation candidate for obligation {}, skipping",
                    obligation_key
                );
                return Ok(());
            }
        };

        let payer = self.cfg.payer()?;
        let payer_pubkey = payer.pubkey();

        let liquidity_account = get_associated_token_address(&payer_pubkey, &repay.mint_address);
        let balance = self
            .rpc
            .get_token_account_balance(&liquidity_account)
            .map_err(|err| {
                anyhow!(
                    "failed to fetch {} balance for {}: {:#?}",
                    repay.symbol,
                    liquidity_account,
                    err
                )
            })?;
        let balance = u64::from_str(balance.amount.as_str())?;
        if balance == 0 {
            info!(
                "insufficient {} to liquidate obligation {} in market {}",
                repay.symbol, obligation_key, market.address
            );
            return Ok(());
        }

        // repay with the available balance, or the repay-everything sentinel
        // when the borrow exceeds it
        let amount_to_repay = match repay.borrowed_amount_wads.cmp(&Decimal::from(balance)) {
            Ordering::Greater => u64::MAX,
            Ordering::Equal | Ordering::Less => balance,
        };

        let program_id = self.cfg.lending.lending_id();
        let market_key = market.address_pubkey();
        let (market_authority, _bump) =
            Pubkey::find_program_address(&[market_key.as_ref()], &program_id);

        let repay_entry = market.reserve_by_address(&repay.borrow_reserve)?;
        let withdraw_entry = market.reserve_by_address(&withdraw.deposit_reserve)?;
        let collateral_account =
            get_associated_token_address(&payer_pubkey, &withdraw_entry.collateral_mint());

        // 1 ix per distinct reserve refresh, 1 obligation refresh, 1 liquidation
        let distinct_reserves = obligation.distinct_reserves();
        let mut instructions = Vec::with_capacity(distinct_reserves.len() + 2);
        for reserve_key in distinct_reserves {
            let entry = market.reserve_by_address(&reserve_key)?;
            let oracle = self.cfg.lending.oracle_address(entry.asset.as_str())?;
            instructions.push(new_refresh_reserve_ix(program_id, reserve_key, oracle));
        }
        instructions.push(new_refresh_obligation_ix(
            program_id,
            obligation_key,
            &obligation.deposit_reserves(),
            &obligation.borrow_reserves(),
        ));
        instructions.push(new_liquidate_obligation_ix(
            program_id,
            amount_to_repay,
            liquidity_account,
            collateral_account,
            repay.borrow_reserve,
            repay_entry.liquidity_supply(),
            withdraw.deposit_reserve,
            withdraw_entry.collateral_supply(),
            obligation_key,
            market_key,
            market_authority,
            payer_pubkey,
        ));

        let mut tx = Transaction::new_with_payer(&instructions[..], Some(&payer_pubkey));
        let blockhash = self.rpc.get_latest_blockhash()?;
        tx.sign(&[&payer], blockhash);
        info!(
            "sending liquidation for obligation {}. repay {} withdraw {}",
            obligation_key, repay.symbol, withdraw.symbol
        );
        let sig = self.rpc.send_and_confirm_transaction(&tx)?;
        info!("liquidated obligation {} in tx {}", obligation_key, sig);

        // redeeming can fail when the reserve lacks liquidity; that only
        // delays collecting the bounty, so it never fails the handler
        if let Err(err) =
            self.redeem_collateral(market, withdraw.deposit_reserve, &payer, collateral_account)
        {
            error!(
                "failed to redeem collateral for obligation {}: {:#?}",
                obligation_key, err
            );
        }
        Ok(())
    }

    /// swaps the collateral tokens seized by a liquidation back into the
    /// underlying liquidity
    fn redeem_collateral(
        &self,
        market: &Market,
        withdraw_reserve: Pubkey,
        payer: &Keypair,
        collateral_account: Pubkey,
    ) -> Result<()> {
        let payer_pubkey = payer.pubkey();
        let program_id = self.cfg.lending.lending_id();
        let market_key = market.address_pubkey();
        let (market_authority, _bump) =
            Pubkey::find_program_address(&[market_key.as_ref()], &program_id);

        let entry = market.reserve_by_address(&withdraw_reserve)?;
        let asset = self.cfg.lending.asset_by_symbol(entry.asset.as_str())?;
        let oracle = self.cfg.lending.oracle_address(entry.asset.as_str())?;
        let liquidity_account = get_associated_token_address(
            &payer_pubkey,
            &Pubkey::from_str(asset.mint_address.as_str())?,
        );

        let balance = self.rpc.get_token_account_balance(&collateral_account)?;
        let collateral_amount = u64::from_str(balance.amount.as_str())?;
        if collateral_amount == 0 {
            return Ok(());
        }

        let instructions = vec![
            new_refresh_reserve_ix(program_id, withdraw_reserve, oracle),
            new_redeem_reserve_collateral_ix(
                program_id,
                collateral_amount,
                collateral_account,
                liquidity_account,
                withdraw_reserve,
                entry.collateral_mint(),
                entry.liquidity_supply(),
                market_key,
                market_authority,
                payer_pubkey,
            ),
        ];
        let mut tx = Transaction::new_with_payer(&instructions[..], Some(&payer_pubkey));
        let blockhash = self.rpc.get_latest_blockhash()?;
        tx.sign(&[payer], blockhash);
        let sig = self.rpc.send_and_confirm_transaction(&tx)?;
        info!(
            "redeemed {} collateral tokens of {} in tx {}",
            collateral_amount, entry.asset, sig
        );
        Ok(())
    }
}
