//! program-account scans for the reserves and obligations of a lending
//! market. accounts are matched by their fixed data size plus a memcmp on
//! the lending market key, and decoded through the core's pure decoders;
//! accounts that fail to decode are logged and skipped.

use anyhow::{anyhow, Result};
use lending::state::{Obligation, Reserve, LENDING_MARKET_OFFSET, OBLIGATION_LEN, RESERVE_LEN};
use log::error;
use solana_account_decoder::UiAccountEncoding;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;

fn market_accounts(
    rpc: &Arc<RpcClient>,
    program_id: &Pubkey,
    lending_market: &Pubkey,
    data_size: usize,
) -> Result<Vec<(Pubkey, Account)>> {
    rpc.get_program_accounts_with_config(
        program_id,
        RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::DataSize(data_size as u64),
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                    LENDING_MARKET_OFFSET,
                    lending_market.as_ref(),
                )),
            ]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64Zstd),
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .map_err(|err| {
        anyhow!(
            "failed to scan program accounts of size {} for market {}: {:#?}",
            data_size,
            lending_market,
            err
        )
    })
}

/// all obligations opened against the given lending market
pub fn scan_obligations(
    rpc: &Arc<RpcClient>,
    program_id: &Pubkey,
    lending_market: &Pubkey,
) -> Result<Vec<(Pubkey, Obligation)>> {
    let accounts = market_accounts(rpc, program_id, lending_market, OBLIGATION_LEN)?;
    let mut obligations = Vec::with_capacity(accounts.len());
    for (key, account) in accounts.iter() {
        match Obligation::unpack(&account.data[..]) {
            Ok(obligation) => obligations.push((*key, obligation)),
            Err(err) => {
                error!("failed to decode obligation {}: {:#?}", key, err);
                continue;
            }
        }
    }
    Ok(obligations)
}

/// all reserves of the given lending market, indexed by reserve address
pub fn scan_reserves(
    rpc: &Arc<RpcClient>,
    program_id: &Pubkey,
    lending_market: &Pubkey,
) -> Result<HashMap<Pubkey, Reserve>> {
    let accounts = market_accounts(rpc, program_id, lending_market, RESERVE_LEN)?;
    let mut reserves = HashMap::with_capacity(accounts.len());
    for (key, account) in accounts.iter() {
        match Reserve::unpack(&account.data[..]) {
            Ok(reserve) => {
                reserves.insert(*key, reserve);
            }
            Err(err) => {
                error!("failed to decode reserve {}: {:#?}", key, err);
                continue;
            }
        }
    }
    Ok(reserves)
}
