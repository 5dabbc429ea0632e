//! price-feed client: reads the pyth price account behind every reserve of a
//! market and turns the quotes into per-reserve oracle snapshots for the
//! health calculator.

use anyhow::{anyhow, Result};
use config::markets::{LendingMarkets, Market};
use lending::math::Decimal;
use lending::oracle::TokenOracle;
use log::error;
use solana_account_decoder::UiAccountEncoding;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::RpcAccountInfoConfig;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

const PYTH_MAGIC: u32 = 0xa1b2_c3d4;
/// byte offset of the exponent field in a pyth price account
const PYTH_EXPONENT_OFFSET: usize = 20;
/// byte offset of the aggregate price field
const PYTH_AGG_PRICE_OFFSET: usize = 208;
/// minimum account length covering the fields read here
const PYTH_PRICE_MIN_LEN: usize = PYTH_AGG_PRICE_OFFSET + 8;

/// decodes the aggregate quote of a pyth price account into a decimal price
/// for one whole token
pub fn parse_pyth_price(data: &[u8]) -> Result<Decimal> {
    if data.len() < PYTH_PRICE_MIN_LEN {
        return Err(anyhow!(
            "price account too short: {} bytes, need at least {}",
            data.len(),
            PYTH_PRICE_MIN_LEN
        ));
    }
    let magic = u32::from_le_bytes(data[0..4].try_into()?);
    if magic != PYTH_MAGIC {
        return Err(anyhow!("invalid pyth magic {:#x}", magic));
    }
    let exponent = i32::from_le_bytes(
        data[PYTH_EXPONENT_OFFSET..PYTH_EXPONENT_OFFSET + 4].try_into()?,
    );
    let price = i64::from_le_bytes(
        data[PYTH_AGG_PRICE_OFFSET..PYTH_AGG_PRICE_OFFSET + 8].try_into()?,
    );
    if price < 0 {
        return Err(anyhow!("negative aggregate price {}", price));
    }

    let price = Decimal::from(price as u64);
    let scale = 10u64
        .checked_pow(exponent.unsigned_abs())
        .ok_or_else(|| anyhow!("price exponent {} out of range", exponent))?;
    let scaled = if exponent >= 0 {
        price.try_mul(Decimal::from(scale))?
    } else {
        price.try_div(Decimal::from(scale))?
    };
    Ok(scaled)
}

/// fetches the oracle snapshot for every reserve of the given market,
/// keyed by reserve address. reserves whose price account is missing or
/// unparsable are logged and left out, which the health calculator later
/// reports as a missing oracle for any obligation touching them.
pub fn get_token_oracles(
    rpc: &Arc<RpcClient>,
    catalogue: &LendingMarkets,
    market: &Market,
) -> Result<HashMap<Pubkey, TokenOracle>> {
    let mut price_accounts = Vec::with_capacity(market.reserves.len());
    for reserve in market.reserves.iter() {
        price_accounts.push(catalogue.oracle_address(reserve.asset.as_str())?);
    }

    let mut price_infos = rpc
        .get_multiple_accounts_with_config(
            &price_accounts[..],
            RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64Zstd),
                ..Default::default()
            },
        )
        .map_err(|err| anyhow!("failed to fetch price accounts: {:#?}", err))?
        .value;

    let mut oracles = HashMap::with_capacity(market.reserves.len());
    for (idx, price_info) in price_infos.iter_mut().enumerate() {
        let reserve = &market.reserves[idx];
        let price_info = match std::mem::take(price_info) {
            Some(price_info) => price_info,
            None => {
                error!(
                    "price account {} for asset {} not found",
                    price_accounts[idx], reserve.asset
                );
                continue;
            }
        };
        let price = match parse_pyth_price(&price_info.data[..]) {
            Ok(price) => price,
            Err(err) => {
                error!(
                    "failed to parse pyth price {}: {:#?}",
                    price_accounts[idx], err
                );
                continue;
            }
        };
        let asset = match catalogue.asset_by_symbol(reserve.asset.as_str()) {
            Ok(asset) => asset,
            Err(err) => {
                error!("unknown asset {}: {:#?}", reserve.asset, err);
                continue;
            }
        };
        let mint_address = match Pubkey::from_str(asset.mint_address.as_str()) {
            Ok(mint) => mint,
            Err(err) => {
                error!("bad mint address for asset {}: {:#?}", asset.symbol, err);
                continue;
            }
        };
        oracles.insert(
            reserve.account(),
            TokenOracle {
                reserve_address: reserve.account(),
                price,
                decimals: asset.decimals,
                symbol: asset.symbol.clone(),
                mint_address,
            },
        );
    }
    Ok(oracles)
}

#[cfg(test)]
mod test {
    use super::*;

    fn price_buffer(price: i64, exponent: i32) -> Vec<u8> {
        let mut buf = vec![0u8; 3312];
        buf[0..4].copy_from_slice(&PYTH_MAGIC.to_le_bytes());
        buf[PYTH_EXPONENT_OFFSET..PYTH_EXPONENT_OFFSET + 4]
            .copy_from_slice(&exponent.to_le_bytes());
        buf[PYTH_AGG_PRICE_OFFSET..PYTH_AGG_PRICE_OFFSET + 8]
            .copy_from_slice(&price.to_le_bytes());
        buf
    }

    #[test]
    fn test_parse_negative_exponent() {
        // 12345678 * 10^-8 = 0.12345678
        let price = parse_pyth_price(&price_buffer(12_345_678, -8)).unwrap();
        assert_eq!(
            price,
            Decimal::from(12_345_678u64)
                .try_div(Decimal::from(100_000_000u64))
                .unwrap()
        );
    }

    #[test]
    fn test_parse_non_negative_exponent() {
        let price = parse_pyth_price(&price_buffer(42, 0)).unwrap();
        assert_eq!(price, Decimal::from(42u64));
        let price = parse_pyth_price(&price_buffer(42, 2)).unwrap();
        assert_eq!(price, Decimal::from(4200u64));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut buf = price_buffer(1, 0);
        buf[0] = 0;
        assert!(parse_pyth_price(&buf).is_err());
    }

    #[test]
    fn test_rejects_short_buffer() {
        assert!(parse_pyth_price(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_rejects_negative_price() {
        assert!(parse_pyth_price(&price_buffer(-1, -8)).is_err());
    }
}
