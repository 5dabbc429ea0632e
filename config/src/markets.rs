//! describes the lending markets the bot works against: the lending program,
//! the traded assets, the oracle account per asset and the reserve accounts
//! per market. matches the catalogue payload served by the markets endpoint.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::{collections::HashMap, str::FromStr};

#[remain::sorted]
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct LendingMarkets {
    pub assets: Vec<Asset>,
    pub markets: Vec<Market>,
    pub oracles: Oracles,
    /// the lending program id
    pub program_id: String,
}

#[remain::sorted]
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct Asset {
    /// the number of decimals in the token mint
    pub decimals: u8,
    pub mint_address: String,
    pub name: String,
    pub symbol: String,
}

#[remain::sorted]
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct Oracles {
    pub assets: Vec<OracleAsset>,
    pub pyth_program_id: String,
}

/// an asset specific price feed account
#[remain::sorted]
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct OracleAsset {
    /// asset symbol this feed prices
    pub asset: String,
    /// the price account which stores pricing information
    pub price_address: String,
}

#[remain::sorted]
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct Market {
    /// lending market account address
    pub address: String,
    pub authority: String,
    pub name: String,
    pub reserves: Vec<MarketReserve>,
}

#[remain::sorted]
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct MarketReserve {
    /// reserve account address
    pub address: String,
    /// asset symbol backing this reserve
    pub asset: String,
    pub collateral_mint_address: String,
    pub collateral_supply_address: String,
    pub liquidity_address: String,
    pub liquidity_fee_receiver_address: String,
}

impl LendingMarkets {
    /// fetches the catalogue from an http endpoint serving it as json
    pub fn fetch(url: &str) -> Result<LendingMarkets> {
        let markets: LendingMarkets = reqwest::blocking::get(url)?.json()?;
        Ok(markets)
    }
    pub fn lending_id(&self) -> Pubkey {
        parse_pubkey(self.program_id.as_str())
    }
    /// returns the asset entry for the given symbol
    pub fn asset_by_symbol(&self, symbol: &str) -> Result<&Asset> {
        self.assets
            .iter()
            .find(|asset| asset.symbol.eq(symbol))
            .ok_or_else(|| anyhow!("failed to find asset {} in catalogue", symbol))
    }
    /// returns the oracle price account for the given asset symbol
    pub fn oracle_address(&self, asset: &str) -> Result<Pubkey> {
        self.oracles
            .assets
            .iter()
            .find(|oracle| oracle.asset.eq(asset))
            .map(|oracle| parse_pubkey(oracle.price_address.as_str()))
            .ok_or_else(|| anyhow!("failed to find oracle for asset {}", asset))
    }
}

impl Market {
    pub fn address_pubkey(&self) -> Pubkey {
        parse_pubkey(self.address.as_str())
    }
    /// returns a HashMap of reserve_account -> market reserve entry
    pub fn reserve_map(&self) -> HashMap<Pubkey, MarketReserve> {
        let mut reserve_map = HashMap::with_capacity(self.reserves.len());
        for reserve in self.reserves.iter() {
            reserve_map.insert(reserve.account(), reserve.clone());
        }
        reserve_map
    }
    pub fn reserve_by_asset(&self, asset: &str) -> Result<&MarketReserve> {
        self.reserves
            .iter()
            .find(|reserve| reserve.asset.eq(asset))
            .ok_or_else(|| anyhow!("failed to find reserve for asset {}", asset))
    }
    pub fn reserve_by_address(&self, address: &Pubkey) -> Result<&MarketReserve> {
        let address = address.to_string();
        self.reserves
            .iter()
            .find(|reserve| reserve.address.eq(&address))
            .ok_or_else(|| anyhow!("failed to find reserve {}", address))
    }
}

impl MarketReserve {
    pub fn account(&self) -> Pubkey {
        parse_pubkey(self.address.as_str())
    }
    pub fn collateral_mint(&self) -> Pubkey {
        parse_pubkey(self.collateral_mint_address.as_str())
    }
    pub fn collateral_supply(&self) -> Pubkey {
        parse_pubkey(self.collateral_supply_address.as_str())
    }
    pub fn liquidity_supply(&self) -> Pubkey {
        parse_pubkey(self.liquidity_address.as_str())
    }
}

fn parse_pubkey(value: &str) -> Pubkey {
    if value.is_empty() {
        Pubkey::default()
    } else {
        Pubkey::from_str(value).expect("failed to parse pubkey")
    }
}
