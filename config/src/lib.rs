#![allow(clippy::needless_lifetimes)]
#![allow(clippy::bool_assert_comparison)]

pub mod liquidator;
pub mod markets;
pub mod rpcs;

use crate::{
    liquidator::Liquidator,
    markets::LendingMarkets,
    rpcs::{RPCEndpoint, RPCs},
};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use simplelog::*;
use solana_sdk::signature::{read_keypair_file, Keypair};
use std::fs;
use std::fs::File;

/// main configuration object
#[remain::sorted]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub debug_log: bool,
    pub key_path: String,
    /// the lending market catalogue the bot scans, either embedded here or
    /// fetched from `markets_url`
    pub lending: LendingMarkets,
    pub liquidator: Liquidator,
    pub log_file: String,
    /// optional http endpoint serving the market catalogue as json
    pub markets_url: String,
    pub rpc_endpoints: RPCs,
}

impl Configuration {
    /// cleans the configuration file removing any potentially sensitive information
    /// useful for storing configuration information in version control without accidentally
    /// storing sensitive information
    pub fn sanitize(&mut self) {
        self.key_path = "".to_string();
        self.log_file = "".to_string();
        self.markets_url = "".to_string();
        self.rpc_endpoints.primary_endpoint.http_url = "".to_string();
        self.rpc_endpoints.primary_endpoint.ws_url = "".to_string();
        self.rpc_endpoints.failover_endpoints = vec![];
    }
    pub fn new_config_file(path: &str, as_json: bool) -> Result<()> {
        let config = Configuration::default();
        config.save(path, as_json)
    }
    pub fn save(&self, path: &str, as_json: bool) -> Result<()> {
        let data = if as_json {
            serde_json::to_string_pretty(&self)?
        } else {
            serde_yaml::to_string(&self)?
        };
        fs::write(path, data)?;
        Ok(())
    }
    pub fn load(path: &str, from_json: bool, init_log: bool) -> Result<Configuration> {
        let data = fs::read(path)?;
        let config: Configuration = if from_json {
            serde_json::from_slice(data.as_slice())?
        } else {
            serde_yaml::from_slice(data.as_slice())?
        };
        if init_log {
            config.init_log(false)?;
        }
        Ok(config)
    }
    /// replaces the embedded market catalogue with the one served at
    /// `markets_url`
    pub fn fetch_markets(&mut self) -> Result<()> {
        if self.markets_url.is_empty() {
            return Err(anyhow!("markets_url is not set"));
        }
        self.lending = LendingMarkets::fetch(self.markets_url.as_str())?;
        Ok(())
    }
    /// loads the contents of key_path as a Keypair
    pub fn payer(&self) -> Result<Keypair> {
        read_keypair_file(self.key_path.as_str())
            .map_err(|err| anyhow!("failed to read keypair file {}: {:#?}", self.key_path, err))
    }

    /// if file_log is true, log to both file and stdout
    /// otherwise just log to stdout
    pub fn init_log(&self, file_log: bool) -> Result<()> {
        let level = if self.debug_log {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        let location_level = if self.debug_log {
            LevelFilter::Debug
        } else {
            LevelFilter::Error
        };
        let log_config = ConfigBuilder::new()
            .set_location_level(location_level)
            .build();
        if !file_log {
            TermLogger::init(level, log_config, TerminalMode::Mixed, ColorChoice::Auto)?;
        } else {
            CombinedLogger::init(vec![
                TermLogger::new(
                    level,
                    log_config.clone(),
                    TerminalMode::Mixed,
                    ColorChoice::Auto,
                ),
                WriteLogger::new(level, log_config, File::create(self.log_file.as_str())?),
            ])?;
        }
        Ok(())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            debug_log: false,
            key_path: "".to_string(),
            lending: LendingMarkets::default(),
            liquidator: Liquidator {
                frequency: 30,
                max_concurrency: 4,
            },
            log_file: "".to_string(),
            markets_url: "".to_string(),
            rpc_endpoints: RPCs {
                primary_endpoint: RPCEndpoint {
                    http_url: "https://api.devnet.solana.com".to_string(),
                    ws_url: "ws://api.devnet.solana.com".to_string(),
                },
                failover_endpoints: vec![],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_sanitize() {
        let mut config = Configuration::default();
        config.key_path = "420".to_string();
        config.log_file = "420".to_string();
        config.markets_url = "420".to_string();
        config.rpc_endpoints.primary_endpoint.http_url = "420".to_string();
        config.rpc_endpoints.primary_endpoint.ws_url = "420".to_string();
        config.rpc_endpoints.failover_endpoints.push(RPCEndpoint {
            http_url: "420".to_string(),
            ws_url: "420".to_string(),
        });
        config.sanitize();
        assert!(config.key_path.is_empty());
        assert!(config.log_file.is_empty());
        assert!(config.markets_url.is_empty());
        assert!(config.rpc_endpoints.primary_endpoint.http_url.is_empty());
        assert!(config.rpc_endpoints.primary_endpoint.ws_url.is_empty());
        assert!(config.rpc_endpoints.failover_endpoints.is_empty());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Configuration::default();
        let data = serde_yaml::to_string(&config).unwrap();
        let parsed: Configuration = serde_yaml::from_str(&data).unwrap();
        assert_eq!(parsed.liquidator.frequency, config.liquidator.frequency);
        assert_eq!(
            parsed.rpc_endpoints.primary_endpoint.http_url,
            config.rpc_endpoints.primary_endpoint.http_url
        );
    }
}
