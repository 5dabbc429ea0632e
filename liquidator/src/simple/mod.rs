//! the simple liquidator with no support for flashloans

pub mod handler;

use anyhow::Result;
use config::markets::Market;
use config::Configuration;
use crossbeam::select;
use crossbeam_channel::tick;
use log::{error, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use solana_client::rpc_client::RpcClient;
use std::sync::Arc;

use crate::{prices, scan};

pub struct SimpleLiquidator {
    pub cfg: Arc<Configuration>,
    pub rpc: Arc<RpcClient>,
}

impl SimpleLiquidator {
    pub fn new(cfg: Arc<Configuration>) -> Result<Arc<SimpleLiquidator>> {
        let rpc = cfg.get_rpc_client(None);
        Ok(Arc::new(SimpleLiquidator {
            cfg,
            rpc: Arc::new(rpc),
        }))
    }
    pub fn start(self: &Arc<Self>, exit_chan: crossbeam_channel::Receiver<bool>) -> Result<()> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.cfg.liquidator.max_concurrency as usize)
            .build()?;
        let ticker = tick(std::time::Duration::from_secs(
            self.cfg.liquidator.frequency,
        ));
        loop {
            select! {
                recv(ticker) -> _msg => {
                    for market in self.cfg.lending.markets.iter() {
                        self.process_market(&pool, market);
                    }
                }
                recv(exit_chan) -> _msg => {
                    warn!("liquidator received exit notification");
                    return Ok(());
                }
            }
        }
    }
    /// scans one market and fans the per-obligation checks out onto the
    /// worker pool. a failure anywhere in one obligation's pipeline is
    /// logged and never blocks the others.
    fn process_market(self: &Arc<Self>, pool: &ThreadPool, market: &Market) {
        let program_id = self.cfg.lending.lending_id();
        let market_key = market.address_pubkey();

        let oracles = match prices::get_token_oracles(&self.rpc, &self.cfg.lending, market) {
            Ok(oracles) => Arc::new(oracles),
            Err(err) => {
                error!("failed to fetch oracles for market {}: {:#?}", market_key, err);
                return;
            }
        };
        let reserves = match scan::scan_reserves(&self.rpc, &program_id, &market_key) {
            Ok(reserves) => Arc::new(reserves),
            Err(err) => {
                error!("failed to scan reserves for market {}: {:#?}", market_key, err);
                return;
            }
        };
        let obligations = match scan::scan_obligations(&self.rpc, &program_id, &market_key) {
            Ok(obligations) => obligations,
            Err(err) => {
                error!("failed to scan obligations for market {}: {:#?}", market_key, err);
                return;
            }
        };
        info!(
            "market {}: {} reserves, {} oracles, {} obligations",
            market_key,
            reserves.len(),
            oracles.len(),
            obligations.len()
        );

        for (obligation_key, obligation) in obligations {
            let service = Arc::clone(self);
            let market = market.clone();
            let reserves = Arc::clone(&reserves);
            let oracles = Arc::clone(&oracles);
            pool.spawn(move || {
                match service.handle_obligation(
                    &market,
                    obligation_key,
                    &obligation,
                    &reserves,
                    &oracles,
                ) {
                    Ok(_) => (),
                    Err(err) => error!(
                        "liquidation check for obligation {} failed: {:#?}",
                        obligation_key, err
                    ),
                };
            });
        }
    }
}
