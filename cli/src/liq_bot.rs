use anyhow::Result;
use config::Configuration;
use log::error;
use signal_hook::{
    consts::{SIGINT, SIGQUIT, SIGTERM},
    iterator::Signals,
};
use std::sync::Arc;

pub fn start_simple(_matches: &clap::ArgMatches, config_file_path: String) -> Result<()> {
    let mut cfg = Configuration::load(&config_file_path, false, true)?;
    if !cfg.markets_url.is_empty() {
        cfg.fetch_markets()?;
    }
    let cfg = Arc::new(cfg);
    let service = liquidator::simple::SimpleLiquidator::new(cfg)?;

    let (exit_tx, exit_rx) = crossbeam_channel::bounded::<bool>(1);
    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGQUIT]).expect("failed to register signals");
    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            error!("caught signal {:#?}", sig);
        }
        if let Err(err) = exit_tx.send(true) {
            error!("failed to send exit signal: {:#?}", err);
        }
    });

    service.start(exit_rx)
}
