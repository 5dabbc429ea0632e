use serde::{Deserialize, Serialize};

#[remain::sorted]
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
/// provides configuration options for the liquidator service
pub struct Liquidator {
    /// how often in seconds the liquidator workloop should run
    pub frequency: u64,
    /// the maximum number of concurrent tasks executable by the liquidator,
    /// this includes checking whether a position can be liquidated as well as
    /// liquidating it
    pub max_concurrency: u64,
}
