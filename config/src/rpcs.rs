use crate::Configuration;
use serde::{Deserialize, Serialize};
use solana_client::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;

#[remain::sorted]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RPCs {
    pub failover_endpoints: Vec<RPCEndpoint>,
    pub primary_endpoint: RPCEndpoint,
}

#[remain::sorted]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RPCEndpoint {
    pub http_url: String,
    pub ws_url: String,
}

impl Configuration {
    /// returns the primary rpc provider
    pub fn get_rpc_client(&self, commitment: Option<CommitmentConfig>) -> RpcClient {
        RpcClient::new_with_commitment(
            self.rpc_endpoints.primary_endpoint.http_url.clone(),
            commitment.unwrap_or_else(CommitmentConfig::confirmed),
        )
    }
    /// returns a vector of clients for the failover rpc endpoints in the
    /// order they are declared in the config file
    pub fn get_rpc_failover_clients(
        &self,
        commitment: Option<CommitmentConfig>,
    ) -> Vec<Arc<RpcClient>> {
        let commitment = commitment.unwrap_or_else(CommitmentConfig::confirmed);
        self.rpc_endpoints
            .failover_endpoints
            .iter()
            .map(|failover| {
                Arc::new(RpcClient::new_with_commitment(
                    failover.http_url.clone(),
                    commitment,
                ))
            })
            .collect()
    }
}
