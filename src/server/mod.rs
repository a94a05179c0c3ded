//! HTTP surface for the BMC RPC service.
//!
//! Two routes:
//! - `POST /rpc`: RPC envelope dispatch (see [`rpc`]).
//! - `GET /maaspower/:mac_address/:port_idx/query`: plain-text status line (see [`query`]).

pub mod query;
pub mod rpc;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::config::{BmcConfig, Machine};
use crate::error::BmcError;
use crate::power::PortController;
use crate::unifi::{DeviceApi, UnifiClient};

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    machines: Arc<HashMap<String, Machine>>,
    ports: PortController,
}

impl AppState {
    pub fn new(machines: HashMap<String, Machine>, api: Arc<dyn DeviceApi>) -> Self {
        Self {
            machines: Arc::new(machines),
            ports: PortController::new(api),
        }
    }

    /// Build state backed by a live controller client.
    pub fn from_config(config: &BmcConfig) -> crate::Result<Self> {
        let client = UnifiClient::from_config(config)?;
        Ok(Self::new(config.machines.clone(), Arc::new(client)))
    }

    /// Machine configured for `host`.
    pub fn machine(&self, host: &str) -> crate::Result<&Machine> {
        self.machines
            .get(host)
            .ok_or_else(|| BmcError::UnknownHost(host.to_string()))
    }

    pub fn ports(&self) -> &PortController {
        &self.ports
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rpc", post(rpc::handle_rpc))
        .route(
            "/maaspower/:mac_address/:port_idx/query",
            get(query::handle_query),
        )
        .with_state(state)
}
