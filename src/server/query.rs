//! `GET /maaspower/:mac_address/:port_idx/query` — plain-text power status.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::power::{PowerState, port_power};
use crate::server::AppState;

/// Report a port's power as `status : running` or `status : stopped`.
///
/// A PoE mode with no power meaning gets a line naming the queried port.
/// Failures answer with the error text and its mapped status.
pub async fn handle_query(
    State(state): State<AppState>,
    Path((mac_address, port_idx)): Path<(String, String)>,
) -> (StatusCode, String) {
    let port = match state.ports().lookup_port(&mac_address, &port_idx).await {
        Ok(port) => port,
        Err(e) => {
            tracing::warn!(mac = %mac_address, port_idx = %port_idx, error = %e, "status query failed");
            return (
                e.status_code(),
                format!(
                    "error querying power for MAC Address {}, Port Index {}: {}",
                    mac_address, port_idx, e
                ),
            );
        }
    };

    let body = match port_power(&port) {
        Some(PowerState::On) => "status : running".to_string(),
        Some(PowerState::Off) => "status : stopped".to_string(),
        None => format!(
            "query request for MAC Address {}, Port Index {}",
            mac_address, port_idx
        ),
    };
    (StatusCode::OK, body)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use crate::server::router;
    use crate::server::test_support::{send, state};
    use crate::unifi::fake::{FakeDeviceApi, switch};

    async fn query(api: FakeDeviceApi, uri: &str) -> (StatusCode, String) {
        let app = router(state(Arc::new(api)));
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn test_stopped() {
        let api = FakeDeviceApi::with_device(switch(&[(2, "off")]));
        let (status, body) = query(api, "/maaspower/AA:BB:CC:DD:EE:FF/2/query").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "status : stopped");
    }

    #[tokio::test]
    async fn test_running() {
        let api = FakeDeviceApi::with_device(switch(&[(1, "auto")]));
        let (status, body) = query(api, "/maaspower/aa:bb:cc:dd:ee:ff/1/query").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "status : running");
    }

    #[tokio::test]
    async fn test_unmapped_mode() {
        let api = FakeDeviceApi::with_device(switch(&[(4, "passthrough")]));
        let (status, body) = query(api, "/maaspower/aa:bb:cc:dd:ee:ff/4/query").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "query request for MAC Address aa:bb:cc:dd:ee:ff, Port Index 4"
        );
    }

    #[tokio::test]
    async fn test_non_numeric_port_index() {
        let api = FakeDeviceApi::with_device(switch(&[(2, "off")]));
        let (status, body) = query(api, "/maaspower/aa:bb:cc:dd:ee:ff/abc/query").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("error getting integer value from port 'abc'"));
    }

    #[tokio::test]
    async fn test_invalid_mac() {
        let api = FakeDeviceApi::with_device(switch(&[(2, "off")]));
        let (status, body) = query(api, "/maaspower/not-a-mac/2/query").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("invalid MAC address"));
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let api = FakeDeviceApi::with_device(switch(&[(2, "off")]));
        let (status, body) = query(api, "/maaspower/00:11:22:33:44:55/2/query").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("00:11:22:33:44:55"));
    }
}
