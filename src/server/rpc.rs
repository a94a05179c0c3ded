//! `POST /rpc` — RPC envelope dispatch.
//!
//! Failures are answered per request with a status from
//! [`BmcError::status_code`] and a `ResponsePayload` whose `error` is set. A
//! failed request never takes the server down.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::BmcError;
use crate::power::PowerState;
use crate::rpc::{Call, RequestPayload, ResponsePayload};
use crate::server::AppState;

/// Axum handler for `POST /rpc`.
///
/// The body is decoded by hand so that any malformed envelope is a bare 400
/// regardless of content type.
pub async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let request: RequestPayload = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "malformed RPC body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let RequestPayload {
        id,
        host,
        method,
        params,
    } = request;

    let call = match Call::from_request(&method, params) {
        Ok(call) => call,
        Err(BmcError::UnknownMethod(method)) => {
            tracing::warn!(host = %host, method = %method, "unknown RPC method");
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(e) => return failure(id, host, e),
    };

    match dispatch(&state, &host, call).await {
        Ok(result) => Json(ResponsePayload::success(id, host, result)).into_response(),
        Err(e) => failure(id, host, e),
    }
}

async fn dispatch(state: &AppState, host: &str, call: Call) -> crate::Result<Value> {
    if !call.needs_machine() {
        return Ok(pong());
    }

    let machine = state.machine(host)?;
    let (mac, port_idx) = (machine.mac_address.as_str(), machine.port_idx.as_str());

    tracing::debug!(host = %host, method = call.method(), mac = %mac, port_idx = %port_idx, "dispatching RPC");

    match call {
        Call::Ping => Ok(pong()),
        Call::PowerGet => {
            let power = state.ports().get_power(mac, port_idx).await?;
            // Unmapped PoE modes are reported as an empty state.
            Ok(Value::String(
                power.map(PowerState::as_str).unwrap_or_default().to_string(),
            ))
        }
        Call::PowerSet(params) => {
            match PowerState::parse(&params.state) {
                Some(desired) => {
                    let change = state.ports().set_power(mac, port_idx, desired).await?;
                    tracing::info!(host = %host, state = %desired, change = ?change, "power set");
                }
                None => {
                    tracing::warn!(host = %host, state = %params.state, "ignoring unsupported power state");
                }
            }
            Ok(Value::Null)
        }
        Call::BootDevice(params) => {
            // Not wired to the controller; acknowledged and echoed back.
            tracing::info!(
                host = %host,
                device = %params.device,
                persistent = params.persistent,
                efi_boot = params.efi_boot,
                "boot device request (no-op)"
            );
            Ok(Value::String(format!(
                "boot device request for MAC Address {}, Port Index {}, Device {}, Persistent {}, EFIBoot {}",
                mac, port_idx, params.device, params.persistent, params.efi_boot
            )))
        }
    }
}

fn pong() -> Value {
    Value::String("pong".to_string())
}

fn failure(id: i64, host: String, error: BmcError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(host = %host, error = %error, "RPC request failed");
    } else {
        tracing::warn!(host = %host, error = %error, "RPC request rejected");
    }
    let body = ResponsePayload::failure(id, host, status.as_u16(), error.to_string());
    (status, Json(body)).into_response()
}
