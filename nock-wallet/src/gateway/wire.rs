// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::address::Address;
use crate::currency::Nick;
use crate::history::TransactionRecord;
use crate::note::{Note, NoteName, NoteSnapshot};
use crate::Error;

/// Opaque backend configuration object
pub type ConfigMap = Map<String, Value>;

/// Failure markers every endpoint may carry
#[derive(Debug, Default, Deserialize)]
struct Failure {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    is_rpc_error: bool,
    #[serde(default)]
    error_details: Option<Value>,
}

fn text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Turns the failure markers of a response body into an [`Error`], if any
pub(crate) fn check(status: StatusCode, body: &Value) -> Result<(), Error> {
    let failure = Failure::deserialize(body).unwrap_or_default();
    let details = failure.error_details.map(text);

    match (failure.error, failure.success) {
        (Some(error), success) if success != Some(true) => {
            let message = text(error);
            if failure.is_rpc_error {
                Err(Error::RpcUnavailable { message, details })
            } else {
                Err(Error::Backend { message, details })
            }
        }
        (_, Some(false)) => Err(Error::Backend {
            message: format!("{status}: request failed"),
            details,
        }),
        _ if !status.is_success() => Err(Error::Backend {
            message: status.to_string(),
            details,
        }),
        _ => Ok(()),
    }
}

/// Decode an already parsed body
pub(crate) fn decode_value<T>(status: StatusCode, body: Value) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    check(status, &body)?;
    Ok(serde_json::from_value(body)?)
}

/// Decode a raw response body
pub(crate) fn decode<T>(status: StatusCode, body: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => decode_value(status, value),
        Err(_) if !status.is_success() => {
            let body = String::from_utf8_lossy(body);
            Err(Error::backend(format!("{status}: {}", body.trim())))
        }
        Err(e) => Err(e.into()),
    }
}

/// Balance of the active address
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceReport {
    /// Number of notes
    #[serde(default)]
    pub notes_count: usize,
    /// Sum of all notes, in [`Nick`]
    #[serde(default)]
    pub total_assets: Nick,
    /// The notes themselves
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl BalanceReport {
    /// Turn the report into an immutable snapshot
    pub fn into_snapshot(self) -> NoteSnapshot {
        NoteSnapshot::new(self.notes, self.notes_count, self.total_assets)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MasterAddresses {
    #[serde(default, alias = "master_addresses")]
    pub addresses: Vec<Address>,
}

/// Result of switching the active address
#[derive(Debug, Clone, Deserialize)]
pub struct SetActiveReport {
    /// The address now active
    #[serde(default)]
    pub active_address: Option<String>,
    /// Its version
    #[serde(default)]
    pub version: Option<u32>,
    /// Backend message
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    balance: Option<Value>,
}

impl SetActiveReport {
    /// The balance of the new active address, when the backend sent one
    pub fn balance(&self) -> Option<Result<BalanceReport, Error>> {
        self.balance
            .clone()
            .map(|balance| decode_value(StatusCode::OK, balance))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct History {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

/// Transfer creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTransaction {
    /// Recipient address
    pub recipient: String,
    /// Amount in Nock
    pub amount_nock: f64,
    /// Fee in [`Nick`]
    pub fee: Nick,
    /// Notes funding the transfer, `None` lets the backend pick
    pub selected_notes: Option<Vec<NoteName>>,
    /// Spend the selected notes entirely
    pub use_all_funds: bool,
}

/// A transaction the backend created and holds under its name
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTransaction {
    /// Name the backend stores the transaction under
    #[serde(alias = "tx_file")]
    pub transaction_name: String,
    /// Backend command output
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransactionName<'a> {
    pub transaction_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetActive<'a> {
    pub address: &'a str,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    /// Backend message
    #[serde(default)]
    pub message: Option<String>,
    /// Backend command output
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct Seedphrase {
    pub seedphrase: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ConfigPayload {
    Wrapped { config: ConfigMap },
    Bare(ConfigMap),
}

impl ConfigPayload {
    pub fn into_map(self) -> ConfigMap {
        match self {
            ConfigPayload::Wrapped { config } => config,
            ConfigPayload::Bare(config) => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn rpc_errors_are_told_apart() {
        let body = br#"{"notes": [], "notes_count": 0, "total_assets": 0,
            "error": "RPC Service Unavailable",
            "error_details": "gRPC: service is currently unavailable",
            "is_rpc_error": true}"#;
        let err = decode::<BalanceReport>(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RpcUnavailable);
        assert_eq!(err.details(), Some("gRPC: service is currently unavailable"));

        let body = br#"{"error": "Command Failed", "is_rpc_error": false}"#;
        let err = decode::<BalanceReport>(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert_eq!(err.to_string(), "Backend error: Command Failed");
    }

    #[test]
    fn failures_without_message() {
        let err = decode::<Ack>(StatusCode::OK, br#"{"success": false}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);

        let err = decode::<Ack>(StatusCode::BAD_GATEWAY, b"<html>bad</html>")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Backend error: 502 Bad Gateway: <html>bad</html>"
        );

        let err =
            decode::<Ack>(StatusCode::INTERNAL_SERVER_ERROR, br#"{}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[test]
    fn error_status_with_message() {
        let body = br#"{"success": false, "error": "Missing address parameter"}"#;
        let err = decode::<SetActiveReport>(StatusCode::BAD_REQUEST, body)
            .unwrap_err();
        assert_eq!(err.to_string(), "Backend error: Missing address parameter");
    }

    #[test]
    fn successful_bodies() {
        let body = br#"{"success": true, "transaction_name": "tx_1.json",
            "output": "ok"}"#;
        let created: CreatedTransaction =
            decode(StatusCode::OK, body).unwrap();
        assert_eq!(created.transaction_name, "tx_1.json");

        let body = br#"{"notes_count": 1, "total_assets": 655360,
            "notes": [{"name": "n", "value": 655360, "block_height": 3}]}"#;
        let report: BalanceReport = decode(StatusCode::OK, body).unwrap();
        let snapshot = report.into_snapshot();
        assert_eq!(snapshot.total_assets(), 655_360);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn embedded_balance() {
        let body = br#"{"success": true, "active_address": "ADDR",
            "balance": {"error": "Command Failed"}}"#;
        let report: SetActiveReport = decode(StatusCode::OK, body).unwrap();
        assert!(matches!(report.balance(), Some(Err(_))));
        assert_eq!(report.active_address.as_deref(), Some("ADDR"));
    }

    #[test]
    fn config_bare_or_wrapped() {
        let bare: ConfigPayload =
            serde_json::from_str(r#"{"grpc": {"type": "public"}}"#).unwrap();
        assert!(bare.into_map().contains_key("grpc"));

        let wrapped: ConfigPayload = serde_json::from_str(
            r#"{"success": true, "config": {"grpc": {"type": "private"}}}"#,
        )
        .unwrap();
        let map = wrapped.into_map();
        assert!(map.contains_key("grpc"));
        assert!(!map.contains_key("success"));
    }
}
