// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Transactions the backend has recorded for this wallet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::currency::{self, Nick};

/// Where a recorded transaction stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Created, waiting for a signature
    Created,
    /// Signed, waiting to be sent
    Signed,
    /// Sent to the network
    Sent,
    /// Broadcast to the network
    Broadcasted,
    /// A status this client does not know
    #[serde(other)]
    Unknown,
}

/// The next step a recorded transaction can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    /// Sign it
    Sign,
    /// Send it
    Send,
}

impl TxStatus {
    /// Lowercase name, as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Created => "created",
            TxStatus::Signed => "signed",
            TxStatus::Sent => "sent",
            TxStatus::Broadcasted => "broadcasted",
            TxStatus::Unknown => "unknown",
        }
    }

    /// The step the transaction is waiting for, if any
    pub fn next_action(&self) -> Option<TxAction> {
        match self {
            TxStatus::Created => Some(TxAction::Sign),
            TxStatus::Signed => Some(TxAction::Send),
            _ => None,
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TxAction {
    /// Lowercase name of the step
    pub fn as_str(&self) -> &'static str {
        match self {
            TxAction::Sign => "sign",
            TxAction::Send => "send",
        }
    }
}

/// A transaction as recorded by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Name the backend stores the transaction under
    pub transaction_name: String,
    /// Current status
    pub status: TxStatus,
    /// Recipient address
    #[serde(default)]
    pub recipient: Option<String>,
    /// Amount in [`Nick`]
    #[serde(default)]
    pub amount: Option<Nick>,
    /// Hash once the transaction is on chain
    #[serde(default)]
    pub transaction_hash: Option<String>,
    /// When the transaction was sent, as reported
    #[serde(default)]
    pub sent_at: Option<String>,
}

impl TransactionRecord {
    /// The amount formatted in Nock
    pub fn display_amount(&self) -> Option<String> {
        self.amount.map(currency::to_display_unit)
    }
}

/// Find a record by name
pub fn find<'a>(
    records: &'a [TransactionRecord],
    name: &str,
) -> Option<&'a TransactionRecord> {
    records.iter().find(|r| r.transaction_name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_from_backend() {
        let records: Vec<TransactionRecord> = serde_json::from_str(
            r#"[
              {"transaction_name": "tx_a", "status": "created",
               "recipient": "R", "amount": 131072},
              {"transaction_name": "tx_b", "status": "signed"},
              {"transaction_name": "tx_c", "status": "sent",
               "transaction_hash": "abc", "sent_at": "2025-01-01T10:00:00"},
              {"transaction_name": "tx_d", "status": "pending"}
            ]"#,
        )
        .unwrap();

        assert_eq!(records[0].status.next_action(), Some(TxAction::Sign));
        assert_eq!(records[0].display_amount().as_deref(), Some("2.0000"));
        assert_eq!(records[1].status.next_action(), Some(TxAction::Send));
        assert_eq!(records[2].status.next_action(), None);
        assert_eq!(records[3].status, TxStatus::Unknown);
        assert_eq!(find(&records, "tx_c").unwrap().status, TxStatus::Sent);
        assert!(find(&records, "tx_z").is_none());
    }
}
