// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::fmt::{self, Display};

use nock_wallet::TransactionRecord;

/// A row of the transaction history table
pub struct TransactionHistory<'a>(pub &'a TransactionRecord);

impl TransactionHistory<'_> {
    pub fn header() -> String {
        format!(
            "{: ^24} | {: ^11} | {: ^17} | {: ^20} | {: ^64}",
            "TRANSACTION", "STATUS", "AMOUNT", "SENT_AT", "RECIPIENT"
        )
    }
}

impl Display for TransactionHistory<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tx = self.0;
        let name = &tx.transaction_name;
        let status = tx.status.as_str();
        let amount = tx.display_amount().unwrap_or_default();
        let sent_at = tx.sent_at.as_deref().unwrap_or("-");
        let recipient = tx.recipient.as_deref().unwrap_or("-");

        write!(
            f,
            "{name: <24} | {status: ^11} | {amount: >17} | {sent_at: ^20} | {recipient}",
        )?;

        if let Some(hash) = &tx.transaction_hash {
            write!(f, "\n{: <24} > {hash}", "")?;
        }

        Ok(())
    }
}
