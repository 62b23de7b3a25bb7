// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::Error;

/// Logical backend operations, one outstanding request each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetch the balance
    Balance,
    /// Fetch the active address
    ActiveAddress,
    /// List the master addresses
    MasterAddresses,
    /// Switch the active address
    SetActiveAddress,
    /// Fetch the transaction history
    History,
    /// Create a transaction
    CreateTransaction,
    /// Sign a transaction
    SignTransaction,
    /// Send a transaction
    SendTransaction,
    /// Import keys from a file or seed
    ImportKeys,
    /// Import keys from a seed phrase
    ImportSeedphrase,
    /// Reveal the seed phrase
    ShowSeedphrase,
    /// Download the keys
    ExportKeys,
    /// Read or write the backend configuration
    Config,
    /// Read or write the gRPC configuration
    GrpcConfig,
    /// Health check
    Health,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Balance => "balance",
            Operation::ActiveAddress => "active address",
            Operation::MasterAddresses => "address list",
            Operation::SetActiveAddress => "address switch",
            Operation::History => "history",
            Operation::CreateTransaction => "create transaction",
            Operation::SignTransaction => "sign transaction",
            Operation::SendTransaction => "send transaction",
            Operation::ImportKeys => "key import",
            Operation::ImportSeedphrase => "seed phrase import",
            Operation::ShowSeedphrase => "seed phrase",
            Operation::ExportKeys => "key export",
            Operation::Config => "config",
            Operation::GrpcConfig => "gRPC config",
            Operation::Health => "health",
        };
        f.write_str(name)
    }
}

/// Tracks the requests currently running.
///
/// Entering an operation that is already running fails instead of letting
/// two responses race to update the same state.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    running: Arc<Mutex<HashSet<Operation>>>,
}

impl InFlight {
    /// Mark the operation as running until the returned guard is dropped
    ///
    /// # Errors
    /// Returns [`Error::RequestInFlight`] if the operation is already running
    pub fn enter(&self, op: Operation) -> Result<InFlightGuard, Error> {
        if !self.running.lock().insert(op) {
            return Err(Error::RequestInFlight(op));
        }
        Ok(InFlightGuard {
            running: self.running.clone(),
            op,
        })
    }

    /// Returns `true` if the operation is running
    pub fn is_running(&self, op: Operation) -> bool {
        self.running.lock().contains(&op)
    }
}

/// Releases its operation on drop
#[derive(Debug)]
pub struct InFlightGuard {
    running: Arc<Mutex<HashSet<Operation>>>,
    op: Operation,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.running.lock().remove(&self.op);
    }
}
