// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::io;

use crate::Nick;
use crate::gateway::Operation;

/// Invalid user input, caught before anything reaches the network
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The recipient address is empty
    #[error("Please enter a recipient address")]
    MissingRecipient,
    /// No amount was given
    #[error("Please enter an amount")]
    MissingAmount,
    /// The amount is not a number
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// The amount is zero, negative or below one nick
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    /// The fee eats the whole value of the selected notes
    #[error("Fee of {fee} nick leaves nothing to send from {total} nick")]
    FeeExceedsSelection {
        /// Total value of the selected notes
        total: Nick,
        /// Requested fee
        fee: Nick,
    },
    /// The address to activate is empty
    #[error("Please enter an address")]
    MissingAddress,
    /// The seed phrase is empty
    #[error("Please enter a seed phrase")]
    MissingSeedphrase,
    /// The key file to import is empty
    #[error("The key file is empty")]
    EmptyKeyFile,
    /// A custom gRPC endpoint was selected without an address
    #[error("Please enter a custom gRPC address")]
    MissingCustomEndpoint,
    /// A `key=value` setting could not be understood
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// The four ways a wallet operation can fail, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input, or an action the client state does not allow
    Validation,
    /// The backend reported an application failure
    Backend,
    /// The backend could not be reached
    Transport,
    /// The backend is up but its chain RPC is not
    RpcUnavailable,
}

/// Errors returned by this library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid user input
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Backend application error
    #[error("Backend error: {message}")]
    Backend {
        /// Message as reported by the backend
        message: String,
        /// Technical details, if the backend sent any
        details: Option<String>,
    },
    /// The backend cannot reach the chain RPC
    #[error("RPC service unavailable: {message}")]
    RpcUnavailable {
        /// Message as reported by the backend
        message: String,
        /// Technical details, if the backend sent any
        details: Option<String>,
    },
    /// Network or connectivity failure
    #[error("A request error occurred: {0}")]
    Transport(#[from] reqwest::Error),
    /// The HTTP client could not be built
    #[error("Unable to build the HTTP client")]
    HttpClient,
    /// The transaction composer cannot perform this step now
    #[error("Cannot {action} a transaction that is {state}")]
    InvalidTransition {
        /// The attempted step
        action: &'static str,
        /// Current composer state
        state: &'static str,
    },
    /// There is no transaction to sign or send
    #[error("No transaction to send")]
    NoPendingTransaction,
    /// The same request is already running
    #[error("A {0} request is already in progress")]
    RequestInFlight(Operation),
    /// Filesystem errors
    #[error(transparent)]
    IO(#[from] io::Error),
    /// JSON serialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Builds a backend error from a message alone
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            message: message.into(),
            details: None,
        }
    }

    /// Category of the error, driving how it is reported
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InvalidTransition { .. }
            | Self::NoPendingTransaction
            | Self::RequestInFlight(_) => ErrorKind::Validation,
            Self::RpcUnavailable { .. } => ErrorKind::RpcUnavailable,
            Self::Transport(_) | Self::HttpClient => ErrorKind::Transport,
            Self::Backend { .. } | Self::IO(_) | Self::Json(_) => {
                ErrorKind::Backend
            }
        }
    }

    /// Technical details attached by the backend, if any
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Backend { details, .. }
            | Self::RpcUnavailable { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}
