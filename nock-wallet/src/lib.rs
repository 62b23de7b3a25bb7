// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! # Nock Wallet Lib
//!
//! The `nock_wallet` library is a headless client for the Nockchain wallet
//! backend. Every piece of business logic (key storage, signing, note
//! selection validation, chain sync) lives in the backend; this crate keeps
//! the client side state consistent while orchestrating the HTTP calls.
//!
//! Clients build a [`Session`] around a [`Gateway`] (usually an
//! [`HttpGateway`]) and drive it with [`Action`]s: refresh the balance,
//! select notes, compose a transfer, sign it and send it.

#![deny(missing_docs)]

mod error;
mod gateway;
mod session;

pub mod address;
pub mod composer;
pub mod currency;
pub mod fee;
pub mod grpc;
pub mod history;
pub mod keys;
pub mod note;
pub mod selection;
pub mod view;

pub use error::{Error, ErrorKind, ValidationError};
pub use gateway::{
    Ack, BalanceReport, ConfigMap, CreateTransaction, CreatedTransaction,
    Gateway, HttpGateway, InFlight, InFlightGuard, Operation,
    SetActiveReport,
};
pub use session::{Action, Outcome, Session};

pub use address::{ActiveAddress, Address, AddressBook};
pub use composer::{
    AmountField, Composer, ComposerState, PendingTransaction, TransferForm,
};
pub use currency::Nick;
pub use grpc::{GrpcConfig, GrpcKind};
pub use history::{TransactionRecord, TxAction, TxStatus};
pub use keys::{KeySource, SeedphraseImport};
pub use note::{Note, NoteName, NoteSnapshot, SortKey, SortOrder};
pub use selection::NoteSelection;
pub use view::BalanceView;

/// The backend the client talks to when nothing else is configured
pub const DEFAULT_BACKEND: &str = "http://127.0.0.1:5007";
