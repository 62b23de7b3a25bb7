// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Transfer composition: create, sign and send, one step at a time.
//!
//! The backend holds the transaction between steps; the composer only keeps
//! the name it was stored under and the parameters it was built from.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::currency::{self, Nick};
use crate::fee::Fee;
use crate::gateway::{CreateTransaction, Gateway};
use crate::note::NoteName;
use crate::selection::NoteSelection;
use crate::{Error, ValidationError};

/// Delay before the balance is refreshed after a successful send
pub const SEND_REFRESH_DELAY: Duration = Duration::from_millis(2000);

/// Delay before the balance is refreshed when a sent transfer is dismissed
pub const DISMISS_REFRESH_DELAY: Duration = Duration::from_millis(500);

/// A transaction created by the backend and not yet dismissed
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransaction {
    /// Name the backend stores the transaction under
    pub name: String,
    /// Recipient address
    pub recipient: String,
    /// Transferred amount
    pub amount: Nick,
    /// Fee paid
    pub fee: Nick,
    /// Notes funding the transfer, if the user picked them
    pub selected_notes: Option<Vec<NoteName>>,
    /// Backend output of the last step
    pub output: Option<String>,
}

impl fmt::Display for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {} nock (fee {} nick)",
            self.name,
            self.recipient,
            currency::to_display_unit(self.amount),
            self.fee
        )
    }
}

/// Where the composer stands
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ComposerState {
    /// Nothing created yet
    #[default]
    Idle,
    /// Created by the backend, not signed
    Created(PendingTransaction),
    /// Signed, not sent
    Signed(PendingTransaction),
    /// Handed to the network
    Sent(PendingTransaction),
}

impl ComposerState {
    /// Lowercase state name
    pub fn name(&self) -> &'static str {
        match self {
            ComposerState::Idle => "idle",
            ComposerState::Created(_) => "created",
            ComposerState::Signed(_) => "signed",
            ComposerState::Sent(_) => "sent",
        }
    }

    /// The transaction being worked on
    pub fn pending(&self) -> Option<&PendingTransaction> {
        match self {
            ComposerState::Idle => None,
            ComposerState::Created(tx)
            | ComposerState::Signed(tx)
            | ComposerState::Sent(tx) => Some(tx),
        }
    }
}

impl fmt::Display for ComposerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User input for a transfer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferForm {
    /// Recipient address
    pub recipient: String,
    /// Amount in Nock, ignored when notes are selected
    pub amount: Option<String>,
    /// Fee override in [`Nick`]
    pub fee: Option<Nick>,
}

impl TransferForm {
    /// A form for a typed amount
    pub fn new<R, A>(recipient: R, amount: A) -> Self
    where
        R: Into<String>,
        A: Into<String>,
    {
        Self {
            recipient: recipient.into(),
            amount: Some(amount.into()),
            fee: None,
        }
    }

    /// A form spending the selected notes
    pub fn spend_selection<R: Into<String>>(recipient: R) -> Self {
        Self {
            recipient: recipient.into(),
            amount: None,
            fee: None,
        }
    }

    /// Override the fee
    pub fn with_fee(mut self, fee: Nick) -> Self {
        self.fee = Some(fee);
        self
    }
}

/// The amount input as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    /// Free input
    Editable,
    /// Derived from the selection, read only
    Locked(Nick),
}

impl AmountField {
    /// Whether the user may type an amount
    pub fn is_editable(&self) -> bool {
        matches!(self, AmountField::Editable)
    }

    /// The value to show for a locked field
    pub fn display(&self) -> Option<String> {
        match self {
            AmountField::Editable => None,
            AmountField::Locked(amount) => {
                Some(currency::to_display_unit(*amount))
            }
        }
    }
}

/// Amount left for the recipient once the fee is taken from the selection
pub fn derive_amount(selection_total: Nick, fee: Nick) -> Nick {
    selection_total.saturating_sub(fee)
}

/// Drives a transfer through create, sign and send.
#[derive(Debug, Default)]
pub struct Composer {
    state: ComposerState,
    fee: Fee,
    was_sent: bool,
}

impl Composer {
    /// A composer with nothing pending and the default fee
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over: no transaction, default fee, nothing sent
    pub fn open(&mut self) {
        *self = Self::default();
    }

    /// Current state
    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    /// Current fee in [`Nick`]
    pub fn fee(&self) -> Nick {
        self.fee.amount()
    }

    /// Set the fee, `None` restores the default
    pub fn set_fee<T: Into<Option<Nick>>>(&mut self, fee: T) {
        self.fee.set(fee);
    }

    /// A transfer was sent since the composer was opened
    pub fn was_sent(&self) -> bool {
        self.was_sent
    }

    /// How the amount input behaves for the given selection
    pub fn amount_field(&self, selection: &NoteSelection) -> AmountField {
        if selection.is_empty() {
            AmountField::Editable
        } else {
            AmountField::Locked(derive_amount(selection.total(), self.fee()))
        }
    }

    /// Validate the form and build the creation request.
    ///
    /// With notes selected the amount is the selection total minus the fee
    /// and the typed amount is ignored.
    ///
    /// # Errors
    /// The first failed check
    pub fn prepare(
        &self,
        form: &TransferForm,
        selection: &NoteSelection,
    ) -> Result<CreateTransaction, ValidationError> {
        let recipient = form.recipient.trim();
        if recipient.is_empty() {
            return Err(ValidationError::MissingRecipient);
        }

        let fee = form.fee.unwrap_or(self.fee());

        let (amount, selected_notes) = if selection.is_empty() {
            let input = form.amount.as_deref().unwrap_or_default();
            (currency::parse_amount(input)?, None)
        } else {
            if form.amount.is_some() {
                debug!("Typed amount ignored, spending the selection");
            }
            let total = selection.total();
            let amount = derive_amount(total, fee);
            if amount == 0 {
                return Err(ValidationError::FeeExceedsSelection {
                    total,
                    fee,
                });
            }
            (amount, Some(selection.names()))
        };

        Ok(CreateTransaction {
            recipient: recipient.to_string(),
            amount_nock: currency::to_nock(amount),
            fee,
            use_all_funds: selected_notes.is_some(),
            selected_notes,
        })
    }

    /// Validate the form and have the backend create the transaction.
    ///
    /// Nothing is sent to the backend if validation fails.
    ///
    /// # Errors
    /// Validation errors, or any error of the creation endpoint
    pub async fn compose<G>(
        &mut self,
        gateway: &G,
        selection: &NoteSelection,
        form: &TransferForm,
    ) -> Result<&PendingTransaction, Error>
    where
        G: Gateway + ?Sized,
    {
        if !matches!(self.state, ComposerState::Idle) {
            return Err(self.invalid("create"));
        }
        if let Some(fee) = form.fee {
            self.fee.set(fee);
        }

        let request = self.prepare(form, selection)?;
        let created = gateway.create_transaction(&request).await?;
        info!("Transaction {} created", created.transaction_name);

        let tx = PendingTransaction {
            name: created.transaction_name,
            recipient: request.recipient,
            amount: currency::to_base_units(request.amount_nock),
            fee: request.fee,
            selected_notes: request.selected_notes,
            output: created.output,
        };
        self.state = ComposerState::Created(tx);
        self.pending_ref()
    }

    /// Sign the created transaction.
    ///
    /// On failure the transaction stays created and signing may be retried.
    ///
    /// # Errors
    /// [`Error::InvalidTransition`] unless a transaction is created, or any
    /// error of the signing endpoint
    pub async fn sign<G>(
        &mut self,
        gateway: &G,
    ) -> Result<&PendingTransaction, Error>
    where
        G: Gateway + ?Sized,
    {
        let name = match &self.state {
            ComposerState::Created(tx) => tx.name.clone(),
            _ => return Err(self.invalid("sign")),
        };

        let ack = gateway.sign_transaction(&name).await.inspect_err(|e| {
            warn!("Signing {name} failed: {e}");
        })?;
        info!("Transaction {name} signed");

        self.state = match std::mem::take(&mut self.state) {
            ComposerState::Created(mut tx) => {
                tx.output = ack.output.or(tx.output);
                ComposerState::Signed(tx)
            }
            other => other,
        };
        self.pending_ref()
    }

    /// Send the signed transaction.
    ///
    /// The selection is cleared, since its notes are now spent, and the
    /// delay after which the balance should be refreshed is returned. On
    /// failure the transaction stays signed.
    ///
    /// # Errors
    /// [`Error::InvalidTransition`] unless a transaction is signed, or any
    /// error of the send endpoint
    pub async fn send<G>(
        &mut self,
        gateway: &G,
        selection: &mut NoteSelection,
    ) -> Result<Duration, Error>
    where
        G: Gateway + ?Sized,
    {
        let name = match &self.state {
            ComposerState::Signed(tx) => tx.name.clone(),
            _ => return Err(self.invalid("send")),
        };

        let ack = gateway.send_transaction(&name).await.inspect_err(|e| {
            warn!("Sending {name} failed: {e}");
        })?;
        info!("Transaction {name} sent");

        self.state = match std::mem::take(&mut self.state) {
            ComposerState::Signed(mut tx) => {
                tx.output = ack.output.or(tx.output);
                ComposerState::Sent(tx)
            }
            other => other,
        };
        self.was_sent = true;
        selection.clear();

        Ok(SEND_REFRESH_DELAY)
    }

    /// Sign then send, stopping at the first failure
    ///
    /// # Errors
    /// See [`Composer::sign`] and [`Composer::send`]
    pub async fn confirm<G>(
        &mut self,
        gateway: &G,
        selection: &mut NoteSelection,
    ) -> Result<Duration, Error>
    where
        G: Gateway + ?Sized,
    {
        self.sign(gateway).await?;
        self.send(gateway, selection).await
    }

    /// Close the composer, dropping the pending transaction.
    ///
    /// Returns the refresh delay if a transfer was sent meanwhile.
    pub fn dismiss(&mut self) -> Option<Duration> {
        if let Some(tx) = self.state.pending() {
            debug!("Dismissing {} transaction {}", self.state, tx.name);
        }
        self.state = ComposerState::Idle;
        std::mem::take(&mut self.was_sent).then_some(DISMISS_REFRESH_DELAY)
    }

    fn invalid(&self, action: &'static str) -> Error {
        if matches!(self.state, ComposerState::Idle) && action != "create" {
            return Error::NoPendingTransaction;
        }
        Error::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    fn pending_ref(&self) -> Result<&PendingTransaction, Error> {
        self.state.pending().ok_or(Error::NoPendingTransaction)
    }
}
