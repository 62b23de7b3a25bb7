// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::address::{ActiveAddress, Address, AddressBook};
use crate::composer::{
    AmountField, Composer, PendingTransaction, SEND_REFRESH_DELAY,
    TransferForm,
};
use crate::currency::Nick;
use crate::gateway::Gateway;
use crate::history::{self, TransactionRecord, TxAction, TxStatus};
use crate::note::{NoteName, NoteSnapshot};
use crate::view::BalanceView;
use crate::{Error, ValidationError};

/// User intents a [`Session`] reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Reload the balance of the active address
    Refresh,
    /// Add a note to the selection
    Select(NoteName),
    /// Remove a note from the selection
    Deselect(NoteName),
    /// Empty the selection
    ClearSelection,
    /// Open the transfer composer
    OpenComposer,
    /// Change the fee, `None` restores the default
    SetFee(Option<Nick>),
    /// Validate and create a transfer
    Compose(TransferForm),
    /// Sign the created transfer
    Sign,
    /// Send the signed transfer
    Send,
    /// Sign then send the created transfer
    Confirm,
    /// Close the composer
    Dismiss,
    /// List the master addresses
    LoadAddresses,
    /// Fetch the active address
    LoadActiveAddress,
    /// Switch the active address
    SetActiveAddress(String),
    /// Load the transaction history
    LoadHistory,
    /// Sign a transaction from the history
    SignExisting(String),
    /// Send a transaction from the history
    SendExisting(String),
}

/// What a dispatched [`Action`] produced
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A new snapshot was installed
    Refreshed(Arc<NoteSnapshot>),
    /// The selection changed
    Selection {
        /// Sum of the selected notes
        total: Nick,
        /// Resulting amount input
        amount: AmountField,
    },
    /// The composer is ready for input
    Composer(AmountField),
    /// The backend created a transfer
    Created(PendingTransaction),
    /// A transaction was signed
    Signed(String),
    /// A transaction was sent, refresh once the delay elapsed
    Sent {
        /// Name of the sent transaction
        name: String,
        /// Delay before the next balance refresh
        refresh_after: Duration,
    },
    /// The composer was closed
    Dismissed {
        /// Delay before the next balance refresh, if one is due
        refresh_after: Option<Duration>,
    },
    /// Master addresses listing
    Addresses(Vec<Address>),
    /// The active address
    ActiveAddress(ActiveAddress),
    /// The active address changed
    AddressChanged {
        /// The new active address
        address: String,
        /// The balance returned with the switch, if any
        snapshot: Option<Arc<NoteSnapshot>>,
    },
    /// Transaction history
    History(Vec<TransactionRecord>),
}

/// Client state around a wallet backend.
///
/// Every piece of state the screens share (the balance view and its
/// selection, the composer, the address listing, the history) is owned here
/// and mutated only through [`Session::dispatch`].
pub struct Session<G> {
    gateway: G,
    view: BalanceView,
    composer: Composer,
    addresses: AddressBook,
    history: Vec<TransactionRecord>,
}

impl<G: Gateway> Session<G> {
    /// A session with empty state
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            view: BalanceView::new(),
            composer: Composer::new(),
            addresses: AddressBook::default(),
            history: vec![],
        }
    }

    /// The backend
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Notes and selection
    pub fn view(&self) -> &BalanceView {
        &self.view
    }

    /// Notes and selection, mutably
    pub fn view_mut(&mut self) -> &mut BalanceView {
        &mut self.view
    }

    /// The transfer composer
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// The last address listing
    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// The last loaded history
    pub fn history(&self) -> &[TransactionRecord] {
        &self.history
    }

    /// Reload the balance
    pub async fn refresh(&mut self) -> Result<Arc<NoteSnapshot>, Error> {
        self.view.refresh(&self.gateway).await
    }

    /// Wait for `delay`, then reload the balance
    pub async fn refresh_after(
        &mut self,
        delay: Duration,
    ) -> Result<Arc<NoteSnapshot>, Error> {
        debug!("Balance refresh in {delay:?}");
        tokio::time::sleep(delay).await;
        self.refresh().await
    }

    /// Apply an action
    ///
    /// # Errors
    /// Validation errors for bad input or illegal steps, backend and
    /// transport errors as returned by the gateway
    pub async fn dispatch(&mut self, action: Action) -> Result<Outcome, Error> {
        debug!("dispatch {action:?}");
        match action {
            Action::Refresh => self.refresh().await.map(Outcome::Refreshed),
            Action::Select(name) => {
                self.view.select(name);
                Ok(self.selection_outcome())
            }
            Action::Deselect(name) => {
                self.view.deselect(&name);
                Ok(self.selection_outcome())
            }
            Action::ClearSelection => {
                self.view.clear_selection();
                Ok(self.selection_outcome())
            }
            Action::OpenComposer => {
                self.composer.open();
                let field = self.composer.amount_field(self.view.selection());
                Ok(Outcome::Composer(field))
            }
            Action::SetFee(fee) => {
                self.composer.set_fee(fee);
                let field = self.composer.amount_field(self.view.selection());
                Ok(Outcome::Composer(field))
            }
            Action::Compose(form) => {
                let tx = self
                    .composer
                    .compose(&self.gateway, self.view.selection(), &form)
                    .await?;
                Ok(Outcome::Created(tx.clone()))
            }
            Action::Sign => {
                let tx = self.composer.sign(&self.gateway).await?;
                Ok(Outcome::Signed(tx.name.clone()))
            }
            Action::Send => {
                let refresh_after = self
                    .composer
                    .send(&self.gateway, self.view.selection_mut())
                    .await?;
                Ok(self.sent_outcome(refresh_after))
            }
            Action::Confirm => {
                let refresh_after = self
                    .composer
                    .confirm(&self.gateway, self.view.selection_mut())
                    .await?;
                Ok(self.sent_outcome(refresh_after))
            }
            Action::Dismiss => Ok(Outcome::Dismissed {
                refresh_after: self.composer.dismiss(),
            }),
            Action::LoadAddresses => {
                let addresses = self.gateway.master_addresses().await?;
                self.addresses.replace(addresses.clone());
                Ok(Outcome::Addresses(addresses))
            }
            Action::LoadActiveAddress => {
                let active = self.gateway.active_address().await?;
                self.addresses.activate(&active.address);
                Ok(Outcome::ActiveAddress(active))
            }
            Action::SetActiveAddress(address) => {
                self.set_active_address(address).await
            }
            Action::LoadHistory => {
                self.history = self.gateway.transaction_history().await?;
                Ok(Outcome::History(self.history.clone()))
            }
            Action::SignExisting(name) => {
                self.check_history(&name, TxAction::Sign)?;
                self.gateway.sign_transaction(&name).await?;
                info!("Transaction {name} signed");
                self.mark(&name, TxStatus::Signed);
                Ok(Outcome::Signed(name))
            }
            Action::SendExisting(name) => {
                self.check_history(&name, TxAction::Send)?;
                self.gateway.send_transaction(&name).await?;
                info!("Transaction {name} sent");
                self.mark(&name, TxStatus::Sent);
                Ok(Outcome::Sent {
                    name,
                    refresh_after: SEND_REFRESH_DELAY,
                })
            }
        }
    }

    async fn set_active_address(
        &mut self,
        address: String,
    ) -> Result<Outcome, Error> {
        let address = address.trim().to_string();
        if address.is_empty() {
            return Err(ValidationError::MissingAddress.into());
        }

        let report = self.gateway.set_active_address(&address).await?;

        let active = report.active_address.clone().unwrap_or(address);
        info!("Active address set to {active}");

        // Notes of the previous address are never kept around
        self.view.invalidate();
        self.addresses.activate(&active);

        let snapshot = match report.balance() {
            Some(Ok(balance)) => Some(self.view.install(balance.into_snapshot())),
            Some(Err(e)) => {
                warn!("Balance of {active} unavailable: {e}");
                None
            }
            None => None,
        };

        Ok(Outcome::AddressChanged {
            address: active,
            snapshot,
        })
    }

    fn selection_outcome(&self) -> Outcome {
        let selection = self.view.selection();
        Outcome::Selection {
            total: selection.total(),
            amount: self.composer.amount_field(selection),
        }
    }

    fn sent_outcome(&self, refresh_after: Duration) -> Outcome {
        let name = self
            .composer
            .state()
            .pending()
            .map(|tx| tx.name.clone())
            .unwrap_or_default();
        Outcome::Sent {
            name,
            refresh_after,
        }
    }

    /// Refuse a step the history says the transaction is not ready for.
    ///
    /// Transactions missing from the loaded history are left to the backend.
    fn check_history(&self, name: &str, action: TxAction) -> Result<(), Error> {
        let Some(record) = history::find(&self.history, name) else {
            return Ok(());
        };
        if record.status.next_action() == Some(action) {
            return Ok(());
        }
        Err(Error::InvalidTransition {
            action: action.as_str(),
            state: record.status.as_str(),
        })
    }

    fn mark(&mut self, name: &str, status: TxStatus) {
        if let Some(record) = self
            .history
            .iter_mut()
            .find(|r| r.transaction_name == name)
        {
            record.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_compare() {
        assert_eq!(Action::Select("a".into()), Action::Select("a".into()));
        assert_ne!(Action::Sign, Action::Send);
        assert_eq!(
            Action::Compose(TransferForm::new("r", "1")),
            Action::Compose(TransferForm::new("r", "1"))
        );
    }
}
