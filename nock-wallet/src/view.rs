// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! The balance screen state: the last note snapshot and the selection made
//! against it.

use std::sync::Arc;

use tracing::{info, warn};

use crate::currency::{self, Nick};
use crate::gateway::Gateway;
use crate::note::{Note, NoteName, NoteSnapshot, SortKey, SortOrder};
use crate::selection::NoteSelection;
use crate::Error;

/// Notes of the active address and the user's selection.
///
/// The selection is always resolved against the snapshot held here, and is
/// dropped whenever that snapshot is replaced.
#[derive(Debug, Default)]
pub struct BalanceView {
    selection: NoteSelection,
}

impl BalanceView {
    /// An empty view
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the balance and replace the snapshot.
    ///
    /// On success the selection is cleared along with the swap. On failure
    /// the view is emptied too, so a zero balance is shown rather than stale
    /// notes, and the error is returned.
    ///
    /// # Errors
    /// Any error of the balance endpoint
    pub async fn refresh<G>(
        &mut self,
        gateway: &G,
    ) -> Result<Arc<NoteSnapshot>, Error>
    where
        G: Gateway + ?Sized,
    {
        match gateway.balance().await {
            Ok(report) => {
                let snapshot = self.install(report.into_snapshot());
                info!(
                    "{} notes loaded, total {} nock",
                    snapshot.len(),
                    currency::to_display_unit(snapshot.total_assets())
                );
                Ok(snapshot)
            }
            Err(e) => {
                warn!("Unable to update the balance: {e}");
                self.invalidate();
                Err(e)
            }
        }
    }

    /// Replace the snapshot, clearing the selection
    pub fn install(&mut self, snapshot: NoteSnapshot) -> Arc<NoteSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.selection.reset(snapshot.clone());
        snapshot
    }

    /// Drop the snapshot and the selection
    pub fn invalidate(&mut self) {
        self.selection.reset(Arc::default());
    }

    /// The current snapshot
    pub fn snapshot(&self) -> &Arc<NoteSnapshot> {
        self.selection.snapshot()
    }

    /// The current selection
    pub fn selection(&self) -> &NoteSelection {
        &self.selection
    }

    /// The current selection, mutably
    pub fn selection_mut(&mut self) -> &mut NoteSelection {
        &mut self.selection
    }

    /// Notes sorted for display, the snapshot keeps its own order
    pub fn sorted(&self, key: SortKey, order: SortOrder) -> Vec<&Note> {
        self.snapshot().sorted(key, order)
    }

    /// Select a note, returning the new selection total
    pub fn select(&mut self, name: NoteName) -> Nick {
        if self.snapshot().get(&name).is_none() {
            warn!("Note {} is not in the current snapshot", name.abbreviated(50));
        }
        self.selection.add(name);
        self.selection.total()
    }

    /// Deselect a note, returning the new selection total
    pub fn deselect(&mut self, name: &NoteName) -> Nick {
        self.selection.remove(name);
        self.selection.total()
    }

    /// Deselect everything
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Register a callback receiving the selection total after each change
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(Nick) + Send + Sync + 'static,
    {
        self.selection.subscribe(observer);
    }
}
