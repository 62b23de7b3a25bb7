// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! The set of notes a user picked to fund a transfer.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::currency::Nick;
use crate::note::{NoteName, NoteSnapshot};

type Observer = Box<dyn Fn(Nick) + Send + Sync>;

/// Notes selected by name against a single [`NoteSnapshot`].
///
/// Every mutation pushes the recomputed total to the subscribed observers.
#[derive(Default)]
pub struct NoteSelection {
    snapshot: Arc<NoteSnapshot>,
    keys: BTreeSet<NoteName>,
    observers: Vec<Observer>,
}

impl NoteSelection {
    /// An empty selection over the given snapshot
    pub fn new(snapshot: Arc<NoteSnapshot>) -> Self {
        Self {
            snapshot,
            keys: BTreeSet::new(),
            observers: vec![],
        }
    }

    /// Register a callback receiving the selection total after each change
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(Nick) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Select a note. Returns `false` if it was already selected
    pub fn add(&mut self, key: NoteName) -> bool {
        let added = self.keys.insert(key);
        self.notify();
        added
    }

    /// Deselect a note. Returns `false` if it was not selected
    pub fn remove(&mut self, key: &NoteName) -> bool {
        let removed = self.keys.remove(key);
        self.notify();
        removed
    }

    /// Deselect everything
    pub fn clear(&mut self) {
        self.keys.clear();
        self.notify();
    }

    /// Swap the snapshot the selection is resolved against, dropping every
    /// key from the previous one
    pub fn reset(&mut self, snapshot: Arc<NoteSnapshot>) {
        self.snapshot = snapshot;
        self.keys.clear();
        self.notify();
    }

    /// Sum of the selected notes' values.
    ///
    /// Keys that are not part of the current snapshot count as zero.
    pub fn total(&self) -> Nick {
        self.keys
            .iter()
            .filter_map(|key| self.snapshot.value_of(key))
            .fold(0, Nick::saturating_add)
    }

    /// Returns `true` if no note is selected
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of selected keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the note is selected
    pub fn contains(&self, key: &NoteName) -> bool {
        self.keys.contains(key)
    }

    /// Selected names, in name order
    pub fn names(&self) -> Vec<NoteName> {
        self.keys.iter().cloned().collect()
    }

    /// The snapshot the selection resolves against
    pub fn snapshot(&self) -> &Arc<NoteSnapshot> {
        &self.snapshot
    }

    fn notify(&self) {
        if self.observers.is_empty() {
            return;
        }
        let total = self.total();
        for observer in &self.observers {
            observer(total);
        }
    }
}

impl fmt::Debug for NoteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteSelection")
            .field("keys", &self.keys)
            .field("observers", &self.observers.len())
            .finish()
    }
}
