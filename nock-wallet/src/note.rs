// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Notes, the spendable value records of a wallet, and the read-only
//! snapshot the client holds of them.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::currency::{self, Nick};

/// Stable identifier of a [`Note`].
///
/// Notes are always selected by name, never by their position in a list,
/// since positions change with every sort and refresh.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NoteName(String);

impl NoteName {
    /// The full name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name cut to `max` characters, with an ellipsis if it was longer
    pub fn abbreviated(&self, max: usize) -> String {
        match self.0.char_indices().nth(max) {
            Some((idx, _)) => format!("{}...", &self.0[..idx]),
            None => self.0.clone(),
        }
    }
}

impl From<String> for NoteName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for NoteName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl FromStr for NoteName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl AsRef<str> for NoteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The key(s) allowed to spend a note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Signers {
    /// No lock information
    #[default]
    None,
    /// A single signer
    One(String),
    /// Multiple signers
    Many(Vec<String>),
}

/// A spendable value record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique name of the note
    pub name: NoteName,
    /// Value in [`Nick`]
    pub value: Nick,
    /// Height of the block the note was created in
    pub block_height: u64,
    /// Where the note came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Keys that can spend the note
    #[serde(default, rename = "signer", alias = "signers")]
    pub signers: Signers,
    /// Note format version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Position of the note in the backend listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

impl Note {
    /// The value formatted in Nock
    pub fn display_value(&self) -> String {
        currency::to_display_unit(self.value)
    }
}

/// Field to sort notes by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Height of the block the note was created in
    #[default]
    BlockHeight,
    /// Value of the note
    Value,
}

impl SortKey {
    fn compare(&self, a: &Note, b: &Note) -> Ordering {
        match self {
            SortKey::BlockHeight => a.block_height.cmp(&b.block_height),
            SortKey::Value => a.value.cmp(&b.value),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block_height" | "block-height" | "height" => {
                Ok(SortKey::BlockHeight)
            }
            "value" => Ok(SortKey::Value),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::BlockHeight => write!(f, "block_height"),
            SortKey::Value => write!(f, "value"),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// The notes of the active address, as last fetched from the backend.
///
/// A snapshot is never mutated once built; a refresh replaces it.
#[derive(Debug, Clone, Default)]
pub struct NoteSnapshot {
    notes: Vec<Note>,
    index: BTreeMap<NoteName, usize>,
    notes_count: usize,
    total_assets: Nick,
}

impl NoteSnapshot {
    /// Build a snapshot from the notes and totals reported by the backend
    pub fn new(notes: Vec<Note>, notes_count: usize, total_assets: Nick) -> Self {
        let mut index = BTreeMap::new();
        for (pos, note) in notes.iter().enumerate() {
            if index.insert(note.name.clone(), pos).is_some() {
                tracing::warn!("Duplicate note name {}", note.name.abbreviated(50));
            }
        }

        Self {
            notes,
            index,
            notes_count,
            total_assets,
        }
    }

    /// Build a snapshot computing the totals from the notes
    pub fn from_notes(notes: Vec<Note>) -> Self {
        let total = notes
            .iter()
            .map(|n| n.value)
            .fold(0, Nick::saturating_add);
        let count = notes.len();
        Self::new(notes, count, total)
    }

    /// Notes in the order the backend listed them
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Iterate over the notes in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    /// Find a note by name
    pub fn get(&self, name: &NoteName) -> Option<&Note> {
        self.index.get(name).map(|&pos| &self.notes[pos])
    }

    /// Value of the named note, if it is in this snapshot
    pub fn value_of(&self, name: &NoteName) -> Option<Nick> {
        self.get(name).map(|note| note.value)
    }

    /// Number of notes as reported by the backend
    pub fn notes_count(&self) -> usize {
        self.notes_count
    }

    /// Total assets in [`Nick`] as reported by the backend
    pub fn total_assets(&self) -> Nick {
        self.total_assets
    }

    /// Number of notes held
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns `true` if there are no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// A freshly sorted view of the notes.
    ///
    /// The sort is stable: notes that compare equal keep their snapshot
    /// order, whatever the direction.
    pub fn sorted(&self, key: SortKey, order: SortOrder) -> Vec<&Note> {
        let mut sorted: Vec<&Note> = self.notes.iter().collect();
        sorted.sort_by(|a, b| {
            let ord = key.compare(a, b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        sorted
    }
}
