// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Master addresses controlled by the wallet keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A master address, one per key version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// The address itself
    #[serde(rename = "address")]
    pub value: String,
    /// Key version the address belongs to
    #[serde(default)]
    pub version: Option<u32>,
    /// Whether this is the active address
    #[serde(default)]
    pub is_active: bool,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(version) = self.version {
            write!(f, " (v{version})")?;
        }
        if self.is_active {
            write!(f, " [active]")?;
        }
        Ok(())
    }
}

/// The address the backend currently works with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActiveAddress {
    /// The address
    #[serde(rename = "active_address")]
    pub address: String,
    /// Key version
    #[serde(default)]
    pub version: Option<u32>,
}

impl fmt::Display for ActiveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(version) => write!(f, "{} (v{version})", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// The last listing of master addresses
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    addresses: Vec<Address>,
}

impl AddressBook {
    /// Replace the listing
    pub fn replace(&mut self, addresses: Vec<Address>) {
        let active = addresses.iter().filter(|a| a.is_active).count();
        if active > 1 {
            tracing::warn!("Backend reports {active} active addresses");
        }
        self.addresses = addresses;
    }

    /// Mark `value` as the only active address
    pub fn activate(&mut self, value: &str) {
        for address in &mut self.addresses {
            address.is_active = address.value == value;
        }
    }

    /// The listed addresses
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// The active address, if listed
    pub fn active(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_active)
    }
}
