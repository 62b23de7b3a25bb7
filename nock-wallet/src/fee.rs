// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! The fee paid by a transfer, in [`Nick`].

use crate::currency::Nick;

/// The default fee for a transfer
pub const DEFAULT_FEE: Nick = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Fee attached to a transfer
pub struct Fee {
    amount: Nick,
}

impl Fee {
    /// A fee of the given amount
    pub const fn new(amount: Nick) -> Self {
        Fee { amount }
    }

    /// The fee in [`Nick`]
    pub fn amount(&self) -> Nick {
        self.amount
    }

    /// Override the fee, `None` restores the default
    pub fn set<T>(&mut self, amount: T)
    where
        T: Into<Option<Nick>>,
    {
        self.amount = amount.into().unwrap_or(DEFAULT_FEE);
    }
}

impl Default for Fee {
    fn default() -> Self {
        Self::new(DEFAULT_FEE)
    }
}

impl From<Nick> for Fee {
    fn from(amount: Nick) -> Self {
        Self::new(amount)
    }
}
