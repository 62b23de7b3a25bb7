// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use inquire::error::InquireResult;
use inquire::{Confirm, Password, PasswordDisplayMode};
use zeroize::Zeroizing;

/// User interaction, faked in tests
pub(crate) trait Prompt {
    /// Ask a yes/no question, defaulting to no
    fn confirm(&self, msg: &str) -> InquireResult<bool>;

    /// Ask for a secret, masked while typed
    fn prompt_secret(&self, msg: &str) -> InquireResult<Zeroizing<String>>;
}

/// Terminal prompts
pub(crate) struct Prompter;

impl Prompt for Prompter {
    fn confirm(&self, msg: &str) -> InquireResult<bool> {
        Confirm::new(msg).with_default(false).prompt()
    }

    fn prompt_secret(&self, msg: &str) -> InquireResult<Zeroizing<String>> {
        Password::new(msg)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .map(Zeroizing::new)
    }
}
