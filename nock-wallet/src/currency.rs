// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Module to help with currency conversions.
//!
//! Values are always stored in [`Nick`], the base unit. Nock amounts only
//! exist as display strings and user input, and every conversion goes through
//! [`NICK_PER_NOCK`].

use std::str::FromStr;

use crate::ValidationError;

/// The underlying unit of Nock
pub type Nick = u64;

/// How many [`Nick`] make one Nock.
///
/// This must match the unit definition of the backend.
pub const NICK_PER_NOCK: Nick = 65_536;

/// Fractional digits used when displaying Nock amounts
pub const DISPLAY_DECIMALS: usize = 4;

/// Returns the Nock value of the given amount of [`Nick`]
pub fn to_nock(nick: Nick) -> f64 {
    nick as f64 / NICK_PER_NOCK as f64
}

/// Formats an amount of [`Nick`] as Nock with exactly four decimals
pub fn to_display_unit(nick: Nick) -> String {
    format!("{:.*}", DISPLAY_DECIMALS, to_nock(nick))
}

/// Converts a Nock value into [`Nick`], truncating toward zero.
///
/// Negative and non finite values convert to zero.
pub fn to_base_units(nock: f64) -> Nick {
    if !nock.is_finite() || nock <= 0.0 {
        return 0;
    }
    // `as` saturates on overflow
    (nock * NICK_PER_NOCK as f64).trunc() as Nick
}

/// Parses a user supplied Nock amount into [`Nick`].
///
/// # Errors
/// Fails if the input is empty, is not a number, or is not strictly positive
/// once converted to the base unit.
pub fn parse_amount(input: &str) -> Result<Nick, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::MissingAmount);
    }

    let nock = f64::from_str(input)
        .map_err(|_| ValidationError::InvalidAmount(input.to_string()))?;

    if !nock.is_finite() || nock <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }

    match to_base_units(nock) {
        0 => Err(ValidationError::NonPositiveAmount),
        nick => Ok(nick),
    }
}
