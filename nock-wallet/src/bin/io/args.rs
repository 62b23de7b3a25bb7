// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::Command;
use crate::settings::{LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "A command-line client for the Nockchain wallet backend."
)]
pub(crate) struct WalletArgs {
    /// Directory to store user data [default: `$HOME/.nockchain/nock-wallet`]
    #[arg(short, long)]
    pub wallet_dir: Option<PathBuf>,

    /// The wallet backend fully qualified URL
    #[arg(short, long, env = "NOCK_WALLET_BACKEND")]
    pub backend: Option<Url>,

    /// Output log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Logging output type
    #[arg(long, value_enum, default_value_t = LogFormat::Coloured)]
    pub log_type: LogFormat,

    /// Command
    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_flag() {
        let args = WalletArgs::try_parse_from([
            "nock-wallet",
            "--backend",
            "http://10.0.0.2:5007",
            "balance",
        ])
        .expect("valid arguments");

        assert_eq!(
            args.backend.map(String::from).as_deref(),
            Some("http://10.0.0.2:5007/")
        );
        assert_eq!(args.command, Command::Balance);
    }

    #[test]
    fn command_is_required() {
        assert!(WalletArgs::try_parse_from(["nock-wallet"]).is_err());
    }

    #[test]
    fn transfer_needs_amount_or_notes() {
        let args = ["nock-wallet", "transfer", "--rcvr", "addr"];
        assert!(WalletArgs::try_parse_from(args).is_err());

        let args = WalletArgs::try_parse_from([
            "nock-wallet",
            "transfer",
            "--rcvr",
            "addr",
            "--note",
            "note-a",
            "--note",
            "note-b",
            "--fee",
            "20",
        ])
        .expect("valid arguments");

        match args.command {
            Command::Transfer {
                notes, fee, amt, ..
            } => {
                assert_eq!(notes.len(), 2);
                assert_eq!(fee, Some(20));
                assert_eq!(amt, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
