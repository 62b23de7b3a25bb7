// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

mod history;


pub use history::TransactionHistory;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use clap::Subcommand;
use serde_json::Value;
use tracing::warn;
use zeroize::Zeroizing;

use nock_wallet::currency::{self, Nick};
use nock_wallet::{
    Action, ActiveAddress, Address, ConfigMap, Gateway, GrpcConfig, GrpcKind,
    KeySource, Note, NoteName, NoteSnapshot, Outcome, SeedphraseImport,
    Session, SortKey, SortOrder, TransactionRecord, TransferForm,
    ValidationError,
};

use crate::io::Prompt;
use crate::settings::Settings;

/// Commands that can be run against the wallet backend
#[derive(PartialEq, Eq, Clone, Subcommand, Debug)]
pub(crate) enum Command {
    /// Check the balance of the active address
    Balance,

    /// List the notes of the active address
    Notes {
        /// Field to sort by (block_height, value)
        #[arg(long, default_value_t = SortKey::BlockHeight)]
        sort_by: SortKey,

        /// Sort direction (asc, desc)
        #[arg(long, default_value_t = SortOrder::Desc)]
        order: SortOrder,
    },

    /// List the master addresses
    Addresses,

    /// Show the active address
    ActiveAddress,

    /// Switch the active address
    SetActive {
        /// Address to activate
        address: String,
    },

    /// Show the transaction history
    History,

    /// Send NOCK through the network
    Transfer {
        /// Receiver address
        #[arg(short, long)]
        rcvr: String,

        /// Amount of NOCK to send
        #[arg(short, long, required_unless_present = "notes")]
        amt: Option<String>,

        /// Spend these notes entirely, the fee is taken from them
        #[arg(long = "note", conflicts_with = "amt")]
        notes: Vec<NoteName>,

        /// Fee in nick
        #[arg(short, long)]
        fee: Option<Nick>,

        /// Sign and send without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Sign a created transaction
    Sign {
        /// Transaction name
        name: String,
    },

    /// Send a signed transaction
    Send {
        /// Transaction name
        name: String,
    },

    /// Import keys from a key file or a seed
    ImportKeys {
        /// Key file exported by a wallet
        #[arg(short, long, required_unless_present = "seed")]
        file: Option<PathBuf>,

        /// Prompt for a seed instead
        #[arg(long, conflicts_with = "file")]
        seed: bool,
    },

    /// Restore the wallet from a seed phrase
    ImportSeedphrase {
        /// Seed phrase, prompted for when not set
        #[arg(long, env = "NOCK_WALLET_SEEDPHRASE", hide_env_values = true)]
        seedphrase: Option<String>,

        /// Key version to derive
        #[arg(long, default_value_t = 1)]
        version: u32,
    },

    /// Reveal the wallet seed phrase
    ShowSeedphrase,

    /// Export the wallet keys to a file
    ExportKeys {
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Show or update the backend configuration
    Config {
        /// Entries to set, as key=value (values are read as JSON when
        /// possible)
        #[arg(long, value_parser = parse_entry)]
        set: Vec<(String, String)>,
    },

    /// Show or update the gRPC endpoint of the backend
    GrpcConfig {
        /// Endpoint kind (public, private, custom)
        #[arg(long)]
        kind: Option<GrpcKind>,

        /// Address of a custom endpoint
        #[arg(long, requires = "kind")]
        address: Option<String>,
    },

    /// Show current settings
    Settings,
}

fn parse_entry(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ValidationError::InvalidSetting(s.to_string())),
    }
}

fn unexpected(outcome: Outcome) -> anyhow::Error {
    anyhow!("Unexpected outcome: {outcome:?}")
}

impl Command {
    /// Runs the command with the provided session
    pub async fn run<G: Gateway>(
        self,
        session: &mut Session<G>,
        settings: &Settings,
        prompter: &dyn Prompt,
    ) -> anyhow::Result<RunResult> {
        match self {
            Command::Balance => {
                let snapshot = session.refresh().await?;
                Ok(RunResult::Balance(snapshot))
            }
            Command::Notes { sort_by, order } => {
                session.refresh().await?;
                let notes = session
                    .view()
                    .sorted(sort_by, order)
                    .into_iter()
                    .cloned()
                    .collect();
                Ok(RunResult::Notes(notes))
            }
            Command::Addresses => {
                match session.dispatch(Action::LoadAddresses).await? {
                    Outcome::Addresses(addresses) => {
                        Ok(RunResult::Addresses(addresses))
                    }
                    other => Err(unexpected(other)),
                }
            }
            Command::ActiveAddress => {
                match session.dispatch(Action::LoadActiveAddress).await? {
                    Outcome::ActiveAddress(active) => {
                        Ok(RunResult::ActiveAddress(active))
                    }
                    other => Err(unexpected(other)),
                }
            }
            Command::SetActive { address } => {
                let action = Action::SetActiveAddress(address);
                match session.dispatch(action).await? {
                    Outcome::AddressChanged { address, snapshot } => {
                        Ok(RunResult::AddressChanged {
                            address,
                            balance: snapshot.map(|s| s.total_assets()),
                        })
                    }
                    other => Err(unexpected(other)),
                }
            }
            Command::History => {
                match session.dispatch(Action::LoadHistory).await? {
                    Outcome::History(records) => Ok(RunResult::History(records)),
                    other => Err(unexpected(other)),
                }
            }
            Command::Transfer {
                rcvr,
                amt,
                notes,
                fee,
                yes,
            } => {
                if !notes.is_empty() {
                    session.dispatch(Action::Refresh).await?;
                    for note in notes {
                        session.dispatch(Action::Select(note)).await?;
                    }
                }

                session.dispatch(Action::OpenComposer).await?;
                let form = TransferForm {
                    recipient: rcvr,
                    amount: amt,
                    fee,
                };
                let tx = match session.dispatch(Action::Compose(form)).await? {
                    Outcome::Created(tx) => tx,
                    other => return Err(unexpected(other)),
                };

                if !yes && !prompter.confirm(&format!("Sign and send {tx}?"))? {
                    session.dispatch(Action::Dismiss).await?;
                    return Ok(RunResult::Cancelled(tx.name));
                }

                let name = match session.dispatch(Action::Confirm).await? {
                    Outcome::Sent { name, .. } => name,
                    other => return Err(unexpected(other)),
                };
                let balance =
                    refreshed_balance(session, settings.refresh_delay).await;

                Ok(RunResult::Sent { name, balance })
            }
            Command::Sign { name } => {
                session.dispatch(Action::LoadHistory).await?;
                match session.dispatch(Action::SignExisting(name)).await? {
                    Outcome::Signed(name) => Ok(RunResult::Signed(name)),
                    other => Err(unexpected(other)),
                }
            }
            Command::Send { name } => {
                session.dispatch(Action::LoadHistory).await?;
                let name =
                    match session.dispatch(Action::SendExisting(name)).await? {
                        Outcome::Sent { name, .. } => name,
                        other => return Err(unexpected(other)),
                    };
                let balance =
                    refreshed_balance(session, settings.refresh_delay).await;

                Ok(RunResult::Sent { name, balance })
            }
            Command::ImportKeys { file, .. } => {
                let source = match file {
                    Some(file) => KeySource::from_file(file)?,
                    None => {
                        let seed = prompter.prompt_secret("Seed:")?;
                        KeySource::seed(seed.as_str())?
                    }
                };
                let ack = session.gateway().import_keys(&source).await?;
                Ok(RunResult::Imported(ack.message))
            }
            Command::ImportSeedphrase {
                seedphrase,
                version,
            } => {
                let phrase = match seedphrase {
                    Some(phrase) => Zeroizing::new(phrase),
                    None => prompter.prompt_secret("Seed phrase:")?,
                };
                let import = SeedphraseImport::new(phrase.as_str(), version)?;
                let ack = session.gateway().import_seedphrase(&import).await?;
                Ok(RunResult::Imported(ack.message))
            }
            Command::ShowSeedphrase => {
                if !prompter.confirm("Reveal the seed phrase on screen?")? {
                    return Err(anyhow!("Seed phrase not revealed"));
                }
                let phrase = session.gateway().show_seedphrase().await?;
                Ok(RunResult::Seedphrase(phrase))
            }
            Command::ExportKeys { out } => {
                let keys = Zeroizing::new(session.gateway().export_keys().await?);
                std::fs::write(&out, keys.as_slice())?;
                Ok(RunResult::ExportedKeys(out))
            }
            Command::Config { set } => {
                let config = if set.is_empty() {
                    session.gateway().config().await?
                } else {
                    let update: ConfigMap = set
                        .into_iter()
                        .map(|(key, value)| {
                            let value = serde_json::from_str(&value)
                                .unwrap_or(Value::String(value));
                            (key, value)
                        })
                        .collect();
                    session.gateway().update_config(&update).await?
                };
                Ok(RunResult::Config(config))
            }
            Command::GrpcConfig { kind, address } => {
                let config = match kind {
                    None => session.gateway().grpc_config().await?,
                    Some(kind) => {
                        let config = GrpcConfig::new(kind, address)?;
                        session.gateway().save_grpc_config(&config).await?
                    }
                };
                Ok(RunResult::Grpc(config))
            }
            Command::Settings => Ok(RunResult::Settings()),
        }
    }
}

/// Wait for the network to pick the transfer up, then reload the balance
async fn refreshed_balance<G: Gateway>(
    session: &mut Session<G>,
    delay: Duration,
) -> Option<Nick> {
    match session.refresh_after(delay).await {
        Ok(snapshot) => Some(snapshot.total_assets()),
        Err(e) => {
            warn!("Unable to reload the balance: {e}");
            None
        }
    }
}

/// Possible results of running a command
pub enum RunResult {
    Balance(Arc<NoteSnapshot>),
    Notes(Vec<Note>),
    Addresses(Vec<Address>),
    ActiveAddress(ActiveAddress),
    AddressChanged {
        address: String,
        balance: Option<Nick>,
    },
    History(Vec<TransactionRecord>),
    Signed(String),
    Sent {
        name: String,
        balance: Option<Nick>,
    },
    Cancelled(String),
    Imported(Option<String>),
    Seedphrase(Zeroizing<String>),
    ExportedKeys(PathBuf),
    Config(ConfigMap),
    Grpc(GrpcConfig),
    Settings(),
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RunResult::*;
        match self {
            Balance(snapshot) => {
                let total = currency::to_display_unit(snapshot.total_assets());
                write!(
                    f,
                    "> Total balance: {total} NOCK\n\
                     > Notes: {}",
                    snapshot.notes_count()
                )
            }
            Notes(notes) => {
                writeln!(
                    f,
                    "{: ^50} | {: ^17} | {: ^12}",
                    "NOTE", "VALUE", "BLOCK"
                )?;
                for note in notes {
                    writeln!(
                        f,
                        "{: <50} | {: >17} | {: >12}",
                        note.name.abbreviated(50),
                        note.display_value(),
                        note.block_height
                    )?;
                }
                Ok(())
            }
            Addresses(addresses) => {
                let addresses = addresses
                    .iter()
                    .map(|a| format!("> {a}"))
                    .collect::<Vec<String>>()
                    .join("\n");
                write!(f, "{addresses}")
            }
            ActiveAddress(active) => write!(f, "> Active address: {active}"),
            AddressChanged { address, balance } => {
                write!(f, "> Active address set to {address}")?;
                if let Some(balance) = balance {
                    let balance = currency::to_display_unit(*balance);
                    write!(f, "\n> Total balance: {balance} NOCK")?;
                }
                Ok(())
            }
            History(records) => {
                writeln!(f, "{}", TransactionHistory::header())?;
                for record in records {
                    writeln!(f, "{}", TransactionHistory(record))?;
                }
                Ok(())
            }
            Signed(name) => write!(f, "> Transaction signed: {name}"),
            Sent { name, balance } => {
                write!(f, "> Transaction sent: {name}")?;
                if let Some(balance) = balance {
                    let balance = currency::to_display_unit(*balance);
                    write!(f, "\n> Total balance: {balance} NOCK")?;
                }
                Ok(())
            }
            Cancelled(name) => {
                write!(f, "> Transaction {name} created, not signed")
            }
            Imported(message) => match message {
                Some(message) => write!(f, "> {message}"),
                None => write!(f, "> Keys imported"),
            },
            Seedphrase(phrase) => write!(f, "{}", phrase.as_str()),
            ExportedKeys(path) => {
                write!(f, "> Keys exported to: {}", path.display())
            }
            Config(config) => {
                let config = Value::Object(config.clone());
                let shown = serde_json::to_string_pretty(&config)
                    .map_err(|_| fmt::Error)?;
                write!(f, "{shown}")
            }
            Grpc(config) => write!(f, "> gRPC endpoint: {config}"),
            Settings() => Ok(()),
        }
    }
}
