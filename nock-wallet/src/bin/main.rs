// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

mod command;
mod config;
mod io;
mod settings;

pub(crate) use command::Command;

use std::fs;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use nock_wallet::{Error, ErrorKind, HttpGateway, Session};

use crate::settings::{LogFormat, Logging, Settings};

use config::Config;
use io::{Prompter, WalletArgs};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = exec().await {
        match err.downcast_ref::<inquire::InquireError>() {
            Some(inquire::InquireError::OperationCanceled)
            | Some(inquire::InquireError::OperationInterrupted) => {}
            _ => report(&err),
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Print an error, with the backend's technical details when the chain RPC
/// is down
fn report(err: &anyhow::Error) {
    eprintln!("{err}");
    if let Some(err) = err.downcast_ref::<Error>() {
        if err.kind() == ErrorKind::RpcUnavailable {
            if let Some(details) = err.details() {
                eprintln!("Details: {details}");
            }
        }
    }
}

fn init_logging(logging: &Logging) -> anyhow::Result<()> {
    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_string()));

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => {
            let subscriber = subscriber.json().flatten_event(true).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Plain => {
            let subscriber = subscriber.with_ansi(false).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Coloured => {
            let subscriber = subscriber.finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    };

    Ok(())
}

async fn exec() -> anyhow::Result<()> {
    // parse user args
    let args = WalletArgs::parse();
    let cmd = args.command.clone();

    let settings_builder = Settings::args(args)?;

    let profile_folder = settings_builder.wallet_dir().clone();
    fs::create_dir_all(profile_folder.as_path())?;

    // load configuration (or use default)
    let cfg = Config::load(&profile_folder)?;
    let settings = settings_builder.config(cfg)?;

    init_logging(&settings.logging)?;

    if let Command::Settings = cmd {
        println!("{settings}");
        return Ok(());
    }

    let gateway = HttpGateway::new(settings.backend.as_str())?;
    if let Err(e) = gateway.check_connection().await {
        warn!(
            "[OFFLINE]: Unable to reach the wallet backend at {}: {e}",
            settings.backend
        );
    }

    let mut session = Session::new(gateway);
    let result = cmd.run(&mut session, &settings, &Prompter).await?;
    println!("{result}");

    Ok(())
}
