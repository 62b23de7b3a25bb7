// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use nock_wallet::DEFAULT_BACKEND;
use nock_wallet::composer::SEND_REFRESH_DELAY;
use url::Url;

use crate::config::Config;
use crate::io::WalletArgs;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Json,
    Plain,
    Coloured,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,
    /// Designates lower priority information.
    Debug,
    /// Designates useful information.
    Info,
    /// Designates hazardous situations.
    Warn,
    /// Designates very serious errors.
    Error,
}

#[derive(Debug)]
pub(crate) struct Logging {
    /// Max log level
    pub level: LogLevel,
    /// Log format
    pub format: LogFormat,
}

#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) backend: Url,
    pub(crate) refresh_delay: Duration,

    pub(crate) logging: Logging,

    pub(crate) wallet_dir: PathBuf,
}

pub(crate) struct SettingsBuilder {
    wallet_dir: PathBuf,
    pub(crate) args: WalletArgs,
}

impl SettingsBuilder {
    pub fn wallet_dir(&self) -> &PathBuf {
        &self.wallet_dir
    }

    /// Complete the settings, arguments take precedence over the config file
    pub fn config(self, config: Config) -> anyhow::Result<Settings> {
        let args = self.args;

        let backend = match args.backend.or(config.backend) {
            Some(backend) => backend,
            None => Url::parse(DEFAULT_BACKEND)?,
        };

        let refresh_delay = config.refresh_delay.unwrap_or(SEND_REFRESH_DELAY);

        let logging = Logging {
            level: args.log_level,
            format: args.log_type,
        };

        Ok(Settings {
            backend,
            refresh_delay,
            logging,
            wallet_dir: self.wallet_dir,
        })
    }
}

impl Settings {
    pub fn args(args: WalletArgs) -> anyhow::Result<SettingsBuilder> {
        let wallet_dir = if let Some(path) = &args.wallet_dir {
            path.clone()
        } else {
            let mut path = dirs::home_dir()
                .ok_or_else(|| anyhow!("Unable to locate the home directory"))?;
            path.push(".nockchain");
            path.push(env!("CARGO_BIN_NAME"));
            path
        };

        Ok(SettingsBuilder { wallet_dir, args })
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Json => "json",
                Self::Plain => "plain",
                Self::Coloured => "coloured",
            }
        )
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Trace => "trace",
                Self::Debug => "debug",
                Self::Info => "info",
                Self::Warn => "warn",
                Self::Error => "error",
            }
        )
    }
}

impl fmt::Display for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Logging: [{}] ({})", self.level, self.format)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "─".repeat(14);
        writeln!(f, "{separator}")?;
        writeln!(f, "Settings")?;
        writeln!(f, "{separator}")?;
        writeln!(f, "Wallet directory: {}", self.wallet_dir.display())?;
        writeln!(f, "{separator}")?;
        writeln!(f, "backend: {}", self.backend)?;
        writeln!(
            f,
            "refresh delay: {}",
            humantime_serde::re::humantime::format_duration(self.refresh_delay)
        )?;
        writeln!(f, "{separator}")?;
        writeln!(f, "{}", self.logging)
    }
}
