// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use serde::Deserialize;
use url::Url;

const DEFAULT_CONFIG: &str = include_str!("../../default.config.toml");

/// Config holds the settings for the CLI wallet
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Config {
    /// Wallet backend to talk to
    #[serde(default)]
    pub(crate) backend: Option<Url>,
    /// Wait before reloading the balance once a transfer is sent
    #[serde(default, with = "humantime_serde")]
    pub(crate) refresh_delay: Option<Duration>,
}

fn read_to_string<P: AsRef<Path>>(path: P) -> io::Result<Option<String>> {
    fs::read_to_string(&path)
        .map(Some)
        .or_else(|e| match e.kind() {
            io::ErrorKind::NotFound => Ok(None),
            _ => Err(e),
        })
}

fn global_config() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push(env!("CARGO_BIN_NAME"));
    path.push("config.toml");
    Some(path)
}

impl Config {
    /// Attempt to load configuration from file
    pub fn load(profile: &Path) -> anyhow::Result<Config> {
        let profile = profile.join("config.toml");
        let global = global_config();

        // Try to read profile config first, then global config
        let mut contents = read_to_string(&profile)?;
        if contents.is_none() {
            if let Some(global) = &global {
                contents = read_to_string(global)?;
            }
        }

        let contents = match contents {
            Some(contents) => contents,
            None => {
                // Seed the global location with the defaults, best effort
                if let Some(global) = &global {
                    if let Some(parent) = global.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(global, DEFAULT_CONFIG);
                }
                DEFAULT_CONFIG.to_string()
            }
        };

        Ok(toml::from_str(&contents)?)
    }
}
