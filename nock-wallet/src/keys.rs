// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Key material handed to, or received from, the backend.
//!
//! The client never derives or stores keys; secrets only pass through and
//! are zeroized on drop.

use std::fmt;
use std::path::Path;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use zeroize::Zeroizing;

use crate::{Error, ValidationError};

/// Key file name used when the path does not provide one
const DEFAULT_KEY_FILE: &str = "keys.export";

/// Keys to import
pub enum KeySource {
    /// An exported key file
    File {
        /// Name of the uploaded file
        file_name: String,
        /// File content
        bytes: Vec<u8>,
    },
    /// A seed
    Seed(Zeroizing<String>),
}

impl KeySource {
    /// Read a key file from disk
    ///
    /// # Errors
    /// Fails if the file cannot be read or is empty
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(ValidationError::EmptyKeyFile.into());
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_KEY_FILE.to_string());

        Ok(KeySource::File { file_name, bytes })
    }

    /// A seed, trimmed
    ///
    /// # Errors
    /// Fails if the seed is blank
    pub fn seed<S: Into<String>>(seed: S) -> Result<Self, ValidationError> {
        let seed = Zeroizing::new(seed.into());
        let trimmed = seed.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingSeedphrase);
        }
        Ok(KeySource::Seed(Zeroizing::new(trimmed.to_string())))
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::File { file_name, bytes } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
            KeySource::Seed(_) => f.write_str("Seed(***)"),
        }
    }
}

/// Import keys from a seed phrase for a given key version
pub struct SeedphraseImport {
    seedphrase: Zeroizing<String>,
    version: u32,
}

impl SeedphraseImport {
    /// Normalizes whitespace between the words
    ///
    /// # Errors
    /// Fails if the phrase is blank
    pub fn new<S: AsRef<str>>(
        seedphrase: S,
        version: u32,
    ) -> Result<Self, ValidationError> {
        let words: Vec<&str> = seedphrase.as_ref().split_whitespace().collect();
        if words.is_empty() {
            return Err(ValidationError::MissingSeedphrase);
        }

        Ok(Self {
            seedphrase: Zeroizing::new(words.join(" ")),
            version,
        })
    }

    /// Key version to derive
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of words in the phrase
    pub fn word_count(&self) -> usize {
        self.seedphrase.split(' ').count()
    }
}

impl Serialize for SeedphraseImport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SeedphraseImport", 2)?;
        state.serialize_field("seedphrase", self.seedphrase.as_str())?;
        state.serialize_field("version", &self.version)?;
        state.end()
    }
}

impl fmt::Debug for SeedphraseImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedphraseImport")
            .field("words", &self.word_count())
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn seedphrase_is_normalized() {
        let import =
            SeedphraseImport::new("  auction  tribe\ttype \n torch ", 1).unwrap();
        let json = serde_json::to_value(&import).unwrap();
        assert_eq!(json["seedphrase"], "auction tribe type torch");
        assert_eq!(json["version"], 1);
        assert_eq!(import.word_count(), 4);
        assert!(!format!("{import:?}").contains("auction"));

        assert_eq!(
            SeedphraseImport::new(" \n ", 0).err(),
            Some(ValidationError::MissingSeedphrase)
        );
    }

    #[test]
    fn seed_source() {
        assert!(matches!(
            KeySource::seed("   "),
            Err(ValidationError::MissingSeedphrase)
        ));
        let seed = KeySource::seed(" words here ").unwrap();
        assert_eq!(format!("{seed:?}"), "Seed(***)");
    }

    #[test]
    fn file_source() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("wallet_keys.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"{\"keys\": []}").unwrap();

        match KeySource::from_file(&path).unwrap() {
            KeySource::File { file_name, bytes } => {
                assert_eq!(file_name, "wallet_keys.json");
                assert_eq!(bytes, b"{\"keys\": []}");
            }
            other => panic!("unexpected source {other:?}"),
        }

        let empty = dir.path().join("empty");
        std::fs::File::create(&empty).unwrap();
        assert!(matches!(
            KeySource::from_file(&empty),
            Err(Error::Validation(ValidationError::EmptyKeyFile))
        ));

        assert!(matches!(
            KeySource::from_file(dir.path().join("missing")),
            Err(Error::IO(_))
        ));
    }
}
