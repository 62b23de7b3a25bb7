// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Which chain RPC endpoint the backend connects to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValidationError;
use crate::gateway::ConfigMap;

/// Kind of gRPC endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrpcKind {
    /// The public endpoint
    #[default]
    Public,
    /// A private node
    Private,
    /// A user supplied address
    Custom,
}

impl FromStr for GrpcKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(GrpcKind::Public),
            "private" => Ok(GrpcKind::Private),
            "custom" => Ok(GrpcKind::Custom),
            other => Err(format!("unknown gRPC endpoint kind: {other}")),
        }
    }
}

impl fmt::Display for GrpcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrpcKind::Public => f.write_str("public"),
            GrpcKind::Private => f.write_str("private"),
            GrpcKind::Custom => f.write_str("custom"),
        }
    }
}

/// gRPC endpoint configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrpcConfig {
    /// Endpoint kind
    #[serde(rename = "type", default)]
    pub kind: GrpcKind,
    /// Address, only meaningful for [`GrpcKind::Custom`]
    #[serde(rename = "customAddress", default)]
    pub custom_address: String,
}

impl GrpcConfig {
    /// A validated configuration.
    ///
    /// # Errors
    /// A custom endpoint needs an address
    pub fn new<S: Into<String>>(
        kind: GrpcKind,
        custom_address: Option<S>,
    ) -> Result<Self, ValidationError> {
        let custom_address = match kind {
            GrpcKind::Custom => {
                let address = custom_address
                    .map(|a| a.into().trim().to_string())
                    .unwrap_or_default();
                if address.is_empty() {
                    return Err(ValidationError::MissingCustomEndpoint);
                }
                address
            }
            _ => String::new(),
        };

        Ok(Self {
            kind,
            custom_address,
        })
    }

    /// Extract the `grpc` entry of a backend configuration, falling back to
    /// the public endpoint
    pub fn from_config(config: &ConfigMap) -> Self {
        config
            .get("grpc")
            .and_then(|grpc| Self::deserialize(grpc).ok())
            .unwrap_or_default()
    }

    /// Body of a save request
    pub fn to_payload(&self) -> Value {
        serde_json::json!({ "grpc": self })
    }
}

impl fmt::Display for GrpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            GrpcKind::Custom => write!(f, "custom ({})", self.custom_address),
            kind => write!(f, "{kind}"),
        }
    }
}
