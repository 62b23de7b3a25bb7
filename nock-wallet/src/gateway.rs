// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

mod guard;
mod wire;

pub use guard::{InFlight, InFlightGuard, Operation};
pub use wire::{
    Ack, BalanceReport, ConfigMap, CreateTransaction, CreatedTransaction,
    SetActiveReport,
};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use crate::address::{ActiveAddress, Address};
use crate::grpc::GrpcConfig;
use crate::history::TransactionRecord;
use crate::keys::{KeySource, SeedphraseImport};
use crate::Error;

/// The wallet backend, one method per endpoint.
///
/// Every call is a single attempt: failures are returned to the caller as
/// they are, nothing is retried.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `GET /api/balance`
    async fn balance(&self) -> Result<BalanceReport, Error>;

    /// `GET /api/active-address`
    async fn active_address(&self) -> Result<ActiveAddress, Error>;

    /// `GET /api/list-master-addresses`
    async fn master_addresses(&self) -> Result<Vec<Address>, Error>;

    /// `POST /api/set-active-address`
    async fn set_active_address(
        &self,
        address: &str,
    ) -> Result<SetActiveReport, Error>;

    /// `GET /api/transaction-history`
    async fn transaction_history(
        &self,
    ) -> Result<Vec<TransactionRecord>, Error>;

    /// `POST /api/create-transaction`
    async fn create_transaction(
        &self,
        request: &CreateTransaction,
    ) -> Result<CreatedTransaction, Error>;

    /// `POST /api/sign-transaction`
    async fn sign_transaction(&self, name: &str) -> Result<Ack, Error>;

    /// `POST /api/send-transaction`
    async fn send_transaction(&self, name: &str) -> Result<Ack, Error>;

    /// `POST /api/import-keys`, multipart for files, JSON for seeds
    async fn import_keys(&self, source: &KeySource) -> Result<Ack, Error>;

    /// `POST /api/import-seedphrase`
    async fn import_seedphrase(
        &self,
        import: &SeedphraseImport,
    ) -> Result<Ack, Error>;

    /// `GET /api/show-seedphrase`
    async fn show_seedphrase(&self) -> Result<Zeroizing<String>, Error>;

    /// `GET /api/export-keys`, the raw key file
    async fn export_keys(&self) -> Result<Vec<u8>, Error>;

    /// `GET /api/config`
    async fn config(&self) -> Result<ConfigMap, Error>;

    /// `POST /api/config`, merged server side
    async fn update_config(&self, config: &ConfigMap)
    -> Result<ConfigMap, Error>;

    /// `GET /api/grpc-config`
    async fn grpc_config(&self) -> Result<GrpcConfig, Error>;

    /// `POST /api/grpc-config`
    async fn save_grpc_config(
        &self,
        config: &GrpcConfig,
    ) -> Result<GrpcConfig, Error>;
}

#[derive(Clone)]
/// Wallet backend HTTP client
pub struct HttpGateway {
    client: reqwest::Client,
    uri: String,
    in_flight: InFlight,
}

impl HttpGateway {
    /// Create a new HTTP Client
    ///
    /// # Errors
    /// This method errors if a TLS backend cannot be initialized, or the
    /// resolver cannot load the system configuration.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(30))
            .build();

        match client {
            Ok(client) => Ok(Self {
                uri: uri.into(),
                client,
                in_flight: InFlight::default(),
            }),
            Err(_) => Err(Error::HttpClient),
        }
    }

    /// The backend base URL
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The requests currently running through this client
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Check the backend is reachable
    ///
    /// # Errors
    /// This method errors if the backend cannot be reached or reports a
    /// failure.
    pub async fn check_connection(&self) -> Result<(), Error> {
        let _: serde_json::Value = self.get(Operation::Health, "health").await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        let uri = self.uri.trim_end_matches('/');
        format!("{uri}/api/{path}")
    }

    async fn get<T>(&self, op: Operation, path: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let _guard = self.in_flight.enter(op)?;
        let url = self.endpoint(path);
        debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        Self::read(response).await
    }

    async fn post<B, T>(
        &self,
        op: Operation,
        path: &str,
        body: &B,
    ) -> Result<T, Error>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let _guard = self.in_flight.enter(op)?;
        let url = self.endpoint(path);
        debug!("POST {url}");

        let response = self.client.post(url).json(body).send().await?;
        Self::read(response).await
    }

    async fn read<T>(response: Response) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.bytes().await?;
        debug!("{status} ({} bytes)", body.len());
        wire::decode(status, &body)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn balance(&self) -> Result<BalanceReport, Error> {
        self.get(Operation::Balance, "balance").await
    }

    async fn active_address(&self) -> Result<ActiveAddress, Error> {
        self.get(Operation::ActiveAddress, "active-address").await
    }

    async fn master_addresses(&self) -> Result<Vec<Address>, Error> {
        let list: wire::MasterAddresses = self
            .get(Operation::MasterAddresses, "list-master-addresses")
            .await?;
        Ok(list.addresses)
    }

    async fn set_active_address(
        &self,
        address: &str,
    ) -> Result<SetActiveReport, Error> {
        let body = wire::SetActive { address };
        self.post(Operation::SetActiveAddress, "set-active-address", &body)
            .await
    }

    async fn transaction_history(
        &self,
    ) -> Result<Vec<TransactionRecord>, Error> {
        let history: wire::History =
            self.get(Operation::History, "transaction-history").await?;
        Ok(history.transactions)
    }

    async fn create_transaction(
        &self,
        request: &CreateTransaction,
    ) -> Result<CreatedTransaction, Error> {
        self.post(Operation::CreateTransaction, "create-transaction", request)
            .await
    }

    async fn sign_transaction(&self, name: &str) -> Result<Ack, Error> {
        let body = wire::TransactionName {
            transaction_name: name,
        };
        self.post(Operation::SignTransaction, "sign-transaction", &body)
            .await
    }

    async fn send_transaction(&self, name: &str) -> Result<Ack, Error> {
        let body = wire::TransactionName {
            transaction_name: name,
        };
        self.post(Operation::SendTransaction, "send-transaction", &body)
            .await
    }

    async fn import_keys(&self, source: &KeySource) -> Result<Ack, Error> {
        match source {
            KeySource::File { file_name, bytes } => {
                let _guard = self.in_flight.enter(Operation::ImportKeys)?;
                let url = self.endpoint("import-keys");
                debug!("POST {url} (multipart, {} bytes)", bytes.len());

                let part =
                    Part::bytes(bytes.clone()).file_name(file_name.clone());
                let form = Form::new().part("file", part);
                let response =
                    self.client.post(url).multipart(form).send().await?;
                Self::read(response).await
            }
            KeySource::Seed(seed) => {
                let body = serde_json::json!({ "seed": seed.as_str() });
                self.post(Operation::ImportKeys, "import-keys", &body).await
            }
        }
    }

    async fn import_seedphrase(
        &self,
        import: &SeedphraseImport,
    ) -> Result<Ack, Error> {
        self.post(Operation::ImportSeedphrase, "import-seedphrase", import)
            .await
    }

    async fn show_seedphrase(&self) -> Result<Zeroizing<String>, Error> {
        let phrase: wire::Seedphrase =
            self.get(Operation::ShowSeedphrase, "show-seedphrase").await?;
        Ok(Zeroizing::new(phrase.seedphrase))
    }

    async fn export_keys(&self) -> Result<Vec<u8>, Error> {
        let _guard = self.in_flight.enter(Operation::ExportKeys)?;
        let url = self.endpoint("export-keys");
        debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // the key file is JSON itself, only its failure markers matter
        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(value) => wire::check(status, &value)?,
            Err(_) if !status.is_success() => {
                return Err(Error::backend(format!(
                    "{status}: {}",
                    String::from_utf8_lossy(&body).trim()
                )));
            }
            Err(_) => {}
        }

        Ok(body.to_vec())
    }

    async fn config(&self) -> Result<ConfigMap, Error> {
        let config: wire::ConfigPayload =
            self.get(Operation::Config, "config").await?;
        Ok(config.into_map())
    }

    async fn update_config(
        &self,
        config: &ConfigMap,
    ) -> Result<ConfigMap, Error> {
        let config: wire::ConfigPayload =
            self.post(Operation::Config, "config", config).await?;
        Ok(config.into_map())
    }

    async fn grpc_config(&self) -> Result<GrpcConfig, Error> {
        let config: wire::ConfigPayload =
            self.get(Operation::GrpcConfig, "grpc-config").await?;
        Ok(GrpcConfig::from_config(&config.into_map()))
    }

    async fn save_grpc_config(
        &self,
        config: &GrpcConfig,
    ) -> Result<GrpcConfig, Error> {
        let body = config.to_payload();
        let saved: wire::ConfigPayload =
            self.post(Operation::GrpcConfig, "grpc-config", &body).await?;
        Ok(GrpcConfig::from_config(&saved.into_map()))
    }
}
