//! Stacks node client over the Hiro HTTP API.
//!
//! Read-only calls go to `/v2/contracts/call-read`. Contract calls are built
//! and signed locally, then broadcast as raw bytes to `/v2/transactions`. The
//! nonce comes from `/v2/accounts` and the fee from `/v2/fees/transaction`,
//! falling back to a fixed fee when the node cannot estimate one.
//!
//! `/v2/accounts` reports the confirmed nonce only, so the client remembers
//! the next nonce of every sender it has broadcast for and never signs below it.

use async_trait::async_trait;
use registrar_types::{
	errors::Result, BroadcastResponse, ClarityValue, ContractCall, Network, NetworkClient,
	ReadOnlyCall, RegistrarError, SecretString, StacksAddress,
};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::keys::StacksPrivateKey;
use super::transaction::ContractCallTransaction;

/// Fee in micro-STX used when the node returns no estimate.
pub const DEFAULT_FALLBACK_FEE: u64 = 1000;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ReadOnlyRequest {
	sender: String,
	arguments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReadOnlyResponse {
	okay: bool,
	result: Option<String>,
	cause: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
	nonce: u64,
}

#[derive(Debug, Serialize)]
struct FeeEstimateRequest {
	transaction_payload: String,
	estimated_len: usize,
}

#[derive(Debug, Deserialize)]
struct FeeEstimateResponse {
	estimations: Vec<FeeEstimation>,
}

#[derive(Debug, Deserialize)]
struct FeeEstimation {
	fee: u64,
}

#[derive(Debug, Deserialize)]
struct BroadcastRejection {
	error: String,
	reason: Option<String>,
	txid: Option<String>,
}

/// `NetworkClient` backed by a Stacks node or the Hiro public API.
pub struct HiroClient {
	http: reqwest::Client,
	api_url: String,
	network: Network,
	fallback_fee: u64,
	/// Next unused nonce per sender, advanced on every accepted broadcast.
	next_nonces: Mutex<HashMap<StacksAddress, u64>>,
}

/// Builder for creating HiroClient instances.
pub struct HiroClientBuilder {
	network: Network,
	api_url: Option<String>,
	timeout: Duration,
	fallback_fee: u64,
}

impl HiroClientBuilder {
	/// Overrides the network's default Hiro endpoint.
	pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
		self.api_url = Some(api_url.into());
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_fallback_fee(mut self, fee: u64) -> Self {
		self.fallback_fee = fee;
		self
	}

	pub fn build(self) -> Result<HiroClient> {
		let api_url = self
			.api_url
			.unwrap_or_else(|| self.network.default_api_url().to_string())
			.trim_end_matches('/')
			.to_string();

		info!(
			"Creating Hiro client for {} at {} with timeout={:?}",
			self.network, api_url, self.timeout
		);

		let http = reqwest::Client::builder()
			.timeout(self.timeout)
			.build()
			.map_err(|e| RegistrarError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(HiroClient {
			http,
			api_url,
			network: self.network,
			fallback_fee: self.fallback_fee,
			next_nonces: Mutex::new(HashMap::new()),
		})
	}
}

impl HiroClient {
	pub fn builder(network: Network) -> HiroClientBuilder {
		HiroClientBuilder {
			network,
			api_url: None,
			timeout: DEFAULT_TIMEOUT,
			fallback_fee: DEFAULT_FALLBACK_FEE,
		}
	}

	pub fn api_url(&self) -> &str {
		&self.api_url
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.api_url, path)
	}

	/// Next nonce of `address`.
	pub async fn get_nonce(&self, address: &StacksAddress) -> Result<u64> {
		let response = self
			.http
			.get(self.url(&format!("/v2/accounts/{}", address)))
			.query(&[("proof", "0")])
			.send()
			.await
			.map_err(|e| RegistrarError::Network(format!("Failed to fetch account: {}", e)))?;

		if !response.status().is_success() {
			return Err(RegistrarError::Network(format!(
				"Failed to fetch account {}: status {}",
				address,
				response.status()
			)));
		}

		let account: AccountResponse = response
			.json()
			.await
			.map_err(|e| RegistrarError::Network(format!("Invalid account response: {}", e)))?;
		Ok(account.nonce)
	}

	/// Middle fee estimate for `tx`, in micro-STX.
	pub async fn estimate_fee(&self, tx: &ContractCallTransaction) -> Result<u64> {
		let request = FeeEstimateRequest {
			transaction_payload: format!("0x{}", hex::encode(tx.payload_bytes())),
			estimated_len: tx.serialize().len(),
		};

		let response = self
			.http
			.post(self.url("/v2/fees/transaction"))
			.json(&request)
			.send()
			.await
			.map_err(|e| RegistrarError::Network(format!("Fee estimation failed: {}", e)))?;

		if !response.status().is_success() {
			return Err(RegistrarError::Network(format!(
				"Fee estimation failed with status {}",
				response.status()
			)));
		}

		let estimate: FeeEstimateResponse = response
			.json()
			.await
			.map_err(|e| RegistrarError::Network(format!("Invalid fee estimate: {}", e)))?;

		let estimations = &estimate.estimations;
		estimations
			.get(1)
			.or_else(|| estimations.first())
			.map(|estimation| estimation.fee)
			.ok_or_else(|| RegistrarError::Network("Fee estimation returned no fees".to_string()))
	}

	/// Sends a signed transaction. A node rejection is returned as a
	/// `BroadcastResponse` with `error` set, not as an `Err`.
	pub async fn broadcast(&self, tx: &ContractCallTransaction) -> Result<BroadcastResponse> {
		let response = self
			.http
			.post(self.url("/v2/transactions"))
			.header(CONTENT_TYPE, "application/octet-stream")
			.body(tx.serialize())
			.send()
			.await
			.map_err(|e| RegistrarError::Network(format!("Broadcast request failed: {}", e)))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| RegistrarError::Network(format!("Failed to read broadcast reply: {}", e)))?;

		if status.is_success() {
			let txid = serde_json::from_str::<String>(&body)
				.unwrap_or_else(|_| body.trim().trim_matches('"').to_string());
			return Ok(BroadcastResponse {
				txid: Some(txid).filter(|txid| !txid.is_empty()),
				..Default::default()
			});
		}

		if status.is_client_error() {
			if let Ok(rejection) = serde_json::from_str::<BroadcastRejection>(&body) {
				warn!(
					status = %status,
					reason = rejection.reason.as_deref().unwrap_or("unknown"),
					"Transaction rejected: {}",
					rejection.error
				);
				return Ok(BroadcastResponse {
					txid: rejection.txid,
					error: Some(rejection.error),
					reason: rejection.reason,
				});
			}
		}

		Err(RegistrarError::Network(format!(
			"Broadcast failed with status {}: {}",
			status,
			body.trim()
		)))
	}
}

#[async_trait]
impl NetworkClient for HiroClient {
	fn network(&self) -> Network {
		self.network
	}

	async fn call_read_only(&self, call: &ReadOnlyCall) -> Result<ClarityValue> {
		let contract = &call.contract;
		let url = self.url(&format!(
			"/v2/contracts/call-read/{}/{}/{}",
			contract.address(),
			contract.name(),
			call.function_name
		));
		let request = ReadOnlyRequest {
			sender: call.sender_address.to_string(),
			arguments: call.function_args.iter().map(|arg| arg.to_hex()).collect(),
		};

		debug!("Calling {}::{}", contract, call.function_name);

		let response = self
			.http
			.post(url)
			.json(&request)
			.send()
			.await
			.map_err(|e| RegistrarError::Network(format!("Read-only call failed: {}", e)))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(RegistrarError::Network(format!(
				"Read-only call {}::{} failed with status {}: {}",
				contract,
				call.function_name,
				status,
				body.trim()
			)));
		}

		let reply: ReadOnlyResponse = response
			.json()
			.await
			.map_err(|e| RegistrarError::Network(format!("Invalid read-only response: {}", e)))?;

		if !reply.okay {
			return Err(RegistrarError::ContractCall(
				reply.cause.unwrap_or_else(|| "unknown cause".to_string()),
			));
		}

		let result = reply.result.ok_or_else(|| {
			RegistrarError::ContractCall("read-only call returned no result".to_string())
		})?;
		Ok(ClarityValue::from_hex(&result)?)
	}

	async fn call_contract(
		&self,
		call: &ContractCall,
		sender_key: &SecretString,
	) -> Result<BroadcastResponse> {
		let key = StacksPrivateKey::from_hex(sender_key.expose_secret())?;
		let sender = key.address(self.network)?;

		// held until the broadcast settles so calls for one sender never share a nonce
		let mut next_nonces = self.next_nonces.lock().await;
		let confirmed = self.get_nonce(&sender).await?;
		let nonce = next_nonces
			.get(&sender)
			.map_or(confirmed, |&pending| pending.max(confirmed));
		let unsigned = ContractCallTransaction::new(self.network, call, &key)?.with_nonce(nonce);

		let fee = match self.estimate_fee(&unsigned).await {
			Ok(fee) => fee,
			Err(e) => {
				warn!(
					"Fee estimation unavailable ({}), using fallback fee {}",
					e, self.fallback_fee
				);
				self.fallback_fee
			}
		};

		let mut tx = unsigned.with_fee(fee);
		tx.sign(&key)?;

		debug!(
			sender = %sender,
			nonce,
			fee,
			txid = %tx.txid(),
			"Broadcasting {}::{}",
			call.contract,
			call.function_name
		);

		let response = self.broadcast(&tx).await?;
		if !response.is_rejected() {
			next_nonces.insert(sender, nonce + 1);
		}
		Ok(response)
	}
}
