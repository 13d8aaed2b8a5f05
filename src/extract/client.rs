use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::chains::Chain;

use super::{
    chunks::BlockRange,
    retry::{Attempt, RetryOutcome, RetryPolicy},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(150);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

const EMPTY_RESULT_MESSAGES: [&str; 2] = ["No records found", "No transactions found"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unable to build the HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("block lookup for {date} on {chain} failed: {reason}")]
    BlockLookup {
        chain: String,
        date: NaiveDate,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closest {
    Before,
    After,
}

impl Closest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Closest::Before => "before",
            Closest::After => "after",
        }
    }
}

/// Envelope shared by every explorer endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub result: Value,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        match &self.status {
            Value::String(status) => status.trim() == "1",
            Value::Number(status) => status.as_u64() == Some(1),
            _ => false,
        }
    }

    pub fn message_text(&self) -> String {
        value_text(&self.message)
    }

    pub fn result_text(&self) -> String {
        value_text(&self.result)
    }

    /// Splits a list response into records, the normal end of data, a
    /// throttled request or a rejection.
    pub fn into_rows(self) -> Attempt<Vec<Value>> {
        if self.is_ok() {
            return match self.result {
                Value::Array(rows) if rows.is_empty() => Attempt::Empty,
                Value::Array(rows) => Attempt::Done(rows),
                Value::Null => Attempt::Empty,
                other => Attempt::Fail(format!("unexpected result {}", other)),
            };
        }

        let message = self.message_text();
        let result = self.result_text();

        if EMPTY_RESULT_MESSAGES
            .iter()
            .any(|empty| result.contains(empty) || message.contains(empty))
        {
            return Attempt::Empty;
        }

        if is_rate_limited(&message) || is_rate_limited(&result) {
            return Attempt::Retry(format!("rate limited: {}", result));
        }

        Attempt::Fail(format!("{} - {}", message, result))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_rate_limited(text: &str) -> bool {
    let text = text.to_lowercase();
    text.contains("rate limit") || text.contains("max calls per sec") || text.contains("too many")
}

/// The explorer mixes JSON numbers and strings for the same field. Scalars
/// are turned into strings so every record reads as text, the way it is
/// written to the intermediate files.
pub fn stringify_scalars(value: Value) -> Value {
    match value {
        Value::Number(number) => Value::String(number.to_string()),
        Value::Bool(flag) => Value::String(if flag { "1" } else { "0" }.to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(stringify_scalars).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, stringify_scalars(value)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// A paged explorer query. Implementations supply everything but the page
/// cursor and the key.
pub trait ExplorerQuery: Send + Sync {
    fn params(&self) -> Vec<(&'static str, String)>;

    fn describe(&self) -> String;
}

/// `module=logs&action=getLogs` over one block range.
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub chain: Chain,
    pub address: String,
    pub topic0: String,
    pub range: BlockRange,
}

impl ExplorerQuery for LogQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("chainid", self.chain.id.to_string()),
            ("module", "logs".to_string()),
            ("action", "getLogs".to_string()),
            ("address", self.address.clone()),
            ("topic0", self.topic0.clone()),
            ("fromBlock", self.range.start.to_string()),
            ("toBlock", self.range.end.to_string()),
        ]
    }

    fn describe(&self) -> String {
        format!("logs {} [{}]", self.chain, self.range)
    }
}

/// `module=account&action=txlist` for one wallet, oldest first.
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    pub chain: Chain,
    pub address: String,
    pub start_block: u64,
    pub end_block: u64,
}

impl ExplorerQuery for TransactionQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("chainid", self.chain.id.to_string()),
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", self.address.clone()),
            ("startblock", self.start_block.to_string()),
            ("endblock", self.end_block.to_string()),
            ("sort", "asc".to_string()),
        ]
    }

    fn describe(&self) -> String {
        format!("txlist {} {}", self.chain, short_address(&self.address))
    }
}

pub fn short_address(address: &str) -> &str {
    address.get(..10).unwrap_or(address)
}

/// Shared HTTP session for one run. Built once and passed by reference to
/// every fetcher.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
    base_url: String,
    api_key: String,
    pub request_delay: Duration,
    pub retry_delay: Duration,
}

impl ExplorerClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_delays(mut self, request_delay: Duration, retry_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self.retry_delay = retry_delay;
        self
    }

    pub fn retry_policy(&self, max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, self.retry_delay)
    }

    pub async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// One GET. Transport problems, non-200 answers and unreadable bodies
    /// are all retryable.
    pub async fn request(&self, mut params: Vec<(&'static str, String)>) -> Attempt<ApiResponse> {
        params.push(("apikey", self.api_key.clone()));

        let response = match self.http.get(&self.base_url).query(&params).send().await {
            Ok(response) => response,
            Err(err) => return Attempt::Retry(format!("request error: {}", err)),
        };

        let status = response.status();

        if status != StatusCode::OK {
            return Attempt::Retry(format!("HTTP {}", status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Attempt::Retry(format!("unreadable body: {}", err)),
        };

        if body.trim().is_empty() {
            return Attempt::Retry("empty response".to_string());
        }

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(response) => Attempt::Done(response),
            Err(err) => Attempt::Retry(format!("malformed payload: {}", err)),
        }
    }

    /// One page of a list query, decoded into `T`.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        query: &dyn ExplorerQuery,
        page: usize,
        offset: usize,
    ) -> Attempt<Vec<T>> {
        let mut params = query.params();
        params.push(("page", page.to_string()));
        params.push(("offset", offset.to_string()));

        let response = match self.request(params).await {
            Attempt::Done(response) => response,
            Attempt::Empty => return Attempt::Empty,
            Attempt::Retry(reason) => return Attempt::Retry(reason),
            Attempt::Fail(reason) => return Attempt::Fail(reason),
        };

        let rows = match response.into_rows() {
            Attempt::Done(rows) => rows,
            Attempt::Empty => return Attempt::Empty,
            Attempt::Retry(reason) => return Attempt::Retry(reason),
            Attempt::Fail(reason) => return Attempt::Fail(reason),
        };

        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            match serde_json::from_value::<T>(stringify_scalars(row)) {
                Ok(record) => records.push(record),
                Err(err) => return Attempt::Retry(format!("malformed record: {}", err)),
            }
        }

        debug!("{} page {}: {} records", query.describe(), page, records.len());

        Attempt::Done(records)
    }

    /// Block closest to UTC midnight of `date`. Any failure is fatal for the
    /// caller, there is no sensible fallback block.
    pub async fn block_by_date(
        &self,
        chain: &Chain,
        date: NaiveDate,
        closest: Closest,
    ) -> Result<u64, ApiError> {
        let timestamp = date.and_time(NaiveTime::default()).and_utc().timestamp();

        let params = vec![
            ("chainid", chain.id.to_string()),
            ("module", "block".to_string()),
            ("action", "getblocknobytime".to_string()),
            ("timestamp", timestamp.to_string()),
            ("closest", closest.as_str().to_string()),
        ];

        let label = format!("block lookup {} {}", chain, date);

        let outcome = self
            .retry_policy(3)
            .run(&label, |_| {
                let params = params.clone();
                async move {
                    match self.request(params).await {
                        Attempt::Done(response) if response.is_ok() => {
                            let result = response.result_text();
                            match result.trim().parse::<u64>() {
                                Ok(block) => Attempt::Done(block),
                                Err(_) => Attempt::Fail(format!("unexpected block {}", result)),
                            }
                        }
                        Attempt::Done(response) => Attempt::Fail(format!(
                            "{} - {}",
                            response.message_text(),
                            response.result_text()
                        )),
                        Attempt::Empty => Attempt::Fail("empty answer".to_string()),
                        Attempt::Retry(reason) => Attempt::Retry(reason),
                        Attempt::Fail(reason) => Attempt::Fail(reason),
                    }
                }
            })
            .await;

        let reason = match outcome {
            RetryOutcome::Done(block) => {
                info!("{} {} ({}) is block {}", chain, date, closest.as_str(), block);
                return Ok(block);
            }
            RetryOutcome::Empty => "empty answer".to_string(),
            RetryOutcome::Exhausted(reason) | RetryOutcome::Failed(reason) => reason,
        };

        Err(ApiError::BlockLookup {
            chain: chain.name.to_string(),
            date,
            reason,
        })
    }
}
