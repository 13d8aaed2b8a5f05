use log::warn;
use serde::de::DeserializeOwned;

use super::{
    client::{ExplorerClient, ExplorerQuery},
    retry::{RetryOutcome, RetryPolicy},
};

pub const PAGE_SIZE: usize = 1000;

/// The explorer refuses to page past this many results for one query.
pub const MAX_RESULTS_PER_QUERY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// Reached the last page or an explicit "no records".
    Complete,
    /// Stopped at the result ceiling, the query range is too wide.
    Saturated,
    /// A page kept failing and the query was abandoned.
    Abandoned(String),
    /// The API rejected the request.
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct PageFetch<T> {
    pub records: Vec<T>,
    pub pages: usize,
    pub status: FetchStatus,
}

impl<T> PageFetch<T> {
    pub fn is_complete(&self) -> bool {
        self.status == FetchStatus::Complete
    }
}

/// Walks every page of one query. Failures never propagate, the caller gets
/// whatever was collected together with the reason it stopped.
pub struct PaginatedFetcher<'a> {
    client: &'a ExplorerClient,
    policy: RetryPolicy,
    page_size: usize,
    max_results: usize,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(client: &'a ExplorerClient, max_attempts: u32) -> Self {
        Self {
            client,
            policy: client.retry_policy(max_attempts),
            page_size: PAGE_SIZE,
            max_results: MAX_RESULTS_PER_QUERY,
        }
    }

    pub fn with_page_size(mut self, page_size: usize, max_results: usize) -> Self {
        self.page_size = page_size.max(1);
        self.max_results = max_results.max(self.page_size);
        self
    }

    pub async fn fetch<T: DeserializeOwned>(&self, query: &dyn ExplorerQuery) -> PageFetch<T> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let label = format!("{} page {}", query.describe(), page);
            let client = self.client;
            let page_size = self.page_size;

            let outcome = self
                .policy
                .run(&label, move |_| client.fetch_page::<T>(query, page, page_size))
                .await;

            let status = match outcome {
                RetryOutcome::Done(batch) => {
                    let received = batch.len();
                    records.extend(batch);

                    if received < self.page_size {
                        FetchStatus::Complete
                    } else if page * self.page_size >= self.max_results {
                        warn!(
                            "{}: reached {} results, reduce the block range to see the rest",
                            query.describe(),
                            self.max_results
                        );
                        FetchStatus::Saturated
                    } else {
                        page += 1;
                        self.client.pause().await;
                        continue;
                    }
                }
                RetryOutcome::Empty => FetchStatus::Complete,
                RetryOutcome::Exhausted(reason) => {
                    warn!(
                        "{}: abandoned at page {} with {} records",
                        query.describe(),
                        page,
                        records.len()
                    );
                    FetchStatus::Abandoned(reason)
                }
                RetryOutcome::Failed(reason) => {
                    warn!("{}: API issue: {}", query.describe(), reason);
                    FetchStatus::Rejected(reason)
                }
            };

            return PageFetch {
                records,
                pages: page,
                status,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{json, Value};
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{
        chains::LINEA,
        extract::client::{TransactionQuery, DEFAULT_TIMEOUT},
        models::RawTransactionRecord,
    };

    fn query() -> TransactionQuery {
        TransactionQuery {
            chain: LINEA,
            address: "0xabc0000000000000000000000000000000000001".to_string(),
            start_block: 0,
            end_block: 99_999_999,
        }
    }

    fn rows(from: usize, count: usize) -> Vec<Value> {
        (from..from + count)
            .map(|n| json!({"hash": format!("0x{:x}", n), "blockNumber": n}))
            .collect()
    }

    fn page(rows: Vec<Value>) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": rows
        }))
    }

    async fn client(server: &MockServer) -> ExplorerClient {
        ExplorerClient::new(&format!("{}/api", server.uri()), "key", DEFAULT_TIMEOUT)
            .unwrap()
            .with_delays(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn follows_pages_until_a_short_one() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("page", "1"))
            .respond_with(page(rows(0, 3)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("page", "2"))
            .respond_with(page(rows(3, 1)))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let fetcher = PaginatedFetcher::new(&client, 3).with_page_size(3, 10_000);

        let fetched = fetcher.fetch::<RawTransactionRecord>(&query()).await;

        assert!(fetched.is_complete());
        assert_eq!(fetched.pages, 2);
        assert_eq!(fetched.records.len(), 4);
        assert_eq!(fetched.records[3].hash.as_deref(), Some("0x3"));
        assert_eq!(fetched.records[3].block_number.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn no_records_is_a_normal_end() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "No transactions found",
                "result": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;

        let fetched = PaginatedFetcher::new(&client, 5)
            .fetch::<RawTransactionRecord>(&query())
            .await;

        assert!(fetched.is_complete());
        assert!(fetched.records.is_empty());
    }

    #[tokio::test]
    async fn keeps_partial_results_when_retries_run_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("page", "1"))
            .respond_with(page(rows(0, 2)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .expect(3)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let fetcher = PaginatedFetcher::new(&client, 3).with_page_size(2, 10_000);

        let fetched = fetcher.fetch::<RawTransactionRecord>(&query()).await;

        assert_eq!(fetched.records.len(), 2);
        assert_eq!(
            fetched.status,
            FetchStatus::Abandoned("empty response".to_string())
        );
    }

    #[tokio::test]
    async fn api_errors_stop_without_retrying() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Invalid API Key"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;

        let fetched = PaginatedFetcher::new(&client, 5)
            .fetch::<RawTransactionRecord>(&query())
            .await;

        assert!(matches!(fetched.status, FetchStatus::Rejected(_)));
        assert!(fetched.records.is_empty());
    }

    #[tokio::test]
    async fn stops_at_the_result_ceiling() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(page(rows(0, 2)))
            .expect(3)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let fetcher = PaginatedFetcher::new(&client, 1).with_page_size(2, 6);

        let fetched = fetcher.fetch::<RawTransactionRecord>(&query()).await;

        assert_eq!(fetched.status, FetchStatus::Saturated);
        assert_eq!(fetched.records.len(), 6);
    }
}
