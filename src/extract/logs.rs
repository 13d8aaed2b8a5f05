use log::info;

use crate::{chains::Chain, models::RawLogRecord};

use super::{
    chunks::{block_ranges, InvalidRangeError},
    client::{ExplorerClient, LogQuery},
    paginator::{FetchStatus, PaginatedFetcher},
};

pub const DEFAULT_CHUNK_SIZE: u64 = 100_000;
pub const LOG_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct LogExtraction {
    pub logs: Vec<RawLogRecord>,
    pub chunks: u64,
    /// Chunks that ended early, with the reason.
    pub incomplete: Vec<(u64, FetchStatus)>,
}

/// Every log of one contract and topic between two blocks, chunk after
/// chunk.
pub async fn fetch_all_logs(
    client: &ExplorerClient,
    chain: &Chain,
    address: &str,
    topic0: &str,
    from_block: u64,
    to_block: u64,
    chunk_size: u64,
) -> Result<LogExtraction, InvalidRangeError> {
    let ranges = block_ranges(from_block, to_block, chunk_size)?;
    let total = ranges.remaining();

    info!(
        "Fetching logs of {} on {} for blocks {} -> {} in {} chunks of {} blocks",
        address, chain, from_block, to_block, total, chunk_size
    );

    let fetcher = PaginatedFetcher::new(client, LOG_MAX_ATTEMPTS);

    let mut logs = Vec::new();
    let mut incomplete = Vec::new();

    for (index, range) in ranges.enumerate() {
        let chunk = index as u64 + 1;

        let query = LogQuery {
            chain: *chain,
            address: address.to_string(),
            topic0: topic0.to_string(),
            range,
        };

        let fetched = fetcher.fetch::<RawLogRecord>(&query).await;
        let received = fetched.records.len();

        if !fetched.is_complete() {
            incomplete.push((range.start, fetched.status.clone()));
        }

        logs.extend(fetched.records);

        info!(
            "Chunk {}/{} blocks {}: {} logs (total: {})",
            chunk,
            total,
            range,
            received,
            logs.len()
        );

        client.pause().await;
    }

    info!("Fetched {} logs from {} chunks", logs.len(), total);

    Ok(LogExtraction {
        logs,
        chunks: total,
        incomplete,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{
        chains::{ETHEREUM, LINEA_BRIDGE_CONTRACT, MESSAGE_SENT_TOPIC},
        extract::client::DEFAULT_TIMEOUT,
    };

    fn log_row(tx: &str, block: &str) -> serde_json::Value {
        json!({
            "address": LINEA_BRIDGE_CONTRACT,
            "topics": [MESSAGE_SENT_TOPIC],
            "data": "0x",
            "blockNumber": block,
            "timeStamp": "0x6797c600",
            "logIndex": "0x1",
            "transactionHash": tx,
        })
    }

    #[tokio::test]
    async fn queries_every_chunk_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("fromBlock", "100"))
            .and(query_param("toBlock", "149"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": [log_row("0xa1", "0x64"), log_row("0xa2", "0x65")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("fromBlock", "150"))
            .and(query_param("toBlock", "160"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "No records found",
                "result": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ExplorerClient::new(&format!("{}/api", server.uri()), "key", DEFAULT_TIMEOUT)
            .unwrap()
            .with_delays(Duration::ZERO, Duration::ZERO);

        let extraction = fetch_all_logs(
            &client,
            &ETHEREUM,
            LINEA_BRIDGE_CONTRACT,
            MESSAGE_SENT_TOPIC,
            100,
            160,
            50,
        )
        .await
        .unwrap();

        assert_eq!(extraction.chunks, 2);
        assert!(extraction.incomplete.is_empty());
        assert_eq!(extraction.logs.len(), 2);
        assert_eq!(extraction.logs[0].topics, vec![MESSAGE_SENT_TOPIC.to_string()]);
        assert_eq!(extraction.logs[1].transaction_hash.as_deref(), Some("0xa2"));
    }

    #[tokio::test]
    async fn rejects_reversed_ranges_before_any_request() {
        let client = ExplorerClient::new("http://127.0.0.1:9/api", "key", DEFAULT_TIMEOUT).unwrap();

        let result = fetch_all_logs(&client, &ETHEREUM, "0x0", "0x0", 10, 5, 100).await;

        assert!(matches!(result, Err(InvalidRangeError::Reversed { .. })));
    }
}
