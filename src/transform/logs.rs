use chrono::DateTime;
use ethabi::ParamType;
use log::{info, warn};
use num_bigint::BigInt;

use crate::models::{DecodedLogRecord, RawLogRecord};

use super::{
    hex::{hex_to_address, hex_to_int},
    units::{u256_to_bigint, wei_to_eth},
};

/// Hex characters of one ABI word.
const WORD_HEX_LEN: usize = 64;

/// `0x` plus the fee and value words. The nonce needs a third word, so
/// shorter payloads keep fee and value and carry no nonce.
pub const MIN_DATA_LEN: usize = 130;

/// Non-indexed head of `MessageSent`: fee, value and nonce, in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSentData {
    pub fee: BigInt,
    pub value: BigInt,
    pub nonce: Option<BigInt>,
}

fn decode_words(digits: &str, count: usize) -> Option<Vec<BigInt>> {
    let bytes = hex::decode(digits).ok()?;

    ethabi::decode(&vec![ParamType::Uint(256); count], &bytes)
        .ok()?
        .into_iter()
        .map(|token| token.into_uint().map(|word| u256_to_bigint(&word)))
        .collect()
}

/// Decodes the fee and value words of the event data, and the nonce when its
/// word is complete. The calldata offset and length that follow are ignored.
pub fn decode_event_data(data: Option<&str>) -> Option<MessageSentData> {
    let data = data?.trim();

    if data.len() < MIN_DATA_LEN {
        return None;
    }

    let digits = data.strip_prefix("0x").unwrap_or(data);

    let mut head = decode_words(digits.get(..WORD_HEX_LEN * 2)?, 2)?.into_iter();

    let nonce = digits
        .get(WORD_HEX_LEN * 2..WORD_HEX_LEN * 3)
        .and_then(|word| decode_words(word, 1))
        .and_then(|words| words.into_iter().next());

    Some(MessageSentData {
        fee: head.next()?,
        value: head.next()?,
        nonce,
    })
}

pub fn decode_log(raw: &RawLogRecord) -> DecodedLogRecord {
    let topic = |index: usize| raw.topics.get(index).map(String::as_str);

    let data = decode_event_data(raw.data.as_deref());

    let nonce = data
        .as_ref()
        .and_then(|data| data.nonce.as_ref())
        .and_then(|nonce| match u64::try_from(nonce) {
            Ok(nonce) => Some(nonce),
            Err(_) => {
                warn!(
                    "Nonce {} of {} does not fit 64 bits",
                    nonce,
                    raw.transaction_hash.as_deref().unwrap_or("unknown tx")
                );
                None
            }
        });

    let timestamp = hex_to_int(raw.time_stamp.as_deref());

    DecodedLogRecord {
        tx_hash: raw.transaction_hash.clone(),
        block_number: hex_to_int(raw.block_number.as_deref()),
        timestamp,
        datetime: i64::try_from(timestamp)
            .ok()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0)),
        from_address: hex_to_address(topic(1)),
        to_address: hex_to_address(topic(2)),
        message_hash: topic(3).map(str::to_string),
        value_eth: data.as_ref().map(|data| wei_to_eth(&data.value)),
        fee_eth: data.as_ref().map(|data| wei_to_eth(&data.fee)),
        nonce,
        gas_price: hex_to_int(raw.gas_price.as_deref()),
        gas_used: hex_to_int(raw.gas_used.as_deref()),
        log_index: hex_to_int(raw.log_index.as_deref()),
        tx_index: hex_to_int(raw.transaction_index.as_deref()),
    }
}

pub fn decode_logs(raw_logs: &[RawLogRecord]) -> Vec<DecodedLogRecord> {
    info!("Decoding {} logs", raw_logs.len());

    let decoded: Vec<DecodedLogRecord> = raw_logs.iter().map(decode_log).collect();

    let undecoded = decoded.iter().filter(|log| log.value_eth.is_none()).count();

    if undecoded > 0 {
        warn!("{} logs carried no decodable payload", undecoded);
    }

    decoded
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use ethabi::{ethereum_types::U256, Token};

    use super::*;
    use crate::chains::MESSAGE_SENT_TOPIC;

    fn encode_words(words: &[u64]) -> String {
        let tokens: Vec<Token> = words.iter().map(|word| Token::Uint(U256::from(*word))).collect();
        format!("0x{}", hex::encode(ethabi::encode(&tokens)))
    }

    fn pad_address(address: &str) -> String {
        format!("0x{:0>64}", address.trim_start_matches("0x"))
    }

    #[test]
    fn decodes_fee_value_and_nonce() {
        let value = U256::from_dec_str("1000000000000000000").unwrap();
        let data = format!(
            "0x{}",
            hex::encode(ethabi::encode(&[
                Token::Uint(U256::from(100)),
                Token::Uint(value),
                Token::Uint(U256::from(42)),
                Token::Uint(U256::from(160)),
                Token::Uint(U256::zero()),
            ]))
        );

        let decoded = decode_event_data(Some(&data)).unwrap();

        assert_eq!(decoded.fee, BigInt::from(100));
        assert_eq!(decoded.value, BigInt::from(1_000_000_000_000_000_000u64));
        assert_eq!(decoded.nonce, Some(BigInt::from(42)));
    }

    #[test]
    fn short_or_invalid_payloads_decode_to_nothing() {
        assert_eq!(decode_event_data(None), None);
        assert_eq!(decode_event_data(Some("0x")), None);
        assert_eq!(decode_event_data(Some(&"0".repeat(129))), None);
        assert_eq!(decode_event_data(Some(&format!("0x{}", "zz".repeat(96)))), None);

        let raw = RawLogRecord {
            data: Some("0x1234".to_string()),
            ..Default::default()
        };
        let decoded = decode_log(&raw);

        assert_eq!(decoded.value_eth, None);
        assert_eq!(decoded.fee_eth, None);
        assert_eq!(decoded.nonce, None);
        assert_eq!(decoded.block_number, 0);
        assert_eq!(decoded.from_address, None);
    }

    #[test]
    fn two_word_payload_keeps_fee_and_value() {
        let data = encode_words(&[0, 1_000_000_000_000_000_000]);
        assert_eq!(data.len(), MIN_DATA_LEN);

        let decoded = decode_event_data(Some(&data)).unwrap();

        assert_eq!(decoded.fee, BigInt::from(0));
        assert_eq!(decoded.value, BigInt::from(1_000_000_000_000_000_000u64));
        assert_eq!(decoded.nonce, None);

        let truncated = format!("{}{}", data, "0".repeat(40));
        let decoded = decode_log(&RawLogRecord {
            data: Some(truncated),
            ..Default::default()
        });

        assert_eq!(decoded.value_eth, Some(BigDecimal::from(1)));
        assert_eq!(decoded.fee_eth, Some(BigDecimal::from(0)));
        assert_eq!(decoded.nonce, None);
    }

    #[test]
    fn decodes_a_bridge_deposit() {
        let from = "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01";
        let to = "0x1111111111111111111111111111111111111111";
        let message_hash = "0x9f6e7c6f0a4b9f4d2d8e5f5fdc3e4c3a1b2c3d4e5f60718293a4b5c6d7e8f901";

        let value = U256::from_dec_str("5000000000000000000").unwrap();
        let data = format!(
            "0x{}",
            hex::encode(ethabi::encode(&[
                Token::Uint(U256::zero()),
                Token::Uint(value),
                Token::Uint(U256::from(7)),
                Token::Uint(U256::from(160)),
                Token::Uint(U256::zero()),
            ]))
        );

        let raw = RawLogRecord {
            address: Some("0xd19d4B5d358258f05D7B411E21A1460D11B0876F".to_string()),
            topics: vec![
                MESSAGE_SENT_TOPIC.to_string(),
                pad_address(from),
                pad_address(to),
                message_hash.to_string(),
            ],
            data: Some(data),
            block_number: Some("0x14f1a2b".to_string()),
            time_stamp: Some("0x6796cc80".to_string()),
            gas_price: Some("0x3b9aca00".to_string()),
            gas_used: Some("0x5208".to_string()),
            log_index: Some("0x".to_string()),
            transaction_hash: Some("0xfeed".to_string()),
            transaction_index: None,
            ..Default::default()
        };

        let decoded = decode_log(&raw);

        assert_eq!(decoded.tx_hash.as_deref(), Some("0xfeed"));
        assert_eq!(decoded.from_address.as_deref(), Some(from));
        assert_eq!(decoded.to_address.as_deref(), Some(to));
        assert_eq!(decoded.message_hash.as_deref(), Some(message_hash));
        assert_eq!(decoded.value_eth, Some(BigDecimal::from(5)));
        assert_eq!(decoded.fee_eth, Some(BigDecimal::from(0)));
        assert_eq!(decoded.nonce, Some(7));
        assert_eq!(decoded.block_number, 0x14f1a2b);
        assert_eq!(decoded.timestamp, 1_737_936_000);
        assert_eq!(
            decoded.datetime.map(|datetime| datetime.to_rfc3339()),
            Some("2025-01-27T00:00:00+00:00".to_string())
        );
        assert_eq!(decoded.gas_price, 1_000_000_000);
        assert_eq!(decoded.gas_used, 21_000);
        assert_eq!(decoded.log_index, 0);
        assert_eq!(decoded.tx_index, 0);
    }

    #[test]
    fn missing_topics_are_null() {
        let raw = RawLogRecord {
            topics: vec![MESSAGE_SENT_TOPIC.to_string()],
            data: Some(encode_words(&[1, 2, 3])),
            ..Default::default()
        };

        let decoded = decode_log(&raw);

        assert_eq!(decoded.from_address, None);
        assert_eq!(decoded.to_address, None);
        assert_eq!(decoded.message_hash, None);
        assert_eq!(
            decoded.value_eth,
            Some(BigDecimal::from_str("0.000000000000000002").unwrap())
        );
    }

    #[test]
    fn oversized_nonce_is_dropped() {
        let raw = RawLogRecord {
            data: Some(format!(
                "0x{}",
                hex::encode(ethabi::encode(&[
                    Token::Uint(U256::zero()),
                    Token::Uint(U256::one()),
                    Token::Uint(U256::MAX),
                ]))
            )),
            ..Default::default()
        };

        let decoded = decode_log(&raw);

        assert_eq!(decoded.nonce, None);
        assert!(decoded.value_eth.is_some());
    }
}
