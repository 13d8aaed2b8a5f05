//! Serde adapters for columns whose file representation differs from the
//! in-memory type. Decimals always travel as strings so no reader ever
//! routes them through a float.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{de, ser, Deserialize, Deserializer, Serializer};

/// Parses a topics column. Files written by this crate hold a JSON array,
/// older exports hold a Python literal list (`['0xabc', '0xdef']`).
pub fn parse_topics(text: &str) -> Vec<String> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(topics) = serde_json::from_str::<Vec<String>>(trimmed) {
        return topics;
    }

    serde_json::from_str::<Vec<String>>(&trimmed.replace('\'', "\"")).unwrap_or_default()
}

pub mod topics {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Column {
        List(Vec<String>),
        Text(String),
    }

    pub fn serialize<S>(topics: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = serde_json::to_string(topics).map_err(ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let column = Option::<Column>::deserialize(deserializer)?;

        Ok(match column {
            None => Vec::new(),
            Some(Column::List(topics)) => topics,
            Some(Column::Text(text)) => parse_topics(&text),
        })
    }
}

pub mod decimal {
    use super::*;

    pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        BigDecimal::from_str(text.trim()).map_err(de::Error::custom)
    }
}

pub mod optional_decimal {
    use super::*;

    pub fn serialize<S>(value: &Option<BigDecimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => BigDecimal::from_str(text.trim())
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_and_python_topic_lists() {
        assert_eq!(
            parse_topics("[\"0xabc\",\"0xdef\"]"),
            vec!["0xabc".to_string(), "0xdef".to_string()]
        );
        assert_eq!(
            parse_topics("['0xabc', '0xdef', '0x123']"),
            vec!["0xabc", "0xdef", "0x123"]
        );
        assert!(parse_topics("").is_empty());
        assert!(parse_topics("not a list").is_empty());
    }
}
