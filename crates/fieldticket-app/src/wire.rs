// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Lenient scalar decoding for the lease API.
//!
//! The PHP endpoints are loose about scalar types: the same column comes back
//! as `"12"`, `12`, or `null` depending on the row. Everything is normalised to
//! an optional string so the query engine can compare raw values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

pub fn required_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    optional_string(deserializer)?
        .map(T::from)
        .ok_or_else(|| serde::de::Error::custom("required field is null"))
}

pub fn list_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::optional_string")]
        value: Option<String>,
        #[serde(deserialize_with = "super::required_string")]
        name: String,
    }

    #[test]
    fn numbers_and_nulls_are_normalised() -> anyhow::Result<()> {
        let row: Row = serde_json::from_str(r#"{"value": 4.5, "name": 7}"#)?;
        assert_eq!(row.value.as_deref(), Some("4.5"));
        assert_eq!(row.name, "7");

        let row: Row = serde_json::from_str(r#"{"value": null, "name": "x"}"#)?;
        assert!(row.value.is_none());

        let row: Row = serde_json::from_str(r#"{"name": "x"}"#)?;
        assert!(row.value.is_none());
        Ok(())
    }

    #[test]
    fn required_null_is_rejected() {
        let error = serde_json::from_str::<Row>(r#"{"name": null}"#)
            .expect_err("null name should fail");
        assert!(error.to_string().contains("required field is null"));
    }
}
