//! Serde helpers for JSON-RPC quantities.
//!
//! Nodes return small integers either as `0x`-prefixed hex strings or as
//! plain JSON numbers depending on the method, so both forms are accepted.

use serde::{de::Error, Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Parses a quantity from a JSON value.
pub fn parse_quantity(value: &Value) -> Result<u64, String> {
	match value {
		Value::Number(n) => n
			.as_u64()
			.ok_or_else(|| format!("Quantity out of range: {}", n)),
		Value::String(s) => {
			if let Some(hex) = s.strip_prefix("0x") {
				if hex.is_empty() {
					return Ok(0);
				}
				u64::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex quantity {}: {}", s, e))
			} else {
				s.parse::<u64>()
					.map_err(|e| format!("Invalid quantity {}: {}", s, e))
			}
		},
		other => Err(format!("Expected quantity, got {}", other)),
	}
}

/// Formats a quantity the way JSON-RPC expects it.
pub fn format_quantity(value: u64) -> String {
	format!("{:#x}", value)
}

pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&format_quantity(*value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
	let value = Value::deserialize(deserializer)?;
	parse_quantity(&value).map_err(D::Error::custom)
}

/// Same as the parent module for optional quantities; `null` maps to `None`.
pub mod opt {
	use super::{format_quantity, parse_quantity};
	use serde::{de::Error, Deserialize, Deserializer, Serializer};
	use serde_json::Value;

	pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
		match value {
			Some(v) => serializer.serialize_str(&format_quantity(*v)),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
		match Option::<Value>::deserialize(deserializer)? {
			None | Some(Value::Null) => Ok(None),
			Some(value) => parse_quantity(&value).map(Some).map_err(D::Error::custom),
		}
	}
}
