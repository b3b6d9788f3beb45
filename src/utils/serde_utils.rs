use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

// The API isn't consistent about identifiers, some
// endpoints send them as JSON numbers and others as
// strings. Everything is an opaque string on our side.
// To be used with annotation:
// #[serde(deserialize_with = "serde_utils::string_or_number")]
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    other => Err(de::Error::custom(
      format!("expected a string or a number as identifier, got {}", other)
    ))
  }
}
