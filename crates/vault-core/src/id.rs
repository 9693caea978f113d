use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept record ids sent as either JSON strings or numbers.
/// Missing or null ids decode to an empty string.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
