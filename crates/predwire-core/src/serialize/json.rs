use crate::serialize::{SerializeError, check_size};
use serde::{Serialize, de::DeserializeOwned};

pub(super) fn serialize<T>(t: &T) -> Result<String, SerializeError>
where
    T: Serialize,
{
    serde_json::to_string(t).map_err(|e| SerializeError::Serialize(e.to_string()))
}

pub(super) fn deserialize_bounded<T>(text: &str, max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    check_size(text.len(), max_bytes)?;

    serde_json::from_str(text).map_err(|e| SerializeError::Deserialize(e.to_string()))
}
