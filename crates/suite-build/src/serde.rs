use serde::{de::DeserializeOwned, Serialize};
use suite_core::errors::{ErrorInfo, SuiteError};

fn serde_error(code: &str, err: impl ToString) -> SuiteError {
    SuiteError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Compact JSON with object keys sorted at every depth.
///
/// Keys are sorted by the round trip through [`serde_json::Value`]; this
/// relies on `serde_json` being built without `preserve_order`.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SuiteError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json-serialize", err))?;
    serde_json::to_vec(&value).map_err(|err| serde_error("json-write", err))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, SuiteError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml-serialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, SuiteError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml-deserialize", err))
}
