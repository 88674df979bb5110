//! Detect configuration keys missing from a config file written by an older
//! release, and fill them in with defaults.

use super::Config;
use crate::errors::{AppError, AppResult};
use serde_yaml::{Mapping, Value};

fn as_mapping(value: Value, what: &str) -> AppResult<Mapping> {
    match value {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!("{} is not a YAML mapping", what))),
    }
}

fn default_mapping() -> AppResult<Mapping> {
    as_mapping(serde_yaml::to_value(Config::default())?, "default configuration")
}

/// Keys present in the default configuration but absent from `content`.
pub fn missing_fields(content: &str) -> AppResult<Vec<String>> {
    let file = as_mapping(serde_yaml::from_str(content)?, "configuration file")?;

    Ok(default_mapping()?
        .keys()
        .filter(|k| !file.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

/// Return `content` with every missing key added at its default value.
/// Existing values (and unknown keys) are left untouched.
pub fn fill_missing(content: &str) -> AppResult<String> {
    let mut file = as_mapping(serde_yaml::from_str(content)?, "configuration file")?;

    for (k, v) in default_mapping()? {
        if !file.contains_key(&k) {
            file.insert(k, v);
        }
    }

    Ok(serde_yaml::to_string(&file)?)
}
