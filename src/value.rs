//! Conversions into template [`Value`]s. These are free functions rather than
//! `From` impls because neither side of the conversion is defined in this
//! crate.

use gtmpl_value::Value;
use serde_yaml::Value as Yaml;
use std::collections::HashMap;
use url::Url;

pub fn from_url(url: &Url) -> Value {
    Value::String(url.to_string())
}

pub fn from_optional_url(url: Option<&Url>) -> Value {
    match url {
        Some(url) => from_url(url),
        None => Value::Nil,
    }
}

/// Converts a YAML value from a data file into a template value. Mapping keys
/// that aren't scalars are dropped.
pub fn from_yaml(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => {
            let mut m: HashMap<String, Value> = HashMap::new();
            for (k, v) in mapping {
                let key = match k {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => continue,
                };
                m.insert(key, from_yaml(v));
            }
            Value::Object(m)
        }
    }
}
