use serde::{Deserialize, Serialize};

/// Namespace shared by every value this client reads or writes.
pub const GLOBAL_NAMESPACE: &str = "global";

/// Key of the click counter.
pub const CLICKS_KEY: &str = "clicks";

/// Keys backing the four rating sliders. `val2` is absent in the deployed
/// table and must stay absent here.
pub const SLIDER_KEYS: [&str; 4] = ["val0", "val1", "val3", "val4"];

pub const SLIDER_MIN: i64 = 0;
pub const SLIDER_MAX: i64 = 10;
pub const SLIDER_DEFAULT: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueKey {
    pub namespace: String,
    pub key: String,
}

impl ValueKey {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for ValueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedValue {
    pub namespace: String,
    pub key: String,
    pub value: i64,
}

impl NamedValue {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>, value: i64) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            value,
        }
    }

    pub fn identity(&self) -> ValueKey {
        ValueKey::new(self.namespace.clone(), self.key.clone())
    }
}

/// Counter snapshot. Only ever produced from `get_counter` or
/// `increment_counter` results, never written through the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    pub namespace: String,
    pub key: String,
    pub value: i64,
}

impl CounterState {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>, value: i64) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            value,
        }
    }
}

/// Default slider map used before the first load completes.
pub fn default_slider_values() -> std::collections::BTreeMap<String, i64> {
    SLIDER_KEYS
        .iter()
        .map(|key| (key.to_string(), SLIDER_DEFAULT))
        .collect()
}

pub fn clamp_slider_value(value: i64) -> i64 {
    value.clamp(SLIDER_MIN, SLIDER_MAX)
}
