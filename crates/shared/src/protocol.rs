use serde::{Deserialize, Serialize};

/// Table holding every named value.
pub const COUNTERS_TABLE: &str = "counters";
pub const GET_COUNTER_RPC: &str = "get_counter";
pub const INCREMENT_COUNTER_RPC: &str = "increment_counter";
/// Columns forming the unique identity, used as the upsert conflict target.
pub const UPSERT_CONFLICT_TARGET: &str = "namespace,key";
pub const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// Arguments of both counter RPCs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRpcArgs {
    pub ns: String,
    pub k: String,
}

impl CounterRpcArgs {
    pub fn new(ns: impl Into<String>, k: impl Into<String>) -> Self {
        Self {
            ns: ns.into(),
            k: k.into(),
        }
    }
}

/// Row projection returned by `select=value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRow {
    pub value: Option<i64>,
}

/// Full row written by the upsert path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRow {
    pub namespace: String,
    pub key: String,
    pub value: i64,
}
