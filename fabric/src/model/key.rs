use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A sharding key value. Range bounds and lookup values share this type so
/// comparisons never have to guess at a representation (grounded on
/// `FlexibleType`/`Value` in the teacher's sharding module, collapsed to the
/// two variants RANGE sharding actually needs).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShardKey {
    Integer(i64),
    Text(String),
}

impl PartialOrd for ShardKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShardKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ShardKey::Integer(a), ShardKey::Integer(b)) => a.cmp(b),
            (ShardKey::Text(a), ShardKey::Text(b)) => a.cmp(b),
            // Mismatched variants can't occur within one well-formed
            // definition; order by discriminant so the comparison is total.
            (ShardKey::Integer(_), ShardKey::Text(_)) => Ordering::Less,
            (ShardKey::Text(_), ShardKey::Integer(_)) => Ordering::Greater,
        }
    }
}

impl std::fmt::Display for ShardKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShardKey::Integer(v) => write!(f, "{v}"),
            ShardKey::Text(v) => write!(f, "{v}"),
        }
    }
}

impl ShardKey {
    /// Parse a literal the way it would appear in a comma-separated
    /// `add_shard` specification: integers parse as `Integer`, anything
    /// else is carried as `Text`.
    pub fn parse(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            ShardKey::Integer(i)
        } else {
            ShardKey::Text(raw.to_string())
        }
    }
}
