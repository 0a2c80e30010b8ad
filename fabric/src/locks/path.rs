use std::cmp::Ordering;

/// A named lockable object path (§4.B): `group/<id>`, `shard/<id>`, or
/// `global`. `Ord` is derived from the canonical string form so acquisition
/// order is lexicographic by path regardless of variant, matching the
/// spec's literal naming scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LockPath {
    Group(String),
    Shard(i64),
    Global,
}

impl LockPath {
    fn canonical(&self) -> String {
        match self {
            LockPath::Group(id) => format!("group/{id}"),
            LockPath::Shard(id) => format!("shard/{id}"),
            LockPath::Global => "global".to_string(),
        }
    }
}

impl PartialOrd for LockPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LockPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_lexicographically_by_canonical_path() {
        let mut paths = vec![
            LockPath::Shard(1),
            LockPath::Global,
            LockPath::Group("z".into()),
            LockPath::Group("a".into()),
        ];
        paths.sort();
        assert_eq!(
            paths,
            vec![
                LockPath::Global,
                LockPath::Group("a".into()),
                LockPath::Group("z".into()),
                LockPath::Shard(1),
            ]
        );
    }
}
