use serde::{Deserialize, Serialize};

/// One set of MySQL credentials, keyed by group so operators can give
/// different groups different service accounts. Mirrors the separation
/// between `pgdog.toml` and `users.toml` in the reference stack: operational
/// settings and secrets live in different files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerCredentials {
    pub group_id: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    #[serde(default)]
    pub servers: Vec<ServerCredentials>,
}

impl Credentials {
    pub fn for_group(&self, group_id: &str) -> Option<&ServerCredentials> {
        self.servers.iter().find(|c| c.group_id == group_id)
    }
}
