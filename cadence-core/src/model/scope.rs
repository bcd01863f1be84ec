use serde::{Deserialize, Serialize};

/// Granularity at which a pattern applies: a single client, an industry
/// segment across clients, or the whole platform.
///
/// Scopes are persisted as URI-style keys (`client://acme`,
/// `industry://saas`, `platform://global`) so the store stays a dumb fact
/// table keyed by strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Client(String),
    Industry(String),
    Platform,
}

impl Scope {
    pub fn key(&self) -> String {
        match self {
            Scope::Client(id) => format!("client://{id}"),
            Scope::Industry(segment) => format!("industry://{segment}"),
            Scope::Platform => "platform://global".to_string(),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        if let Some(id) = key.strip_prefix("client://") {
            if id.is_empty() {
                return None;
            }
            return Some(Scope::Client(id.to_string()));
        }
        if let Some(segment) = key.strip_prefix("industry://") {
            if segment.is_empty() {
                return None;
            }
            return Some(Scope::Industry(segment.to_string()));
        }
        if key == "platform://global" {
            return Some(Scope::Platform);
        }
        None
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}
