//! Deployment environment a signed payload claims to originate from.

use serde::{Deserialize, Serialize};

/// Server environment that produced a signed payload.
///
/// `Xcode` and `LocalTesting` are developer-local signing contexts with no
/// production trust infrastructure. `Sandbox` and `Production` payloads
/// always carry a full certificate chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    Sandbox,
    Production,
    Xcode,
    LocalTesting,
    /// A value this library does not know yet; carries the raw wire string.
    Unrecognized(String),
}

impl Environment {
    /// Wire representation of the environment.
    pub fn as_str(&self) -> &str {
        match self {
            Environment::Sandbox => "Sandbox",
            Environment::Production => "Production",
            Environment::Xcode => "Xcode",
            Environment::LocalTesting => "LocalTesting",
            Environment::Unrecognized(raw) => raw,
        }
    }

    /// True for the developer-local signing contexts (`Xcode`,
    /// `LocalTesting`) that have no chain of trust to verify against.
    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Xcode | Environment::LocalTesting)
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Sandbox" => Environment::Sandbox,
            "Production" => Environment::Production,
            "Xcode" => Environment::Xcode,
            "LocalTesting" => Environment::LocalTesting,
            _ => Environment::Unrecognized(value),
        }
    }
}

impl From<Environment> for String {
    fn from(value: Environment) -> Self {
        value.as_str().to_owned()
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
