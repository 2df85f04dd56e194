use crate::errors::InstructionError;
use std::str::FromStr;

pub const ENVIRONMENT_DEV: &str = "development";
pub const ENVIRONMENT_PROD: &str = "production";

/// Target Moip environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Sandbox used for integration testing.
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Resolves one of the two recognized environment names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ENVIRONMENT_DEV => Some(Environment::Development),
            ENVIRONMENT_PROD => Some(Environment::Production),
            _ => None,
        }
    }

    /// The name used to select this environment.
    pub fn key(&self) -> &'static str {
        match self {
            Environment::Development => ENVIRONMENT_DEV,
            Environment::Production => ENVIRONMENT_PROD,
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Environment::Development => "Sandbox",
            Environment::Production => "Produção",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Development => "https://desenvolvedor.moip.com.br/sandbox",
            Environment::Production => "https://www.moip.com.br",
        }
    }
}

impl FromStr for Environment {
    type Err = InstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::from_name(s).ok_or_else(|| InstructionError::UnknownEnvironment(s.to_string()))
    }
}
