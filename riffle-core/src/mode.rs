//! Runtime mode configuration for Riffle.

use serde::{Deserialize, Serialize};

/// Runtime mode for Riffle services.
///
/// Controls how much failure detail is exposed to HTTP clients. Production
/// mode elides internal error messages; development mode includes them for
/// easier debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeMode {
    /// Production mode - internal error detail is never sent to clients
    Production,
    /// Development mode - error responses carry the underlying message
    Development,
}

impl RuntimeMode {
    /// Check if running in development mode.
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if running in production mode.
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Default for RuntimeMode {
    fn default() -> Self {
        // Default to development mode for development convenience
        Self::Development
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "PRODUCTION"),
            Self::Development => write!(f, "DEVELOPMENT"),
        }
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(format!(
                "Invalid runtime mode: '{s}'. Valid options are: production, development"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_aliases() {
        assert_eq!("prod".parse::<RuntimeMode>(), Ok(RuntimeMode::Production));
        assert_eq!("DEV".parse::<RuntimeMode>(), Ok(RuntimeMode::Development));
        assert!("staging".parse::<RuntimeMode>().is_err());
    }
}
