//! Pre-flight checks before starting the relay.
//!
//! Validates that every secret the configured providers need is present,
//! so the server fails at startup instead of on the first query.

use crate::config::{require_env, Settings};
use crate::error::{RelayError, Result};

/// Check that all secrets required by `settings` are set.
pub fn check(settings: &Settings) -> Result<()> {
    let missing: Vec<&str> = settings
        .required_secrets()
        .into_iter()
        .filter(|name| require_env(name).is_err())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RelayError::Config(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secrets_are_listed() {
        let mut settings = Settings::default();
        settings.generation.api_key_env = "RAGRELAY_TEST_UNSET_GEN".to_string();
        settings.embedding.api_key_env = Some("RAGRELAY_TEST_UNSET_EMB".to_string());
        settings.vector_store.api_key_env = "RAGRELAY_TEST_UNSET_PC".to_string();

        let message = check(&settings).unwrap_err().to_string();
        assert!(message.contains("RAGRELAY_TEST_UNSET_GEN"));
        assert!(message.contains("RAGRELAY_TEST_UNSET_EMB"));
        assert!(message.contains("RAGRELAY_TEST_UNSET_PC"));
    }
}
