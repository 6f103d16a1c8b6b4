//! Doctor command - verify configuration and secrets.

use crate::cli::Output;
use crate::config::{require_env, Settings, VectorStoreProvider};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("ragrelay doctor");
    println!();

    let mut checks = Vec::new();

    println!("{}", style("Providers").bold());
    let provider_checks = check_providers(settings);
    for check in &provider_checks {
        check.print();
    }
    checks.extend(provider_checks);

    println!();

    println!("{}", style("Secrets").bold());
    let secret_checks = check_secrets(settings);
    for check in &secret_checks {
        check.print();
    }
    checks.extend(secret_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. The relay will not start until they are fixed.",
            errors
        ));
    } else if warnings > 0 {
        Output::warning(&format!("{} warning(s). The relay should still start.", warnings));
    } else {
        Output::success("All checks passed!");
    }

    Ok(())
}

fn check_providers(settings: &Settings) -> Vec<CheckResult> {
    let mut checks = vec![
        CheckResult::ok(
            "Generation",
            &format!("{} via {}", settings.generation.model, settings.generation.api_base),
        ),
        CheckResult::ok(
            "Embedding",
            &format!("{} ({})", settings.embedding.model, settings.embedding.provider),
        ),
    ];

    let store = &settings.vector_store;
    checks.push(match store.provider {
        VectorStoreProvider::Pinecone => CheckResult::ok(
            "Vector index",
            &format!(
                "pinecone index '{}' namespace '{}' (top {})",
                store.index_name, store.namespace, store.top_k
            ),
        ),
        VectorStoreProvider::Memory => match settings.documents_path() {
            Some(path) if path.exists() => CheckResult::ok(
                "Vector index",
                &format!("memory, loaded from {}", path.display()),
            ),
            Some(path) => CheckResult::error(
                "Vector index",
                &format!("documents file {} not found", path.display()),
                "Fix vector_store.documents_path",
            ),
            None => CheckResult::warning(
                "Vector index",
                "memory index with no documents",
                "Set vector_store.documents_path to a JSON file of records",
            ),
        },
    });

    checks
}

fn check_secrets(settings: &Settings) -> Vec<CheckResult> {
    settings
        .required_secrets()
        .into_iter()
        .map(|name| match require_env(name) {
            Ok(_) => CheckResult::ok(name, "set"),
            Err(e) => CheckResult::error(
                name,
                &e.to_string(),
                &format!("export {}='...' or add it to .env", name),
            ),
        })
        .collect()
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();

    if config_path.exists() {
        match Settings::load_from(Some(&config_path)) {
            Ok(_) => CheckResult::ok("Config file", &format!("Valid ({})", config_path.display())),
            Err(e) => CheckResult::error(
                "Config file",
                &format!("Invalid: {}", e),
                &format!("Fix or delete {}", config_path.display()),
            ),
        }
    } else {
        CheckResult::ok("Config file", "Using defaults (no config file)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_index_without_documents_warns() {
        let mut settings = Settings::default();
        settings.vector_store.provider = VectorStoreProvider::Memory;

        let checks = check_providers(&settings);
        let index = checks.iter().find(|c| c.name == "Vector index").unwrap();
        assert_eq!(index.status, CheckStatus::Warning);
    }

    #[test]
    fn test_missing_documents_file_is_error() {
        let mut settings = Settings::default();
        settings.vector_store.provider = VectorStoreProvider::Memory;
        settings.vector_store.documents_path = Some("/nonexistent/ragrelay/docs.json".to_string());

        let checks = check_providers(&settings);
        let index = checks.iter().find(|c| c.name == "Vector index").unwrap();
        assert_eq!(index.status, CheckStatus::Error);
    }

    #[test]
    fn test_unset_secret_is_error() {
        let mut settings = Settings::default();
        settings.generation.api_key_env = "RAGRELAY_DOCTOR_UNSET".to_string();

        let checks = check_secrets(&settings);
        let generation = checks.iter().find(|c| c.name == "RAGRELAY_DOCTOR_UNSET").unwrap();
        assert_eq!(generation.status, CheckStatus::Error);
    }
}
