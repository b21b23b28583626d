use crate::server::config::AppConfig;
use crate::server::{build_assistant, load_config, resolve_key, AMAP_KEY_VAR, LLM_KEY_VAR};
use secrecy::SecretString;
use std::path::Path;
use wayfarer_core::HealthStatus;

/// Whether `.env` content assigns a non-placeholder value to `key_name`
fn has_valid_key(content: &str, key_name: &str) -> bool {
    let prefix = format!("{}=", key_name);
    content
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with(&prefix))
        .map(|l| l[prefix.len()..].trim().trim_matches('"'))
        .map(|v| !v.is_empty() && !v.contains("your"))
        .unwrap_or(false)
}

pub async fn run() -> anyhow::Result<()> {
    println!("🏥 Wayfarer Doctor\n");

    let mut all_ok = true;

    check_env_file();
    let config = check_config();
    all_ok &= config.is_some();

    if let Some(config) = &config {
        all_ok &= check_key("Gemini API key", config.llm.api_key.as_ref(), LLM_KEY_VAR);
        all_ok &= check_key("Amap MCP key", config.amap.api_key.as_ref(), AMAP_KEY_VAR);

        if all_ok {
            all_ok &= check_connectivity(config).await;
        }
    }

    println!();
    if all_ok {
        println!("✅ All checks passed! Ready to run Wayfarer.");
        Ok(())
    } else {
        println!("⚠️  Some checks failed. Please fix the issues above.");
        anyhow::bail!("doctor found problems")
    }
}

fn check_env_file() {
    print!("Checking .env file... ");

    if Path::new(".env").exists() {
        println!("✅ Found");

        let content = std::fs::read_to_string(".env").unwrap_or_default();
        for key in [LLM_KEY_VAR, AMAP_KEY_VAR] {
            if has_valid_key(&content, key) {
                println!("  ✅ {} set", key);
            } else {
                println!("  ℹ️  {} not in .env (environment or config may provide it)", key);
            }
        }
    } else {
        println!("ℹ️  Not found (keys must come from the environment or config files)");
    }
}

fn check_config() -> Option<AppConfig> {
    print!("Loading configuration... ");

    match load_config() {
        Ok(config) => {
            println!(
                "✅ {}:{} (model {}, max {} tool calls)",
                config.server.host,
                config.server.port,
                config.llm.model,
                config.orchestrator.max_iterations
            );
            Some(config)
        }
        Err(e) => {
            println!("❌ {:#}", e);
            None
        }
    }
}

fn check_key(label: &str, configured: Option<&SecretString>, var: &str) -> bool {
    print!("Checking {}... ", label);

    match resolve_key(configured, std::env::var(var).ok(), var) {
        Ok(_) => {
            println!("✅ Configured");
            true
        }
        Err(e) => {
            println!("❌ {}", e);
            false
        }
    }
}

async fn check_connectivity(config: &AppConfig) -> bool {
    print!("Probing Gemini and Amap MCP... ");

    let assistant = match build_assistant(config) {
        Ok(assistant) => assistant,
        Err(e) => {
            println!("❌ {:#}", e);
            return false;
        }
    };

    let report = assistant.health().await;
    match report.status {
        HealthStatus::Healthy => println!("✅ Healthy"),
        HealthStatus::Degraded => println!("⚠️  Degraded"),
        HealthStatus::Unhealthy => println!("❌ Unhealthy"),
    }

    for (name, component) in &report.components {
        match &component.error {
            None => println!("  ✅ {} ({}, {}ms)", name, component.provider, component.latency_ms),
            Some(error) => println!("  ❌ {} ({}): {}", name, component.provider, error),
        }
    }

    report.status != HealthStatus::Unhealthy
}
