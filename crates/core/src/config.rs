use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f32(profile: &str, key: &str, default: f32) -> f32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

/// Settings for all three services. Each binary reads the section it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub llm: LlmConfig,
    pub mcp: McpConfig,
    pub api: ApiConfig,
    pub postgres: PostgresConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DESCONTOS_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DESCONTOS_PROFILE", "");
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            llm: LlmConfig::from_env_profiled(p),
            mcp: McpConfig::from_env_profiled(p),
            api: ApiConfig::from_env_profiled(p),
            postgres: PostgresConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  llm:       model={}, base_url={}, key={}",
            self.llm.openai_model,
            self.llm.openai_base_url,
            if self.llm.is_configured() { "set" } else { "(none)" }
        );
        tracing::info!("  mcp:       url={}, listen={}", self.mcp.url, self.mcp.bind_addr());
        tracing::info!("  api:       base_url={}, listen={}", self.mcp.api_base_url, self.api.bind_addr());
        tracing::info!(
            "  postgres:  host={}:{}, db={}, user={}",
            self.postgres.host, self.postgres.port, self.postgres.database, self.postgres.username
        );
    }
}

// ── LLM (OpenAI-compatible) ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: profiled_env_or(p, "OPENAI_BASE_URL", "https://api.openai.com"),
            temperature: profiled_env_f32(p, "LLM_TEMPERATURE", 0.1),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 2000),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

// ── MCP adapter ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Endpoint the chat client connects to.
    pub url: String,
    pub host: String,
    pub port: u16,
    /// Backing API the adapter's tools call.
    pub api_base_url: String,
}

impl McpConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "MCP_URL", "http://localhost:8080/mcp"),
            host: profiled_env_or(p, "MCP_HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "MCP_PORT", 8080),
            api_base_url: profiled_env_or(p, "API_BASE_URL", "http://localhost:8000"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Mock API ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "API_HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "API_PORT", 8000),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── PostgreSQL ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl PostgresConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "DB_HOST", "localhost"),
            port: profiled_env_u16(p, "DB_PORT", 5432),
            database: profiled_env_or(p, "DB_NAME", "database"),
            username: profiled_env_or(p, "DB_USER", "user"),
            password: profiled_env_or(p, "DB_PASSWORD", "userpassword"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiled_key_wins_over_plain_key() {
        env::set_var("CFGTEST_DESCONTOS_SAMPLE", "profiled");
        env::set_var("DESCONTOS_SAMPLE", "plain");

        assert_eq!(profiled_env_or("CFGTEST", "DESCONTOS_SAMPLE", "x"), "profiled");
        assert_eq!(profiled_env_or("", "DESCONTOS_SAMPLE", "x"), "plain");
        assert_eq!(profiled_env_or("OTHER", "DESCONTOS_SAMPLE", "x"), "plain");
    }

    #[test]
    fn test_empty_value_falls_back_to_default() {
        env::set_var("CFGTEST_EMPTY_VALUE", "");
        assert_eq!(profiled_env_or("CFGTEST", "EMPTY_VALUE", "fallback"), "fallback");
    }

    #[test]
    fn test_unparseable_number_uses_default() {
        env::set_var("CFGNUM_SOME_PORT", "not-a-port");
        assert_eq!(profiled_env_u16("CFGNUM", "SOME_PORT", 5432), 5432);
    }

    #[test]
    fn test_postgres_profile_override() {
        env::set_var("PGPROFILE_DB_HOST", "db.internal");
        env::set_var("PGPROFILE_DB_PORT", "6543");

        let config = Config::for_profile("pgprofile");
        assert_eq!(config.profile, "PGPROFILE");
        assert_eq!(config.profile_label(), "PGPROFILE");
        assert_eq!(config.postgres.host, "db.internal");
        assert_eq!(config.postgres.port, 6543);
    }

    #[test]
    fn test_bind_addrs() {
        env::set_var("BINDTEST_MCP_HOST", "127.0.0.1");
        env::set_var("BINDTEST_MCP_PORT", "9090");
        env::set_var("BINDTEST_API_PORT", "18000");

        let config = Config::for_profile("bindtest");
        assert_eq!(config.mcp.bind_addr(), "127.0.0.1:9090");
        assert!(config.api.bind_addr().ends_with(":18000"));
    }

    #[test]
    fn test_defaults_for_unset_keys() {
        // Only keys absent from the environment can be checked against their fallback.
        let unset = |key: &str| env::var(key).map(|v| v.is_empty()).unwrap_or(true);
        let config = Config::for_profile("defaultstest");

        if unset("DB_HOST") {
            assert_eq!(config.postgres.host, "localhost");
        }
        if unset("DB_NAME") {
            assert_eq!(config.postgres.database, "database");
        }
        if unset("DB_USER") {
            assert_eq!(config.postgres.username, "user");
        }
        if unset("DB_PASSWORD") {
            assert_eq!(config.postgres.password, "userpassword");
        }
        if unset("DB_PORT") {
            assert_eq!(config.postgres.port, 5432);
        }
        if unset("MCP_URL") {
            assert_eq!(config.mcp.url, "http://localhost:8080/mcp");
        }
        if unset("MCP_HOST") && unset("MCP_PORT") {
            assert_eq!(config.mcp.bind_addr(), "0.0.0.0:8080");
        }
        if unset("API_BASE_URL") {
            assert_eq!(config.mcp.api_base_url, "http://localhost:8000");
        }
        if unset("API_HOST") && unset("API_PORT") {
            assert_eq!(config.api.bind_addr(), "0.0.0.0:8000");
        }
        if unset("OPENAI_MODEL") {
            assert_eq!(config.llm.openai_model, "gpt-4o-mini");
        }
        if unset("OPENAI_BASE_URL") {
            assert_eq!(config.llm.openai_base_url, "https://api.openai.com");
        }
        if unset("LLM_TEMPERATURE") {
            assert!((config.llm.temperature - 0.1).abs() < f32::EPSILON);
        }
        if unset("LLM_MAX_TOKENS") {
            assert_eq!(config.llm.max_tokens, 2000);
        }
    }

    #[test]
    fn test_llm_configured_only_with_key() {
        env::set_var("LLMTEST_OPENAI_API_KEY", "sk-test");
        env::set_var("LLMTEST_LLM_TEMPERATURE", "0.5");

        let llm = LlmConfig::from_env_profiled("LLMTEST");
        assert!(llm.is_configured());
        assert_eq!(llm.openai_api_key.as_deref(), Some("sk-test"));
        assert!((llm.temperature - 0.5).abs() < f32::EPSILON);
    }
}
