//! Database connection configuration.

use std::time::Duration;

/// Connection settings for the PostgreSQL database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL host.
    pub host: String,
    /// PostgreSQL port.
    pub port: u16,
    /// Database name.
    pub dbname: String,
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// Schema whose tables are introspected.
    pub schema: String,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Server-side limit for a single statement (None = no limit).
    pub statement_timeout: Option<Duration>,
    /// Whether introspection reads foreign key constraints.
    pub discover_foreign_keys: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "agentic_db".to_string(),
            user: "admin".to_string(),
            password: "password123".to_string(),
            schema: "public".to_string(),
            connect_timeout: Duration::from_secs(10),
            statement_timeout: Some(Duration::from_secs(30)),
            discover_foreign_keys: true,
        }
    }
}

impl DatabaseConfig {
    /// Create a configuration from `DB_*` environment variables, falling back
    /// to the defaults for anything unset or unparseable.
    ///
    /// `DB_STATEMENT_TIMEOUT_SECS=0` disables the statement timeout.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let statement_timeout = match std::env::var("DB_STATEMENT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.statement_timeout,
        };

        Self {
            host: std::env::var("DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: std::env::var("DB_NAME").unwrap_or(defaults.dbname),
            user: std::env::var("DB_USER").unwrap_or(defaults.user),
            password: std::env::var("DB_PASS").unwrap_or(defaults.password),
            schema: std::env::var("DB_SCHEMA").unwrap_or(defaults.schema),
            connect_timeout: defaults.connect_timeout,
            statement_timeout,
            discover_foreign_keys: defaults.discover_foreign_keys,
        }
    }

    /// Set the introspected schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Set the statement timeout.
    pub fn with_statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Enable or disable foreign key discovery.
    pub fn with_foreign_keys(mut self, discover: bool) -> Self {
        self.discover_foreign_keys = discover;
        self
    }

    /// Build the client configuration for a new connection.
    pub(crate) fn to_pg_config(&self) -> postgres::Config {
        let mut cfg = postgres::Config::new();
        cfg.host(&self.host)
            .port(self.port)
            .dbname(&self.dbname)
            .user(&self.user)
            .password(&self.password)
            .connect_timeout(self.connect_timeout)
            .application_name("askdb");

        if let Some(timeout) = self.statement_timeout {
            cfg.options(&format!("-c statement_timeout={}", timeout.as_millis()));
        }

        cfg
    }
}
