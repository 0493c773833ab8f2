//! Main AskDb struct and public API.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::info;

use crate::correction::{ChatResponse, CorrectionLoop, DEFAULT_MAX_ATTEMPTS};
use crate::db::{
    DatabaseConfig, DdlRequest, Execution, PostgresDatabase, SchemaIntrospector, SqlExecutor,
    seed_sample_schema,
};
use crate::error::{AskDbError, Result};
use crate::llm::{LlmConfig, OllamaProvider, SqlGenerator};
use crate::schema::{SchemaSnapshot, render_context};

/// Configuration for an [`AskDb`] instance.
#[derive(Debug, Clone)]
pub struct AskDbConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Generation backend settings.
    pub llm: LlmConfig,
    /// Maximum executions per question.
    pub max_attempts: usize,
}

impl Default for AskDbConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            llm: LlmConfig::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl AskDbConfig {
    /// Read every setting from the environment (`DB_*`, `OLLAMA_HOST`,
    /// `ASKDB_MODEL`, `ASKDB_MAX_ATTEMPTS`).
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            llm: LlmConfig::from_env(),
            max_attempts: std::env::var("ASKDB_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
        }
    }

    /// Check settings that would otherwise fail late.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(AskDbError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(AskDbError::Config("model must not be empty".to_string()));
        }
        if self.database.schema.trim().is_empty() {
            return Err(AskDbError::Config("schema must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Natural-language question answering over a live database.
///
/// Holds no per-question state, so one instance can serve concurrent
/// questions from several threads.
pub struct AskDb {
    introspector: Arc<dyn SchemaIntrospector>,
    executor: Arc<dyn SqlExecutor>,
    generator: Arc<dyn SqlGenerator>,
    max_attempts: usize,
}

impl AskDb {
    /// Create an instance over a database and a generator.
    pub fn new<D, G>(database: D, generator: G) -> Self
    where
        D: SchemaIntrospector + SqlExecutor + 'static,
        G: SqlGenerator + 'static,
    {
        let database = Arc::new(database);
        Self {
            introspector: database.clone(),
            executor: database,
            generator: Arc::new(generator),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Create an instance backed by PostgreSQL and Ollama.
    pub fn from_config(config: &AskDbConfig) -> Result<Self> {
        config.validate()?;

        let database = PostgresDatabase::new(config.database.clone());
        let generator = OllamaProvider::with_config(config.llm.clone())?;

        info!(
            host = %config.database.host,
            dbname = %config.database.dbname,
            model = %config.llm.model,
            "askdb configured"
        );

        Ok(Self::new(database, generator).with_max_attempts(config.max_attempts))
    }

    /// Bound the number of executions per question. Values below 1 are
    /// treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// The generator in use.
    pub fn generator(&self) -> &dyn SqlGenerator {
        self.generator.as_ref()
    }

    /// Answer a question with SQL run against the live database.
    pub fn ask(&self, message: &str) -> Result<ChatResponse> {
        info!(question = %message, "answering question");
        let result = self.correction_loop().run(message)?;
        Ok(result.into())
    }

    /// Like [`ask`](Self::ask), but stops with [`AskDbError::Cancelled`] at
    /// the next step once `cancel` is set.
    pub fn ask_with_cancel(&self, message: &str, cancel: &AtomicBool) -> Result<ChatResponse> {
        info!(question = %message, "answering question");
        let result = self.correction_loop().run_with_cancel(message, cancel)?;
        Ok(result.into())
    }

    /// Read the current schema.
    pub fn schema(&self) -> Result<SchemaSnapshot> {
        self.introspector.snapshot()
    }

    /// Read the current schema and render it as prompt context.
    pub fn schema_context(&self) -> Result<String> {
        Ok(render_context(&self.schema()?))
    }

    /// Execute SQL directly, bypassing generation.
    pub fn execute(&self, sql: &str) -> Result<Execution> {
        self.executor.execute(sql)
    }

    /// Apply a structured schema edit, returning the SQL that ran.
    pub fn apply_ddl(&self, request: &DdlRequest) -> Result<String> {
        request.apply(self.executor.as_ref())
    }

    /// Create the sample `users` table if it is missing.
    pub fn seed(&self) -> Result<()> {
        match seed_sample_schema(self.executor.as_ref())? {
            Execution::Failed { error } => Err(AskDbError::Execution(error)),
            _ => Ok(()),
        }
    }

    fn correction_loop(&self) -> CorrectionLoop<'_> {
        CorrectionLoop::new(
            self.introspector.as_ref(),
            self.executor.as_ref(),
            self.generator.as_ref(),
        )
        .with_max_attempts(self.max_attempts)
    }
}
