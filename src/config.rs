use anyhow::{Context, Result, bail};
use std::env;
use std::fmt;

/// Port the service listens on unless `SERVICE_PORT` overrides it.
pub const DEFAULT_PORT: u16 = 5000;

/// Fully qualified Spanner database path:
/// `projects/{project}/instances/{instance}/databases/{database}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePath {
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl DatabasePath {
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        match parts.as_slice() {
            ["projects", project, "instances", instance, "databases", database]
                if !project.is_empty() && !instance.is_empty() && !database.is_empty() =>
            {
                Ok(Self {
                    project: project.to_string(),
                    instance: instance.to_string(),
                    database: database.to_string(),
                })
            }
            _ => bail!(
                "expected 'projects/{{project}}/instances/{{instance}}/databases/{{database}}', got '{}'",
                s
            ),
        }
    }

    pub fn project_path(&self) -> String {
        format!("projects/{}", self.project)
    }

    pub fn instance_path(&self) -> String {
        format!("{}/instances/{}", self.project_path(), self.instance)
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/databases/{}", self.instance_path(), self.database)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub spanner_emulator_host: Option<String>,
    pub database: DatabasePath,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let spanner_emulator_host = var("SPANNER_EMULATOR_HOST");

        let database = var("SPANNER_DATABASE")
            .context("SPANNER_DATABASE environment variable is required")?;
        let database = DatabasePath::parse(&database)
            .context("SPANNER_DATABASE is not a valid Spanner database path")?;

        let service_port = match var("SERVICE_PORT") {
            Some(port) => port
                .parse::<u16>()
                .context("SERVICE_PORT must be a valid port number (0-65535)")?,
            None => DEFAULT_PORT,
        };

        let service_host = var("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Config {
            spanner_emulator_host,
            database,
            service_port,
            service_host,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  Spanner emulator: {}",
            self.spanner_emulator_host
                .as_deref()
                .unwrap_or("disabled (using production)")
        );
        tracing::info!("  Spanner database: {}", self.database);
        tracing::info!("  Service listening on: {}", self.bind_addr());
    }
}
