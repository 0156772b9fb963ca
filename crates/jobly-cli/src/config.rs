use crate::cli::DbArgs;
use jobly::pool::DEFAULT_POOL_SIZE;
use serde::Deserialize;
use std::path::Path;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to load config file {}: {e}",
                config_path.display()
            )
        })?;

        Ok(Self { file })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub version: String,

    pub database: DatabaseConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ConfigFile {
    /// Parse, expand `${VAR}` references and validate.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.database.url = expand_env_vars(&self.database.url)?;
        self.log.level = expand_env_vars(&self.log.level)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }

        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.pool_size == 0 {
            anyhow::bail!("database.pool_size must be at least 1");
        }

        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            anyhow::bail!(
                "unsupported log.level: {} (expected one of {})",
                self.log.level,
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }
}

/// Connection and logging settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub pool_size: usize,
    pub log_level: String,
}

impl Settings {
    /// Merge the config file (if present), `--database` and `DATABASE_URL`.
    ///
    /// `.env` is loaded first so its variables are visible to `${VAR}`
    /// expansion.
    pub fn resolve(args: &DbArgs) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        if args.config.exists() {
            let project = ProjectConfig::load(&args.config)?;
            let ConfigFile { database, log, .. } = project.file;
            return Ok(Self {
                database_url: args.database.clone().unwrap_or(database.url),
                pool_size: database.pool_size,
                log_level: log.level,
            });
        }

        let Some(database_url) = args
            .database
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
        else {
            anyhow::bail!(
                "failed to load config {}; provide --database, set DATABASE_URL, or run `jobly init` first",
                args.config.display()
            );
        };

        Ok(Self {
            database_url,
            pool_size: DEFAULT_POOL_SIZE,
            log_level: default_log_level(),
        })
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
