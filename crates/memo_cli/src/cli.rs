use clap::Parser;
use memo_core::CoreConfig;
use std::path::PathBuf;

/// Interactive session over a local memo store.
#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version, about)]
pub struct CliConfig {
    /// SQLite file holding the store (overrides `MEMO_DB_PATH`).
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides `MEMO_LOG_LEVEL`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Absolute directory for log files (overrides `MEMO_LOG_DIR`).
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Applies explicit flags on top of `base`.
    pub fn resolve(self, base: CoreConfig) -> CoreConfig {
        CoreConfig {
            db_path: self.db.unwrap_or(base.db_path),
            log_level: self.log_level.unwrap_or(base.log_level),
            log_dir: self.log_dir.or(base.log_dir),
        }
    }
}
