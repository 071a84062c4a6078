//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `prefstore_core` linkage.
//! - Report store health: core version, schema version and row count.
//!
//! Usage: `prefstore_cli [DB_PATH] [LOG_DIR]`. Without a path an in-memory
//! store is used. Logs go to `LOG_DIR`, or `prefstore-logs` under the system
//! temp directory.

use log::{error, info};
use prefstore_core::db::migrations::current_version;
use prefstore_core::{
    core_version, default_log_level, init_logging, open_db, open_db_in_memory,
    PreferenceRepository, SqlitePreferenceRepository,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_LOG_DIR_NAME: &str = "prefstore-logs";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let db_path = args.next();
    let log_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));

    match run(db_path, log_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("prefstore_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>, log_dir: PathBuf) -> Result<(), Box<dyn Error>> {
    let log_dir = log_dir
        .to_str()
        .ok_or("log directory is not valid UTF-8")?;
    init_logging(default_log_level(), log_dir)?;

    let conn = match db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    let schema_version = current_version(&conn)?;
    let rows = SqlitePreferenceRepository::new(&conn).count_preferences()?;
    info!(
        "event=cli_probe module=cli status=ok schema_version={} preferences={}",
        schema_version, rows
    );

    println!("prefstore_core version={}", core_version());
    println!(
        "prefstore_core store={}",
        db_path.as_deref().unwrap_or(":memory:")
    );
    println!("prefstore_core schema_version={schema_version}");
    println!("prefstore_core preferences={rows}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use prefstore_core::logging_status;

    #[test]
    fn run_initializes_logging_and_reports_in_memory_store() {
        let log_dir = tempfile::tempdir().expect("temp dir");

        run(None, log_dir.path().to_path_buf()).expect("probe should succeed");

        let (level, active_dir) = logging_status().expect("logging should be active");
        assert_eq!(level, prefstore_core::default_log_level());
        assert_eq!(active_dir, log_dir.path());
    }
}
