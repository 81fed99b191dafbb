//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `perflab_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use perflab_core::db::migrations::latest_version;
use perflab_core::db::open_db_in_memory;
use perflab_core::{default_log_level, init_logging};

fn main() {
    let log_dir = std::env::temp_dir().join("perflab-cli-logs");
    if let Some(dir) = log_dir.to_str() {
        if let Err(err) = init_logging(default_log_level(), dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("perflab_core version={}", perflab_core::core_version());
    match open_db_in_memory() {
        Ok(_) => println!("perflab_core schema_version={}", latest_version()),
        Err(err) => {
            eprintln!("perflab_core bootstrap failed: {err}");
            std::process::exit(1);
        }
    }
}
