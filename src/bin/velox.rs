//! A thin script runner: `velox <file.vx>` scans, parses, and executes a
//! Velox script, installing the standard hook library and an importer
//! rooted at the script's own directory.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use velox::{Interpreter, VeloxConfig};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "velox".to_string());
    let Some(path) = args.next() else {
        eprintln!("usage: {program} <script.vx>");
        return ExitCode::FAILURE;
    };

    let search_paths = PathBuf::from(&path)
        .parent()
        .map(|dir| vec![dir.to_path_buf()])
        .unwrap_or_default();

    let config = VeloxConfig {
        import_search_paths: search_paths,
        ..VeloxConfig::default()
    };
    let mut interpreter = Interpreter::new(config);

    match interpreter.run_file(&PathBuf::from(&path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
