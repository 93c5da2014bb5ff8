// src/bin/genz_model.rs
//
// Usage: genz_model <package-dir> [--tests] <TypeName>...
//
// Prints the extracted elements as a JSON array on stdout. Logs go to stderr,
// filtered by `GENZ_LOG` (default `genz_model=info`).
use std::process::ExitCode;
use std::sync::Once;

use genz_model::{build_elements, LoadConfig, Loader};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("GENZ_LOG").unwrap_or_else(|_| EnvFilter::new("genz_model=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn main() -> ExitCode {
    init_tracing();

    let mut config = LoadConfig::default();
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--tests" {
            config = config.with_tests(true);
        } else {
            positional.push(arg);
        }
    }

    let Some((dir, names)) = positional.split_first() else {
        eprintln!("usage: genz_model <package-dir> [--tests] <TypeName>...");
        return ExitCode::from(2);
    };
    if names.is_empty() {
        eprintln!("usage: genz_model <package-dir> [--tests] <TypeName>...");
        return ExitCode::from(2);
    }

    let pkg = match Loader::new(config).load_dir(dir) {
        Ok(pkg) => pkg,
        Err(err) => {
            error!(%err, "failed to load package");
            return ExitCode::FAILURE;
        }
    };

    let mut elements = Vec::with_capacity(names.len());
    let mut failed = false;
    for (name, result) in names.iter().zip(build_elements(&pkg, names)) {
        match result {
            Ok(element) => elements.push(element),
            Err(err) => {
                error!(name = %name, %err, "extraction failed");
                failed = true;
            }
        }
    }
    if failed {
        return ExitCode::FAILURE;
    }

    match serde_json::to_string_pretty(&elements) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "failed to serialize elements");
            ExitCode::FAILURE
        }
    }
}
