//! Arend CLI.

use std::io::IsTerminal;
use std::path::PathBuf;

use arendc::commands::{check_modules, dependency_order, load_into, load_sources, SourceModule};
use arendc::{ArendServer, ServerContext, ServerError};
use arend_ir::ModulePath;
use arend_typeck::CancellationToken;

fn main() {
    arendc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    let paths: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();
    let result = match command {
        "check" | "order" if paths.is_empty() => {
            eprintln!("Usage: arend {command} <file.ard|dir>...");
            std::process::exit(1);
        }
        "check" => check(&paths),
        "order" => order(&paths),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(true)
        }
        _ => {
            eprintln!("unknown command: {command}");
            print_usage();
            std::process::exit(1);
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(2);
        }
    }
}

fn targets(sources: &[SourceModule]) -> Vec<ModulePath> {
    sources.iter().map(|source| source.module.clone()).collect()
}

fn check(paths: &[PathBuf]) -> Result<bool, ServerError> {
    let sources = load_sources(paths)?;
    let server = ArendServer::new(ServerContext::new());
    let renderer = load_into(&server, &sources).with_color(std::io::stderr().is_terminal());
    let outcome = check_modules(&server, &targets(&sources), &CancellationToken::new())?;

    let mut stderr = std::io::stderr().lock();
    renderer
        .render_all(&outcome.diagnostics, &mut stderr)
        .map_err(|source| ServerError::Io {
            path: "<stderr>".to_string(),
            source,
        })?;

    let errors = outcome.error_count();
    if errors == 0 {
        println!(
            "OK: {} modules, {} definitions checked",
            sources.len(),
            outcome.summary.checked
        );
    } else {
        eprintln!("{errors} errors in {} modules", sources.len());
    }
    Ok(outcome.is_ok())
}

fn order(paths: &[PathBuf]) -> Result<bool, ServerError> {
    let sources = load_sources(paths)?;
    let server = ArendServer::new(ServerContext::new());
    load_into(&server, &sources);
    for component in dependency_order(&server, &targets(&sources))? {
        println!("{component}");
    }
    Ok(true)
}

fn print_usage() {
    println!("Arend incremental typechecker");
    println!();
    println!("Usage: arend <command> <file.ard|dir>...");
    println!();
    println!("Commands:");
    println!("  check    Parse, resolve and typecheck modules");
    println!("  order    Print definitions in the order they are checked");
    println!("  help     Show this message");
    println!();
    println!("Logging: set AREND_LOG (or RUST_LOG), e.g. AREND_LOG=arend_typeck=debug");
}
