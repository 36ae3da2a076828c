// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Compile a JSON syntax tree and print the compilation as JSON
//!
//! ```text
//! nested-sql-explain <statement.json> [catalog.yaml|catalog.json] [--allow-undefined] [--strict]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use nested_sql_catalog::StaticCatalog;
use nested_sql_compiler::{CompileError, Compiler, CompilerConfig};
use nested_sql_ir::ast;

#[derive(Debug, Parser)]
#[command(name = "nested-sql-explain", version)]
#[command(about = "Compile a JSON syntax tree and print the compilation as JSON", long_about = None)]
struct Args {
    /// Syntax tree of the statement, as JSON.
    statement: PathBuf,

    /// Catalog of global names (`.yaml`, `.yml` or `.json`).
    ///
    /// Without one every global lookup fails.
    catalog: Option<PathBuf>,

    /// Defer unresolved variables to runtime instead of reporting them.
    #[arg(long, env = "NESTED_SQL_ALLOW_UNDEFINED")]
    allow_undefined: bool,

    /// Fail when compilation reports any problem.
    #[arg(long, env = "NESTED_SQL_STRICT")]
    strict: bool,
}

fn run(args: Args) -> Result<bool> {
    let config = CompilerConfig::new()
        .allow_undefined_variables(args.allow_undefined)
        .strict(args.strict);

    let source = std::fs::read_to_string(&args.statement)
        .with_context(|| format!("reading {}", args.statement.display()))?;
    let statement: ast::Statement = serde_json::from_str(&source)
        .with_context(|| format!("parsing syntax tree in {}", args.statement.display()))?;

    let catalog = match &args.catalog {
        Some(path) => StaticCatalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => StaticCatalog::new(),
    };
    tracing::info!(entries = catalog.len(), "Loaded catalog");

    let compiler = Compiler::with_config(catalog, config)?;
    match compiler.run(&statement) {
        Ok(compilation) => {
            println!("{}", serde_json::to_string_pretty(&compilation)?);
            Ok(!compilation.has_problems())
        }
        Err(CompileError::Problems(problems)) => {
            for problem in &problems {
                eprintln!("{problem}");
            }
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_and_flags() {
        let args = Args::try_parse_from(["nested-sql-explain", "q.json", "--strict", "shop.yaml"])
            .unwrap();
        assert_eq!(args.statement, PathBuf::from("q.json"));
        assert_eq!(args.catalog, Some(PathBuf::from("shop.yaml")));
        assert!(args.strict);
        assert!(!args.allow_undefined);
    }

    #[test]
    fn test_parse_requires_statement() {
        let err = Args::try_parse_from(["nested-sql-explain", "--allow-undefined"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        let err = Args::try_parse_from(["nested-sql-explain", "q.json", "--verbose"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_parse_rejects_extra_positional() {
        let err = Args::try_parse_from(["nested-sql-explain", "q.json", "shop.yaml", "more.yaml"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_flags_read_compiler_environment() {
        let command = Args::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_os_string())
        };

        assert_eq!(
            env_of("allow_undefined"),
            Some(nested_sql_compiler::config::ENV_ALLOW_UNDEFINED.into())
        );
        assert_eq!(env_of("strict"), Some(nested_sql_compiler::config::ENV_STRICT.into()));
    }
}
