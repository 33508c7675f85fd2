use aml_codegen::{CompileOptions, Diagnostic};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "aml")]
#[command(about = "AML academic markup language compiler")]
#[command(version)]
struct Cli {
    /// Log compiler passes (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile an .aml file to a standalone HTML document
    Build {
        /// Input .aml file
        path: String,

        /// Directory for the generated file (defaults to the input's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// TOML file with document options
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Report diagnostics for an .aml file without writing output
    Check {
        /// Input .aml file
        path: String,
    },

    /// Print highlight spans, one per line: kind, start, end, depth
    Highlight {
        /// Input .aml file
        path: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("reading {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("writing {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: String,
        source: toml::de::Error,
    },

    #[error("{path}: {count} error(s)")]
    Diagnostics { path: String, count: usize },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Command::Build {
            path,
            out_dir,
            config,
        } => cmd_build(&path, out_dir.as_deref(), config.as_deref()),
        Command::Check { path } => cmd_check(&path),
        Command::Highlight { path } => cmd_highlight(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn read_source(path: &str) -> Result<String, CliError> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(CliError::NotFound(path.to_string()));
    }
    std::fs::read_to_string(p).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })
}

fn read_options(config: Option<&Path>) -> Result<CompileOptions, CliError> {
    let Some(config) = config else {
        return Ok(CompileOptions::default());
    };
    let path = config.display().to_string();
    let text = read_source(&path)?;
    toml::from_str(&text).map_err(|source| CliError::Config { path, source })
}

fn report(path: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let span = diagnostic.span();
        eprintln!(
            "{path}:{}:{}: {}[{}]: {diagnostic}",
            span.line,
            span.column,
            diagnostic.severity(),
            diagnostic.code()
        );
    }
}

fn cmd_build(path: &str, out_dir: Option<&Path>, config: Option<&Path>) -> Result<(), CliError> {
    let source = read_source(path)?;
    let options = read_options(config)?;

    let compilation = aml_codegen::compile_with(&source, &options);
    report(path, &compilation.diagnostics);

    // Write output next to the source unless told otherwise
    let input = Path::new(path);
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    let dir = match out_dir {
        Some(dir) => dir,
        None => input.parent().unwrap_or(Path::new(".")),
    };
    let html_path = dir.join(format!("{stem}.html"));

    std::fs::create_dir_all(dir).map_err(|source| CliError::Write {
        path: dir.display().to_string(),
        source,
    })?;
    std::fs::write(&html_path, &compilation.document).map_err(|source| CliError::Write {
        path: html_path.display().to_string(),
        source,
    })?;

    eprintln!("Built: {}", html_path.display());
    Ok(())
}

fn cmd_check(path: &str) -> Result<(), CliError> {
    let source = read_source(path)?;

    let compilation = aml_codegen::compile(&source);
    report(path, &compilation.diagnostics);

    let count = compilation
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.is_error())
        .count();
    if count > 0 {
        return Err(CliError::Diagnostics {
            path: path.to_string(),
            count,
        });
    }

    eprintln!("OK: {path}");
    Ok(())
}

fn cmd_highlight(path: &str) -> Result<(), CliError> {
    let source = read_source(path)?;

    for span in aml_codegen::highlight(&source) {
        let range = span.span();
        println!("{} {} {} {}", span.kind(), range.start, range.end, span.depth());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aml-cli-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_build_creates_missing_out_dir() {
        let dir = scratch_dir("out-dir");
        let input = dir.join("notes.aml");
        std::fs::write(&input, "\\h1{Notes}").unwrap();
        let out_dir = dir.join("site").join("pages");

        cmd_build(input.to_str().unwrap(), Some(out_dir.as_path()), None).unwrap();

        let html = std::fs::read_to_string(out_dir.join("notes.html")).unwrap();
        assert!(html.contains("<h1 id=\"UID"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_check_fails_on_errors() {
        let dir = scratch_dir("check");
        let input = dir.join("bad.aml");
        std::fs::write(&input, "\\nope{x}").unwrap();

        let result = cmd_check(input.to_str().unwrap());
        assert!(matches!(result, Err(CliError::Diagnostics { count: 1, .. })));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
