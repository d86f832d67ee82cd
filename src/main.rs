//! `sophia-lex`: dumps the token stream of a Sophia source file.

use std::{
    fs::read_to_string,
    io::{self, BufWriter, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sophia_lexer::{
    errors::errors::Error as LexError, render_error, Lexer, LexerOptions, Token, SOPHIA_INFO,
};

#[derive(Parser, Debug)]
#[command(name = "sophia-lex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tokenize Sophia smart-contract source", long_about = None)]
struct Cli {
    /// Source file to tokenize; reads stdin when omitted
    file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Raw)]
    format: Format,

    /// Exit with an error and point at the first unmatched character
    #[arg(long)]
    strict: bool,

    /// Tokenize files that do not look like Sophia sources
    #[arg(long)]
    force: bool,

    /// Keep leading and trailing newlines
    #[arg(long)]
    no_stripnl: bool,

    /// Strip all leading and trailing whitespace
    #[arg(long)]
    stripall: bool,

    /// Do not append a final newline
    #[arg(long)]
    no_ensurenl: bool,

    /// Expand tabs to this width
    #[arg(long)]
    tabsize: Option<usize>,

    /// Generic lexer option, e.g. `-O stripnl=false`
    #[arg(short = 'O', value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// One `Kind<TAB>"text"` line per token
    Raw,
    /// A JSON array of `{kind, value, start, end}` objects
    Json,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(
        "{path}: not a Sophia source (expected one of {globs}), pass --force to tokenize anyway",
        path = .0.display(),
        globs = SOPHIA_INFO.filenames.join(", ")
    )]
    UnsupportedFile(PathBuf),

    #[error("malformed option {0:?}, expected KEY=VALUE")]
    MalformedOption(String),

    #[error("{0}")]
    Lexer(#[from] LexError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let subscriber = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    // a subscriber may already be installed by an embedding process
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init();
}

fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let source = match &cli.file {
        Some(path) => {
            if !cli.force && !SOPHIA_INFO.matches_filename(path) {
                return Err(CliError::UnsupportedFile(path.clone()));
            }
            read_to_string(path)?
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let options = build_options(cli)?;
    debug!(?options, bytes = source.len(), "tokenizing");

    let lexer = Lexer::sophia().with_options(options);
    let text = lexer.options().preprocess(&source);
    let tokens: Vec<Token> = lexer.tokens_unprocessed(&text).collect();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.format {
        Format::Raw => {
            for token in &tokens {
                writeln!(out, "{}", token.raw())?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &tokens)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if cli.strict {
        let file_name = cli
            .file
            .as_ref()
            .map(|path| path.display().to_string());

        if let Err(err) = lexer.check(&text, file_name) {
            eprint!("{}", render_error(&err, &text));
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// `-O` pairs first, then the dedicated flags on top.
fn build_options(cli: &Cli) -> Result<LexerOptions, CliError> {
    let pairs = cli
        .options
        .iter()
        .map(|option| {
            option
                .split_once('=')
                .ok_or_else(|| CliError::MalformedOption(option.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut options = LexerOptions::from_pairs(pairs)?;

    if cli.no_stripnl {
        options.stripnl = false;
    }
    if cli.stripall {
        options.stripall = true;
    }
    if cli.no_ensurenl {
        options.ensurenl = false;
    }
    if let Some(tabsize) = cli.tabsize {
        options.tabsize = tabsize;
    }

    Ok(options)
}
