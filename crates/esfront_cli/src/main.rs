//! esfront: Command-line driver for the ECMAScript front end.
//!
//! Usage:
//!   esfront [options] <FILE>...
//!
//! Parses each file and reports syntax errors with source snippets. With
//! `--tokens` or `--ast` it also prints what the lexer and parser produced.

mod diagnostic;

use bumpalo::Bump;
use clap::Parser as ClapParser;
use diagnostic::ParseDiagnostic;
use esfront_ast::visitor::find_function;
use esfront_ast::{FunctionId, FunctionNode, TokenType};
use esfront_core::Source;
use esfront_diagnostics::{Diagnostic, ParseError};
use esfront_lexer::tokenize;
use esfront_parser::{parse_options_json, Parser, ParserOptions, ParserOptionsFile, ReparsedFunction};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "esfront", about = "esfront - ECMAScript lexer and parser")]
struct Cli {
    /// Source files to parse.
    #[arg(value_name = "FILE", required = true)]
    files: Vec<String>,

    /// Parse as strict mode code from the start.
    #[arg(long)]
    strict: bool,

    /// Enable shell-style syntax extensions.
    #[arg(long)]
    scripting: bool,

    /// Accept ECMAScript 6 syntax.
    #[arg(long)]
    es6: bool,

    /// Parse files as modules.
    #[arg(long)]
    module: bool,

    /// JSON options file; command-line flags win over it.
    #[arg(long, value_name = "JSON")]
    config: Option<String>,

    /// Print the token stream.
    #[arg(long)]
    tokens: bool,

    /// Print the syntax tree.
    #[arg(long)]
    ast: bool,

    /// Reparse lazily for the function starting at this offset and print it.
    #[arg(long, value_name = "FUNCTION-ID")]
    lazy: Option<u32>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("ESFRONT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = match resolve_options(&cli) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(2);
        }
    };
    debug!(?options, "resolved options");

    let mut failed = false;
    for path in &cli.files {
        match std::fs::read_to_string(path) {
            Ok(text) => failed |= !run_file(&cli, options, path, &text),
            Err(error) => {
                eprintln!("error: cannot read {}: {}", path, error);
                failed = true;
            }
        }
    }
    process::exit(if failed { 1 } else { 0 });
}

/// Merge the options file, if any, under the command-line flags.
fn resolve_options(cli: &Cli) -> Result<ParserOptions, String> {
    let flags = ParserOptionsFile {
        strict: cli.strict.then_some(true),
        scripting: cli.scripting.then_some(true),
        es6: cli.es6.then_some(true),
        pause_on_function_body: None,
        lazy_compilation: cli.lazy.map(|_| true),
    };
    let file = match &cli.config {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|error| format!("cannot read {}: {}", path, error))?;
            parse_options_json(&content).map_err(|error| format!("invalid options file {}: {}", path, error))?
        }
        None => ParserOptionsFile::default(),
    };
    Ok(flags.or(file).resolve())
}

/// Parse one file and print what was asked for. Returns `false` when any
/// error was reported.
fn run_file(cli: &Cli, options: ParserOptions, path: &str, text: &str) -> bool {
    let source = Source::new(path, text);

    if cli.tokens && !print_tokens(&source, options, path, text) {
        return false;
    }

    let arena = Bump::new();
    let mut parser = Parser::new(&arena, &source, options);
    let result = if cli.module {
        parser.parse_module(path)
    } else {
        parser.parse()
    };
    let program = match result {
        Ok(program) => program,
        Err(error) => {
            report_error(&error, path, text);
            return false;
        }
    };

    let diagnostics = parser.diagnostics();
    for diagnostic in diagnostics.diagnostics() {
        report_diagnostic(diagnostic, path, text);
    }
    info!(file = path, errors = diagnostics.error_count(), "parsed");

    if cli.ast {
        println!("{:#?}", program);
    }
    if let Some(offset) = cli.lazy {
        if !print_lazy_function(FunctionId(offset), &parser, &source, options, path, text) {
            return false;
        }
    }
    diagnostics.is_empty()
}

fn print_tokens(source: &Source, options: ParserOptions, path: &str, text: &str) -> bool {
    match tokenize(source, options.lexer_options(false)) {
        Ok(tokens) => {
            for token in tokens {
                let token_type = token.token_type();
                let token_text = match token_type {
                    TokenType::Eol | TokenType::Eof => String::new(),
                    _ => source.substring(token.position(), token.length()),
                };
                println!(
                    "{:>6} {:>4} {:<14} {}",
                    token.position(),
                    token.length(),
                    format!("{:?}", token_type),
                    token_text.escape_debug()
                );
            }
            true
        }
        Err(error) => {
            report_error(&error, path, text);
            false
        }
    }
}

/// Reparse the file, skipping every body not needed for the function at
/// `id`, and print that function.
fn print_lazy_function(
    id: FunctionId,
    full: &Parser<'_>,
    source: &Source,
    options: ParserOptions,
    path: &str,
    text: &str,
) -> bool {
    let recorded = full.recorded_functions();
    let Some(target) = ReparsedFunction::from_recorded(recorded, id) else {
        eprintln!("error: no function starts at offset {} in {}", id.0, path);
        return false;
    };

    let arena = Bump::new();
    let mut parser = Parser::new(&arena, source, options);
    parser.set_reparsed_function(target, recorded.clone());
    let program = match parser.parse() {
        Ok(program) => program,
        Err(error) => {
            report_error(&error, path, text);
            return false;
        }
    };
    print_function(find_function(program, id));
    true
}

fn print_function(function: Option<&FunctionNode<'_>>) {
    match function {
        Some(function) => println!("{:#?}", function),
        None => println!("(function not found after reparse)"),
    }
}

fn report_error(error: &ParseError, path: &str, text: &str) {
    let report = miette::Report::new(ParseDiagnostic::from_error(error, path, text));
    eprintln!("{:?}", report);
}

fn report_diagnostic(diagnostic: &Diagnostic, path: &str, text: &str) {
    let report = miette::Report::new(ParseDiagnostic::from_diagnostic(diagnostic, path, text));
    eprintln!("{:?}", report);
}
