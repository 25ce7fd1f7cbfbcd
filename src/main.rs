use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use asp_expr::ast_printer::AstPrinter;
use asp_expr::expr::Expr;
use asp_expr::parser::{parse_expression, ParserConfig};
use asp_expr::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Classic ASP expression parser and constant folder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,

    /// Deepest allowed expression nesting
    #[arg(long, global = true, default_value_t = ParserConfig::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Tallest allowed deferred expression tree
    #[arg(long, global = true, default_value_t = ParserConfig::DEFAULT_MAX_HEIGHT)]
    max_height: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes an expression from a file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses an expression from a file and prints its folded AST
    Parse {
        filename: PathBuf,

        /// Print the AST as JSON instead of source text
        #[arg(long)]
        json: bool,
    },

    /// Folds an expression from a file and prints its constant value
    Fold { filename: PathBuf },
}

/// Reads the contents of a file into a String
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip the crate prefix from the module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("asp_expr::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let config = ParserConfig {
        max_depth: args.max_depth,
        max_height: args.max_height,
    };

    match args.commands {
        Commands::Tokenize { filename } => {
            info!("Running Tokenize subcommand");
            let source = read_file(filename)?;
            let mut tokenized = true;

            for token in Scanner::new(&source) {
                match token {
                    Ok(token) => {
                        debug!("Scanned token: {}", token);

                        println!("{}", token);
                    }

                    Err(e) => {
                        tokenized = false;

                        debug!("Tokenization debug: {}", e);

                        eprintln!("{}", e);
                    }
                }
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code 65");

                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename, json } => {
            info!("Running Parse subcommand");
            let source = read_file(filename)?;

            match parse_expression(&source, config) {
                Ok(expr) => {
                    if json {
                        let rendered = serde_json::to_string_pretty(&expr)
                            .context("Failed to serialize AST")?;

                        println!("{}", rendered);
                    } else {
                        let printed = AstPrinter::print(&expr);

                        debug!("AST: {}", printed);
                        println!("{}", printed);
                    }
                }

                Err(e) => {
                    debug!("Parse debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            }

            info!("Parse subcommand completed");
        }

        Commands::Fold { filename } => {
            info!("Running Fold subcommand");
            let source = read_file(filename)?;

            match parse_expression(&source, config) {
                Ok(Expr::Eval(folded)) => {
                    debug!("Folded to: {:?}", folded.value);
                    println!("{}", folded.value);
                }

                Ok(expr) => {
                    eprintln!(
                        "Expression is not constant: {}",
                        AstPrinter::print(&expr)
                    );
                    std::process::exit(70);
                }

                Err(e) => {
                    debug!("Parse debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            }

            info!("Fold subcommand completed");
        }
    }

    Ok(())
}
