use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use symfold::emitter;
use symfold::error::FoldError;
use symfold::eval::{self, Bindings, Verdict};
use symfold::folder::{self, FoldOutcome, FoldedStmt};
use symfold::highlight;
use symfold::input::InputVector;
use symfold::parser::Parser;
use symfold::scanner::Scanner;
use symfold::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Symbolic constant folder with branch-verdict annotation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input from a file and prints it re-formatted
    Parse { filename: Option<PathBuf> },

    /// Folds input from a file against an input vector and prints the result
    Fold {
        filename: Option<PathBuf>,

        /// Input vector, e.g. "x = 1, y = [4, 5, 6]"
        #[arg(long)]
        vector: Option<String>,

        /// Also print the branch-predicate ledger
        #[arg(long)]
        ledger: bool,
    },

    /// Folds input and colors each branch line by its verdict
    Annotate {
        filename: Option<PathBuf>,

        /// Input vector, e.g. "x = 1, y = [4, 5, 6]"
        #[arg(long)]
        vector: Option<String>,

        /// Print the verdict list as JSON instead of colored source
        #[arg(long)]
        json: bool,
    },
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with statement number and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'symfold::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("symfold::")
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
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// 65 for parse-class failures, 70 for evaluation-class failures.
fn exit_code(error: &FoldError) -> i32 {
    match error {
        FoldError::Lex { .. } | FoldError::Parse { .. } | FoldError::Vector(_) => 65,
        _ => 70,
    }
}

fn parse_vector(text: Option<String>) -> std::result::Result<InputVector, FoldError> {
    match text {
        Some(text) => InputVector::parse(&text),
        None => Ok(InputVector::new()),
    }
}

fn main() -> Result<()> {
    // Initialize logger before parsing CLI args
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let buf = read_file(filename)?;
                let mut scanner = Scanner::new(&buf);
                let mut tokenized = true;

                while let Some(token) = scanner.next() {
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
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let buf = read_file(filename)?;

                let tokens: std::result::Result<Vec<Token<'_>>, FoldError> =
                    Scanner::new(&buf).collect();

                let formatted = tokens.and_then(|tokens| {
                    let mut parser = Parser::new(&tokens);
                    let program = parser.parse()?;

                    let converted: std::result::Result<Vec<FoldedStmt>, FoldError> =
                        program.iter().map(folder::verbatim_stmt).collect();

                    Ok(emitter::emit(&converted?))
                });

                match formatted {
                    Ok(text) => {
                        info!("Program parsed successfully");

                        println!("{}", text);
                    }

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Fold {
            filename,
            vector,
            ledger,
        } => match filename {
            Some(filename) => {
                info!("Running Fold subcommand");

                let buf = read_file(filename)?;
                let source = String::from_utf8(buf).context("Source is not valid UTF-8")?;

                let result = parse_vector(vector)
                    .and_then(|vector| folder::fold_source(&source, &vector));

                match result {
                    Ok(outcome) => {
                        info!("Fold completed successfully");

                        println!("{}", emitter::emit(&outcome.program));

                        if ledger {
                            for predicate in &outcome.ledger {
                                println!("[line {}] {}", predicate.line, predicate.text());
                            }
                        }
                    }

                    Err(e) => {
                        debug!("Fold debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(exit_code(&e));
                    }
                }

                info!("Fold subcommand completed");
            }

            None => {
                info!("No filepath provided for Fold");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Annotate {
            filename,
            vector,
            json,
        } => match filename {
            Some(filename) => {
                info!("Running Annotate subcommand");

                let buf = read_file(filename)?;
                let source = String::from_utf8(buf).context("Source is not valid UTF-8")?;

                let result: std::result::Result<(FoldOutcome, InputVector), FoldError> =
                    parse_vector(vector).and_then(|vector| {
                        let outcome = folder::fold_source(&source, &vector)?;
                        Ok((outcome, vector))
                    });

                let annotated = result.and_then(|(outcome, vector)| {
                    let bindings = Bindings {
                        folded: &outcome.bindings,
                        vector: &vector,
                    };

                    let verdicts: Vec<Verdict> = eval::verdicts(&outcome.ledger, &bindings)?;

                    debug!("Computed {} verdicts", verdicts.len());

                    if json {
                        let rendered = serde_json::to_string_pretty(&verdicts)
                            .map_err(|e| FoldError::eval(e.to_string()))?;

                        Ok(rendered)
                    } else {
                        let folded = emitter::emit(&outcome.program);

                        Ok(highlight::annotate(&folded, &verdicts))
                    }
                });

                match annotated {
                    Ok(text) => {
                        info!("Annotate completed successfully");

                        println!("{}", text);
                    }

                    Err(e) => {
                        debug!("Annotate debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(exit_code(&e));
                    }
                }

                info!("Annotate subcommand completed");
            }

            None => {
                info!("No filepath provided for Annotate");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },
    }

    Ok(())
}
