use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use clap_stdin::FileOrStdin;
use log::LevelFilter;
use serde::Serialize;

use tacc::analyzer::SymbolEntry;
use tacc::codegen::Instr;
use tacc::lexer::{Token, TransitionMap};
use tacc::parser::SyntaxTree;
use tacc::{compile, tokenize, Compilation, Diagnostic};

#[derive(Parser)]
#[command(name = "tacc", version)]
#[command(about = "Front end for typed assignments: tokens, syntax tree, symbol table and three-address code")]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token listing
    Tokens {
        /// Source file, or - for stdin
        input: FileOrStdin,
    },
    /// Print the syntax tree
    Tree {
        /// Source file, or - for stdin
        input: FileOrStdin,

        /// Emit Graphviz source instead of an outline
        #[arg(long)]
        dot: bool,
    },
    /// Print the three-address code
    Tac {
        /// Source file, or - for stdin
        input: FileOrStdin,
    },
    /// Print the symbol table
    Symbols {
        /// Source file, or - for stdin
        input: FileOrStdin,
    },
    /// Run every phase and only report diagnostics
    Check {
        /// Source file, or - for stdin
        input: FileOrStdin,
    },
    /// Print the token transition map as Graphviz source
    Transitions {
        /// Source file, or - for stdin
        input: FileOrStdin,
    },
    /// Print every artifact
    Compile {
        /// Source file, or - for stdin
        input: FileOrStdin,

        /// Emit one JSON document
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct TacLine<'a> {
    text: String,
    uses_undefined: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    undefined: Vec<&'a str>,
}

impl<'a> From<&'a Instr> for TacLine<'a> {
    fn from(instr: &'a Instr) -> Self {
        Self {
            text: instr.to_string(),
            uses_undefined: instr.uses_undefined(),
            undefined: instr.undefined_names(),
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    tokens: &'a [Token],
    tree: Option<SyntaxTree>,
    tac: Vec<TacLine<'a>>,
    symbols: Vec<&'a SymbolEntry>,
    diagnostics: Vec<String>,
}

impl<'a> From<&'a Compilation> for Report<'a> {
    fn from(c: &'a Compilation) -> Self {
        Self {
            tokens: &c.tokens,
            tree: c.syntax_tree(),
            tac: c.tac().instrs().iter().map(TacLine::from).collect(),
            symbols: c.symbol_table().iter().collect(),
            diagnostics: c.diagnostics.iter().map(|d| d.to_string()).collect(),
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read(input: FileOrStdin) -> Result<String> {
    input.contents().context("failed to read source")
}

fn print_listing(tokens: &[Token]) {
    for token in tokens {
        println!("{}", token);
    }
}

fn print_text_report(c: &Compilation) {
    println!("Tokens:");
    print_listing(&c.tokens);

    println!();
    println!("Syntax tree:");
    match c.syntax_tree() {
        Some(tree) => print!("{}", tree),
        None => println!("(syntax error)"),
    }

    println!();
    println!("Three-address code:");
    for instr in c.tac().instrs() {
        let names = instr.undefined_names();
        if names.is_empty() {
            println!("{}", instr);
        } else {
            println!("{}    # undefined: {}", instr, names.join(", "));
        }
    }

    println!();
    println!("Symbol table:");
    print!("{}", c.symbol_table());
}

fn report_diagnostics(diagnostics: &[Diagnostic]) -> ExitCode {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
    if diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let diagnostics = match cli.command {
        Command::Tokens { input } => {
            let (tokens, diagnostics) = tokenize(&read(input)?);
            print_listing(&tokens);
            diagnostics
        }
        Command::Tree { input, dot } => {
            let c = compile(&read(input)?);
            if let Some(tree) = c.syntax_tree() {
                if dot {
                    print!("{}", tree.dot());
                } else {
                    print!("{}", tree);
                }
            }
            c.diagnostics
        }
        Command::Tac { input } => {
            let c = compile(&read(input)?);
            if !c.tac().is_empty() {
                println!("{}", c.tac());
            }
            c.diagnostics
        }
        Command::Symbols { input } => {
            let c = compile(&read(input)?);
            print!("{}", c.symbol_table());
            c.diagnostics
        }
        Command::Check { input } => compile(&read(input)?).diagnostics,
        Command::Transitions { input } => {
            let (tokens, diagnostics) = tokenize(&read(input)?);
            print!("{}", TransitionMap::from_tokens(&tokens).dot());
            diagnostics
        }
        Command::Compile { input, json } => {
            let c = compile(&read(input)?);
            if json {
                let report = Report::from(&c);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("failed to serialize report")?
                );
            } else {
                print_text_report(&c);
            }
            c.diagnostics
        }
    };

    Ok(report_diagnostics(&diagnostics))
}
