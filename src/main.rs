use artemis_query::cli::{self, CheckOptions, CheckResult, CliError};
use artemis_query::{DatabaseFamily, ParserRegistry, tokenize};
use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(ClapParser)]
#[command(name = "artemis")]
#[command(about = "Artemis - parse, prepare and run NoSQL entity queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and execute a query against a JSON data file
    Check {
        /// The query to execute
        query: String,

        /// Database family: key-value, column, document or graph
        #[arg(short, long, default_value = "document")]
        family: DatabaseFamily,

        /// Data file (reads from stdin if not provided)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Entity metadata file used to map field names
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Parameter binding as name=<json value>; repeatable
        #[arg(short, long = "bind", value_name = "NAME=VALUE")]
        bindings: Vec<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the parsed form of a query
    Parse {
        /// The query to parse
        query: String,

        /// Database family: key-value, column, document or graph
        #[arg(short, long, default_value = "document")]
        family: DatabaseFamily,

        /// Print the token stream instead of the syntax tree
        #[arg(long)]
        tokens: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'artemis docs' to list categories)
        category: String,
    },
}

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            query,
            family,
            data,
            metadata,
            bindings,
            pretty,
            syntax_only,
        } => run_check(query, family, data, metadata, bindings, pretty, syntax_only),
        Commands::Parse {
            query,
            family,
            tokens,
        } => run_parse(&query, family, tokens),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    query: String,
    family: DatabaseFamily,
    data: Option<PathBuf>,
    metadata: Option<PathBuf>,
    bindings: Vec<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let data = match data {
        Some(path) => Some(fs::read_to_string(path)?),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };
    let metadata = metadata.map(fs::read_to_string).transpose()?;
    let bindings = bindings
        .iter()
        .map(|b| cli::parse_binding(b))
        .collect::<Result<Vec<_>, _>>()?;

    let options = CheckOptions {
        query,
        family,
        data,
        metadata,
        bindings,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn run_parse(query: &str, family: DatabaseFamily, tokens: bool) -> Result<(), CliError> {
    if tokens {
        for token in tokenize(query)? {
            println!(
                "{:>4}:{:<4} {:<12} {}",
                token.position.line,
                token.position.column,
                format!("{:?}", token.category()),
                token.lexeme
            );
        }
        return Ok(());
    }

    let parsed = ParserRegistry::with_defaults().get(family)?.parse(query)?;
    let parameters = parsed.parameters();
    println!("{:#?}", parsed);
    if !parameters.is_empty() {
        println!("parameters: {}", parameters.join(", "));
    }
    Ok(())
}
