use clap::{Parser as ClapParser, Subcommand};
use efilter::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "efilter")]
#[command(about = "EFILTER - A query language for filtering forensic objects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and execute a query
    Check {
        /// The query to execute
        query: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Template parameters as a JSON array (for `{}`) or object (for `{name}`)
        #[arg(long)]
        params: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,

        /// Treat unresolved fields as errors
        #[arg(long)]
        strict: bool,

        /// Print the branch that decided the result on stderr
        #[arg(long)]
        trace: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            params,
            pretty,
            syntax_only,
            strict,
            trace,
        } => run_check(CheckOptions {
            query,
            input,
            params,
            pretty,
            syntax_only,
            strict,
            trace,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions) -> Result<(), CliError> {
    if options.input.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success { output, branch } => {
            let json = if options.pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", json);
            if let Some(branch) = branch {
                eprintln!("matched: {}", branch);
            }
        }
    }
    Ok(())
}
