use clap::Parser;
use ctxpack::logger::initialize_logger;
use ctxpack::{run, PackConfig, RuleScope};
use std::path::PathBuf;
use std::process::ExitCode;

/// Pack a directory's text files into one blob for pasting into an LLM,
/// respecting .gitignore rules.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Directory to pack
    #[arg(default_value = ".")]
    path: PathBuf,

    #[arg(short = 'c', long, help = "Copy output to the system clipboard")]
    copy: bool,

    #[arg(
        short = 'o',
        long,
        help = "Write output to a file (context.txt inside it if a directory is given)"
    )]
    output: Option<PathBuf>,

    #[arg(long, help = "Print a token estimate to stderr")]
    estimate: bool,

    #[arg(short = 'v', long, help = "Show which files are being packed")]
    verbose: bool,

    #[arg(
        long = "ignore-pattern",
        env = "CTXPACK_IGNORE",
        help = "Extra ignore pattern, applied like a root .gitignore line (e.g. '*.test.go'). Repeat for more"
    )]
    ignore_patterns: Vec<String>,

    #[arg(long, help = "Only evaluate the root .gitignore, not nested ones")]
    root_rules_only: bool,

    #[arg(
        short = 'M',
        long,
        env = "CTXPACK_MODEL",
        help = "Also count tokens with this model's tokenizer (with --estimate)"
    )]
    model: Option<String>,
}

impl From<CliArgs> for PackConfig {
    fn from(args: CliArgs) -> Self {
        PackConfig {
            root: args.path,
            extra_patterns: args.ignore_patterns,
            scope: if args.root_rules_only {
                RuleScope::RootOnly
            } else {
                RuleScope::Nested
            },
            copy: args.copy,
            output: args.output,
            estimate: args.estimate,
            verbose: args.verbose,
            model: args.model,
        }
    }
}

fn main() -> ExitCode {
    let cli_args = CliArgs::parse();
    initialize_logger(cli_args.verbose);

    let config = PackConfig::from(cli_args);
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
