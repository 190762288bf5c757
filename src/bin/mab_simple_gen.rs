//! Standalone REST example generator
//!
//! Runs the simple generator without a shell session:
//!
//! ```bash
//! mab-simple-gen ios android -e examples/ -o mobile -c UserController
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mab_cli::extension::{EmptyPropertyPolicy, Platform};
use mab_cli::shell::Console;
use mab_cli::simplegen::{
    self, DescriptorGenerator, GenerateRequest, SimpleGenError, TranscriptParser,
    DEFAULT_CONTROLLER_CLASS, DEFAULT_OUT_DIR, DEFAULT_PACKAGE,
};

#[derive(Parser)]
#[command(name = "mab-simple-gen")]
#[command(author, version, about = "Generate mobile API assets from REST examples")]
struct Cli {
    /// Target platforms (default: all)
    #[arg(value_parser = ["ios", "android", "js"])]
    platforms: Vec<String>,

    /// REST example file or directory
    #[arg(long, short = 'e')]
    examples: Option<String>,

    /// Output directory
    #[arg(long, short = 'o', default_value = DEFAULT_OUT_DIR)]
    out: PathBuf,

    /// Controller class name
    #[arg(long = "class", short = 'c', default_value = DEFAULT_CONTROLLER_CLASS)]
    class_name: String,

    /// Package for generated code
    #[arg(long, short = 'p', default_value = DEFAULT_PACKAGE)]
    package: String,

    /// Namespace prefix for generated assets
    #[arg(long, short = 'n')]
    namespace: Option<String>,

    /// Handling of properties whose type cannot be inferred
    #[arg(
        long,
        short = 'j',
        default_value = "abort",
        value_parser = ["abort", "ignore", "default-type"]
    )]
    policy: String,

    /// Delete the output directory before generating
    #[arg(long, short = 'f')]
    force: bool,

    /// Print progress details
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Print error backtraces
    #[arg(long, short = 't')]
    trace: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut console = Console::stdio();
    console.set_verbose(cli.verbose);
    console.set_tracing(cli.trace);

    match run(&cli, &mut console) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            console.error(&error.to_string());
            console.trace(&format!("{error:?}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, console: &mut Console) -> Result<(), SimpleGenError> {
    let examples = cli
        .examples
        .clone()
        .ok_or(SimpleGenError::ExamplesRequired)?;
    let policy: EmptyPropertyPolicy =
        cli.policy.parse().map_err(SimpleGenError::InvalidOption)?;

    let request = GenerateRequest {
        platforms: parse_platforms(&cli.platforms)?,
        examples,
        out_dir: cli.out.clone(),
        force: cli.force,
    };
    let mut generator = DescriptorGenerator::new(
        cli.class_name.clone(),
        cli.package.clone(),
        cli.namespace.clone(),
        policy,
    );
    simplegen::generate(&request, &TranscriptParser, &mut generator, console)
}

/// Repeated platforms collapse to their first occurrence
fn parse_platforms(names: &[String]) -> Result<Vec<Platform>, SimpleGenError> {
    let mut platforms = Vec::new();
    for name in names {
        let platform: Platform = name.parse().map_err(SimpleGenError::InvalidOption)?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Ok(platforms)
}
