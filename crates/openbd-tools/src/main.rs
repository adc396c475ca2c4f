//! openbd CLI - scaffold, deploy, and update OpenBD server projects

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use openbd_core::workflows::create::CreateArgs;
use openbd_core::workflows::generate::GenerateArgs;
use openbd_core::workflows::update::UpdateArgs;
use openbd_core::workflows::{create, generate, update};

#[derive(Parser, Debug)]
#[command(name = "openbd")]
#[command(about = "Scaffold, deploy, and update OpenBD server projects")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new openbd project
    Generate(GenerateCliArgs),
    /// Create a new openbd app on the platform
    Create(CreateCliArgs),
    /// Update the openbd project in the current directory
    Update(UpdateCliArgs),
}

#[derive(Parser, Debug)]
struct GenerateCliArgs {
    /// Project name (auto-generated when omitted)
    name: Option<String>,

    /// OpenBD version. Default is the last stable release
    #[arg(short = 'v', long)]
    version: Option<String>,

    /// Flush cache and download a new openbd engine
    #[arg(short, long)]
    rebuild: bool,

    /// Recreate the project, deleting ALL existing files
    #[arg(short, long)]
    overwrite: bool,

    /// Use the complete engine, disabling thin deployment
    #[arg(short, long)]
    full_engine: bool,

    /// Skip git initialize and commit
    #[arg(short, long)]
    no_git: bool,

    /// Show detailed output
    #[arg(long)]
    verbose: bool,
}

impl From<GenerateCliArgs> for GenerateArgs {
    fn from(args: GenerateCliArgs) -> Self {
        GenerateArgs {
            name: args.name,
            version: args.version,
            rebuild: args.rebuild,
            overwrite: args.overwrite,
            full_engine: args.full_engine,
            no_git: args.no_git,
            verbose: args.verbose,
        }
    }
}

#[derive(Parser, Debug)]
struct CreateCliArgs {
    /// App name (the platform picks one when omitted)
    name: Option<String>,

    /// Comma-delimited list of addons to install
    #[arg(long, value_name = "ADDONS")]
    addons: Option<String>,

    /// Don't create a git remote
    #[arg(short, long)]
    no_remote: bool,

    /// The git remote to create
    #[arg(short, long, default_value = "heroku")]
    remote: String,

    /// Admin console password (auto-generated when omitted)
    #[arg(short, long)]
    password: Option<String>,

    /// Seconds to wait for app provisioning
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

impl From<CreateCliArgs> for CreateArgs {
    fn from(args: CreateCliArgs) -> Self {
        CreateArgs {
            name: args.name,
            addons: args.addons,
            no_remote: args.no_remote,
            remote: args.remote,
            password: args.password,
            timeout_secs: args.timeout,
        }
    }
}

#[derive(Parser, Debug)]
struct UpdateCliArgs {
    /// OpenBD version. Defaults to the currently installed version
    #[arg(short = 'v', long)]
    version: Option<String>,

    /// Flush cache and download a new copy of openbd
    #[arg(short, long)]
    rebuild: bool,

    /// Reset configuration files to defaults
    #[arg(short, long)]
    overwrite_config: bool,

    /// Show detailed output
    #[arg(long)]
    verbose: bool,
}

impl From<UpdateCliArgs> for UpdateArgs {
    fn from(args: UpdateCliArgs) -> Self {
        UpdateArgs {
            version: args.version,
            rebuild: args.rebuild,
            overwrite_config: args.overwrite_config,
            verbose: args.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let cwd = std::env::current_dir()?;

    let result = match args.command {
        Command::Generate(generate_args) => generate::run(&cwd, generate_args.into()).await,
        Command::Create(create_args) => create::run(&cwd, create_args.into()).await,
        Command::Update(update_args) => update::run(&cwd, update_args.into()).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    if let Err(err) = result {
        eprintln!("{} {err:#}", "Error:".red().bold());
        std::process::exit(1);
    }
    Ok(())
}
