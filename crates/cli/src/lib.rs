use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dirlens_listing::{DirlensConfig, ScanContext};
use dirlens_protocol::{human_bytes, serialize_json, Response, ResponseData, RevealOutcome};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod handler;
mod render;
mod reveal;
mod serve;

pub use handler::RequestHandler;
pub use reveal::{FileManager, SystemFileManager};
pub use serve::{serve_lines, serve_stdio};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "dirlens")]
#[command(about = "See what is eating your disk, one directory at a time", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (overrides DIRLENS_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Break a directory down into its children by size
    List(ListArgs),

    /// Total file count and size of a directory tree
    Size(SizeArgs),

    /// Show a path in the platform file manager
    Reveal(RevealArgs),

    /// Answer newline-delimited JSON requests on stdin (list | status | reveal)
    #[command(name = "serve-stdio")]
    ServeStdio,
}

#[derive(Args)]
struct ListArgs {
    /// Directory to break down
    path: PathBuf,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,
}

#[derive(Args)]
struct SizeArgs {
    /// Directory to measure
    path: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RevealArgs {
    /// Path to reveal, passed through unmodified
    path: String,
}

#[derive(Serialize)]
struct SizeOutput {
    path: String,
    file_count: u64,
    byte_total: u64,
    human_size: String,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout is reserved for JSON in these modes
    let json_output = match &cli.command {
        Commands::List(args) => args.json,
        Commands::Size(args) => args.json,
        Commands::ServeStdio => true,
        Commands::Reveal(_) => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = DirlensConfig::load(cli.config.as_deref()).context("Invalid configuration")?;
    let context = Arc::new(ScanContext::new(&config).context("Invalid configuration")?);
    let handler = Arc::new(RequestHandler::new(
        Arc::clone(&context),
        Arc::new(SystemFileManager),
    ));

    match cli.command {
        Commands::List(args) => run_list(args, &context).await?,
        Commands::Size(args) => run_size(args, &context).await?,
        Commands::Reveal(args) => run_reveal(args, &handler).await?,
        Commands::ServeStdio => serve_stdio(handler).await?,
    }

    Ok(())
}

async fn run_list(args: ListArgs, context: &ScanContext) -> Result<()> {
    let result = context.get_listing(&args.path).await;

    if args.json {
        let response = match &result {
            Ok(listing) => Response::ok(ResponseData::Listing(listing.clone())),
            Err(err) => Response::error(err.to_envelope()),
        };
        let text = if args.pretty {
            serde_json::to_string_pretty(&response)?
        } else {
            serialize_json(&response)?
        };
        print_stdout(&text)?;
        if result.is_err() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let listing = result.with_context(|| format!("Cannot list {}", args.path.display()))?;
    print_stdout(&render::render_listing(&listing))
}

async fn run_size(args: SizeArgs, context: &ScanContext) -> Result<()> {
    let size = context
        .folder_size(&args.path)
        .await
        .with_context(|| format!("Cannot measure {}", args.path.display()))?;
    let output = SizeOutput {
        path: args.path.display().to_string(),
        file_count: size.file_count,
        byte_total: size.byte_total,
        human_size: human_bytes(size.byte_total),
    };

    if args.json {
        print_stdout(&serialize_json(&output)?)
    } else {
        print_stdout(&format!(
            "{}: {} in {} files",
            output.path, output.human_size, output.file_count
        ))
    }
}

async fn run_reveal(args: RevealArgs, handler: &RequestHandler) -> Result<()> {
    let response = handler
        .handle(dirlens_protocol::Request::Reveal { path: args.path })
        .await;
    match response {
        Response::Ok {
            data:
                ResponseData::Reveal {
                    reveal: RevealOutcome::Revealed,
                },
        } => Ok(()),
        Response::Ok {
            data:
                ResponseData::Reveal {
                    reveal: RevealOutcome::Unsupported,
                },
        } => anyhow::bail!("Revealing files is not supported on this platform"),
        Response::Error { error } => anyhow::bail!(error.message),
        Response::Ok { .. } => anyhow::bail!("Unexpected reveal response"),
    }
}
