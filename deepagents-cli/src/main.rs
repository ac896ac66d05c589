//! deepagents-fs binary: parse one file command, run it as a tool call and print the output.

use std::path::PathBuf;

use clap::Parser;
use deepagents_cli::{run_with_options, FsCommand, RunOptions, ToolCall};

#[derive(Parser, Debug)]
#[command(name = "deepagents-fs")]
#[command(about = "Run agent file tools (ls, read, write, edit, glob, grep) against a directory plus a /memories/ store")]
struct Args {
    /// Directory served at / (overrides ROOT_DIR)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// SQLite file for the memories store (overrides DB_PATH)
    #[arg(long, value_name = "PATH")]
    db: Option<String>,

    /// User id scoping the memories store (overrides USER_ID)
    #[arg(long)]
    user: Option<String>,

    /// Mount prefix of the memories store (overrides MEMORIES_PREFIX)
    #[arg(long, value_name = "PREFIX")]
    memories_prefix: Option<String>,

    /// Skip files larger than this in grep (overrides MAX_FILE_SIZE_MB)
    #[arg(long, value_name = "MB")]
    max_file_size_mb: Option<u64>,

    /// Show debug logs
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: FsCommand,
}

fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(parent) = cwd.parent() {
            let env_path = parent.join(".env");
            if env_path.is_file() {
                let _ = dotenv::from_path(env_path);
            }
        }
    }
}

/// Initializes tracing to stderr. `--verbose` means debug; otherwise `RUST_LOG` or warn.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    load_dotenv();
    let args = Args::parse();
    init_tracing(args.verbose);

    let options = RunOptions {
        root_dir: args.root.clone(),
        db_path: args.db.clone(),
        user_id: args.user.clone(),
        memories_prefix: args.memories_prefix.clone(),
        max_file_size_mb: args.max_file_size_mb,
        verbose: args.verbose,
    };
    let call = ToolCall::from(&args.command);

    match run_with_options(&call, &options).await {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
