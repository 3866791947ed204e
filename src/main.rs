//! `kg-memory` — run one knowledge-graph operation from the command line.
//!
//! ```text
//! kg-memory --memory-path memory.jsonl search_nodes '{"query": "spanish"}'
//! ```
//!
//! The JSON result goes to stdout; logs go to stderr. Debug logging is on
//! with `--debug`, `KG_DEBUG=true`, or `IQ_DEBUG=true`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value as JsonValue;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use kg_memory::config::MemoryPathConfig;
use kg_memory::tools::{self, Tool};
use kg_memory::{GraphManager, JsonlStore};

#[derive(Parser, Debug)]
#[command(name = "kg-memory")]
#[command(about = "Knowledge-graph memory with temporal observations", long_about = None)]
#[command(version)]
struct Cli {
    /// Memory file (overrides MEMORY_FILE_PATH). Relative paths are
    /// resolved against the program's directory.
    #[arg(long)]
    memory_path: Option<PathBuf>,

    /// Log at debug level (also enabled by IQ_DEBUG=true).
    #[arg(long, env = "KG_DEBUG")]
    debug: bool,

    /// Tool to run, e.g. create_entities, search_nodes, read_graph.
    tool: String,

    /// JSON argument object for the tool.
    #[arg(default_value = "{}")]
    arguments: String,
}

/// Environment switch for debug logging shared with the other memory tools.
const IQ_DEBUG_ENV: &str = "IQ_DEBUG";

fn debug_from_env(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let iq_debug = std::env::var(IQ_DEBUG_ENV).ok();
    init_tracing(cli.debug || debug_from_env(iq_debug.as_deref()));

    let tool: Tool = match cli.tool.parse() {
        Ok(tool) => tool,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let arguments: JsonValue = match serde_json::from_str(&cli.arguments) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", tools::describe_failure(tool, &kg_memory::Error::InvalidRequest(e.to_string())));
            return ExitCode::FAILURE;
        }
    };

    let config = match MemoryPathConfig::from_process(cli.memory_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(path = %config.path.display(), source = ?config.source, "memory file");

    let manager = GraphManager::new(JsonlStore::open(config.path));
    match tools::dispatch(&manager, tool, arguments).await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("cannot render result: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{}", tools::describe_failure(tool, &e));
            ExitCode::FAILURE
        }
    }
}
