//! Canvas Arranger CLI
//!
//! Usage:
//!   canvas-arrange [OPTIONS] <REQUEST>
//!
//! Options:
//!   -c, --config <FILE>    Configuration file (TOML format)
//!   -r, --response <FILE>  Replay a captured oracle response instead of calling the service
//!   -t, --timeout <SECS>   Override the oracle timeout
//!       --prompt           Print the oracle prompt and exit
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::error;

use canvas_arranger::prompt::build_prompt;
use canvas_arranger::{
    ArrangeError, ArrangeRequest, Arranger, ArrangerConfig, GeminiOracle, LayoutOracle,
    StaticOracle,
};

#[derive(Parser)]
#[command(name = "canvas-arrange")]
#[command(about = "Re-layout canvas elements for a new canvas size")]
struct Cli {
    /// Arrangement request JSON file ("-" reads from stdin)
    request: PathBuf,

    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay a captured oracle response instead of calling the service
    #[arg(short, long)]
    response: Option<PathBuf>,

    /// Oracle timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Print the oracle prompt and exit
    #[arg(long)]
    prompt: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ArrangerConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => ArrangerConfig::default(),
    };
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let source = match read_input(&cli.request) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading request '{}': {}", cli.request.display(), e);
            process::exit(1);
        }
    };
    let request: ArrangeRequest = match serde_json::from_str(&source) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing request: {}", e);
            process::exit(1);
        }
    };
    let frame = request.frame();

    if cli.prompt {
        println!("{}", build_prompt(&request.selected_elements, &frame));
        return;
    }

    let oracle: Arc<dyn LayoutOracle> = match &cli.response {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => Arc::new(StaticOracle::new(text)),
            Err(e) => {
                eprintln!("Error reading response '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => match GeminiOracle::from_config(&config.oracle) {
            Ok(o) => Arc::new(o),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
    };

    let arranger = Arranger::from_config(oracle, &config);
    match arranger.arrange(&request.selected_elements, &frame).await {
        Ok(arrangement) => match serde_json::to_string_pretty(&arrangement.records) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error writing result: {}", e);
                process::exit(1);
            }
        },
        Err(ArrangeError::Parse(e)) => {
            error!("oracle response could not be parsed");
            let raw = cli
                .response
                .as_deref()
                .and_then(|p| fs::read_to_string(p).ok())
                .unwrap_or_else(|| e.excerpt().to_string());
            eprintln!("{}", e.format(&raw, "oracle-response"));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn read_input(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}
