mod client;
mod commands;
mod output;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use client::SwitchboardClient;
use output::{OutputConfig, OutputFormat};
use switchboard::config;

/// CLI for the Switchboard maintenance intake service
#[derive(Parser, Debug)]
#[clap(name = "switchboard-cli", about = "CLI for the Switchboard maintenance intake service")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "SWITCHBOARD_URL", global = true)]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect and update maintenance requests
    #[command(subcommand)]
    Requests(commands::requests::RequestCommands),
    /// POST a saved webhook payload to the server
    Replay {
        /// Path to a JSON payload file
        file: PathBuf,
    },
    /// Check that the server is up
    Health,
}

/// Resolves the server URL from CLI args, config file, or the default
///
/// Precedence: CLI flag / env var > `server_url` in config.toml > http://localhost:3000
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    let from_file = config::get_config_dir_path()
        .map(|dir| dir.join("config.toml"))
        .and_then(|path| config::config_from_file(Some(path)).ok())
        .and_then(|update| update.server_url);

    from_file.unwrap_or_else(|| "http://localhost:3000".to_string())
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.to_lowercase().contains("connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!("Could not connect to server. Is switchboard running?\n  {}", err_string);
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = SwitchboardClient::new(resolve_server_url(cli.server_url));
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Requests(cmd) => commands::requests::execute(&client, cmd, &output_config).await,
        Commands::Replay { file } => commands::replay::execute(&client, file, &output_config).await,
        Commands::Health => client
            .health()
            .await
            .map(|status| output::print_value(&status, &output_config))
            .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
