use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linkmgmt::{
    ArcPath,
    app::{App, Command},
    install_panic_hook,
};

#[derive(Parser)]
#[command(name = "lnk")]
#[command(about = "Save, scrape and manage your links from the terminal")]
struct Cli {
    /// Configuration file (defaults to ~/.config/linkmgmt/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive interface (the default)
    Tui,
    /// Print every stored link
    Links,
    /// Check that the scraping service is reachable
    Health,
    /// Scrape a page and print its title and text
    Scrape {
        #[arg(required = true)]
        url: String,
    },
    /// Store a new link
    Add {
        #[arg(required = true)]
        url: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Let the API scrape the page and fill the missing fields
        #[arg(long)]
        server_scrape: bool,
    },
    /// Print the effective configuration, or change one value
    Config {
        /// Set a value and save the file, e.g. `--set api_key=abc123`
        #[arg(long, value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Option<(String, String)>,
    },
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {arg:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    install_panic_hook()?;
    let cli = Cli::parse();

    let app = App::build(cli.config.as_deref().map(ArcPath::from)).await?;
    let command = match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => None,
        Commands::Links => Some(Command::Links),
        Commands::Health => Some(Command::Health),
        Commands::Scrape { url } => Some(Command::Scrape { url }),
        Commands::Add {
            url,
            title,
            description,
            server_scrape,
        } => Some(Command::Add {
            url,
            title,
            description,
            server_scrape,
        }),
        Commands::Config { set: None } => Some(Command::Config),
        Commands::Config {
            set: Some((key, value)),
        } => Some(Command::SetConfig { key, value }),
    };

    let result = match command {
        Some(command) => app.resolve(command).await,
        None => app.run_tui().await,
    };
    app.shutdown().await;
    result
}
