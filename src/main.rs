use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use dbsetup::prompts::{self, TerminalPrompter};
use dbsetup::{ConfigService, ProviderRegistry};

/// Configure and validate a database connection
#[derive(Parser, Debug)]
#[command(name = "dbsetup", version)]
struct Cli {
    /// Backend to configure (mysql, postgresql, mongodb). Asked for when omitted.
    backend: Option<String>,

    /// List supported backends and the environment variables they use
    #[arg(long)]
    list: bool,

    /// How many times to re-prompt after a failed validation
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Suggested database name for the prompts
    #[arg(long)]
    database: Option<String>,

    /// Print the validated settings as environment variable assignments
    #[arg(long)]
    print_env: bool,

    /// Print the validated configuration as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.attempts == 0 {
        bail!("--attempts must be at least 1");
    }

    let registry = ProviderRegistry::with_defaults();

    if cli.list {
        for provider in registry.providers() {
            let db_type = provider.database_type();
            println!(
                "{:<12} {}",
                style(db_type.id()).cyan(),
                provider.required_env_vars().join(", ")
            );
        }
        return Ok(());
    }

    let backend = match cli.backend {
        Some(id) => id,
        None => prompts::select_backend(registry.supported()).await?.to_string(),
    };

    let mut prompter = TerminalPrompter::new();
    if let Some(name) = cli.database {
        prompter = prompter.with_default_database(name);
    }
    let service = ConfigService::new(registry, Box::new(prompter));

    let provider = service
        .get_provider(&backend)
        .with_context(|| format!("unsupported database provider: {backend}"))?;
    let db_type = provider.database_type();

    eprintln!("{}", style(format!(" {} CONFIGURATION ", db_type.name().to_uppercase())).black().on_cyan());

    let config = service
        .configure_and_validate(&backend, cli.attempts)
        .await
        .with_context(|| format!("could not configure {}", db_type.name()))?;

    eprintln!(
        "{} {} database configured successfully ({})",
        style("✔").green(),
        db_type.name(),
        config.target_label(db_type)
    );

    if cli.print_env {
        for (name, value) in provider.env_assignments(&config) {
            println!("{name}={value}");
        }
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    Ok(())
}
