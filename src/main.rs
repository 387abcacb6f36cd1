use clap::Parser;
use hotjar_mcp::cli::{Cli, Commands};
use hotjar_mcp::{Config, ServerResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ServerResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet); env vars win over the file
    let config = if cli.config.exists() {
        Config::load(&cli.config)
            .unwrap_or_default()
            .with_env_overrides()
    } else {
        Config::load_or_default()
    };

    // Determine log level: CLI flags take precedence over env/config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("hotjar_mcp={}", log_level)
            .parse()
            .unwrap_or_else(|_| "hotjar_mcp=info".parse().expect("fallback directive is valid")),
    );

    // Logs always go to stderr: stdout belongs to the stdio transport
    let fmt_layer = fmt::layer().with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt_layer.json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry().with(fmt_layer).with(filter).init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            hotjar_mcp::cli::commands::init(path).await?;
        }
        Commands::Serve { port, stdio } => {
            hotjar_mcp::cli::commands::serve(port, stdio, &config).await?;
        }
        Commands::Status => {
            hotjar_mcp::cli::commands::status(&config).await?;
        }
        Commands::Version => {
            hotjar_mcp::cli::commands::version();
        }
    }

    Ok(())
}
