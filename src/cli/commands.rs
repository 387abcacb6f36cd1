//! Implementação dos comandos CLI do hotjar-mcp.

use std::path::PathBuf;
use std::sync::Arc;

use crate::mcp::{run_sse, McpServer};
use crate::types::config::{Config, TransportMode, CONFIG_FILE};
use crate::ServerResult;

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> ServerResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    // The config file may hold client credentials; keep it out of git.
    update_gitignore(&target_dir)?;

    let config = Config::default();
    config.save(&config_path)?;

    println!("hotjar-mcp initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set HOTJAR_CLIENT_ID / HOTJAR_CLIENT_SECRET (or edit {})", CONFIG_FILE);
    println!("  2. Optionally set HOTJAR_SITE_ID and HOTJAR_SURVEY_ID defaults");
    println!("  3. Add to Claude Code: claude mcp add hotjar -- hotjar-mcp serve --stdio");

    Ok(())
}

/// Updates or creates .gitignore to include the config file.
fn update_gitignore(target_dir: &PathBuf) -> ServerResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = CONFIG_FILE;
    let comment = "# hotjar-mcp - may contain Hotjar credentials";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content.lines().any(|line| line.trim() == entry) {
            tracing::debug!(".gitignore already contains {}", entry);
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with {}", entry);
    } else {
        let content = format!("{}\n{}\n", comment, entry);
        std::fs::write(&gitignore_path, content)?;
        println!(".gitignore created with {}", entry);
    }

    Ok(())
}

/// Inicia o servidor MCP no transporte resolvido.
pub async fn serve(port: Option<u16>, stdio: bool, config: &Config) -> ServerResult<()> {
    let use_stdio = stdio || config.general.transport == TransportMode::Stdio;

    let server = McpServer::new(config.clone());

    if use_stdio {
        tracing::info!("Starting hotjar-mcp server on stdio...");
        return server.run_stdio().await;
    }

    let port = port.unwrap_or(config.general.port);
    run_sse(Arc::new(server), port).await
}

/// Mostra a configuração resolvida, sem tocar na rede.
pub async fn status(config: &Config) -> ServerResult<()> {
    println!("hotjar-mcp v{}\n", env!("CARGO_PKG_VERSION"));

    let transport = match config.general.transport {
        TransportMode::Sse => format!("sse (port {})", config.general.port),
        TransportMode::Stdio => "stdio".to_string(),
    };

    println!("Transport:     {}", transport);
    println!("Log level:     {}", config.general.log_level);
    println!("API base:      {}", config.hotjar.api_base);
    println!("Page size:     {}", config.hotjar.api_limit);
    println!();
    println!(
        "Client ID:     {}",
        label_presence(config.hotjar.client_id.as_deref())
    );
    println!(
        "Client secret: {}",
        if config.hotjar.client_secret.is_some() {
            "set (hidden)"
        } else {
            "not set"
        }
    );
    println!(
        "Site ID:       {}",
        config.hotjar.site_id.as_deref().unwrap_or("not set")
    );
    println!(
        "Survey ID:     {}",
        config.hotjar.survey_id.as_deref().unwrap_or("not set")
    );

    if config.hotjar.client_id.is_none() || config.hotjar.client_secret.is_none() {
        println!();
        println!("Tools will require clientId/clientSecret parameters until");
        println!("HOTJAR_CLIENT_ID and HOTJAR_CLIENT_SECRET are set.");
    }

    Ok(())
}

fn label_presence(value: Option<&str>) -> &str {
    value.unwrap_or("not set")
}

/// Mostra versão.
pub fn version() {
    println!("hotjar-mcp v{}", env!("CARGO_PKG_VERSION"));
}
