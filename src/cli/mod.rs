//! Interface de linha de comando do hotjar-mcp.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hotjar-mcp - Servidor MCP para a API Hotjar.
#[derive(Parser, Debug)]
#[command(name = "hotjar-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "hotjar-mcp.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Inicia o servidor MCP (SSE por padrão).
    Serve {
        /// Porta para o transporte SSE.
        #[arg(short, long)]
        port: Option<u16>,

        /// Usa o transporte stdio em vez de SSE.
        #[arg(long)]
        stdio: bool,
    },

    /// Mostra a configuração resolvida (sem chamadas de rede).
    Status,

    /// Mostra versão.
    Version,
}
