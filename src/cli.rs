//! Interface de linha de comando do jobboard baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (list, show, ids)
//! e flags globais (--config, --batch-size, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// jobboard — vagas do Hacker News no terminal.
#[derive(Debug, Parser)]
#[command(name = "jobboard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./jobboard.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Quantidade de vagas por página.
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista as vagas mais recentes, página por página.
    List {
        /// Número de páginas a carregar.
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Carrega todas as páginas disponíveis.
        #[arg(long, conflicts_with = "pages")]
        all: bool,
    },

    /// Mostra uma única vaga pelo id.
    Show {
        /// Id do item no Hacker News.
        id: u64,
    },

    /// Imprime os ids das vagas atuais.
    Ids,
}
