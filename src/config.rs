//! Configuração do jobboard carregada a partir de `jobboard.toml`.
//!
//! A struct [`BoardConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `JOBBOARD_API_URL` tem precedência sobre o arquivo.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::board::DEFAULT_BATCH_SIZE;
use crate::error::BoardError;
use crate::hn::{API_URL, HnClient};

/// Nome do arquivo procurado no diretório atual quando `--config` não é informado.
pub const DEFAULT_CONFIG_FILE: &str = "jobboard.toml";

/// Configuração de nível superior carregada de `jobboard.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// URL base da API do Hacker News.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Quantidade de vagas buscadas por página.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Timeout de conexão em segundos.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Timeout total de cada requisição em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Valor padrão para a URL base: a API pública do Hacker News.
fn default_api_base_url() -> String {
    API_URL.to_string()
}

// Valor padrão para o tamanho da página: o mesmo do board.
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

// Valor padrão para o timeout de conexão: 10s.
fn default_connect_timeout_secs() -> u64 {
    10
}

// Valor padrão para o timeout da requisição: 30s.
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            batch_size: default_batch_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BoardConfig {
    /// Carrega a configuração de `path`, ou de `jobboard.toml` no diretório atual.
    ///
    /// Um caminho explícito precisa existir; o arquivo padrão é opcional e,
    /// se ausente, os valores padrão são usados.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração.
        if let Ok(url) = std::env::var("JOBBOARD_API_URL")
            && !url.is_empty()
        {
            config.api_base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Lê e desserializa um arquivo TOML, sem aplicar variáveis de ambiente.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(BoardError::from)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str::<BoardConfig>(&contents).map_err(BoardError::from)?;
        Ok(config)
    }

    /// Rejeita valores que tornariam o board inutilizável.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.batch_size == 0 {
            return Err(BoardError::Config("batch_size must be at least 1".into()));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(BoardError::Config("api_base_url must not be empty".into()));
        }
        Ok(())
    }

    /// Constrói o cliente HTTP com os timeouts configurados.
    pub fn client(&self) -> Result<HnClient, BoardError> {
        let client = HnClient::with_timeouts(
            &self.api_base_url,
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.request_timeout_secs),
        )?;
        Ok(client)
    }
}
