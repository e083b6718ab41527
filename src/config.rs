use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::{
    chat::{ChatClient, ChatError, DEFAULT_API_BASE_URL, DEFAULT_MODEL, GeminiClient},
    credentials::{AdminPasswordHash, CredentialCheck, DenyAll},
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "modelland",
    about = "Model Land site content server",
    version = crate::version::VERSION,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub config: Config,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP server (default).
    Run,

    /// Write a backup of all site content.
    Export(ExportArgs),

    /// Restore site content from a backup file.
    Import(ImportArgs),

    /// Delete all stored content so defaults are reseeded.
    Reset,

    /// Print an argon2id hash for MODELLAND_ADMIN_PASSWORD_HASH.
    HashAdminPassword(HashAdminPasswordArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Output file; defaults to `modelland-data-<date>.json` in the current directory.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Write to stdout instead of a file.
    #[arg(long, conflicts_with = "out")]
    pub stdout: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct HashAdminPasswordArgs {
    /// Read the password from this environment variable instead of stdin.
    #[arg(long, value_name = "VAR")]
    pub from_env: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct Config {
    #[arg(
        long,
        global = true,
        env = "MODELLAND_BIND",
        value_name = "ADDR",
        default_value = "127.0.0.1:8080"
    )]
    pub bind: SocketAddr,

    #[arg(
        long,
        global = true,
        env = "MODELLAND_DATA_DIR",
        value_name = "PATH",
        default_value = "./data"
    )]
    pub data_dir: PathBuf,

    #[arg(
        long,
        global = true,
        env = "MODELLAND_ADMIN_PASSWORD_HASH",
        value_name = "HASH",
        default_value = "",
        hide_env_values = true
    )]
    pub admin_password_hash: String,

    #[arg(
        long,
        global = true,
        env = "MODELLAND_CHAT_API_KEY",
        value_name = "KEY",
        default_value = "",
        hide_env_values = true
    )]
    pub chat_api_key: String,

    #[arg(
        long,
        global = true,
        env = "MODELLAND_CHAT_MODEL",
        value_name = "MODEL",
        default_value = DEFAULT_MODEL
    )]
    pub chat_model: String,

    #[arg(
        long,
        global = true,
        env = "MODELLAND_CHAT_API_BASE_URL",
        value_name = "URL",
        default_value = DEFAULT_API_BASE_URL
    )]
    pub chat_api_base_url: String,

    #[arg(
        long = "chat-timeout-secs",
        global = true,
        env = "MODELLAND_CHAT_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=120)
    )]
    pub chat_timeout_secs: u64,
}

impl Config {
    pub fn admin_password_hash(&self) -> Option<AdminPasswordHash> {
        AdminPasswordHash::parse(&self.admin_password_hash)
    }

    /// Credential check for the admin API; denies everything when no valid hash is set.
    pub fn admin_credentials(&self) -> Arc<dyn CredentialCheck> {
        match self.admin_password_hash() {
            Some(hash) => Arc::new(hash),
            None => Arc::new(DenyAll),
        }
    }

    /// `None` when no API key is configured.
    pub fn chat_client(&self) -> Result<Option<Arc<dyn ChatClient>>, ChatError> {
        let key = self.chat_api_key.trim();
        if key.is_empty() {
            return Ok(None);
        }
        let client = GeminiClient::new(
            key,
            self.chat_model.clone(),
            self.chat_api_base_url.clone(),
            Duration::from_secs(self.chat_timeout_secs),
        )?;
        Ok(Some(Arc::new(client)))
    }
}
