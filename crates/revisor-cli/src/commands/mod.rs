pub mod history;
pub mod init;

use clap::Args;
use revisor_core::config::RevisionerConfig;
use std::path::PathBuf;

/// Database and configuration shared by every command
#[derive(Debug, Args)]
pub struct StoreArgs {
    #[arg(long, default_value = ".revisor/revisions.db")]
    pub db: PathBuf,

    /// YAML revisioner configuration; defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl StoreArgs {
    pub fn load_config(&self) -> Result<RevisionerConfig, Box<dyn std::error::Error>> {
        Ok(match &self.config {
            Some(path) => RevisionerConfig::from_yaml_file(path)?,
            None => RevisionerConfig::default(),
        })
    }
}
