//! Revision table initialisation

use super::StoreArgs;
use clap::Args;
use revisor_engine::Revisioner;
use revisor_store::db;

#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.store.load_config()?;
    let revisioner = Revisioner::new(config)?;

    if let Some(parent) = args.store.db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut conn = db::open(&args.store.db)?;
    revisioner.migrate(&mut conn)?;

    let config = revisioner.config();
    println!(
        "Initialised revision table '{}' in {} (primary key: {}, instance ids: {}, bodies: {:?})",
        config.table_name,
        args.store.db.display(),
        config.primary_key.as_str(),
        config.instance_id_type.as_str(),
        config.body_storage
    );
    Ok(())
}
