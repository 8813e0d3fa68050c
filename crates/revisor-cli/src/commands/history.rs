//! History read commands
//!
//! Output is JSON on stdout.

use super::StoreArgs;
use clap::{Args, Subcommand};
use revisor_core::model::{entity_key, InstanceId, RevisionId};
use revisor_core::query::{ListOptions, Projection};
use revisor_core::RevisionerConfig;
use revisor_engine::Revisioner;
use revisor_store::db;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List revisions of one instance, oldest first
    List(ListArgs),
    /// Show one revision of one instance
    Show(ShowArgs),
    /// Count revisions of one instance
    Count(InstanceArgs),
}

#[derive(Debug, Args)]
pub struct InstanceArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Instance type tag, e.g. Post
    #[arg(long = "type")]
    pub instance_type: String,

    /// Instance id
    #[arg(long = "id")]
    pub instance_id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Include type, instance id and body
    #[arg(long)]
    pub full: bool,

    /// Newest first
    #[arg(long)]
    pub desc: bool,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub offset: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Revision id
    #[arg(long)]
    pub revision: String,
}

pub fn execute(args: HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        HistoryCommand::List(list_args) => execute_list(list_args),
        HistoryCommand::Show(show_args) => execute_show(show_args),
        HistoryCommand::Count(count_args) => execute_count(count_args),
    }
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (revisioner, conn, instance_id) = open(&args.instance)?;

    let mut options = ListOptions {
        limit: args.limit,
        offset: args.offset,
        ..ListOptions::default()
    };
    if args.full {
        options = options.with_projection(Projection::full());
    }
    if args.desc {
        options = options.newest_first();
    }

    let rows = revisioner.history().list_revisions(
        &conn,
        &args.instance.instance_type,
        &instance_id,
        &options,
    )?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn execute_show(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (revisioner, conn, instance_id) = open(&args.instance)?;
    let revision_id = RevisionId::parse(revisioner.config().primary_key, &args.revision)
        .ok_or_else(|| {
            format!(
                "'{}' is not a {} revision id",
                args.revision,
                revisioner.config().primary_key.as_str()
            )
        })?;

    let revision = revisioner
        .history()
        .get_revision(
            &conn,
            &args.instance.instance_type,
            &instance_id,
            &revision_id,
        )?
        .ok_or_else(|| {
            format!(
                "revision {} not found for {}",
                revision_id,
                entity_key(&args.instance.instance_type, &instance_id)
            )
        })?;

    println!("{}", serde_json::to_string_pretty(&revision)?);
    Ok(())
}

fn execute_count(args: InstanceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (revisioner, conn, instance_id) = open(&args)?;
    let count = revisioner
        .store()
        .count(&conn, &args.instance_type, &instance_id)?;
    println!("{}", count);
    Ok(())
}

fn open(
    args: &InstanceArgs,
) -> Result<(Revisioner, rusqlite::Connection, InstanceId), Box<dyn std::error::Error>> {
    let config: RevisionerConfig = args.store.load_config()?;
    let instance_id = config
        .instance_id_type
        .parse(&args.instance_id)
        .ok_or_else(|| {
            format!(
                "'{}' is not a {} instance id",
                args.instance_id,
                config.instance_id_type.as_str()
            )
        })?;
    if !args.store.db.exists() {
        return Err(format!("database {} does not exist", args.store.db.display()).into());
    }
    let revisioner = Revisioner::new(config)?;
    let conn = db::open_read_only(&args.store.db)?;
    Ok((revisioner, conn, instance_id))
}
