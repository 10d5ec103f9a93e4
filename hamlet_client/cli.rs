use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use hamlet_app::{
    cqrs::queries::QueueItemKind,
    session::{GameSession, SessionDeps},
    sync::SyncStatus,
};
use hamlet_game::models::buildings::BuildingStatus;
use hamlet_types::{
    Result, buildings::BuildingName, errors::ApplicationError, warriors::WarriorName,
};

#[derive(Debug, Parser)]
#[command(name = "hamlet", version, about = "Drive a hamlet village from the terminal")]
pub struct Cli {
    /// Player whose village is loaded.
    pub player_id: Uuid,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resources, buildings, troops and pending work.
    Status,
    /// Builds a building, or upgrades it when already built.
    Build {
        building: BuildingName,
        #[arg(long)]
        location: Option<u32>,
    },
    /// Queues troops, e.g. `train swordsman=5 archer=2`.
    Train {
        #[arg(required = true, value_parser = parse_selection)]
        selections: Vec<(WarriorName, u32)>,
    },
    /// Raises a warrior type by one level.
    LevelUp { warrior: WarriorName },
    /// Sends failed or pending backend updates again.
    Reconcile,
    /// Keeps the job worker running until Ctrl-C.
    Run,
}

fn parse_selection(s: &str) -> Result<(WarriorName, u32), String> {
    let (name, count) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <warrior>=<count>, got '{s}'"))?;
    let warrior = name.parse::<WarriorName>().map_err(|e| e.to_string())?;
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid count '{count}': {e}"))?;
    Ok((warrior, count))
}

/// Repeated entries for the same warrior add up.
fn merge_selections(selections: Vec<(WarriorName, u32)>) -> BTreeMap<WarriorName, u32> {
    let mut merged = BTreeMap::new();
    for (warrior, count) in selections {
        let total: &mut u32 = merged.entry(warrior).or_insert(0);
        *total = total.saturating_add(count);
    }
    merged
}

pub async fn run(args: Cli, deps: SessionDeps) -> Result<()> {
    if let Command::Run = args.command {
        return run_worker(args.player_id, deps).await;
    }

    let session = GameSession::open(args.player_id, deps).await?;
    // completions that fell due while the client was closed
    let ran = session.process_due_jobs().await?;
    if ran > 0 {
        info!(count = ran, "Applied completions due since last run");
    }

    let outcome = match args.command {
        Command::Status => Ok(()),
        Command::Build { building, location } => session.build_or_upgrade(building, location).await,
        Command::Train { selections } => session.train(merge_selections(selections)).await,
        Command::LevelUp { warrior } => session.level_up(warrior).await,
        Command::Reconcile => session.reconcile().await.map(|report| {
            println!(
                "Reconciled: {} confirmed, {} failed",
                report.confirmed, report.failed
            );
        }),
        Command::Run => Ok(()),
    };

    session.wait_for_sync().await;
    match outcome {
        Ok(()) => print_status(&session).await?,
        Err(ApplicationError::Game(e)) => println!("Not possible: {e}"),
        Err(e) => return Err(e),
    }

    session.logout().await;
    Ok(())
}

async fn run_worker(player_id: Uuid, deps: SessionDeps) -> Result<()> {
    let session = GameSession::login(player_id, deps).await?;
    print_status(&session).await?;
    info!("Worker running, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| ApplicationError::Infrastructure(e.to_string()))?;

    session.wait_for_sync().await;
    session.logout().await;
    Ok(())
}

async fn print_status(session: &GameSession) -> Result<()> {
    let overview = session.overview().await?;
    println!("Village {}", overview.village_id);
    println!(
        "  resources  {} (capacity {})",
        overview.resources, overview.storage_capacity
    );
    println!("  production {} per hour", overview.production);
    println!(
        "  troops     {}/{}",
        overview.total_troops, overview.troop_capacity
    );
    println!(
        "  player     level {}, {} xp",
        overview.stats.level, overview.stats.experience
    );

    println!("Buildings");
    for b in session.buildings().await? {
        let state = match b.status {
            BuildingStatus::Unbuilt => "unbuilt".to_string(),
            BuildingStatus::Built { level } => format!("level {level}/{}", b.max_level),
            BuildingStatus::UnderConstruction {
                target_level,
                finish_time,
            } => format!("building level {target_level}, ready at {finish_time}"),
        };
        let next = match b.next_cost {
            Some(cost) => format!("next: {cost}"),
            None => "max level".to_string(),
        };
        println!("  {:<14} {state} ({next})", b.name.to_string());
    }

    println!("Warriors");
    for w in session.roster().await? {
        println!(
            "  {:<10} level {} x{} (+{} queued)",
            w.name.to_string(),
            w.level,
            w.count,
            w.queued
        );
    }

    let queue = session.job_queue().await?;
    if !queue.is_empty() {
        println!("Queue");
        for item in queue {
            let what = match item.kind {
                QueueItemKind::Construction { building, level } => {
                    format!("{building} level {level}")
                }
                QueueItemKind::Training { warrior, remaining } => {
                    format!("{remaining} {warrior} in training")
                }
                QueueItemKind::LevelUp { warrior, level } => format!("{warrior} to level {level}"),
            };
            println!("  {what} at {}", item.finishes_at);
        }
    }

    let unsynced = session
        .sync_intents()
        .await?
        .into_iter()
        .filter(|i| i.status != SyncStatus::Confirmed)
        .count();
    if unsynced > 0 {
        println!("{unsynced} change(s) not confirmed by the backend, run `reconcile`");
    }

    for n in session.notifications().await?.iter().filter(|n| !n.read) {
        println!("! {}: {}", n.title, n.body);
    }
    Ok(())
}
