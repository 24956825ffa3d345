// Integration tests for the auction console.
//
// These tests exercise the full system end-to-end using the library crate's
// public API. They verify that the major subsystems (auction workflow,
// persistence, CSV import/export, the change feed, and the lock flag) work
// together correctly.

use std::sync::Arc;

use auction_console::app::{AppState, Command, Update};
use auction_console::auction::bid::{default_tiers, BidStrategy};
use auction_console::auction::log::LogAction;
use auction_console::auction::player::{NewPlayer, PlayerStatus, Role};
use auction_console::auction::state::{BlockState, CurrentBid};
use auction_console::config::{AuctionConfig, Config, CredentialsConfig};
use auction_console::db::Database;
use auction_console::service::ObjectStore;

use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to project root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

/// Build a test-ready Config with inline auction settings (no files).
fn inline_config() -> Config {
    Config {
        auction: AuctionConfig {
            base_min_bid: 1000,
            total_points: 50_000,
            max_players: 15,
            max_retain_players: 2,
            strategy: BidStrategy::FlatReserve,
            enforce_recommended_ceiling: true,
            bid_increments: default_tiers(),
        },
        credentials: CredentialsConfig::default(),
        ws_port: 0,
        db_path: ":memory:".into(),
        storage_root: None,
    }
}

/// A unique temp path for per-test scratch files.
fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "auction-console-it-{}-{}-{name}",
        std::process::id(),
        rand::random::<u32>()
    ))
}

/// Create a full AppState wired to the given database.
fn create_test_app(db: Arc<Database>) -> (AppState, mpsc::Receiver<Update>) {
    let store_dir = scratch_path("store");
    let store = ObjectStore::open(Some(store_dir.to_str().expect("utf-8 temp dir")))
        .expect("object store should open");
    let (update_tx, update_rx) = mpsc::channel(1024);
    let app = AppState::new(inline_config(), db, store, update_tx)
        .expect("app state should build");
    (app, update_rx)
}

fn create_in_memory_app() -> (AppState, mpsc::Receiver<Update>) {
    let db = Arc::new(Database::open(":memory:").expect("in-memory db"));
    create_test_app(db)
}

/// Drive the selection animation until a player lands on the block.
async fn run_selection(app: &mut AppState) {
    app.handle_command(Command::SelectRandomPlayer).await;
    for _ in 0..32 {
        if app.auction.player_on_block().is_some() {
            return;
        }
        app.tick_selection().await;
    }
    panic!("selection never revealed a player");
}

async fn seed_team(app: &mut AppState, name: &str) -> i64 {
    app.handle_command(Command::CreateTeam { name: name.into() }).await;
    app.db
        .teams()
        .expect("teams should list")
        .into_iter()
        .find(|t| t.team_name == name)
        .expect("team should exist")
        .id
}

async fn seed_player(app: &mut AppState, name: &str, role: Role, base_price: i64) -> i64 {
    app.handle_command(Command::AddPlayer {
        new: NewPlayer { name: name.into(), role, base_price },
    })
    .await;
    app.db
        .players()
        .expect("players should list")
        .into_iter()
        .find(|p| p.name == name)
        .expect("player should exist")
        .id
}

// ===========================================================================
// Full auction flow
// ===========================================================================

#[tokio::test]
async fn full_auction_flow_updates_every_counter() {
    let (mut app, _rx) = create_in_memory_app();
    let team_id = seed_team(&mut app, "Chennai Strikers").await;
    let player_id = seed_player(&mut app, "V Sharma", Role::Batsman, 1000).await;

    run_selection(&mut app).await;
    assert_eq!(app.auction.player_on_block(), Some(player_id));

    app.handle_command(Command::PlaceBid { team_id, amount: 4000 }).await;
    assert_eq!(app.auction.current_bid, Some(CurrentBid { team_id, amount: 4000 }));

    app.handle_command(Command::FinalizeSale).await;

    let team = app.db.team(team_id).expect("fetch").expect("exists");
    assert_eq!(team.points_used, 4000);
    assert_eq!(team.points_left, 46_000); // 50000 - 4000
    assert_eq!(team.players_count, 1);
    assert_eq!(team.balance_players_count, 14); // 15 - 1
    assert!(team.budget_consistent());

    let player = app.db.player(player_id).expect("fetch").expect("exists");
    assert_eq!(player.status, PlayerStatus::Sold);
    assert_eq!(player.sold_price, Some(4000));
    assert_eq!(player.sold_to, Some(team_id));
    assert_eq!(player.sold_team.as_deref(), Some("Chennai Strikers"));
    assert!(player.sale_fields_consistent());

    let logs = app.db.logs().expect("logs should list");
    let sold: Vec<_> = logs.iter().filter(|l| l.action == LogAction::Sold).collect();
    assert_eq!(sold.len(), 1);
    assert_eq!(sold[0].bid_amount, 4000);
    assert_eq!(sold[0].team_name, "Chennai Strikers");

    assert_eq!(app.auction.block, BlockState::Idle);
    assert!(app.auction.current_bid.is_none());
}

#[tokio::test]
async fn recommended_ceiling_blocks_overbids() {
    let (mut app, _rx) = create_in_memory_app();
    let team_id = seed_team(&mut app, "Chennai Strikers").await;
    seed_player(&mut app, "V Sharma", Role::Batsman, 1000).await;
    run_selection(&mut app).await;

    // Flat reserve: 50000 - 14 * 1000 = 36000 is the ceiling.
    app.handle_command(Command::PlaceBid { team_id, amount: 36_500 }).await;
    assert!(app.auction.current_bid.is_none());

    app.handle_command(Command::PlaceBid { team_id, amount: 36_000 }).await;
    assert_eq!(
        app.auction.current_bid,
        Some(CurrentBid { team_id, amount: 36_000 })
    );
}

#[tokio::test]
async fn unsold_players_can_be_resold_later() {
    let (mut app, _rx) = create_in_memory_app();
    let team_id = seed_team(&mut app, "Chennai Strikers").await;
    let player_id = seed_player(&mut app, "V Sharma", Role::Batsman, 1000).await;

    run_selection(&mut app).await;
    app.handle_command(Command::MarkUnsold).await;

    let player = app.db.player(player_id).expect("fetch").expect("exists");
    assert_eq!(player.status, PlayerStatus::Unsold);
    assert!(player.sale_fields_consistent());

    // The unsold pool feeds the block once the fresh pool is empty.
    run_selection(&mut app).await;
    app.handle_command(Command::PlaceBid { team_id, amount: 2000 }).await;
    app.handle_command(Command::FinalizeSale).await;

    let player = app.db.player(player_id).expect("fetch").expect("exists");
    assert_eq!(player.status, PlayerStatus::Sold);
    assert_eq!(player.sold_price, Some(2000));
    assert!(player.sale_fields_consistent());
}

#[tokio::test]
async fn reset_restores_the_opening_state() {
    let (mut app, _rx) = create_in_memory_app();
    let team_id = seed_team(&mut app, "Chennai Strikers").await;
    let player_id = seed_player(&mut app, "V Sharma", Role::Batsman, 1000).await;
    let retained_id = seed_player(&mut app, "K Iyer", Role::Allrounder, 1500).await;

    app.handle_command(Command::RetainPlayer { player_id: retained_id, team_id }).await;
    run_selection(&mut app).await;
    app.handle_command(Command::PlaceBid { team_id, amount: 4000 }).await;
    app.handle_command(Command::FinalizeSale).await;

    app.handle_command(Command::ResetAuction).await;

    let team = app.db.team(team_id).expect("fetch").expect("exists");
    assert_eq!(team.points_used, 0);
    assert_eq!(team.points_left, 50_000);
    assert_eq!(team.players_count, 0);
    assert_eq!(team.retained_players_count, 0);
    assert_eq!(team.balance_players_count, 15);

    for id in [player_id, retained_id] {
        let player = app.db.player(id).expect("fetch").expect("exists");
        assert_eq!(player.status, PlayerStatus::Available);
        assert_eq!(player.retained_team, None);
        assert!(player.sale_fields_consistent());
    }

    assert!(app.db.logs().expect("logs").is_empty());
    assert_eq!(app.auction.block, BlockState::Idle);
}

// ===========================================================================
// CSV import and export
// ===========================================================================

#[tokio::test]
async fn csv_import_feeds_the_pool_and_reports_bad_rows() {
    let (mut app, mut rx) = create_in_memory_app();
    app.handle_command(Command::ImportPlayers {
        path: format!("{FIXTURES}/sample_players.csv").into(),
    })
    .await;

    let mut imported = None;
    while let Ok(update) = rx.try_recv() {
        if let Update::PlayersImported { count, issues } = update {
            imported = Some((count, issues));
        }
    }
    let (count, issues) = imported.expect("import update");
    assert_eq!(count, 6); // 7 data rows, one with a bad price
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].line, 7); // header is line 1

    let players = app.db.players().expect("players should list");
    assert_eq!(players.len(), 6);
    let sharma = players.iter().find(|p| p.name == "V Sharma").expect("imported");
    assert_eq!(sharma.role, Role::Batsman);
    assert_eq!(sharma.base_price, 2000);
    let nair = players.iter().find(|p| p.name == "S Nair").expect("imported");
    assert_eq!(nair.role, Role::Wicketkeeper);
}

#[tokio::test]
async fn results_export_reflects_completed_sales() {
    let (mut app, _rx) = create_in_memory_app();
    let team_id = seed_team(&mut app, "Chennai Strikers").await;
    seed_player(&mut app, "V Sharma", Role::Batsman, 1000).await;
    seed_player(&mut app, "R Patel", Role::Bowler, 1000).await;

    run_selection(&mut app).await;
    app.handle_command(Command::PlaceBid { team_id, amount: 3000 }).await;
    app.handle_command(Command::FinalizeSale).await;

    let out = scratch_path("results.csv");
    app.handle_command(Command::ExportResults { path: out.clone() }).await;

    let contents = std::fs::read_to_string(&out).expect("export should exist");
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("player_name,role,base_price,sold_price,team")
    );
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 2);
    let sold_row = rows
        .iter()
        .find(|r| r.contains("3000"))
        .expect("sold player in export");
    assert!(sold_row.contains("Chennai Strikers"));
    let unsold_row = rows.iter().find(|r| r.ends_with("-")).expect("pool player in export");
    assert!(!unsold_row.contains("3000"));

    let _ = std::fs::remove_file(out);
}

// ===========================================================================
// Change feed
// ===========================================================================

#[tokio::test]
async fn settlement_broadcasts_on_the_change_feed() {
    let (mut app, _rx) = create_in_memory_app();
    let team_id = seed_team(&mut app, "Chennai Strikers").await;
    seed_player(&mut app, "V Sharma", Role::Batsman, 1000).await;
    run_selection(&mut app).await;
    app.handle_command(Command::PlaceBid { team_id, amount: 2000 }).await;

    let mut changes = app.db.subscribe_changes();
    app.handle_command(Command::FinalizeSale).await;

    let mut tables = Vec::new();
    while let Ok(event) = changes.try_recv() {
        tables.push(event.table);
    }
    assert!(tables.contains(&"players"));
    assert!(tables.contains(&"teams"));
    assert!(tables.contains(&"auction_logs"));
}

// ===========================================================================
// Lock persistence
// ===========================================================================

#[tokio::test]
async fn lock_flag_survives_a_restart() {
    let db_path = scratch_path("lock.db");
    let db_str = db_path.to_str().expect("utf-8 temp dir").to_string();

    {
        let db = Arc::new(Database::open(&db_str).expect("file-backed db"));
        let (mut app, _rx) = create_test_app(db);
        app.handle_command(Command::SetLock(true)).await;
        assert!(app.auction.locked);
    }

    // A fresh process sees the flag.
    let db = Arc::new(Database::open(&db_str).expect("file-backed db"));
    let (mut app, _rx) = create_test_app(db);
    assert!(app.auction.locked);

    let team_id = seed_team(&mut app, "Chennai Strikers").await;
    seed_player(&mut app, "V Sharma", Role::Batsman, 1000).await;
    app.handle_command(Command::SelectRandomPlayer).await;
    assert_eq!(app.auction.block, BlockState::Idle);
    let _ = team_id;

    let _ = std::fs::remove_file(&db_path);
}
