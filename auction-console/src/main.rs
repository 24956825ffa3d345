// Auction console entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not the operator terminal)
// 2. Load config
// 3. Open database
// 4. Open the object store, build the auth service
// 5. Create mpsc channels
// 6. Spawn the WebSocket change feed
// 7. Spawn the application loop
// 8. Run the operator console on stdin until quit
// 9. Cleanup on exit

use auction_console::app::{self, Command, Update};
use auction_console::auction::bid::format_points;
use auction_console::config;
use auction_console::db::Database;
use auction_console::realtime;
use auction_console::service::{AuthService, ObjectStore};

use anyhow::Context;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not the operator terminal)
    init_tracing()?;
    info!("Auction console starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} point budget, {} player squads, base bid {}",
        config.auction.total_points, config.auction.max_players, config.auction.base_min_bid
    );

    // 3. Open database
    let db = Arc::new(Database::open(&config.db_path).context("failed to open database")?);
    info!("Database opened at {}", config.db_path);

    // 4. Object store and auth
    let store = ObjectStore::open(config.storage_root.as_deref())
        .context("failed to open object store")?;
    info!("Object store rooted at {}", store.root().display());

    let auth = AuthService::new(&config.credentials);
    if auth.is_configured() {
        info!("Admin credentials configured; console requires login");
    } else {
        info!("No admin credentials configured; console is open");
    }

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (update_tx, mut update_rx) = mpsc::channel(256);

    // 6. Spawn the WebSocket change feed
    let ws_port = config.ws_port;
    let feed_db = db.clone();
    let feed_handle = tokio::spawn(async move {
        if let Err(e) = realtime::run(ws_port, feed_db).await {
            error!("Change feed error: {}", e);
        }
    });

    // 7. Spawn the application loop
    let app_state = app::AppState::new(config, db, store, update_tx)
        .context("failed to build application state")?;
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(app_state, cmd_rx).await {
            error!("Application loop error: {}", e);
        }
    });

    // Print updates as they arrive.
    let printer_handle = tokio::spawn(async move {
        while let Some(update) = update_rx.recv().await {
            println!("{}", render_update(&update));
        }
    });

    // 8. Operator console: one command per line.
    info!("Console ready; change feed on 127.0.0.1:{}", ws_port);
    run_console(auth, cmd_tx).await?;

    // 9. Cleanup: wait for the app task to drain (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    // The change feed and printer loop forever
    feed_handle.abort();
    printer_handle.abort();

    info!("Auction console shut down cleanly");
    Ok(())
}

/// Read operator commands from stdin. `login` and `logout` are handled
/// here; everything else goes through the command channel, gated on a
/// session when credentials are configured.
async fn run_console(auth: AuthService, cmd_tx: mpsc::Sender<Command>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("login") => {
                let (email, password) = (parts.next(), parts.next());
                match (email, password) {
                    (Some(email), Some(password)) => match auth.login(email, password) {
                        Ok(session) => println!("logged in as {}", session.email),
                        Err(e) => println!("error: {e}"),
                    },
                    _ => println!("usage: login <email> <password>"),
                }
                continue;
            }
            Some("logout") => {
                auth.logout();
                println!("logged out");
                continue;
            }
            _ => {}
        }

        if auth.is_configured() && auth.current_user().is_err() {
            println!("login required");
            continue;
        }

        match app::parse_command(line) {
            Ok(cmd) => {
                let shutdown = cmd == Command::Shutdown;
                if cmd_tx.send(cmd).await.is_err() {
                    break;
                }
                if shutdown {
                    break;
                }
            }
            Err(e) => println!("error: {e}"),
        }
    }
    Ok(())
}

fn render_update(update: &Update) -> String {
    match update {
        Update::TeamCreated(team) => {
            format!("team '{}' registered (id {})", team.team_name, team.id)
        }
        Update::TeamDeleted(id) => format!("team {id} deleted"),
        Update::PlayerDeleted(id) => format!("player {id} deleted"),
        Update::PlayerAdded(player) => format!(
            "player '{}' added ({}, base {})",
            player.name,
            player.role,
            format_points(player.base_price)
        ),
        Update::PlayersImported { count, issues } => {
            if issues.is_empty() {
                format!("imported {count} players")
            } else {
                let mut out = format!("imported {count} players, {} rows skipped:", issues.len());
                for issue in issues {
                    out.push_str(&format!("\n  line {}: {}", issue.line, issue.message));
                }
                out
            }
        }
        Update::SelectionTick { display_name } => format!("  ... {display_name}"),
        Update::PlayerOnBlock(player) => format!(
            "ON THE BLOCK: {} ({}, base {})",
            player.name,
            player.role,
            format_points(player.base_price)
        ),
        Update::NoEligiblePlayers => "no eligible players remain".to_string(),
        Update::BidPlaced { team, amount } => format!(
            "bid {} by '{}' ({} left)",
            format_points(*amount),
            team.team_name,
            format_points(team.points_left)
        ),
        Update::SaleFinalized { player, team } => format!(
            "SOLD: {} to '{}' for {} ({} left, {} slots)",
            player.name,
            team.team_name,
            format_points(player.sold_price.unwrap_or_default()),
            format_points(team.points_left),
            team.balance_players_count
        ),
        Update::MarkedUnsold(player) => format!("unsold: {}", player.name),
        Update::PlayerRetained { player, team } => format!(
            "retained: {} by '{}' at {}",
            player.name,
            team.team_name,
            format_points(player.base_price)
        ),
        Update::PhotoAttached { player, url } => {
            format!("photo for '{}' at {url}", player.name)
        }
        Update::FixturesGenerated(fixtures) => {
            let mut out = format!("{} fixtures:", fixtures.len());
            for f in fixtures {
                out.push_str(&format!("\n  {}. {} vs {}", f.match_number, f.team1, f.team2));
            }
            out
        }
        Update::DrawStarted { groups } => format!("group draw started: {}", groups.join(", ")),
        Update::TeamDrawn(team) => format!("drawn: {team}"),
        Update::TeamAssigned { team, group, draw_complete } => {
            if *draw_complete {
                format!("{team} -> {group}; draw complete")
            } else {
                format!("{team} -> {group}")
            }
        }
        Update::GroupFixturesGenerated(groups) => {
            let mut out = String::from("group fixtures:");
            for (group, fixtures) in groups {
                out.push_str(&format!("\n{group}:"));
                for f in fixtures {
                    out.push_str(&format!(
                        "\n  {}. {} vs {}",
                        f.match_number, f.team1, f.team2
                    ));
                }
            }
            out
        }
        Update::AuctionReset => "auction reset".to_string(),
        Update::LockChanged(true) => "auction locked".to_string(),
        Update::LockChanged(false) => "auction unlocked".to_string(),
        Update::Exported(path) => format!("exported {}", path.display()),
        Update::Error(message) => format!("error: {message}"),
    }
}

/// Initialize tracing to log to a file (the terminal belongs to the
/// operator console).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("auction-console.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("auction_console=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
