// Application orchestration: owns the workflow state and applies every
// auction mutation through the database, one command at a time.

use anyhow::{anyhow, Context, Result};
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::auction::log::LogAction;
use crate::auction::player::{NewPlayer, Player, PlayerStatus};
use crate::auction::state::{
    pick_random_player, settle_retention, settle_sale, validate_bid, AuctionError, AuctionState,
    BlockState, CurrentBid,
};
use crate::auction::team::Team;
use crate::config::Config;
use crate::db::Database;
use crate::export::{self, ImportIssue};
use crate::schedule::{generate_round_robin, shuffle_schedule, Fixture, GroupDraw};
use crate::service::ObjectStore;

/// How many animation frames the cosmetic selection phase shows
/// before revealing the pre-drawn pick.
const SELECTION_TICKS: u8 = 12;
const SELECTION_TICK_MS: u64 = 150;

// ---------------------------------------------------------------------------
// Commands and updates
// ---------------------------------------------------------------------------

/// Operator commands, applied strictly one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTeam { name: String },
    DeleteTeam { id: i64 },
    AddPlayer { new: NewPlayer },
    DeletePlayer { id: i64 },
    ImportPlayers { path: PathBuf },
    SelectRandomPlayer,
    PlaceBid { team_id: i64, amount: i64 },
    FinalizeSale,
    MarkUnsold,
    RetainPlayer { player_id: i64, team_id: i64 },
    AttachPhoto { player_id: i64, path: PathBuf },
    GenerateFixtures,
    StartGroupDraw { num_groups: usize },
    DrawTeam,
    AssignDrawn { group: String },
    GroupFixtures,
    ResetAuction,
    SetLock(bool),
    ExportResults { path: PathBuf },
    ExportTeamSummary { path: PathBuf },
    Shutdown,
}

/// Updates pushed to the operator console.
#[derive(Debug, Clone)]
pub enum Update {
    TeamCreated(Team),
    TeamDeleted(i64),
    PlayerAdded(Player),
    PlayerDeleted(i64),
    PlayersImported { count: usize, issues: Vec<ImportIssue> },
    /// One frame of the selection animation; cycles through pool names.
    SelectionTick { display_name: String },
    PlayerOnBlock(Player),
    NoEligiblePlayers,
    BidPlaced { team: Team, amount: i64 },
    SaleFinalized { player: Player, team: Team },
    MarkedUnsold(Player),
    PlayerRetained { player: Player, team: Team },
    PhotoAttached { player: Player, url: String },
    FixturesGenerated(Vec<Fixture>),
    DrawStarted { groups: Vec<String> },
    TeamDrawn(String),
    TeamAssigned { team: String, group: String, draw_complete: bool },
    GroupFixturesGenerated(Vec<(String, Vec<Fixture>)>),
    AuctionReset,
    LockChanged(bool),
    Exported(PathBuf),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

struct SelectionAnimation {
    pending_player_id: i64,
    ticks_left: u8,
    /// Names cycled through while the animation runs. Display only;
    /// the pick was already drawn.
    pool_names: Vec<String>,
}

pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
    pub store: ObjectStore,
    pub auction: AuctionState,
    selection: Option<SelectionAnimation>,
    /// In-progress group lottery, if one was started.
    draw: Option<GroupDraw>,
    update_tx: mpsc::Sender<Update>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<Database>,
        store: ObjectStore,
        update_tx: mpsc::Sender<Update>,
    ) -> Result<Self> {
        let locked = db.is_locked().context("failed to read lock flag")?;
        Ok(AppState {
            config,
            db,
            store,
            auction: AuctionState::new(locked),
            selection: None,
            draw: None,
            update_tx,
        })
    }

    async fn push(&self, update: Update) {
        // The console having gone away is not a reason to stop applying
        // commands.
        let _ = self.update_tx.send(update).await;
    }

    async fn report_error(&self, err: anyhow::Error) {
        warn!("command failed: {err:#}");
        self.push(Update::Error(format!("{err:#}"))).await;
    }

    pub async fn handle_command(&mut self, cmd: Command) {
        debug!("handling command {cmd:?}");
        let result = match cmd {
            Command::CreateTeam { name } => self.create_team(&name).await,
            Command::DeleteTeam { id } => self.delete_team(id).await,
            Command::AddPlayer { new } => self.add_player(new).await,
            Command::DeletePlayer { id } => self.delete_player(id).await,
            Command::ImportPlayers { path } => self.import_players(&path).await,
            Command::SelectRandomPlayer => self.select_random_player().await,
            Command::PlaceBid { team_id, amount } => self.place_bid(team_id, amount).await,
            Command::FinalizeSale => self.finalize_sale().await,
            Command::MarkUnsold => self.mark_unsold().await,
            Command::RetainPlayer { player_id, team_id } => {
                self.retain_player(player_id, team_id).await
            }
            Command::AttachPhoto { player_id, path } => {
                self.attach_photo(player_id, &path).await
            }
            Command::GenerateFixtures => self.generate_fixtures().await,
            Command::StartGroupDraw { num_groups } => self.start_group_draw(num_groups).await,
            Command::DrawTeam => self.draw_team().await,
            Command::AssignDrawn { group } => self.assign_drawn(&group).await,
            Command::GroupFixtures => self.group_fixtures().await,
            Command::ResetAuction => self.reset_auction().await,
            Command::SetLock(locked) => self.set_lock(locked).await,
            Command::ExportResults { path } => self.export_results(&path).await,
            Command::ExportTeamSummary { path } => self.export_team_summary(&path).await,
            Command::Shutdown => Ok(()),
        };
        if let Err(err) = result {
            self.report_error(err).await;
        }
    }

    // -----------------------------------------------------------------
    // Setup commands
    // -----------------------------------------------------------------

    async fn create_team(&mut self, name: &str) -> Result<()> {
        let team = self.db.create_team(name, &self.config.auction)?;
        info!("registered team '{}' (id {})", team.team_name, team.id);
        self.push(Update::TeamCreated(team)).await;
        Ok(())
    }

    async fn delete_team(&mut self, id: i64) -> Result<()> {
        self.db.delete_team(id)?;
        info!("deleted team {id}");
        self.push(Update::TeamDeleted(id)).await;
        Ok(())
    }

    async fn add_player(&mut self, new: NewPlayer) -> Result<()> {
        let player = self.db.create_player(&new)?;
        self.push(Update::PlayerAdded(player)).await;
        Ok(())
    }

    /// Remove a player along with their audit rows and stored photo.
    /// A player on the block must be settled first. Sold or retained
    /// players leave their team's counters as they are, mirroring the
    /// dangling semantics of team deletion.
    async fn delete_player(&mut self, id: i64) -> Result<()> {
        let player = self.db.player(id)?.ok_or(AuctionError::UnknownPlayer(id))?;
        if self.auction.involves_player(id) {
            return Err(anyhow!(AuctionError::PlayerOnBlock { name: player.name }));
        }
        for entry in self.db.logs()? {
            if entry.player_id == id {
                self.db.delete_log(entry.id)?;
            }
        }
        if let Some(object) = &player.photo_path {
            self.store.delete("player-photos", object)?;
        }
        self.db.delete_player(id)?;
        info!("deleted player '{}' (id {})", player.name, id);
        self.push(Update::PlayerDeleted(id)).await;
        Ok(())
    }

    async fn import_players(&mut self, path: &std::path::Path) -> Result<()> {
        let import = export::read_players_csv(path)?;
        let count = self.db.import_players(&import.players)?;
        info!(
            "imported {count} players from {} ({} rows skipped)",
            path.display(),
            import.issues.len()
        );
        self.push(Update::PlayersImported { count, issues: import.issues }).await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Auction workflow
    // -----------------------------------------------------------------

    async fn select_random_player(&mut self) -> Result<()> {
        if self.auction.locked {
            return Err(anyhow!(AuctionError::Locked));
        }
        if self.auction.block != BlockState::Idle {
            return Err(anyhow!(AuctionError::BlockOccupied));
        }
        let players = self.db.players()?;
        // The pick happens now; the animation that follows is display
        // only.
        let Some(picked) = pick_random_player(&players, &mut rand::thread_rng()) else {
            info!("selection requested but no eligible players remain");
            self.push(Update::NoEligiblePlayers).await;
            return Ok(());
        };
        let pool_names: Vec<String> = players
            .iter()
            .filter(|p| p.is_eligible_for_block())
            .map(|p| p.name.clone())
            .collect();
        info!("drew player '{}' (id {})", picked.name, picked.id);
        self.auction.block = BlockState::Selecting { pending_player_id: picked.id };
        self.selection = Some(SelectionAnimation {
            pending_player_id: picked.id,
            ticks_left: SELECTION_TICKS,
            pool_names,
        });
        Ok(())
    }

    /// Advance the selection animation one frame; on the last frame,
    /// reveal the pre-drawn pick.
    pub async fn tick_selection(&mut self) {
        let Some(animation) = self.selection.as_mut() else {
            return;
        };
        animation.ticks_left = animation.ticks_left.saturating_sub(1);
        if animation.ticks_left > 0 {
            let display_name = animation
                .pool_names
                .choose(&mut rand::thread_rng())
                .cloned()
                .unwrap_or_default();
            self.push(Update::SelectionTick { display_name }).await;
            return;
        }
        let player_id = animation.pending_player_id;
        self.selection = None;
        match self.db.player(player_id) {
            Ok(Some(player)) => {
                self.auction.block = BlockState::OnBlock { player_id };
                self.auction.current_bid = None;
                self.push(Update::PlayerOnBlock(player)).await;
            }
            Ok(None) => {
                // Deleted mid-animation; back to idle.
                self.auction.clear_block();
                self.report_error(anyhow!(AuctionError::UnknownPlayer(player_id))).await;
            }
            Err(err) => {
                self.auction.clear_block();
                self.report_error(err).await;
            }
        }
    }

    async fn place_bid(&mut self, team_id: i64, amount: i64) -> Result<()> {
        let player_id =
            self.auction.player_on_block().ok_or(AuctionError::NoPlayerOnBlock)?;
        let player =
            self.db.player(player_id)?.ok_or(AuctionError::UnknownPlayer(player_id))?;
        let team = self.db.team(team_id)?.ok_or(AuctionError::UnknownTeam(team_id))?;

        validate_bid(&self.auction, &player, &team, amount, &self.config.bid_rules())?;

        // The log write is the only remote step; the in-memory bid is
        // set only after it succeeds, so a failure leaves no trace.
        self.db.record_log(&crate::auction::log::LogDraft {
            player_id: player.id,
            player_name: player.name.clone(),
            team_id: team.id,
            team_name: team.team_name.clone(),
            bid_amount: amount,
            action: LogAction::Bid,
        })?;
        self.auction.current_bid = Some(CurrentBid { team_id, amount });
        info!("bid {} by '{}' on '{}'", amount, team.team_name, player.name);
        self.push(Update::BidPlaced { team, amount }).await;
        Ok(())
    }

    /// Hammer the current bid down. Three writes applied as a saga:
    /// player, team, then the sold log entry. A failure after the first
    /// write compensates the earlier steps in reverse order; if
    /// compensation itself fails, the inconsistency is logged for
    /// manual reconciliation.
    async fn finalize_sale(&mut self) -> Result<()> {
        if self.auction.locked {
            return Err(anyhow!(AuctionError::Locked));
        }
        let bid = self.auction.current_bid.ok_or(AuctionError::NoBidToFinalize)?;
        let player_id =
            self.auction.player_on_block().ok_or(AuctionError::NoPlayerOnBlock)?;
        let player =
            self.db.player(player_id)?.ok_or(AuctionError::UnknownPlayer(player_id))?;
        let team =
            self.db.team(bid.team_id)?.ok_or(AuctionError::UnknownTeam(bid.team_id))?;

        let outcome = settle_sale(&player, &team, bid)?;

        // Step 1: player -> sold.
        let mut sold = player.clone();
        sold.status = PlayerStatus::Sold;
        sold.sold_price = Some(outcome.patch.sold_price);
        sold.sold_to = Some(outcome.patch.sold_to);
        sold.sold_team = Some(outcome.patch.sold_team.clone());
        self.db.update_player(&sold).context("sale failed before any write took effect")?;

        // Step 2: team counters.
        if let Err(err) = self.db.update_team(&outcome.team_after) {
            warn!("sale settlement failed at the team update, compensating: {err:#}");
            if let Err(comp) = self.db.update_player(&player) {
                error!(
                    "compensation failed; player {} needs manual reconciliation: {comp:#}",
                    player.id
                );
            }
            return Err(err.context("sale aborted, player restored"));
        }

        // Step 3: audit trail.
        if let Err(err) = self.db.record_log(&outcome.log) {
            warn!("sale settlement failed at the log write, compensating: {err:#}");
            if let Err(comp) = self.db.update_team(&team) {
                error!(
                    "compensation failed; team {} needs manual reconciliation: {comp:#}",
                    team.id
                );
            }
            if let Err(comp) = self.db.update_player(&player) {
                error!(
                    "compensation failed; player {} needs manual reconciliation: {comp:#}",
                    player.id
                );
            }
            return Err(err.context("sale aborted, player and team restored"));
        }

        self.auction.clear_block();
        info!(
            "sold '{}' to '{}' for {}",
            sold.name, outcome.team_after.team_name, bid.amount
        );
        self.push(Update::SaleFinalized { player: sold, team: outcome.team_after }).await;
        Ok(())
    }

    async fn mark_unsold(&mut self) -> Result<()> {
        if self.auction.locked {
            return Err(anyhow!(AuctionError::Locked));
        }
        let player_id =
            self.auction.player_on_block().ok_or(AuctionError::NoPlayerOnBlock)?;
        let player =
            self.db.player(player_id)?.ok_or(AuctionError::UnknownPlayer(player_id))?;

        let mut unsold = player;
        unsold.status = PlayerStatus::Unsold;
        // The sale fields travel together: leaving `sold` clears all of
        // them, whether or not a stale value was present.
        unsold.sold_price = None;
        unsold.sold_to = None;
        unsold.sold_team = None;
        self.db.update_player(&unsold)?;

        self.auction.clear_block();
        info!("marked '{}' unsold", unsold.name);
        self.push(Update::MarkedUnsold(unsold)).await;
        Ok(())
    }

    /// Assign a player to a team at base price outside bidding. One
    /// routine covers the first retention and re-assignment: when the
    /// player was retained by another team, that team's counters are
    /// reversed before the new team is charged.
    async fn retain_player(&mut self, player_id: i64, team_id: i64) -> Result<()> {
        let player =
            self.db.player(player_id)?.ok_or(AuctionError::UnknownPlayer(player_id))?;
        // A player mid-bidding must be sold or marked unsold first;
        // retaining them here would charge two teams for one player.
        if self.auction.involves_player(player_id) {
            return Err(anyhow!(AuctionError::PlayerOnBlock { name: player.name }));
        }
        let team = self.db.team(team_id)?.ok_or(AuctionError::UnknownTeam(team_id))?;
        let previous_team = match player.retained_team {
            Some(prev_id) => self.db.team(prev_id)?,
            None => None,
        };

        let outcome = settle_retention(&player, &team, previous_team.as_ref())?;

        if let Some(released) = &outcome.release_team_after {
            self.db.update_team(released)?;
            info!("released retention of '{}' from '{}'", player.name, released.team_name);
        }
        self.db.update_team(&outcome.team_after)?;

        let mut retained = player;
        retained.retained_team = Some(outcome.retained_by);
        self.db.update_player(&retained)?;

        info!(
            "retained '{}' by '{}' at base price {}",
            retained.name, outcome.team_after.team_name, outcome.price
        );
        self.push(Update::PlayerRetained { player: retained, team: outcome.team_after }).await;
        Ok(())
    }

    async fn attach_photo(&mut self, player_id: i64, path: &std::path::Path) -> Result<()> {
        let player =
            self.db.player(player_id)?.ok_or(AuctionError::UnknownPlayer(player_id))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("photo path has no usable file name"))?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read photo {}", path.display()))?;
        let object = format!("players/{player_id}/{file_name}");
        self.store.upload("player-photos", &object, &bytes)?;

        let mut updated = player;
        updated.photo_path = Some(object.clone());
        self.db.update_player(&updated)?;

        let url = self.store.public_url("player-photos", &object);
        info!("attached photo for '{}' at {url}", updated.name);
        self.push(Update::PhotoAttached { player: updated, url }).await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------

    /// Full round robin over every registered team, shuffled.
    async fn generate_fixtures(&mut self) -> Result<()> {
        let names: Vec<String> =
            self.db.teams()?.into_iter().map(|t| t.team_name).collect();
        let mut fixtures = generate_round_robin(&names);
        shuffle_schedule(&mut fixtures, &mut rand::thread_rng());
        info!("generated {} fixtures for {} teams", fixtures.len(), names.len());
        self.push(Update::FixturesGenerated(fixtures)).await;
        Ok(())
    }

    async fn start_group_draw(&mut self, num_groups: usize) -> Result<()> {
        let names: Vec<String> =
            self.db.teams()?.into_iter().map(|t| t.team_name).collect();
        let draw = GroupDraw::new(names, num_groups)?;
        let groups = draw.groups().iter().map(|g| g.name.clone()).collect();
        self.draw = Some(draw);
        self.push(Update::DrawStarted { groups }).await;
        Ok(())
    }

    async fn draw_team(&mut self) -> Result<()> {
        let draw = self.draw.as_mut().ok_or_else(|| anyhow!("no group draw in progress"))?;
        let team = draw.draw_next(&mut rand::thread_rng())?;
        info!("drew '{team}' from the lottery pool");
        self.push(Update::TeamDrawn(team)).await;
        Ok(())
    }

    async fn assign_drawn(&mut self, group: &str) -> Result<()> {
        let draw = self.draw.as_mut().ok_or_else(|| anyhow!("no group draw in progress"))?;
        let team = draw.drawn().map(str::to_string).ok_or_else(|| anyhow!("nothing drawn"))?;
        draw.assign_drawn(group)?;
        let complete = draw.is_complete();
        self.push(Update::TeamAssigned {
            team,
            group: group.to_string(),
            draw_complete: complete,
        })
        .await;
        Ok(())
    }

    async fn group_fixtures(&mut self) -> Result<()> {
        let draw = self.draw.as_ref().ok_or_else(|| anyhow!("no group draw in progress"))?;
        let fixtures = draw.group_fixtures(&mut rand::thread_rng())?;
        self.push(Update::GroupFixturesGenerated(fixtures)).await;
        Ok(())
    }

    async fn reset_auction(&mut self) -> Result<()> {
        self.db.reset_auction()?;
        self.auction.clear_block();
        self.selection = None;
        info!("auction reset: players, teams, and logs wound back");
        self.push(Update::AuctionReset).await;
        Ok(())
    }

    async fn set_lock(&mut self, locked: bool) -> Result<()> {
        self.db.set_locked(locked)?;
        self.auction.locked = locked;
        info!("auction lock {}", if locked { "engaged" } else { "released" });
        self.push(Update::LockChanged(locked)).await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Exports
    // -----------------------------------------------------------------

    async fn export_results(&mut self, path: &std::path::Path) -> Result<()> {
        let players = self.db.players()?;
        let teams = self.db.teams()?;
        export::write_results_csv(path, &players, &teams)?;
        self.push(Update::Exported(path.to_path_buf())).await;
        Ok(())
    }

    async fn export_team_summary(&mut self, path: &std::path::Path) -> Result<()> {
        let teams = self.db.teams()?;
        export::write_team_summary_csv(path, &teams)?;
        self.push(Update::Exported(path.to_path_buf())).await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Drive the application until `Shutdown` arrives or the command
/// channel closes. A single actor owns every mutation: commands apply
/// sequentially, and the animation interval only fires while a
/// selection is running.
pub async fn run(mut app: AppState, mut cmd_rx: mpsc::Receiver<Command>) -> Result<()> {
    let mut animation = tokio::time::interval(Duration::from_millis(SELECTION_TICK_MS));
    // The first tick of a tokio interval fires immediately; consume it.
    animation.tick().await;

    loop {
        tokio::select! {
            maybe_cmd = cmd_rx.recv() => {
                match maybe_cmd {
                    None | Some(Command::Shutdown) => {
                        info!("shutting down");
                        break;
                    }
                    Some(cmd) => app.handle_command(cmd).await,
                }
            }
            _ = animation.tick(), if app.selection.is_some() => {
                app.tick_selection().await;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Command parsing (operator console lines)
// ---------------------------------------------------------------------------

/// Parse one operator console line into a command.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("empty command".to_string());
    };
    let rest = |mut parts: std::str::SplitWhitespace<'_>| -> String {
        parts.next().map(|first| {
            std::iter::once(first).chain(parts).collect::<Vec<_>>().join(" ")
        }).unwrap_or_default()
    };
    match verb {
        "team" => {
            let name = rest(parts);
            if name.is_empty() {
                return Err("usage: team <name>".to_string());
            }
            Ok(Command::CreateTeam { name })
        }
        "delete-team" => {
            let id = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: delete-team <team_id>")?;
            Ok(Command::DeleteTeam { id })
        }
        "delete-player" => {
            let id = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: delete-player <player_id>")?;
            Ok(Command::DeletePlayer { id })
        }
        "import" => {
            let path = rest(parts);
            if path.is_empty() {
                return Err("usage: import <players.csv>".to_string());
            }
            Ok(Command::ImportPlayers { path: PathBuf::from(path) })
        }
        "select" => Ok(Command::SelectRandomPlayer),
        "bid" => {
            let team_id = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: bid <team_id> <amount>")?;
            let amount = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: bid <team_id> <amount>")?;
            Ok(Command::PlaceBid { team_id, amount })
        }
        "sold" => Ok(Command::FinalizeSale),
        "unsold" => Ok(Command::MarkUnsold),
        "retain" => {
            let player_id = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: retain <player_id> <team_id>")?;
            let team_id = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: retain <player_id> <team_id>")?;
            Ok(Command::RetainPlayer { player_id, team_id })
        }
        "photo" => {
            let player_id = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: photo <player_id> <file>")?;
            let path = rest(parts);
            if path.is_empty() {
                return Err("usage: photo <player_id> <file>".to_string());
            }
            Ok(Command::AttachPhoto { player_id, path: PathBuf::from(path) })
        }
        "fixtures" => Ok(Command::GenerateFixtures),
        "groups" => {
            let num_groups = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: groups <count>")?;
            Ok(Command::StartGroupDraw { num_groups })
        }
        "draw" => Ok(Command::DrawTeam),
        "assign" => {
            let group = rest(parts);
            if group.is_empty() {
                return Err("usage: assign <group name>".to_string());
            }
            Ok(Command::AssignDrawn { group })
        }
        "group-fixtures" => Ok(Command::GroupFixtures),
        "reset" => Ok(Command::ResetAuction),
        "lock" => match parts.next() {
            Some("on") => Ok(Command::SetLock(true)),
            Some("off") => Ok(Command::SetLock(false)),
            _ => Err("usage: lock on|off".to_string()),
        },
        "export" => match parts.next() {
            Some("results") => Ok(Command::ExportResults {
                path: PathBuf::from(export::timestamped_name("auction_results")),
            }),
            Some("teams") => Ok(Command::ExportTeamSummary {
                path: PathBuf::from(export::timestamped_name("team_summary")),
            }),
            _ => Err("usage: export results|teams".to_string()),
        },
        "quit" | "exit" => Ok(Command::Shutdown),
        other => Err(format!("unknown command '{other}'")),
    }
}
