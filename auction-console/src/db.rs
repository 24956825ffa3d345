// SQLite persistence layer for teams, players, and the auction log.

use anyhow::{bail, Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::auction::log::{AuctionLogEntry, LogAction, LogDraft};
use crate::auction::player::{NewPlayer, Player, PlayerStatus, Role};
use crate::auction::state::AuctionError;
use crate::auction::team::Team;
use crate::config::AuctionConfig;

const LOCK_KEY: &str = "auction_locked";

/// A committed change to one of the persisted tables. Broadcast to
/// realtime subscribers, who refetch the table rather than patching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub action: &'static str,
}

pub struct Database {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Database {
    /// Open (or create) the database at the given path and run the
    /// schema. Pass `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .context("failed to enable WAL mode")?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("failed to enable foreign keys")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                team_name TEXT NOT NULL UNIQUE,
                total_points INTEGER NOT NULL,
                points_used INTEGER NOT NULL DEFAULT 0,
                points_left INTEGER NOT NULL,
                players_count INTEGER NOT NULL DEFAULT 0,
                balance_players_count INTEGER NOT NULL,
                max_players INTEGER NOT NULL,
                max_retain_players INTEGER NOT NULL DEFAULT 0,
                retained_players_count INTEGER NOT NULL DEFAULT 0,
                group_name TEXT
            );
            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                base_price INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'available',
                sold_price INTEGER,
                sold_to INTEGER,
                sold_team TEXT,
                retained_team INTEGER,
                photo_path TEXT
            );
            CREATE TABLE IF NOT EXISTS auction_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                player_id INTEGER NOT NULL,
                player_name TEXT NOT NULL,
                team_id INTEGER NOT NULL,
                team_name TEXT NOT NULL,
                bid_amount INTEGER NOT NULL,
                action TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_players_status ON players(status);
            CREATE INDEX IF NOT EXISTS idx_players_sold_to ON players(sold_to);
            CREATE INDEX IF NOT EXISTS idx_logs_player ON auction_logs(player_id);",
        )
        .context("failed to create schema")?;

        let (changes, _) = broadcast::channel(256);
        Ok(Database { conn: Mutex::new(conn), changes })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Subscribe to committed table changes.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    fn notify(&self, table: &'static str, action: &'static str) {
        // No subscribers is fine; the send result carries nothing else.
        let _ = self.changes.send(ChangeEvent { table, action });
    }

    // -----------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------

    /// Register a new team with a full budget per the auction config.
    /// A duplicate name surfaces as a validation error, not a raw
    /// constraint failure.
    pub fn create_team(&self, name: &str, cfg: &AuctionConfig) -> Result<Team> {
        let team = Team::new(0, name, cfg.total_points, cfg.max_players, cfg.max_retain_players);
        let id = {
            let conn = self.conn();
            let result = conn.execute(
                "INSERT INTO teams (team_name, total_points, points_used, points_left,
                                    players_count, balance_players_count, max_players,
                                    max_retain_players, retained_players_count, group_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    team.team_name,
                    team.total_points,
                    team.points_used,
                    team.points_left,
                    team.players_count,
                    team.balance_players_count,
                    team.max_players,
                    team.max_retain_players,
                    team.retained_players_count,
                    team.group_name,
                ],
            );
            match result {
                Ok(_) => conn.last_insert_rowid(),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    bail!(AuctionError::DuplicateTeamName(name.to_string()));
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to insert team '{name}'"))
                }
            }
        };
        self.notify("teams", "insert");
        Ok(Team { id, ..team })
    }

    pub fn team(&self, id: i64) -> Result<Option<Team>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT * FROM teams WHERE id = ?1")
            .context("failed to prepare team query")?;
        let mut rows = stmt
            .query_map([id], team_from_row)
            .context("failed to query team")?;
        rows.next().transpose().context("failed to read team row")
    }

    pub fn teams(&self) -> Result<Vec<Team>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT * FROM teams ORDER BY id")
            .context("failed to prepare teams query")?;
        let rows = stmt
            .query_map([], team_from_row)
            .context("failed to query teams")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read team rows")
    }

    /// Write every counter back. `points_left` is recomputed from
    /// `total_points - points_used` so the budget invariant holds no
    /// matter what the caller passed.
    pub fn update_team(&self, team: &Team) -> Result<()> {
        {
            let conn = self.conn();
            let updated = conn
                .execute(
                    "UPDATE teams SET team_name = ?2, total_points = ?3, points_used = ?4,
                         points_left = ?3 - ?4, players_count = ?5, balance_players_count = ?6,
                         max_players = ?7, max_retain_players = ?8,
                         retained_players_count = ?9, group_name = ?10
                     WHERE id = ?1",
                    rusqlite::params![
                        team.id,
                        team.team_name,
                        team.total_points,
                        team.points_used,
                        team.players_count,
                        team.balance_players_count,
                        team.max_players,
                        team.max_retain_players,
                        team.retained_players_count,
                        team.group_name,
                    ],
                )
                .with_context(|| format!("failed to update team {}", team.id))?;
            if updated == 0 {
                bail!(AuctionError::UnknownTeam(team.id));
            }
        }
        self.notify("teams", "update");
        Ok(())
    }

    pub fn delete_team(&self, id: i64) -> Result<()> {
        {
            let conn = self.conn();
            let deleted = conn
                .execute("DELETE FROM teams WHERE id = ?1", [id])
                .with_context(|| format!("failed to delete team {id}"))?;
            if deleted == 0 {
                bail!(AuctionError::UnknownTeam(id));
            }
        }
        self.notify("teams", "delete");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------

    pub fn create_player(&self, new: &NewPlayer) -> Result<Player> {
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO players (name, role, base_price, status)
                 VALUES (?1, ?2, ?3, 'available')",
                rusqlite::params![new.name, new.role.storage_str(), new.base_price],
            )
            .with_context(|| format!("failed to insert player '{}'", new.name))?;
            conn.last_insert_rowid()
        };
        self.notify("players", "insert");
        Ok(Player {
            id,
            name: new.name.clone(),
            role: new.role,
            base_price: new.base_price,
            status: PlayerStatus::Available,
            sold_price: None,
            sold_to: None,
            sold_team: None,
            retained_team: None,
            photo_path: None,
        })
    }

    pub fn player(&self, id: i64) -> Result<Option<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT * FROM players WHERE id = ?1")
            .context("failed to prepare player query")?;
        let mut rows = stmt
            .query_map([id], player_from_row)
            .context("failed to query player")?;
        rows.next().transpose().context("failed to read player row")
    }

    pub fn players(&self) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT * FROM players ORDER BY id")
            .context("failed to prepare players query")?;
        let rows = stmt
            .query_map([], player_from_row)
            .context("failed to query players")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read player rows")
    }

    pub fn players_by_team(&self, team_id: i64) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT * FROM players WHERE sold_to = ?1 OR retained_team = ?1 ORDER BY id")
            .context("failed to prepare squad query")?;
        let rows = stmt
            .query_map([team_id], player_from_row)
            .context("failed to query squad")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read squad rows")
    }

    pub fn update_player(&self, player: &Player) -> Result<()> {
        {
            let conn = self.conn();
            let updated = conn
                .execute(
                    "UPDATE players SET name = ?2, role = ?3, base_price = ?4, status = ?5,
                         sold_price = ?6, sold_to = ?7, sold_team = ?8, retained_team = ?9,
                         photo_path = ?10
                     WHERE id = ?1",
                    rusqlite::params![
                        player.id,
                        player.name,
                        player.role.storage_str(),
                        player.base_price,
                        player.status.storage_str(),
                        player.sold_price,
                        player.sold_to,
                        player.sold_team,
                        player.retained_team,
                        player.photo_path,
                    ],
                )
                .with_context(|| format!("failed to update player {}", player.id))?;
            if updated == 0 {
                bail!(AuctionError::UnknownPlayer(player.id));
            }
        }
        self.notify("players", "update");
        Ok(())
    }

    pub fn delete_player(&self, id: i64) -> Result<()> {
        {
            let conn = self.conn();
            let deleted = conn
                .execute("DELETE FROM players WHERE id = ?1", [id])
                .with_context(|| format!("failed to delete player {id}"))?;
            if deleted == 0 {
                bail!(AuctionError::UnknownPlayer(id));
            }
        }
        self.notify("players", "delete");
        Ok(())
    }

    /// Bulk insert for the CSV import path. All rows land in one
    /// transaction: a bad row aborts the whole batch.
    pub fn import_players(&self, rows: &[NewPlayer]) -> Result<usize> {
        {
            let mut conn = self.conn();
            let tx = conn.transaction().context("failed to begin import transaction")?;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO players (name, role, base_price, status)
                         VALUES (?1, ?2, ?3, 'available')",
                    )
                    .context("failed to prepare import statement")?;
                for row in rows {
                    stmt.execute(rusqlite::params![
                        row.name,
                        row.role.storage_str(),
                        row.base_price
                    ])
                    .with_context(|| format!("failed to import player '{}'", row.name))?;
                }
            }
            tx.commit().context("failed to commit import transaction")?;
        }
        if !rows.is_empty() {
            self.notify("players", "insert");
        }
        Ok(rows.len())
    }

    // -----------------------------------------------------------------
    // Auction log
    // -----------------------------------------------------------------

    pub fn record_log(&self, draft: &LogDraft) -> Result<AuctionLogEntry> {
        let entry = {
            let conn = self.conn();
            conn.query_row(
                "INSERT INTO auction_logs (player_id, player_name, team_id, team_name,
                                           bid_amount, action)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING id, created_at",
                rusqlite::params![
                    draft.player_id,
                    draft.player_name,
                    draft.team_id,
                    draft.team_name,
                    draft.bid_amount,
                    draft.action.storage_str(),
                ],
                |row| {
                    Ok(AuctionLogEntry {
                        id: row.get(0)?,
                        player_id: draft.player_id,
                        player_name: draft.player_name.clone(),
                        team_id: draft.team_id,
                        team_name: draft.team_name.clone(),
                        bid_amount: draft.bid_amount,
                        action: draft.action,
                        created_at: row.get(1)?,
                    })
                },
            )
            .context("failed to record auction log entry")?
        };
        self.notify("auction_logs", "insert");
        Ok(entry)
    }

    pub fn logs(&self) -> Result<Vec<AuctionLogEntry>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, player_id, player_name, team_id, team_name, bid_amount,
                        action, created_at
                 FROM auction_logs ORDER BY id",
            )
            .context("failed to prepare log query")?;
        let rows = stmt
            .query_map([], log_from_row)
            .context("failed to query logs")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read log rows")
    }

    pub fn delete_log(&self, id: i64) -> Result<()> {
        {
            let conn = self.conn();
            conn.execute("DELETE FROM auction_logs WHERE id = ?1", [id])
                .with_context(|| format!("failed to delete log entry {id}"))?;
        }
        self.notify("auction_logs", "delete");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Reset and lock flag
    // -----------------------------------------------------------------

    /// Wind the whole auction back in one transaction: every player to
    /// `available` with sale and retention fields cleared, every team
    /// to its initial capacity, the audit trail emptied.
    pub fn reset_auction(&self) -> Result<()> {
        {
            let mut conn = self.conn();
            let tx = conn.transaction().context("failed to begin reset transaction")?;
            tx.execute_batch(
                "UPDATE players SET status = 'available', sold_price = NULL, sold_to = NULL,
                     sold_team = NULL, retained_team = NULL;
                 UPDATE teams SET points_used = 0, points_left = total_points,
                     players_count = 0, balance_players_count = max_players,
                     retained_players_count = 0, group_name = NULL;
                 DELETE FROM auction_logs;",
            )
            .context("failed to apply auction reset")?;
            tx.commit().context("failed to commit auction reset")?;
        }
        self.notify("players", "reset");
        self.notify("teams", "reset");
        self.notify("auction_logs", "reset");
        Ok(())
    }

    /// The persisted global lock flag. Missing key reads as unlocked.
    pub fn is_locked(&self) -> Result<bool> {
        let conn = self.conn();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                [LOCK_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("failed to read lock flag")?;
        Ok(value.as_deref() == Some("true"))
    }

    pub fn set_locked(&self, locked: bool) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![LOCK_KEY, if locked { "true" } else { "false" }],
        )
        .context("failed to write lock flag")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mappers
// ---------------------------------------------------------------------------

fn team_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get("id")?,
        team_name: row.get("team_name")?,
        total_points: row.get("total_points")?,
        points_used: row.get("points_used")?,
        points_left: row.get("points_left")?,
        players_count: row.get("players_count")?,
        balance_players_count: row.get("balance_players_count")?,
        max_players: row.get("max_players")?,
        max_retain_players: row.get("max_retain_players")?,
        retained_players_count: row.get("retained_players_count")?,
        group_name: row.get("group_name")?,
    })
}

fn player_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Player> {
    let role_text: String = row.get("role")?;
    let role = Role::from_str_role(&role_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown role '{role_text}'").into(),
        )
    })?;
    let status_text: String = row.get("status")?;
    let status = PlayerStatus::from_str_status(&status_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown status '{status_text}'").into(),
        )
    })?;
    Ok(Player {
        id: row.get("id")?,
        name: row.get("name")?,
        role,
        base_price: row.get("base_price")?,
        status,
        sold_price: row.get("sold_price")?,
        sold_to: row.get("sold_to")?,
        sold_team: row.get("sold_team")?,
        retained_team: row.get("retained_team")?,
        photo_path: row.get("photo_path")?,
    })
}

fn log_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuctionLogEntry> {
    let action_text: String = row.get("action")?;
    let action = LogAction::from_str_action(&action_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown log action '{action_text}'").into(),
        )
    })?;
    Ok(AuctionLogEntry {
        id: row.get("id")?,
        player_id: row.get("player_id")?,
        player_name: row.get("player_name")?,
        team_id: row.get("team_id")?,
        team_name: row.get("team_name")?,
        bid_amount: row.get("bid_amount")?,
        action,
        created_at: row.get("created_at")?,
    })
}
