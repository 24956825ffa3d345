// CSV import of pool players and export of auction results.

use anyhow::{bail, Context, Result};
use chrono::Local;
use std::path::Path;

use crate::auction::player::{NewPlayer, Player, Role};
use crate::auction::team::Team;

/// A row the importer had to skip, reported by line number so the
/// operator can fix the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportIssue {
    pub line: u64,
    pub message: String,
}

/// Parsed import: the usable rows plus everything that was skipped.
#[derive(Debug)]
pub struct PlayerImport {
    pub players: Vec<NewPlayer>,
    pub issues: Vec<ImportIssue>,
}

/// Read a registration sheet with `name, role, base_price` headers.
/// Header matching is case-insensitive and tolerates `baseprice`.
/// Malformed rows are collected as issues rather than aborting the
/// whole file; a missing column does abort.
pub fn read_players_csv(path: &Path) -> Result<PlayerImport> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader.headers().context("failed to read CSV headers")?.clone();
    let find = |names: &[&str]| -> Option<usize> {
        headers.iter().position(|h| {
            let h = h.trim().to_lowercase().replace([' ', '_'], "");
            names.contains(&h.as_str())
        })
    };
    let Some(name_idx) = find(&["name", "playername"]) else {
        bail!("CSV is missing a 'name' column");
    };
    let Some(role_idx) = find(&["role"]) else {
        bail!("CSV is missing a 'role' column");
    };
    let Some(price_idx) = find(&["baseprice"]) else {
        bail!("CSV is missing a 'base_price' column");
    };

    let mut players = Vec::new();
    let mut issues = Vec::new();

    for record in reader.records() {
        let record = record.context("failed to read CSV record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let name = record.get(name_idx).unwrap_or("").trim();
        if name.is_empty() {
            issues.push(ImportIssue { line, message: "empty player name".to_string() });
            continue;
        }

        let role_text = record.get(role_idx).unwrap_or("").trim();
        let Some(role) = Role::from_str_role(role_text) else {
            issues.push(ImportIssue {
                line,
                message: format!("unknown role '{role_text}'"),
            });
            continue;
        };

        let price_text = record.get(price_idx).unwrap_or("").trim();
        let base_price = match price_text.parse::<i64>() {
            Ok(price) if price > 0 => price,
            Ok(price) => {
                issues.push(ImportIssue {
                    line,
                    message: format!("base price must be > 0, got {price}"),
                });
                continue;
            }
            Err(_) => {
                issues.push(ImportIssue {
                    line,
                    message: format!("invalid base price '{price_text}'"),
                });
                continue;
            }
        };

        players.push(NewPlayer { name: name.to_string(), role, base_price });
    }

    Ok(PlayerImport { players, issues })
}

/// Export every player's auction outcome. A sold player whose team
/// row has since been deleted renders its team as "-".
pub fn write_results_csv(path: &Path, players: &[Player], teams: &[Team]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer
        .write_record(["player_name", "role", "base_price", "sold_price", "team"])
        .context("failed to write results header")?;
    for player in players {
        let team_name = player
            .sold_to
            .and_then(|id| teams.iter().find(|t| t.id == id))
            .map(|t| t.team_name.as_str())
            .or(player.sold_team.as_deref())
            .unwrap_or("-");
        let sold_price =
            player.sold_price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        writer
            .write_record([
                player.name.as_str(),
                player.role.display_str(),
                &player.base_price.to_string(),
                &sold_price,
                team_name,
            ])
            .with_context(|| format!("failed to write row for '{}'", player.name))?;
    }
    writer.flush().context("failed to flush results CSV")?;
    Ok(())
}

/// Export per-team budget totals.
pub fn write_team_summary_csv(path: &Path, teams: &[Team]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer
        .write_record([
            "team_name",
            "total_points",
            "points_used",
            "points_remaining",
            "players_count",
        ])
        .context("failed to write summary header")?;
    for team in teams {
        writer
            .write_record([
                team.team_name.as_str(),
                &team.total_points.to_string(),
                &team.points_used.to_string(),
                &team.points_left.to_string(),
                &team.players_count.to_string(),
            ])
            .with_context(|| format!("failed to write row for '{}'", team.team_name))?;
    }
    writer.flush().context("failed to flush summary CSV")?;
    Ok(())
}

/// Timestamped export file name, e.g. `auction_results_20260830_141502.csv`.
pub fn timestamped_name(prefix: &str) -> String {
    Local::now().format(&format!("{prefix}_%Y%m%d_%H%M%S.csv")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::player::PlayerStatus;
    use std::path::PathBuf;

    fn temp_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    fn sold_player(id: i64, name: &str, team_id: Option<i64>, price: Option<i64>) -> Player {
        Player {
            id,
            name: name.to_string(),
            role: Role::Bowler,
            base_price: 1000,
            status: if price.is_some() { PlayerStatus::Sold } else { PlayerStatus::Available },
            sold_price: price,
            sold_to: team_id,
            sold_team: None,
            retained_team: None,
            photo_path: None,
        }
    }

    #[test]
    fn import_parses_well_formed_rows() {
        let path = temp_file("auction_import_ok.csv");
        std::fs::write(
            &path,
            "name,role,base_price\n\
             R Sharma,Batsman,2000\n\
             J Bumrah,bowler,1500\n\
             H Pandya,All-Rounder,1000\n",
        )
        .unwrap();

        let import = read_players_csv(&path).expect("import succeeds");
        assert!(import.issues.is_empty());
        assert_eq!(import.players.len(), 3);
        assert_eq!(import.players[0].name, "R Sharma");
        assert_eq!(import.players[0].role, Role::Batsman);
        assert_eq!(import.players[2].role, Role::Allrounder);
        assert_eq!(import.players[1].base_price, 1500);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn import_accepts_baseprice_header_variant() {
        let path = temp_file("auction_import_header.csv");
        std::fs::write(&path, "Name,Role,BasePrice\nA Kumar,bowler,1200\n").unwrap();
        let import = read_players_csv(&path).expect("import succeeds");
        assert_eq!(import.players.len(), 1);
        assert_eq!(import.players[0].base_price, 1200);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn import_reports_bad_rows_by_line() {
        let path = temp_file("auction_import_bad.csv");
        std::fs::write(
            &path,
            "name,role,base_price\n\
             Good Player,batsman,2000\n\
             ,batsman,2000\n\
             Bad Role,umpire,2000\n\
             Bad Price,bowler,lots\n\
             Zero Price,bowler,0\n",
        )
        .unwrap();

        let import = read_players_csv(&path).expect("import succeeds with issues");
        assert_eq!(import.players.len(), 1);
        assert_eq!(import.issues.len(), 4);
        assert_eq!(import.issues[0].line, 3);
        assert_eq!(import.issues[1].message, "unknown role 'umpire'");
        assert_eq!(import.issues[2].message, "invalid base price 'lots'");
        assert_eq!(import.issues[3].message, "base price must be > 0, got 0");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn import_rejects_missing_columns() {
        let path = temp_file("auction_import_cols.csv");
        std::fs::write(&path, "name,base_price\nA,1000\n").unwrap();
        let err = read_players_csv(&path).expect_err("missing role column");
        assert!(err.to_string().contains("role"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn results_export_renders_dangling_team_as_dash() {
        let path = temp_file("auction_results.csv");
        let teams = vec![Team::new(1, "Strikers", 50_000, 15, 2)];
        let players = vec![
            sold_player(1, "Sold Ok", Some(1), Some(4000)),
            // Team 9 no longer exists and no name snapshot was taken.
            sold_player(2, "Sold Dangling", Some(9), Some(3000)),
            sold_player(3, "Unsold", None, None),
        ];
        write_results_csv(&path, &players, &teams).expect("export");

        let body = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "player_name,role,base_price,sold_price,team");
        assert_eq!(lines[1], "Sold Ok,Bowler,1000,4000,Strikers");
        assert_eq!(lines[2], "Sold Dangling,Bowler,1000,3000,-");
        assert_eq!(lines[3], "Unsold,Bowler,1000,-,-");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn results_export_falls_back_to_name_snapshot() {
        let path = temp_file("auction_results_snapshot.csv");
        let mut player = sold_player(1, "Sold", Some(9), Some(2500));
        player.sold_team = Some("Deleted Team".to_string());
        write_results_csv(&path, &[player], &[]).expect("export");
        let body = std::fs::read_to_string(&path).expect("read back");
        assert!(body.lines().nth(1).is_some_and(|l| l.ends_with("Deleted Team")));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn team_summary_export_has_budget_columns() {
        let path = temp_file("auction_summary.csv");
        let mut team = Team::new(1, "Strikers", 50_000, 15, 2);
        team.apply_purchase(4000);
        write_team_summary_csv(&path, &[team]).expect("export");

        let body = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "team_name,total_points,points_used,points_remaining,players_count");
        assert_eq!(lines[1], "Strikers,50000,4000,46000,1");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn timestamped_name_carries_prefix_and_extension() {
        let name = timestamped_name("auction_results");
        assert!(name.starts_with("auction_results_"));
        assert!(name.ends_with(".csv"));
    }
}
