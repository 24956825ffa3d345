// Configuration loading and parsing (auction.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::auction::bid::{default_tiers, BidRules, BidStrategy, BidTier};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub auction: AuctionConfig,
    pub credentials: CredentialsConfig,
    pub ws_port: u16,
    pub db_path: String,
    /// Root directory of the photo object store. Falls back to a
    /// platform data directory when omitted.
    pub storage_root: Option<String>,
}

impl Config {
    /// Bid-validation knobs assembled for the auction engine.
    pub fn bid_rules(&self) -> BidRules {
        BidRules {
            base_min_bid: self.auction.base_min_bid,
            tiers: self.auction.bid_increments.clone(),
            strategy: self.auction.strategy,
            enforce_recommended_ceiling: self.auction.enforce_recommended_ceiling,
        }
    }
}

// ---------------------------------------------------------------------------
// auction.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire auction.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AuctionFile {
    auction: AuctionSection,
    websocket: WebsocketSection,
    database: DatabaseSection,
    #[serde(default)]
    storage: StorageSection,
}

#[derive(Debug, Clone, Deserialize)]
struct AuctionSection {
    base_min_bid: i64,
    total_points: i64,
    max_players: u32,
    #[serde(default)]
    max_retain_players: u32,
    #[serde(default)]
    strategy: BidStrategy,
    #[serde(default = "default_true")]
    enforce_recommended_ceiling: bool,
    #[serde(default)]
    bid_increments: Vec<TierEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct TierEntry {
    upto: Option<i64>,
    step: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct WebsocketSection {
    port: u16,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct StorageSection {
    root: Option<String>,
}

fn default_true() -> bool {
    true
}

/// The public auction config assembled from the `[auction]` section.
#[derive(Debug, Clone)]
pub struct AuctionConfig {
    /// Floor price of any player, and the reserve held back per
    /// remaining squad slot by the flat-reserve strategy.
    pub base_min_bid: i64,
    /// Budget each team starts with.
    pub total_points: i64,
    /// Squad size ceiling per team.
    pub max_players: u32,
    /// Retention slots per team.
    pub max_retain_players: u32,
    pub strategy: BidStrategy,
    pub enforce_recommended_ceiling: bool,
    pub bid_increments: Vec<BidTier>,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/auction.toml` and
/// (optionally) `config/credentials.toml`, relative to the given
/// `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default
/// initialization automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- auction.toml (required) ---
    let auction_path = config_dir.join("auction.toml");
    let auction_text = read_file(&auction_path)?;
    let auction_file: AuctionFile =
        toml::from_str(&auction_text).map_err(|e| ConfigError::ParseError {
            path: auction_path.clone(),
            source: e,
        })?;

    let section = auction_file.auction;
    let bid_increments = if section.bid_increments.is_empty() {
        default_tiers()
    } else {
        section
            .bid_increments
            .iter()
            .map(|t| BidTier { upto: t.upto, step: t.step })
            .collect()
    };
    let auction = AuctionConfig {
        base_min_bid: section.base_min_bid,
        total_points: section.total_points,
        max_players: section.max_players,
        max_retain_players: section.max_retain_players,
        strategy: section.strategy,
        enforce_recommended_ceiling: section.enforce_recommended_ceiling,
        bid_increments,
    };

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        auction,
        credentials,
        ws_port: auction_file.websocket.port,
        db_path: auction_file.database.path,
        storage_root: auction_file.storage.root,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist, seeding missing ones from the
/// `defaults/` templates. Returns the files that were seeded.
/// `.example` files are left for the operator to copy by hand.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        // An already-populated config/ works without the templates.
        if config_dir.exists() {
            return Ok(vec![]);
        }
        return Err(copy_error(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the project root or ensure defaults/ is present",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create config directory: {e}")))?;

    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("failed to read defaults directory: {e}")))?;

    let mut seeded = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("failed to read defaults entry: {e}")))?
            .path();
        let Some(file_name) = source.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !source.is_file() || file_name.ends_with(".example") {
            continue;
        }
        let target = config_dir.join(file_name);
        if seed_config_file(&source, &target)? {
            seeded.push(target);
        }
    }
    Ok(seeded)
}

/// Copy one template into place unless the operator already has a
/// file there. `create_new` keeps the existence check and the create
/// a single step.
fn seed_config_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    use std::io::Write;

    let mut dest = match std::fs::OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("failed to create {}: {e}", target.display()))),
    };
    let content = std::fs::read(source)
        .map_err(|e| copy_error(format!("failed to read {}: {e}", source.display())))?;
    dest.write_all(&content)
        .map_err(|e| copy_error(format!("failed to write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let auction = &config.auction;

    if auction.base_min_bid <= 0 {
        return Err(ConfigError::ValidationError {
            field: "auction.base_min_bid".into(),
            message: format!("must be > 0, got {}", auction.base_min_bid),
        });
    }

    if auction.total_points <= 0 {
        return Err(ConfigError::ValidationError {
            field: "auction.total_points".into(),
            message: format!("must be > 0, got {}", auction.total_points),
        });
    }

    if auction.max_players == 0 {
        return Err(ConfigError::ValidationError {
            field: "auction.max_players".into(),
            message: "must be greater than 0".into(),
        });
    }

    if auction.max_retain_players > auction.max_players {
        return Err(ConfigError::ValidationError {
            field: "auction.max_retain_players".into(),
            message: format!(
                "cannot exceed max_players ({}), got {}",
                auction.max_players, auction.max_retain_players
            ),
        });
    }

    // A team must be able to pay the minimum bid for every squad slot.
    let floor = auction.base_min_bid * auction.max_players as i64;
    if auction.total_points < floor {
        return Err(ConfigError::ValidationError {
            field: "auction.total_points".into(),
            message: format!(
                "must cover base_min_bid for every squad slot ({} * {} = {})",
                auction.base_min_bid, auction.max_players, floor
            ),
        });
    }

    // Tier bounds must be strictly ascending with positive steps; only
    // the final tier may be open-ended.
    let tiers = &auction.bid_increments;
    if tiers.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "auction.bid_increments".into(),
            message: "at least one tier is required".into(),
        });
    }
    let mut prev_upto: Option<i64> = None;
    for (i, tier) in tiers.iter().enumerate() {
        if tier.step <= 0 {
            return Err(ConfigError::ValidationError {
                field: format!("auction.bid_increments[{i}].step"),
                message: format!("must be > 0, got {}", tier.step),
            });
        }
        match tier.upto {
            Some(upto) => {
                if let Some(prev) = prev_upto {
                    if upto <= prev {
                        return Err(ConfigError::ValidationError {
                            field: format!("auction.bid_increments[{i}].upto"),
                            message: format!("must be > {prev}, got {upto}"),
                        });
                    }
                }
                prev_upto = Some(upto);
            }
            None => {
                if i != tiers.len() - 1 {
                    return Err(ConfigError::ValidationError {
                        field: format!("auction.bid_increments[{i}].upto"),
                        message: "only the final tier may be open-ended".into(),
                    });
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
