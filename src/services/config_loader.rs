use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "remi.toml";
pub const CONFIG_PATH_ENV: &str = "REMI_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Higher total is better.
    #[default]
    HighestWins,
    /// Lower total is better.
    LowestWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinnerLatch {
    /// Drop the winner flag once nobody is over the threshold any more.
    #[default]
    ClearBelowThreshold,
    /// Keep the winner flag until the game is finished.
    Sticky,
}

/// What cutting a player does to the score they are currently typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutPending {
    #[default]
    Clear,
    Zero,
    Keep,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_winner_threshold")]
    pub winner_threshold: i64,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default)]
    pub winner_latch: WinnerLatch,
    #[serde(default)]
    pub cut_pending: CutPending,
    #[serde(default = "default_min_players_to_submit")]
    pub min_players_to_submit: usize,
    /// Table variant: refuse a round while any player's slot is blank.
    #[serde(default)]
    pub require_every_score: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            winner_threshold: default_winner_threshold(),
            sort_direction: SortDirection::default(),
            winner_latch: WinnerLatch::default(),
            cut_pending: CutPending::default(),
            min_players_to_submit: default_min_players_to_submit(),
            require_every_score: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresentationConfig {
    #[serde(default = "default_pixels_per_point")]
    pub pixels_per_point: f32,
    #[serde(default = "default_photo_max_dimension")]
    pub photo_max_dimension: u32,
    #[serde(default)]
    pub show_keypad: bool,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            pixels_per_point: default_pixels_per_point(),
            photo_max_dimension: default_photo_max_dimension(),
            show_keypad: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RemiConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
}

fn default_winner_threshold() -> i64 {
    1000
}

fn default_min_players_to_submit() -> usize {
    1
}

fn default_pixels_per_point() -> f32 {
    1.1
}

fn default_photo_max_dimension() -> u32 {
    128
}

/// `REMI_CONFIG` when set, otherwise `remi.toml` in the working directory.
pub fn resolve_config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

pub fn load_remi_config(config_path: &Path) -> Result<RemiConfig> {
    if !config_path.exists() {
        info!(
            "{} not found, using defaults",
            config_path.display()
        );
        return Ok(RemiConfig::default());
    }

    let raw = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config at {}", config_path.display()))?;

    parse_remi_config(&raw)
        .with_context(|| format!("Failed to parse config at {}", config_path.display()))
}

pub fn parse_remi_config(raw: &str) -> Result<RemiConfig> {
    let config = toml::from_str::<RemiConfig>(raw)?;
    Ok(config)
}
