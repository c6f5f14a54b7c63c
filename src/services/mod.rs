pub mod config_loader;
pub mod history;
pub mod photo_cache;
pub mod score_input;
pub mod scoreboard;
