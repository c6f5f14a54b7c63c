mod models;
mod screens;
mod services;

use eframe::egui;
use screens::history::HistoryAction;
use screens::scoreboard::ScoreboardAction;
use services::config_loader::{RemiConfig, load_remi_config, resolve_config_path};
use services::scoreboard::Scoreboard;
use std::fs;
use std::path::Path;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

enum RemiState {
    Board,
    History,
}

struct RemiApp {
    state: RemiState,
    scoreboard: Scoreboard,
    config: RemiConfig,
}

impl RemiApp {
    fn new(config: RemiConfig) -> Self {
        Self {
            state: RemiState::Board,
            scoreboard: Scoreboard::new(config.scoring.clone()),
            config,
        }
    }
}

impl eframe::App for RemiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            match self.state {
                RemiState::Board => {
                    match screens::scoreboard::ui(ui, ctx, &mut self.scoreboard, &self.config) {
                        ScoreboardAction::OpenHistory => {
                            info!("Transition: Board -> History");
                            self.state = RemiState::History;
                        }
                        ScoreboardAction::Stay => {}
                    }
                }
                RemiState::History => match screens::history::ui(ui, ctx, &mut self.scoreboard) {
                    HistoryAction::Back => {
                        info!("Transition: History -> Board");
                        self.state = RemiState::Board;
                    }
                    HistoryAction::Stay => {}
                },
            }
        });
    }
}

const LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "remi.log";
/// Used when `RUST_LOG` is unset. Keeps egui and winit chatter out of the board log.
const DEFAULT_LOG_FILTER: &str = "info,eframe=warn,egui=warn,winit=warn";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Console output plus a daily file under `logs/`. The guard must live as
/// long as the app or buffered lines are lost.
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let file_layer = match fs::create_dir_all(log_dir) {
        Ok(()) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));
            Some((
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
                guard,
            ))
        }
        Err(err) => {
            eprintln!("cannot create {}: {err}, logging to console only", log_dir.display());
            None
        }
    };
    let (file_layer, guard) = match file_layer {
        Some((layer, guard)) => (Some(layer), Some(guard)),
        None => (None, None),
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stdout);

    if let Err(err) = tracing_subscriber::registry()
        .with(log_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("tracing init failed: {err}");
        return None;
    }
    guard
}

fn load_config() -> RemiConfig {
    let config_path = resolve_config_path();
    match load_remi_config(&config_path) {
        Ok(config) => {
            info!(
                "Config ready: threshold={}, direction={:?}",
                config.scoring.winner_threshold, config.scoring.sort_direction
            );
            config
        }
        Err(err) => {
            error!("{err:#}; falling back to defaults");
            RemiConfig::default()
        }
    }
}

fn main() -> eframe::Result<()> {
    let _log_guard = init_tracing(Path::new(LOG_DIR));
    info!("Starting Remi");

    let config = load_config();
    let pixels_per_point = config.presentation.pixels_per_point;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 820.0])
            .with_min_inner_size([360.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Remi",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_pixels_per_point(pixels_per_point);

            let mut style = (*cc.egui_ctx.style()).clone();
            style
                .text_styles
                .insert(egui::TextStyle::Heading, egui::FontId::proportional(30.0));
            style
                .text_styles
                .insert(egui::TextStyle::Body, egui::FontId::proportional(18.0));
            style
                .text_styles
                .insert(egui::TextStyle::Button, egui::FontId::proportional(18.0));
            style.spacing.button_padding = egui::vec2(12.0, 8.0);
            cc.egui_ctx.set_style(style);

            Ok(Box::new(RemiApp::new(config)))
        }),
    )
}
