#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod db;
mod error;
mod form;
mod model;
mod summary;
mod ui;

use app::App;
use config::Config;
use db::Database;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting expense tracker");

    let (config, config_error) = Config::load();
    if let Some(e) = config_error {
        log::error!("ignoring config file: {:#}", e);
    }

    // 连接只在启动时打开一次，窗口关闭时随 App 一起释放
    let app = match Database::open(&config) {
        Ok(db) => App::new(db),
        Err(e) => App::degraded(e),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("My Expense Tracker")
            .with_inner_size([940.0, 720.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    let result = eframe::run_native(
        "My Expense Tracker",
        options,
        Box::new(|cc| {
            ui::apply_style(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    );
    log::info!("expense tracker closed");
    result
}
