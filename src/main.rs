// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod gui;
mod visualizer;
use eframe::egui;
use log::info;
use neuronarrative::config;
// 入口函数
fn main() -> eframe::Result<()> {
    env_logger::init();
    // 配置：neuronarrative.json + NEURONARRATIVE_* 环境变量
    let settings = *config::settings();
    info!("settings: {:?}", settings);
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1463.0, 915.0])
        .with_min_inner_size([1200.0, 760.0])
        .with_title("NeuroNarrative");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "NeuroNarrative",
        options,
        Box::new(move |_cc| Box::new(gui::NeuroNarrativeApp::new(settings))),
    )
}
