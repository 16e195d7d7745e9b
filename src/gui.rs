// src/gui.rs
use std::path::PathBuf;
use anyhow::Context;
use eframe::egui;
use egui::Color32;
use egui_plot::{Line, Plot, PlotBounds, PlotPoints, VLine};
use log::{info, warn};
use neuronarrative::config::AppConfig;
use neuronarrative::engine::{LoaderEvent, ParseLoader};
use neuronarrative::events::EventTimeline;
use neuronarrative::playback::{
    AudioClock, AudioMetadata, Navigation, PlaybackSynchronizer, TransportClock, TransportState,
};
use neuronarrative::signal::{render_overview_png, PlotStyle, SessionPlan};
use neuronarrative::surfaces::SessionView;
use neuronarrative::types::ParseSource;
use crate::visualizer;

fn load_audio(path: &str) -> anyhow::Result<AudioClock> {
    AudioClock::open(path).with_context(|| format!("cannot play audio {path}"))
}

fn load_events(path: &str) -> anyhow::Result<EventTimeline> {
    EventTimeline::from_path(path).with_context(|| format!("cannot read events {path}"))
}

fn export_overview(view: &SessionView, cursor: f64, events: &EventTimeline, path: &str) -> anyhow::Result<()> {
    let bytes = render_overview_png(view.result(), cursor, &events.times(), PlotStyle::default())
        .context("rendering overview")?;
    std::fs::write(path, bytes).with_context(|| format!("writing {path}"))?;
    info!("exported overview to {path}");
    Ok(())
}

// 事件卡片在事件之后保持显示的秒数
const EVENT_CARD_SEC: f64 = 5.0;

pub struct NeuroNarrativeApp {
    config: AppConfig,

    // 数据
    view: Option<SessionView>,
    events: EventTimeline,
    audio: Option<AudioMetadata>,

    // 播放
    sync: PlaybackSynchronizer,

    // 输入框
    csv_path: String,
    audio_path: String,
    events_path: String,
    export_path: String,

    // 界面日志
    log_messages: Vec<String>,

    // 后台解析
    loader: ParseLoader,
}

impl NeuroNarrativeApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            view: None,
            events: EventTimeline::default(),
            audio: None,
            sync: PlaybackSynchronizer::new(Box::new(TransportClock::new(0.0))),
            csv_path: String::new(),
            audio_path: String::new(),
            events_path: String::new(),
            export_path: "overview.png".to_owned(),
            log_messages: vec!["NeuroNarrative Ready.".to_owned()],
            loader: ParseLoader::spawn(config.inference),
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 { self.log_messages.remove(0); }
    }

    fn request_parse(&mut self, source: ParseSource) {
        let label = source.label();
        let id = self.loader.request(source);
        self.log(&format!("Parsing {} (#{})", label, id));
    }

    fn open_audio(&mut self) {
        match load_audio(self.audio_path.trim()) {
            Ok(clock) => {
                let meta = clock.metadata();
                self.sync.replace_clock(Box::new(clock));
                self.audio = Some(meta);
                self.log(&format!("🔊 Audio {:.1}s @ {:.0} Hz", meta.duration_sec, meta.sampling_rate_hz));
            }
            Err(e) => {
                warn!("{e:#}");
                self.log(&format!("❌ {:#}", e));
            }
        }
    }

    fn open_events(&mut self) {
        match load_events(self.events_path.trim()) {
            Ok(timeline) => {
                let n = timeline.markers().len();
                self.events = timeline;
                self.log(&format!("📌 {} events", n));
            }
            Err(e) => self.log(&format!("❌ {:#}", e)),
        }
    }

    fn export_png(&mut self) {
        let Some(view) = &self.view else { return };
        let path = self.export_path.trim().to_owned();
        match export_overview(view, self.sync.cursor().time_sec, &self.events, &path) {
            Ok(()) => self.log(&format!("💾 Saved {}", path)),
            Err(e) => self.log(&format!("❌ {:#}", e)),
        }
    }

    fn on_parsed(&mut self, view: SessionView) {
        let r = view.result();
        let summary = format!(
            "✅ {} samples, {:?} / {} (÷{})",
            r.store.len(), r.time_field, r.value_field, r.divisor
        );
        // 没有音频时用数据时长驱动播放
        if self.audio.is_none() {
            self.sync.replace_clock(Box::new(TransportClock::new(r.end_time)));
        }
        self.view = Some(view);
        self.log(&summary);
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() { return; }
        let skip = self.config.view.skip_sec;
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) { self.sync.toggle(); }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) { self.sync.navigate(Navigation::Skip(-skip)); }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) { self.sync.navigate(Navigation::Skip(skip)); }
        if ctx.input(|i| i.key_pressed(egui::Key::Home)) { self.sync.navigate(Navigation::Start); }
        if ctx.input(|i| i.key_pressed(egui::Key::End)) { self.sync.navigate(Navigation::End); }
    }

    fn transport_ui(&mut self, ui: &mut egui::Ui) {
        let cursor = self.sync.cursor();
        let skip = self.config.view.skip_sec;
        ui.horizontal(|ui| {
            if ui.button("⏮").clicked() { self.sync.navigate(Navigation::Start); }
            if ui.button(format!("-{:.0}s", skip)).clicked() { self.sync.navigate(Navigation::Skip(-skip)); }
            let label = if cursor.is_playing() { "⏸ PAUSE" } else { "▶ PLAY" };
            if ui.button(label).clicked() { self.sync.toggle(); }
            if ui.button(format!("+{:.0}s", skip)).clicked() { self.sync.navigate(Navigation::Skip(skip)); }
            if ui.button("⏭").clicked() { self.sync.navigate(Navigation::End); }
        });
        ui.horizontal(|ui| {
            for f in [0.25, 0.5, 0.75] {
                if ui.button(format!("{:.0}%", f * 100.0)).clicked() {
                    self.sync.navigate(Navigation::Fraction(f));
                }
            }
        });
        ui.horizontal(|ui| {
            let enabled = !self.events.is_empty();
            if ui.add_enabled(enabled, egui::Button::new("◀ EVENT")).clicked() {
                if let Some(t) = self.events.previous_event(cursor.time_sec) { self.sync.seek(t); }
            }
            if ui.add_enabled(enabled, egui::Button::new("EVENT ▶")).clicked() {
                if let Some(t) = self.events.next_event(cursor.time_sec) { self.sync.seek(t); }
            }
        });
        let state = match cursor.state {
            TransportState::Stopped => "stopped",
            TransportState::Playing => "playing",
            TransportState::Paused => "paused",
        };
        ui.monospace(format!("{:>8.2}s / {:.2}s  [{}]", cursor.time_sec, cursor.duration_sec, state));
    }
}

impl eframe::App for NeuroNarrativeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. 后台消息
        for event in self.loader.poll() {
            match event {
                LoaderEvent::Log(s) => self.log(&s),
                LoaderEvent::Ready(parsed) => {
                    let view = SessionView::new(parsed, &self.config.view);
                    self.on_parsed(view);
                }
                LoaderEvent::Failed(e) => self.log(&format!("❌ {}", e)),
            }
        }

        // 2. 播放时钟
        self.handle_keys(ctx);
        let cursor = self.sync.tick();
        if let Some(notice) = self.sync.take_notice() { self.log(&format!("⚠ {}", notice)); }
        if cursor.is_playing() || self.loader.is_busy() { ctx.request_repaint(); }

        // 3. UI 绘制
        let mut visuals = egui::Visuals::dark();
        visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 10, 15);
        ctx.set_visuals(visuals);

        egui::SidePanel::left("L").min_width(300.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("NeuroNarrative");
            ui.label("GSR Session Review");
            ui.separator();

            ui.label("SIGNAL CSV");
            ui.text_edit_singleline(&mut self.csv_path);
            ui.horizontal(|ui| {
                if ui.button("📂 LOAD").clicked() {
                    let path = PathBuf::from(self.csv_path.trim());
                    self.request_parse(ParseSource::Path(path));
                }
                if ui.button("🎲 DEMO").clicked() {
                    self.request_parse(ParseSource::Synthetic(SessionPlan::default()));
                }
            });
            if self.loader.is_busy() { ui.label(egui::RichText::new("Parsing...").color(Color32::YELLOW).small()); }

            ui.label("AUDIO (WAV)");
            ui.text_edit_singleline(&mut self.audio_path);
            if ui.button("🔊 OPEN").clicked() { self.open_audio(); }

            ui.label("ANALYSIS JSON");
            ui.text_edit_singleline(&mut self.events_path);
            if ui.button("📌 OPEN").clicked() { self.open_events(); }

            ui.add_space(10.0);
            ui.separator();
            self.transport_ui(ui);

            ui.add_space(10.0);
            ui.label("GAUGE");
            let gauge = self.config.gauge;
            let reading = self.view.as_mut().map(|v| v.gauge_reading(cursor.time_sec, &gauge));
            visualizer::draw_gauge(ui, reading.as_ref(), &gauge);
            if let Some(r) = reading {
                ui.monospace(format!("value {:.3}", r.sample.value));
                if let Some(b) = r.sample.baseline { ui.monospace(format!("baseline {:.2}", b)); }
                if let Some(k) = r.sample.resistance { ui.monospace(format!("resistance {:.2} kΩ", k)); }
            }

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.export_path);
                if ui.add_enabled(self.view.is_some(), egui::Button::new("💾 PNG")).clicked() { self.export_png(); }
            });

            ui.add_space(10.0);
            egui::ScrollArea::vertical().max_height(140.0).show(ui, |ui| {
                for m in &self.log_messages { ui.monospace(m); }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(view) = self.view.as_ref() else {
                ui.label("Load a CSV export or start the demo session.");
                return;
            };
            let markers = self.events.times();
            let mut seek_to = None;

            // 概览：整段数据，点击跳转
            let overview = Plot::new("overview")
                .height(220.0)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new(PlotPoints::new(view.overview_points().to_vec())).name(&view.result().value_field).color(Color32::from_rgb(0, 255, 255)));
                    if !view.baseline_points().is_empty() {
                        plot_ui.line(Line::new(PlotPoints::new(view.baseline_points().to_vec())).name("baseline").color(Color32::YELLOW));
                    }
                    for &m in &markers { plot_ui.vline(VLine::new(m).color(Color32::from_rgb(255, 0, 255))); }
                    plot_ui.vline(VLine::new(cursor.time_sec).color(Color32::RED).width(2.0));
                    plot_ui.pointer_coordinate()
                });
            if overview.response.clicked() {
                seek_to = overview.inner.map(|p| p.x);
            }

            if let Some(t) = visualizer::draw_timeline(ui, view, &cursor, &markers) { seek_to = Some(t); }

            // 细节：以光标为中心的滚动窗口
            let window = self.config.view.detail_window_sec;
            let (from, to) = view.detail_bounds(cursor.time_sec, window);
            let (lo, hi) = (view.result().value_min, view.result().value_max);
            let pad = ((hi - lo) * 0.05).max(1e-3);
            Plot::new("detail")
                .height(260.0)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max([from, lo - pad], [to, hi + pad]));
                    plot_ui.line(Line::new(PlotPoints::new(view.detail_points(cursor.time_sec, window))).color(Color32::from_rgb(0, 255, 255)));
                    for &m in markers.iter().filter(|m| **m >= from && **m <= to) {
                        plot_ui.vline(VLine::new(m).color(Color32::from_rgb(255, 0, 255)));
                    }
                    plot_ui.vline(VLine::new(cursor.time_sec).color(Color32::RED).width(2.0));
                });

            if let Some(event) = self.events.active_at(cursor.time_sec, EVENT_CARD_SEC) {
                ui.separator();
                ui.label(egui::RichText::new(format!("📌 {} @ {:.1}s ({})", event.event_id, event.time_sec, event.rule)).strong().color(Color32::YELLOW));
                if let Some(s) = &event.summary { ui.label(s); }
                if let Some(s) = &event.transcript_excerpt { ui.label(egui::RichText::new(s).italics()); }
            }

            if let Some(t) = seek_to {
                info!("seek from chart to {:.2}s", t);
                self.sync.seek(t);
            }
        });
    }
}
