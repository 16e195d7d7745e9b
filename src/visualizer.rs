// src/visualizer.rs
use eframe::egui;
use egui::{Color32, Pos2, Rect, Rounding, Shape, Stroke, Vec2};
use neuronarrative::config::GaugeConfig;
use neuronarrative::playback::PlaybackCursor;
use neuronarrative::surfaces::{GaugeReading, SessionView};

const TIMELINE_PADDING: f32 = 12.0;

// 半圆表盘：左端 display_min，右端 display_max
pub fn draw_gauge(ui: &mut egui::Ui, reading: Option<&GaugeReading>, config: &GaugeConfig) {
    let body_color = Color32::from_rgb(50, 50, 55);
    let outline_color = Color32::from_rgb(80, 80, 85);
    let text_color = Color32::from_rgb(180, 180, 180);
    let width = 280.0;
    let height = 170.0;
    let (response, painter) = ui.allocate_painter(Vec2::new(width, height), egui::Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, Rounding::same(12.0), body_color);
    painter.rect_stroke(rect, Rounding::same(12.0), Stroke::new(1.5, outline_color));

    let pivot = Pos2::new(rect.center().x, rect.bottom() - 35.0);
    let radius = 105.0;
    let span = config.display_max - config.display_min;
    let angle_for = |v: f64| -> f32 {
        let f = if span > 0.0 { ((v - config.display_min) / span).clamp(0.0, 1.0) } else { 0.0 };
        std::f32::consts::PI * (1.0 - f as f32)
    };
    let on_arc = |angle: f32, r: f32| pivot + Vec2::new(angle.cos(), -angle.sin()) * r;

    // 1. 刻度弧
    let arc: Vec<Pos2> = (0..=48)
        .map(|i| on_arc(std::f32::consts::PI * (1.0 - i as f32 / 48.0), radius))
        .collect();
    painter.add(Shape::line(arc, Stroke::new(2.0, outline_color)));
    let mut tick = config.display_min.ceil();
    while tick <= config.display_max {
        let a = angle_for(tick);
        painter.line_segment([on_arc(a, radius - 10.0), on_arc(a, radius)], Stroke::new(1.5, text_color));
        painter.text(
            on_arc(a, radius - 22.0),
            egui::Align2::CENTER_CENTER,
            format!("{tick:.0}"),
            egui::FontId::proportional(11.0),
            text_color,
        );
        tick += 1.0;
    }

    // 2. 指针
    match reading {
        Some(r) => {
            let a = angle_for(r.position);
            painter.line_segment([pivot, on_arc(a, radius - 6.0)], Stroke::new(3.0, Color32::from_rgb(255, 80, 80)));
            painter.circle_filled(pivot, 6.0, Color32::from_rgb(200, 200, 200));
            painter.text(
                pivot + Vec2::new(0.0, 12.0),
                egui::Align2::CENTER_TOP,
                format!("{:.2}", r.position),
                egui::FontId::monospace(14.0),
                Color32::WHITE,
            );
        }
        None => {
            painter.text(
                pivot + Vec2::new(0.0, -30.0),
                egui::Align2::CENTER_CENTER,
                "NO DATA",
                egui::FontId::proportional(14.0),
                text_color,
            );
        }
    }
}

// 进度条：返回点击位置对应的时间
pub fn draw_timeline(
    ui: &mut egui::Ui,
    view: &SessionView,
    cursor: &PlaybackCursor,
    markers: &[f64],
) -> Option<f64> {
    let size = Vec2::new(ui.available_width(), 28.0);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    let rect = response.rect;
    let usable = (rect.width() - 2.0 * TIMELINE_PADDING).max(0.0);
    let track = Rect::from_min_max(
        Pos2::new(rect.left() + TIMELINE_PADDING, rect.center().y - 4.0),
        Pos2::new(rect.right() - TIMELINE_PADDING, rect.center().y + 4.0),
    );
    painter.rect_filled(track, Rounding::same(3.0), Color32::from_rgb(40, 40, 45));

    let x_of = |t: f64| rect.left() + view.cursor_x(t, TIMELINE_PADDING as f64, usable as f64) as f32;
    for &m in markers {
        let x = x_of(m);
        painter.line_segment(
            [Pos2::new(x, rect.top() + 4.0), Pos2::new(x, rect.bottom() - 4.0)],
            Stroke::new(1.0, Color32::from_rgb(255, 0, 255)),
        );
    }
    let cx = x_of(cursor.time_sec);
    let played = Rect::from_min_max(track.min, Pos2::new(cx, track.max.y));
    painter.rect_filled(played, Rounding::same(3.0), Color32::from_rgb(0, 160, 160));
    painter.circle_filled(Pos2::new(cx, rect.center().y), 7.0, Color32::from_rgb(0, 255, 255));

    if response.clicked() || response.dragged() {
        let pos = response.interact_pointer_pos()?;
        return Some(view.click_target(
            (pos.x - rect.left()) as f64,
            TIMELINE_PADDING as f64,
            usable as f64,
        ));
    }
    None
}
