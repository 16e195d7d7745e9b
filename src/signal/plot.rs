use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::signal::parse::ParsedResult;
use crate::signal::SignalError;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub signal: RGBColor,
    pub baseline: RGBColor,
    pub cursor: RGBColor,
    pub marker: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 360,
            background: RGBColor(10, 10, 15),
            signal: CYAN,
            baseline: YELLOW,
            cursor: RED,
            marker: MAGENTA,
        }
    }
}
/// Full-session chart with the playback cursor and event markers, encoded as PNG.
pub fn render_overview_png(
    result: &ParsedResult,
    cursor_time: f64,
    markers: &[f64],
    style: PlotStyle,
) -> Result<Vec<u8>, SignalError> {
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let x_range = if result.duration_sec() > 0.0 {
            result.start_time..result.end_time
        } else {
            result.start_time - 0.5..result.end_time + 0.5
        };
        let y_range = if (result.value_max - result.value_min).abs() < f64::EPSILON {
            result.value_min - 1.0..result.value_max + 1.0
        } else {
            let pad = (result.value_max - result.value_min) * 0.05;
            result.value_min - pad..result.value_max + pad
        };
        let (y_lo, y_hi) = (y_range.start, y_range.end);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                result.value_field.as_str(),
                ("sans-serif", 20).into_font().color(&WHITE),
            )
            .set_label_area_size(LabelAreaPosition::Left, 45)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x_range, y_range)?;
        chart
            .configure_mesh()
            .light_line_style(&WHITE.mix(0.1))
            .x_desc("seconds")
            .draw()?;
        let samples = result.store.samples();
        let signal = style.signal;
        chart
            .draw_series(LineSeries::new(
                samples.iter().map(|s| (s.time_sec, s.value)),
                &signal,
            ))?
            .label(result.value_field.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &signal));
        if result.has_baseline && result.baseline_field.as_ref() != Some(&result.value_field) {
            let baseline = style.baseline;
            chart
                .draw_series(LineSeries::new(
                    samples
                        .iter()
                        .filter_map(|s| s.baseline.map(|b| (s.time_sec, b))),
                    &baseline,
                ))?
                .label(result.baseline_field.clone().unwrap_or_default())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &baseline));
        }
        for &t in markers {
            chart.draw_series(LineSeries::new(
                [(t, y_lo), (t, y_hi)],
                style.marker.mix(0.6).stroke_width(1),
            ))?;
        }
        chart.draw_series(LineSeries::new(
            [(cursor_time, y_lo), (cursor_time, y_hi)],
            &style.cursor,
        ))?;
        chart
            .configure_series_labels()
            .border_style(&WHITE.mix(0.2))
            .background_style(&style.background)
            .draw()?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, SignalError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| SignalError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
