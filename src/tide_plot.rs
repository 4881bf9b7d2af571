//! # Tide Chart Plotter
//!
//! Renders the trailing-24h water-level series as a black-on-white filled
//! area chart, sized 720x240 (a 12:4 aspect at 60 DPI) and titled
//! "Tide - Past 24 Hours". The series is re-based so its minimum is zero
//! before plotting; the drawn shape is relative, not absolute to the datum.
//!
//! The transform is deterministic: the same input series always yields the
//! same pixel-for-pixel image.

use crate::canvas::Canvas;
use crate::layout::text_width;
use crate::WaterLevelSeries;
use embedded_graphics::mono_font::iso_8859_1::FONT_9X15;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

/// 12 inches at 60 DPI
pub const CHART_WIDTH: u32 = 720;
/// 4 inches at 60 DPI
pub const CHART_HEIGHT: u32 = 240;

const TITLE: &str = "Tide - Past 24 Hours";

// Plot margins inside the chart image
const MARGIN_SIDE: u32 = 10;
const MARGIN_TOP: u32 = 30; // leaves room for the title
const MARGIN_BOTTOM: u32 = 10;

/// Render the series into a fresh chart canvas.
pub fn render(series: &WaterLevelSeries) -> Canvas {
    let mut chart = Canvas::new(CHART_WIDTH, CHART_HEIGHT);

    let title_style = MonoTextStyle::new(&FONT_9X15, BinaryColor::On);
    let title_x = (CHART_WIDTH.saturating_sub(text_width(&FONT_9X15, TITLE))) / 2;
    Text::with_baseline(
        TITLE,
        Point::new(title_x as i32, 6),
        title_style,
        Baseline::Top,
    )
    .draw(&mut chart)
    .ok();

    let rebased = series.rebased();
    if rebased.samples.len() < 2 {
        // Not enough points for a shape; the empty-dataset case is already
        // a ProviderError upstream, so this only guards a 1-sample series.
        return chart;
    }

    let plot_x = MARGIN_SIDE;
    let plot_y = MARGIN_TOP;
    let plot_width = CHART_WIDTH - 2 * MARGIN_SIDE;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline_y = plot_y + plot_height;

    let max_level = rebased.max_level();

    // Baseline along the bottom of the plot area
    for px in plot_x..plot_x + plot_width {
        chart.set_pixel(px, baseline_y, BinaryColor::On);
    }

    if max_level <= 0.0 {
        // Perfectly flat series rebases to all zeros; baseline is the chart
        return chart;
    }

    // Fill each column from the baseline up to the interpolated level
    let span = (rebased.samples.len() - 1) as f32;
    for column in 0..plot_width {
        let position = column as f32 / (plot_width - 1) as f32 * span;
        let index = (position.floor() as usize).min(rebased.samples.len() - 2);
        let alpha = position - index as f32;
        let level = rebased.samples[index].level_ft * (1.0 - alpha)
            + rebased.samples[index + 1].level_ft * alpha;

        let fill = ((level / max_level) * plot_height as f32).round() as u32;
        for dy in 0..fill.min(plot_height) {
            chart.set_pixel(plot_x + column, baseline_y - dy, BinaryColor::On);
        }
    }

    chart
}
