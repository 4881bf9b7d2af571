//! # Layout Compositor
//!
//! Places every visual element onto the fixed 800x480 canvas, starting from
//! the static template background. The layout is a single linear pass with
//! one genuine decision point: the current-conditions report string is
//! wrapped onto two lines when its rendered width exceeds 250 px, then
//! re-measured and horizontally centered around x = 120.
//!
//! When an upstream fetch has failed, [`render_error_panel`] replaces the
//! whole layout with a full-screen error notice sharing only the canvas
//! dimensions and font stack.

use crate::assets::AssetStore;
use crate::canvas::Canvas;
use crate::error::AssetError;
use crate::{CurrentConditions, DailyForecast, TideExtremum, TideKind};
use chrono::{DateTime, Local};
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_7X13, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};

/// Display canvas width in pixels
pub const SCREEN_WIDTH: u32 = 800;
/// Display canvas height in pixels
pub const SCREEN_HEIGHT: u32 = 480;

/// Report strings wider than this are reflowed onto two lines
pub const REPORT_WRAP_WIDTH: u32 = 250;

// Font roles; sizes approximate the original proportional faces
const FONT_SMALL: &MonoFont = &FONT_7X13; // detail lines, tide list
const FONT_MEDIUM: &MonoFont = &FONT_9X15; // report, day labels
const FONT_LARGE: &MonoFont = &FONT_10X20; // location, temperature, errors

/// Everything one render cycle feeds the compositor.
pub struct DashboardData {
    pub location: String,
    pub current: CurrentConditions,
    pub today: DailyForecast,
    pub tomorrow: DailyForecast,
    pub day_after: DailyForecast,
    pub tide_chart: Canvas,
    pub extrema: Vec<TideExtremum>,
    pub generated_at: DateTime<Local>,
}

/// Rendered pixel width of `text` in a monospaced font.
pub fn text_width(font: &MonoFont, text: &str) -> u32 {
    text.chars().count() as u32 * (font.character_size.width + font.character_spacing)
}

/// Title-case a provider description: "light rain" becomes "Light Rain".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the "Now: ..." report string and its centered x position.
///
/// If the one-line form is wider than [`REPORT_WRAP_WIDTH`], a line break is
/// inserted after "Now:" and the string re-measured (widest line wins).
/// There is no second width check after the reflow. The horizontal anchor is
/// `x = 120 - floor(width / 2)`.
pub fn layout_report(description: &str, font: &MonoFont) -> (String, i32) {
    let titled = title_case(description);
    let mut report = format!("Now: {}", titled);
    if text_width(font, &report) > REPORT_WRAP_WIDTH {
        report = format!("Now:\n{}", titled);
    }
    let width = report
        .lines()
        .map(|line| text_width(font, line))
        .max()
        .unwrap_or(0);
    (report, 120 - (width / 2) as i32)
}

/// Current temperature for the big readout, e.g. "68°F".
pub fn format_current_temp(temp: f32) -> String {
    format!("{:.0}°F", temp)
}

/// Apparent-temperature line, e.g. "Feels like: 65°F".
pub fn format_feels_like(feels_like: f32) -> String {
    format!("Feels like: {:.0}°F", feels_like)
}

/// Wind line with one decimal, e.g. "Wind: 5.3 MPH".
pub fn format_wind(wind_speed: f32) -> String {
    format!("Wind: {:.1} MPH", wind_speed)
}

/// Label for one tide extremum, or None for an unlabeled kind.
///
/// The two-space pad after "Low:" keeps the times column-aligned in the
/// monospaced list.
pub fn format_extremum(extremum: &TideExtremum) -> Option<String> {
    let time = extremum.time.format("%H:%M");
    match extremum.kind {
        Some(TideKind::High) => Some(format!("High: {}", time)),
        Some(TideKind::Low) => Some(format!("Low:  {}", time)),
        None => None,
    }
}

/// Compose the full dashboard onto the template background.
pub fn render_dashboard(data: &DashboardData, assets: &AssetStore) -> Result<Canvas, AssetError> {
    let mut canvas = Canvas::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    canvas.blit(&assets.template()?, 0, 0);

    let small = MonoTextStyle::new(FONT_SMALL, BinaryColor::On);
    let medium = MonoTextStyle::new(FONT_MEDIUM, BinaryColor::On);
    let large = MonoTextStyle::new(FONT_LARGE, BinaryColor::On);

    // 1. Current-conditions icon
    canvas.blit(&assets.icon(&data.current.icon_code)?, 50, 50);

    // 2. Location label
    draw(&mut canvas, &data.location, 125, 10, large);

    // 3-4. Report string with single-level reflow, centered around x=120
    let (report, report_x) = layout_report(&data.current.description, FONT_MEDIUM);
    draw(&mut canvas, &report, report_x, 175, medium);

    // 5. Current readings at fixed offsets from y=100
    draw(
        &mut canvas,
        &format_current_temp(data.current.temp),
        250,
        55,
        large,
    );
    let y = 100;
    draw(
        &mut canvas,
        &format_feels_like(data.current.feels_like),
        250,
        y,
        small,
    );
    draw(
        &mut canvas,
        &format_wind(data.current.wind_speed),
        250,
        y + 20,
        small,
    );
    draw(&mut canvas, &data.today.fmt_precip, 250, y + 40, small);
    draw(&mut canvas, &data.today.fmt_temp_max, 250, y + 60, small);
    draw(&mut canvas, &data.today.fmt_temp_min, 250, y + 80, small);

    // 6. Last-updated timestamp
    let updated = format!("Last Updated: {}", data.generated_at.format("%H:%M"));
    draw(&mut canvas, &updated, 125, 218, small);

    // 7. Forecast columns for day +1 and +2
    canvas.blit(&assets.icon_file(&data.tomorrow.icon_file)?, 435, 50);
    draw(&mut canvas, "Tomorrow", 450, 20, medium);
    draw(&mut canvas, &data.tomorrow.fmt_temp_max, 415, 180, small);
    draw(&mut canvas, &data.tomorrow.fmt_temp_min, 515, 180, small);
    draw(&mut canvas, &data.tomorrow.fmt_precip, 460, 200, small);

    canvas.blit(&assets.icon_file(&data.day_after.icon_file)?, 635, 50);
    draw(&mut canvas, "Next-Next Day", 625, 20, medium);
    draw(&mut canvas, &data.day_after.fmt_temp_max, 615, 180, small);
    draw(&mut canvas, &data.day_after.fmt_temp_min, 715, 180, small);
    draw(&mut canvas, &data.day_after.fmt_precip, 660, 200, small);

    // 8. Vertical dividers between the three weather columns
    line(&mut canvas, (400, 10), (400, 220), 3);
    line(&mut canvas, (600, 20), (600, 210), 2);

    // 9. Tide chart
    canvas.blit(&data.tide_chart, 125, 240);

    // 10. Horizontal divider above the tide section
    line(&mut canvas, (25, 240), (775, 240), 3);

    // 11. Tide extrema list; unlabeled kinds are skipped without
    // advancing the cursor
    draw(&mut canvas, "Today's Tide", 30, 260, medium);
    let mut y_loc = 300;
    for extremum in &data.extrema {
        if let Some(label) = format_extremum(extremum) {
            draw(&mut canvas, &label, 40, y_loc, small);
            y_loc += 25;
        }
    }

    Ok(canvas)
}

/// Full-screen error panel drawn when an upstream stage has failed.
pub fn render_error_panel(
    width: u32,
    height: u32,
    source: &str,
    retry_secs: u64,
    now: DateTime<Local>,
) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    let large = MonoTextStyle::new(FONT_LARGE, BinaryColor::On);
    let medium = MonoTextStyle::new(FONT_MEDIUM, BinaryColor::On);

    draw(&mut canvas, &format!("{} ERROR", source), 100, 150, large);
    draw(
        &mut canvas,
        &format!("Retrying in {} seconds", retry_secs),
        100,
        300,
        medium,
    );
    draw(
        &mut canvas,
        &format!("Last Refresh: {}", now.format("%H:%M")),
        300,
        365,
        large,
    );
    canvas
}

fn draw(canvas: &mut Canvas, text: &str, x: i32, y: i32, style: MonoTextStyle<'_, BinaryColor>) {
    Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
        .draw(canvas)
        .ok();
}

fn line(canvas: &mut Canvas, from: (i32, i32), to: (i32, i32), stroke: u32) {
    Line::new(Point::new(from.0, from.1), Point::new(to.0, to.1))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, stroke))
        .draw(canvas)
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn extremum(h: u32, m: u32, kind: Option<TideKind>) -> TideExtremum {
        TideExtremum {
            time: NaiveDate::from_ymd_opt(2024, 6, 16)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
            kind,
        }
    }

    #[test]
    fn title_cases_each_word() {
        assert_eq!(title_case("light rain"), "Light Rain");
        assert_eq!(title_case("overcast clouds"), "Overcast Clouds");
        assert_eq!(title_case("mist"), "Mist");
    }

    #[test]
    fn short_report_is_unmodified_and_centered() {
        // "Now: Light Rain" = 15 chars x 9 px = 135 px, under the threshold
        let (report, x) = layout_report("light rain", &FONT_9X15);
        assert_eq!(report, "Now: Light Rain");
        let width = text_width(&FONT_9X15, &report);
        assert!(width <= REPORT_WRAP_WIDTH);
        assert_eq!(x, 120 - (width / 2) as i32);
    }

    #[test]
    fn wide_report_reflows_after_now_prefix() {
        // 31 chars with the prefix: 36 x 9 = 324 px, over the threshold
        let description = "thunderstorm with heavy drizzle";
        let (report, x) = layout_report(description, &FONT_9X15);
        assert_eq!(report, "Now:\nThunderstorm With Heavy Drizzle");

        // Centering uses the re-measured multi-line width (widest line)
        let widest = report
            .lines()
            .map(|l| text_width(&FONT_9X15, l))
            .max()
            .unwrap();
        assert_eq!(widest, text_width(&FONT_9X15, "Thunderstorm With Heavy Drizzle"));
        assert_eq!(x, 120 - (widest / 2) as i32);
    }

    #[test]
    fn current_condition_strings_round_for_display() {
        assert_eq!(format_current_temp(68.4), "68°F");
        assert_eq!(format_feels_like(65.0), "Feels like: 65°F");
        assert_eq!(format_wind(5.3), "Wind: 5.3 MPH");
    }

    #[test]
    fn extremum_labels_match_alignment() {
        assert_eq!(
            format_extremum(&extremum(14, 5, Some(TideKind::High))).unwrap(),
            "High: 14:05"
        );
        assert_eq!(
            format_extremum(&extremum(3, 30, Some(TideKind::Low))).unwrap(),
            "Low:  03:30"
        );
        assert_eq!(format_extremum(&extremum(9, 0, None)), None);
    }

    #[test]
    fn error_panel_draws_all_three_lines() {
        let now = Local.with_ymd_and_hms(2024, 6, 16, 8, 15, 0).unwrap();
        let panel = render_error_panel(SCREEN_WIDTH, SCREEN_HEIGHT, "Tide Data", 30, now);
        assert_eq!(panel.width(), SCREEN_WIDTH);
        assert!(panel.black_pixel_count() > 0);
        // Text rows at the three fixed anchors
        assert!((100..400).any(|x| panel.is_black(x, 155)));
        assert!((100..400).any(|x| panel.is_black(x, 305)));
        assert!((300..600).any(|x| panel.is_black(x, 370)));
    }

    // -- full dashboard composition over synthetic assets --

    fn synthetic_assets() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("icon")).unwrap();
        let template =
            RgbaImage::from_pixel(SCREEN_WIDTH, SCREEN_HEIGHT, Rgba([255, 255, 255, 255]));
        template.save(dir.path().join("template.png")).unwrap();
        for code in ["10d", "02d", "04d"] {
            let icon = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
            icon.save(dir.path().join("icon").join(format!("{}.png", code)))
                .unwrap();
        }
        dir
    }

    fn forecast(icon: &str) -> DailyForecast {
        DailyForecast {
            temp_min: 54.0,
            temp_max: 72.0,
            precip_percent: 30.0,
            icon_code: icon.to_string(),
            fmt_temp_min: "Low: 54°F".to_string(),
            fmt_temp_max: "High: 72°F".to_string(),
            fmt_precip: "Precip: 30%".to_string(),
            icon_file: format!("{}.png", icon),
        }
    }

    fn dashboard_data() -> DashboardData {
        DashboardData {
            location: "Portland, ME".to_string(),
            current: CurrentConditions {
                temp: 68.4,
                feels_like: 65.0,
                humidity: 71,
                wind_speed: 5.3,
                description: "light rain".to_string(),
                icon_code: "10d".to_string(),
            },
            today: forecast("10d"),
            tomorrow: forecast("02d"),
            day_after: forecast("04d"),
            tide_chart: crate::tide_plot::render(&crate::WaterLevelSeries {
                samples: vec![
                    crate::LevelSample {
                        time: NaiveDate::from_ymd_opt(2024, 6, 16)
                            .unwrap()
                            .and_hms_opt(0, 0, 0)
                            .unwrap(),
                        level_ft: -0.4,
                    },
                    crate::LevelSample {
                        time: NaiveDate::from_ymd_opt(2024, 6, 16)
                            .unwrap()
                            .and_hms_opt(12, 0, 0)
                            .unwrap(),
                        level_ft: 9.2,
                    },
                ],
            }),
            extrema: vec![
                extremum(3, 30, Some(TideKind::Low)),
                extremum(9, 0, None),
                extremum(14, 5, Some(TideKind::High)),
            ],
            generated_at: Local.with_ymd_and_hms(2024, 6, 16, 8, 15, 0).unwrap(),
        }
    }

    #[test]
    fn dashboard_contains_all_fixed_coordinate_draws() {
        let assets_dir = synthetic_assets();
        let assets = AssetStore::new(assets_dir.path());
        let canvas = render_dashboard(&dashboard_data(), &assets).unwrap();

        assert_eq!(canvas.width(), SCREEN_WIDTH);
        assert_eq!(canvas.height(), SCREEN_HEIGHT);

        // Current icon pasted solid at (50,50), 130x130
        assert!(canvas.is_black(50, 50));
        assert!(canvas.is_black(179, 179));
        // Forecast icons at (435,50) and (635,50)
        assert!(canvas.is_black(435, 50));
        assert!(canvas.is_black(635, 50));
        // Vertical dividers at x=400 and x=600
        assert!(canvas.is_black(400, 100));
        assert!(canvas.is_black(600, 100));
        // Horizontal divider at y=240
        assert!(canvas.is_black(100, 240));
        // Location text row at (125,10)
        assert!((125..300).any(|x| canvas.is_black(x, 15)));
        // Tide list rows: two labeled entries at y=300 and y=325, the
        // unlabeled one skipped without advancing the cursor
        assert!((40..150).any(|x| canvas.is_black(x, 305)));
        assert!((40..150).any(|x| canvas.is_black(x, 330)));
        assert!(!(40..150).any(|x| canvas.is_black(x, 355)));
    }

    #[test]
    fn missing_icon_aborts_composition() {
        let assets_dir = synthetic_assets();
        let assets = AssetStore::new(assets_dir.path());
        let mut data = dashboard_data();
        data.current.icon_code = "99z".to_string();
        assert!(render_dashboard(&data, &assets).is_err());
    }
}
