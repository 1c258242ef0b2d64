use std::f64::consts::FRAC_PI_4;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use crate::error::{PassengerError, Result};
use crate::histogram::FareHistogram;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;

const FONT_FAMILY: &'static str = "sans-serif";
const FONT_DATA: &'static [u8] = include_bytes!("../assets/DejaVuSans.ttf");

const TITLE: &'static str = "Count of Titanic Passengers in Fare Percentage Ranges";
const X_DESC: &'static str = "Percentage Range";
const Y_DESC: &'static str = "Count of Passengers";

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const BAR_HALF_WIDTH: f64 = 0.25;
const LABEL_SIZE: u32 = 14;

/// Renders the histogram as a bar chart and returns the PNG, base64 encoded.
pub fn render_base64(hist: &FareHistogram) -> Result<String> {
    Ok(STANDARD.encode(render_png(hist)?))
}

pub fn render_png(hist: &FareHistogram) -> Result<Vec<u8>> {
    ensure_font()?;
    let mut pixels = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    draw_chart(hist, &mut pixels)?;

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&pixels, WIDTH, HEIGHT, ColorType::Rgb8)
        .map_err(PassengerError::chart)?;
    debug!(bytes = png.len(), "encoded fare histogram");
    Ok(png)
}

fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let registered = *REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_DATA).is_ok());
    if registered {
        Ok(())
    } else {
        Err(PassengerError::chart("embedded font could not be loaded"))
    }
}

fn draw_chart(hist: &FareHistogram, pixels: &mut [u8]) -> Result<()> {
    let root = BitMapBackend::with_buffer(pixels, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(PassengerError::chart)?;

    let max_count = hist.buckets.iter().map(|b| b.count).max().unwrap_or(0);
    let y_max = max_count + max_count / 10 + 1;
    let x_max = hist.buckets.len() as f64 - 0.5;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, (FONT_FAMILY, 22))
        .margin(20)
        .x_label_area_size(100)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..x_max, 0u64..y_max)
        .map_err(PassengerError::chart)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .axis_desc_style((FONT_FAMILY, 16))
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .draw()
        .map_err(PassengerError::chart)?;

    chart
        .draw_series(hist.buckets.iter().enumerate().map(|(i, bucket)| {
            let x = i as f64;
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0), (x + BAR_HALF_WIDTH, bucket.count)],
                SKY_BLUE.filled(),
            )
        }))
        .map_err(PassengerError::chart)?;

    let count_style = TextStyle::from((FONT_FAMILY, LABEL_SIZE).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(hist.buckets.iter().enumerate().map(|(i, bucket)| {
            EmptyElement::at((i as f64, bucket.count))
                + Text::new(bucket.count.to_string(), (0, -5), count_style.clone())
        }))
        .map_err(PassengerError::chart)?;

    for (i, bucket) in hist.buckets.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(i as f64, 0));
        draw_rotated_label(&root, &bucket.label, (x, y + 8))?;
    }

    root.present().map_err(PassengerError::chart)?;
    Ok(())
}

/// Draws `text` turned 45 degrees counter-clockwise, its bounding box hanging
/// centered below `top`. Plotters only rotates text by quarter turns, so the
/// label is rasterized off-screen and resampled.
fn draw_rotated_label(area: &DrawingArea<BitMapBackend<'_>, Shift>, text: &str, top: (i32, i32)) -> Result<()> {
    let style = TextStyle::from((FONT_FAMILY, LABEL_SIZE).into_font()).color(&BLACK);
    let (text_w, text_h) = area.estimate_text_size(text, &style).map_err(PassengerError::chart)?;
    let (w, h) = (text_w + 4, text_h + 4);

    let mut glyphs = vec![255u8; (w * h * 3) as usize];
    {
        let scratch = BitMapBackend::with_buffer(&mut glyphs, (w, h)).into_drawing_area();
        scratch.draw_text(text, &style, (2, 2)).map_err(PassengerError::chart)?;
        scratch.present().map_err(PassengerError::chart)?;
    }

    let (sin, cos) = FRAC_PI_4.sin_cos();
    let half_extent = ((w + h) as f64 * sin / 2.0).ceil() as i32;
    let center = (top.0, top.1 + half_extent);
    for dy in -half_extent..=half_extent {
        for dx in -half_extent..=half_extent {
            let (fx, fy) = (dx as f64, dy as f64);
            let sx = (fx * cos - fy * sin + w as f64 / 2.0).floor();
            let sy = (fx * sin + fy * cos + h as f64 / 2.0).floor();
            if sx < 0.0 || sy < 0.0 || sx >= w as f64 || sy >= h as f64 {
                continue;
            }
            let shade = glyphs[((sy as u32 * w + sx as u32) * 3) as usize];
            if shade < 250 {
                area.draw_pixel((center.0 + dx, center.1 + dy), &RGBColor(shade, shade, shade))
                    .map_err(PassengerError::chart)?;
            }
        }
    }
    Ok(())
}
