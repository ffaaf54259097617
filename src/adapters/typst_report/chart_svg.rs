//! SVG rendering of the daily cumulative P&L curve.

use crate::domain::analytics::CumulativePoint;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 240.0;
const PADDING: f64 = 40.0;

/// Render the curve as a standalone SVG document. Empty input yields an empty string.
pub fn generate_cumulative_svg(points: &[CumulativePoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    // Zero is always in range so the baseline can be drawn.
    let min = points
        .iter()
        .map(|p| p.cumulative_pnl)
        .fold(0.0_f64, f64::min);
    let max = points
        .iter()
        .map(|p| p.cumulative_pnl)
        .fold(0.0_f64, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if points.len() > 1 {
        plot_width / (points.len() - 1) as f64
    } else {
        0.0
    };
    let y_for = |value: f64| HEIGHT - PADDING - (value - min) * scale_y;

    let polyline = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", PADDING + i as f64 * scale_x, y_for(p.cumulative_pnl)))
        .collect::<Vec<_>>()
        .join(" ");

    let last = points[points.len() - 1].cumulative_pnl;
    let stroke = if last >= 0.0 { "#1f8a3a" } else { "#c0392b" };
    let baseline = y_for(0.0);
    let first_date = points[0].date.format("%Y-%m-%d");
    let last_date = points[points.len() - 1].date.format("%Y-%m-%d");

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}">"#
    ));
    svg.push_str(&format!(
        r#"<rect width="{WIDTH:.0}" height="{HEIGHT:.0}" fill="white"/>"#
    ));
    svg.push_str(&format!(
        r##"<line x1="{PADDING:.0}" y1="{baseline:.1}" x2="{:.0}" y2="{baseline:.1}" stroke="#999999" stroke-dasharray="4 3"/>"##,
        WIDTH - PADDING
    ));
    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="{stroke}" stroke-width="2" points="{polyline}"/>"#
    ));
    svg.push_str(&format!(
        r#"<text x="{PADDING:.0}" y="{:.0}" font-size="10">{first_date}</text>"#,
        HEIGHT - 10.0
    ));
    svg.push_str(&format!(
        r#"<text x="{:.0}" y="{:.0}" font-size="10" text-anchor="end">{last_date}</text>"#,
        WIDTH - PADDING,
        HEIGHT - 10.0
    ));
    svg.push_str(&format!(
        r#"<text x="4" y="{:.0}" font-size="10">{max:.2}</text>"#,
        PADDING
    ));
    svg.push_str(&format!(
        r#"<text x="4" y="{:.0}" font-size="10">{min:.2}</text>"#,
        HEIGHT - PADDING
    ));
    svg.push_str("</svg>");
    svg
}
