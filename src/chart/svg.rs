//! SVG document assembly.
//!
//! Output is a standalone document: fixed width/height, gradient and style
//! embedded, no external references. Identical input gives identical bytes.

use std::fmt::Write;

use super::curve::{self, fmt_num, Point};
use super::scale::{date_ticks, TimeScale, ValueScale};
use super::{ChartPoint, ChartText, Layout};

const LINE_COLOR: &str = "#2196F3";

const STYLE: &str = "
    .grid line { stroke: #e0e0e0; stroke-opacity: 0.7; shape-rendering: crispEdges; }
    .grid path { stroke-width: 0; }
    .dot:hover { r: 6; }
    text { font-family: Arial, sans-serif; }
    .title { font-size: 16px; font-weight: bold; }
    .label { font-size: 12px; }
    .x-axis path, .y-axis path, .x-axis line, .y-axis line { stroke: #ccc; }
    .x-axis text, .y-axis text { fill: #666; font-size: 10px; }
";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(points: &[ChartPoint], layout: &Layout, text: &ChartText) -> String {
    let plot_w = layout.plot_width();
    let plot_h = layout.plot_height();

    let dates: Vec<_> = points.iter().map(|p| p.date).collect();
    let x = TimeScale::new(&dates, plot_w);
    let max_value = points.iter().map(|p| p.value).max().unwrap_or(0);
    let y = ValueScale::new(max_value, layout.headroom_factor, layout.value_ticks, plot_h);

    let x_ticks = date_ticks(&dates, layout.max_date_ticks);
    let y_ticks = y.ticks();
    let decimals = y.step().decimals();

    let plotted: Vec<Point> = points
        .iter()
        .map(|p| Point {
            x: x.map(p.date),
            y: y.map(p.value as f64),
        })
        .collect();

    let mut svg = String::new();

    // writing to a String never fails, results are ignored below
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(layout.width),
        h = fmt_num(layout.height),
    );
    let _ = writeln!(svg, "<style>{STYLE}</style>");
    let _ = writeln!(
        svg,
        r#"<defs><linearGradient id="area-gradient" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="{LINE_COLOR}" stop-opacity="0.8"/><stop offset="100%" stop-color="{LINE_COLOR}" stop-opacity="0.1"/></linearGradient></defs>"#
    );
    let _ = writeln!(
        svg,
        r#"<g transform="translate({},{})">"#,
        fmt_num(layout.margin.left),
        fmt_num(layout.margin.top)
    );

    let _ = writeln!(
        svg,
        r#"<text class="title" x="{}" y="{}" text-anchor="middle">{}</text>"#,
        fmt_num(plot_w / 2.0),
        fmt_num(-layout.margin.top / 2.0),
        escape(&text.title)
    );

    // gridlines
    let _ = writeln!(svg, r#"<g class="grid">"#);
    for date in &x_ticks {
        let px = fmt_num(x.map(*date));
        let _ = writeln!(svg, r#"<line x1="{px}" y1="0" x2="{px}" y2="{}"/>"#, fmt_num(plot_h));
    }
    for tick in &y_ticks {
        let py = fmt_num(y.map(*tick));
        let _ = writeln!(svg, r#"<line x1="0" y1="{py}" x2="{}" y2="{py}"/>"#, fmt_num(plot_w));
    }
    let _ = writeln!(svg, "</g>");

    if plotted.len() >= 2 {
        let _ = writeln!(
            svg,
            r#"<path class="area" d="{}" style="fill: url(#area-gradient); opacity: 0.3"/>"#,
            curve::path_data(&curve::area(&plotted, plot_h))
        );
    }
    if !plotted.is_empty() {
        let _ = writeln!(
            svg,
            r#"<path class="line" d="{}" style="fill: none; stroke: {LINE_COLOR}; stroke-width: 2px"/>"#,
            curve::path_data(&curve::monotone_x(&plotted))
        );
    }

    for p in &plotted {
        let _ = writeln!(
            svg,
            r#"<circle class="dot" cx="{}" cy="{}" r="4" style="fill: {LINE_COLOR}; stroke: #fff; stroke-width: 2px"/>"#,
            fmt_num(p.x),
            fmt_num(p.y)
        );
    }
    for (p, source) in plotted.iter().zip(points) {
        let _ = writeln!(
            svg,
            r#"<text class="label" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            fmt_num(p.x),
            fmt_num(p.y - 10.0),
            source.value
        );
    }

    // x axis
    let _ = writeln!(
        svg,
        r#"<g class="x-axis" transform="translate(0,{})">"#,
        fmt_num(plot_h)
    );
    let _ = writeln!(svg, r#"<path d="M0,0H{}" fill="none"/>"#, fmt_num(plot_w));
    for date in &x_ticks {
        let _ = writeln!(
            svg,
            r#"<g transform="translate({},0)"><line y2="6"/><text y="9" dx="-.8em" dy=".15em" transform="rotate(-45)" text-anchor="end">{}</text></g>"#,
            fmt_num(x.map(*date)),
            date.format("%m-%d")
        );
    }
    let _ = writeln!(svg, "</g>");

    // y axis
    let _ = writeln!(svg, r#"<g class="y-axis">"#);
    let _ = writeln!(svg, r#"<path d="M0,{}V0" fill="none"/>"#, fmt_num(plot_h));
    for tick in &y_ticks {
        let _ = writeln!(
            svg,
            r#"<g transform="translate(0,{})"><line x2="-6"/><text x="-9" dy=".32em" text-anchor="end">{:.*} {}</text></g>"#,
            fmt_num(y.map(*tick)),
            decimals,
            tick,
            escape(&text.unit_label)
        );
    }
    let _ = writeln!(svg, "</g>");

    let _ = writeln!(svg, "</g>");
    let _ = writeln!(svg, "</svg>");
    svg
}
