//! Monotone cubic interpolation in x (Fritsch-Carlson, as in d3's
//! `curveMonotoneX`). The curve passes through every point and never leaves
//! the vertical range of the two points a segment connects.

use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

fn sign(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn slope(a: Point, b: Point) -> f64 {
    let h = b.x - a.x;
    if h == 0.0 {
        0.0
    } else {
        (b.y - a.y) / h
    }
}

/// Tangent at `curr`, limited so the curve cannot overshoot either neighbour.
fn interior_tangent(prev: Point, curr: Point, next: Point) -> f64 {
    let h0 = curr.x - prev.x;
    let h1 = next.x - curr.x;
    let s0 = slope(prev, curr);
    let s1 = slope(curr, next);
    let p = if h0 + h1 == 0.0 { 0.0 } else { (s0 * h1 + s1 * h0) / (h0 + h1) };
    let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if t.is_finite() {
        t
    } else {
        0.0
    }
}

/// Tangent at an end point from the neighbouring tangent `t`.
fn end_tangent(a: Point, b: Point, t: f64) -> f64 {
    let h = b.x - a.x;
    if h == 0.0 {
        t
    } else {
        (3.0 * (b.y - a.y) / h - t) / 2.0
    }
}

/// Path segments through `points`, which must be sorted by x.
pub fn monotone_x(points: &[Point]) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(points.len());
    let Some(&first) = points.first() else {
        return segments;
    };
    segments.push(Segment::MoveTo(first));

    match points.len() {
        1 => {}
        2 => segments.push(Segment::LineTo(points[1])),
        n => {
            let mut tangents = vec![0.0; n];
            for i in 1..n - 1 {
                tangents[i] = interior_tangent(points[i - 1], points[i], points[i + 1]);
            }
            tangents[0] = end_tangent(points[0], points[1], tangents[1]);
            tangents[n - 1] = end_tangent(points[n - 2], points[n - 1], tangents[n - 2]);

            for i in 0..n - 1 {
                let (a, b) = (points[i], points[i + 1]);
                let dx = (b.x - a.x) / 3.0;
                segments.push(Segment::CubicTo(
                    Point { x: a.x + dx, y: a.y + dx * tangents[i] },
                    Point { x: b.x - dx, y: b.y - dx * tangents[i + 1] },
                    b,
                ));
            }
        }
    }

    segments
}

/// The same curve closed down to `baseline`, for the filled area.
pub fn area(points: &[Point], baseline: f64) -> Vec<Segment> {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let mut segments = monotone_x(points);
    segments.push(Segment::LineTo(Point { x: last.x, y: baseline }));
    segments.push(Segment::LineTo(Point { x: first.x, y: baseline }));
    segments.push(Segment::Close);
    segments
}

/// Format a coordinate with at most two decimals and no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// SVG path data for the segments.
pub fn path_data(segments: &[Segment]) -> String {
    let mut d = String::new();
    for segment in segments {
        // writing to a String never fails
        let _ = match segment {
            Segment::MoveTo(p) => write!(d, "M{},{}", fmt_num(p.x), fmt_num(p.y)),
            Segment::LineTo(p) => write!(d, "L{},{}", fmt_num(p.x), fmt_num(p.y)),
            Segment::CubicTo(c1, c2, p) => write!(
                d,
                "C{},{},{},{},{},{}",
                fmt_num(c1.x),
                fmt_num(c1.y),
                fmt_num(c2.x),
                fmt_num(c2.y),
                fmt_num(p.x),
                fmt_num(p.y)
            ),
            Segment::Close => write!(d, "Z"),
        };
    }
    d
}
