//! ASCII plotting for terminal output.
//!
//! Fixed-size grid, deterministic output. The x axis is elapsed time (left is
//! inception, right is maturity), the y axis is the penalty amount.
//!
//! Plot elements:
//! - decay schedule: `-` line
//! - the request's own position: `*`

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::DecaySchedule;

/// Render a decay schedule.
pub fn render_decay_plot(schedule: &DecaySchedule, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let total = f64::from(schedule.request.total_maturity_days);

    let curve: Vec<(f64, f64)> = schedule
        .points
        .iter()
        .map(|p| (total - f64::from(p.days_remaining), to_f64(p.penalty_amount)))
        .collect();
    let current = (
        total - f64::from(schedule.request.days_remaining),
        to_f64(schedule.current.penalty_amount),
    );

    let (y_min, y_max) = y_range(&curve).unwrap_or((0.0, 1.0));
    let (pad_min, pad_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &curve, total, pad_min, pad_max);

    let x = map_x(current.0, total, width);
    let y = map_y(current.1, pad_min, pad_max, height);
    grid[y][x] = '*';

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: days remaining=[{} -> 0] | penalty=[{y_min:.2}, {y_max:.2}]\n",
        schedule.request.total_maturity_days
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn to_f64(v: Decimal) -> f64 {
    v.to_f64().unwrap_or(0.0)
}

fn y_range(curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in curve {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(elapsed: f64, total: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = if total > 0.0 { (elapsed / total).clamp(0.0, 1.0) } else { 1.0 };
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], total: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, total, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
