//! Plotters-powered decay chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer with
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description. All series and bounds are computed
/// outside the render call.
pub struct DecayChart<'a> {
    /// Penalty amount against days elapsed.
    pub curve: &'a [(f64, f64)],
    /// The request's own position on the curve.
    pub current: (f64, f64),
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for DecayChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let curve_color = RGBColor(0, 255, 255); // cyan
            let current_color = RGBColor(255, 255, 0); // yellow

            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a pixel
            // cross reads clearly in a terminal.
            let (cx, cy) = self.current;
            let dx = (x1 - x0) / 100.0;
            let dy = (y1 - y0) / 50.0;
            chart.draw_series(
                [(cx, cy), (cx - dx, cy), (cx + dx, cy), (cx, cy - dy), (cx, cy + dy)]
                    .into_iter()
                    .map(|p| Pixel::new(p, current_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
