//! Ratatui-based terminal UI.
//!
//! A form with the four request inputs on the left, the live estimate below
//! it, and the decay chart on the right. Every edit recomputes; while the form
//! is invalid the field errors are shown in the status line and nothing is
//! computed.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::cli::TuiArgs;
use crate::domain::{DecaySchedule, EngineConfig, Field, PenaltyRequest, PenaltyResult, Severity};
use crate::engine::{PenaltyError, compute_penalty_with, decay_schedule, validate};
use crate::error::AppError;
use crate::io::RequestDraft;
use crate::report::{WaitHint, fmt_money, fmt_pct, format_wait_hint};

mod plotters_chart;

use plotters_chart::DecayChart;

/// Schedule resolution for the chart.
const CHART_POINTS: u32 = 120;

/// Start the TUI.
pub fn run(args: TuiArgs, config: EngineConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(&args, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Everything derived from a valid form.
struct Estimate {
    request: PenaltyRequest,
    result: PenaltyResult,
    schedule: DecaySchedule,
    hints: Vec<WaitHint>,
}

struct App {
    config: EngineConfig,
    /// Raw text per field, in `Field::REQUEST` order.
    inputs: [String; 4],
    selected_field: usize,
    status: String,
    estimate: Option<Estimate>,
}

impl App {
    fn new(args: &TuiArgs, config: EngineConfig) -> Self {
        let mut app = Self {
            config,
            inputs: [
                args.principal.to_string(),
                args.rate.to_string(),
                args.days_remaining.to_string(),
                args.total_days.to_string(),
            ],
            selected_field: 0,
            status: String::new(),
            estimate: None,
        };
        app.recompute();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::BackTab => {
                self.selected_field = self.selected_field.checked_sub(1).unwrap_or(self.inputs.len() - 1);
            }
            KeyCode::Down | KeyCode::Tab | KeyCode::Enter => {
                self.selected_field = (self.selected_field + 1) % self.inputs.len();
            }
            KeyCode::Left => self.nudge_days(-1),
            KeyCode::Right => self.nudge_days(1),
            KeyCode::Char('c') => {
                self.config.overrun_policy = self.config.overrun_policy.toggled();
                self.recompute();
            }
            KeyCode::Backspace => {
                self.inputs[self.selected_field].pop();
                self.recompute();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                self.inputs[self.selected_field].push(c);
                self.recompute();
            }
            _ => {}
        }
        false
    }

    /// Move days remaining by `delta`, staying within `[0, total]` when the
    /// term parses.
    fn nudge_days(&mut self, delta: i64) {
        let Ok(days) = self.inputs[2].trim().parse::<i64>() else {
            self.status = "Days remaining must be a whole number to nudge.".to_string();
            return;
        };
        let upper = self.inputs[3].trim().parse::<i64>().unwrap_or(i64::from(u32::MAX));
        let next = (days + delta).clamp(0, upper.max(0));
        self.inputs[2] = next.to_string();
        self.recompute();
    }

    fn recompute(&mut self) {
        match self.estimate_from_inputs() {
            Ok(estimate) => {
                self.status = format!(
                    "{} | overrun: {}",
                    estimate.result.severity,
                    self.config.overrun_policy.as_str()
                );
                self.estimate = Some(estimate);
            }
            Err(err) => {
                self.status = err.to_string();
                self.estimate = None;
            }
        }
    }

    fn estimate_from_inputs(&self) -> Result<Estimate, PenaltyError> {
        let draft = RequestDraft::from_text(&self.inputs[0], &self.inputs[1], &self.inputs[2], &self.inputs[3]);
        let request = draft.finish(&self.config)?;
        let result = compute_penalty_with(&request, &self.config)?;
        let request = validate(&request, &self.config)?;
        let step = (request.total_maturity_days / CHART_POINTS).max(1);
        let schedule = decay_schedule(&request, step, &self.config)?;
        let hints = crate::app::wait_hints(&request, result.severity, &self.config)?;
        Ok(Estimate {
            request,
            result,
            schedule,
            hints,
        })
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let t = self.config.thresholds;
        let line = Line::from(vec![
            Span::styled("penalty", Style::default().fg(Color::Cyan)),
            Span::raw(" early withdrawal estimator "),
            Span::styled(
                format!(
                    "| overrun: {} | medium >= {} | high >= {}",
                    self.config.overrun_policy.as_str(),
                    t.medium,
                    t.high
                ),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(columns[0]);

        self.draw_form(frame, left[0]);
        self.draw_result(frame, left[1]);
        self.draw_chart(frame, columns[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = Field::REQUEST
            .iter()
            .zip(&self.inputs)
            .map(|(field, text)| ListItem::new(format!("{:<18} {text}", field_label(*field))))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Request").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Estimate").borders(Borders::ALL);
        let Some(est) = &self.estimate else {
            let msg = Paragraph::new("Fix the highlighted inputs to see an estimate.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let r = &est.result;
        let mut lines = vec![
            Line::from(format!("Time to maturity  {}%", fmt_pct(r.maturity_progress_percent))),
            Line::from(format!("Adjusted rate     {}%", fmt_pct(r.adjusted_penalty_percent))),
            Line::from(format!("Penalty           {}", fmt_money(r.penalty_amount))),
            Line::from(format!("Net withdrawal    {}", fmt_money(r.net_withdrawal))),
            Line::from(format!("Effective rate    {}%", fmt_pct(r.effective_penalty_percent))),
            Line::from(vec![
                Span::raw("Severity          "),
                Span::styled(
                    r.severity.as_str(),
                    Style::default()
                        .fg(severity_color(r.severity))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];
        if est.request.days_remaining != self.inputs[2].trim().parse().unwrap_or(est.request.days_remaining) {
            lines.push(Line::from(Span::styled(
                format!("Days remaining clamped to {}", est.request.days_remaining),
                Style::default().fg(Color::Yellow),
            )));
        }
        if !est.hints.is_empty() {
            lines.push(Line::from(""));
            for h in &est.hints {
                lines.push(Line::from(Span::styled(format_wait_hint(h), Style::default().fg(Color::Gray))));
            }
        }

        let p = Paragraph::new(Text::from(lines)).block(block);
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Penalty decay").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(est) = &self.estimate else {
            return;
        };

        let series = chart_series(&est.schedule);
        let widget = DecayChart {
            curve: &series.curve,
            current: series.current,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "days elapsed",
            y_label: "penalty",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  type to edit  ←/→ days  c overrun  q quit";
        let status_color = match &self.estimate {
            Some(est) => severity_color(est.result.severity),
            None => Color::Red,
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(status_color)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::Principal => "Principal",
        Field::PenaltyRatePercent => "Penalty rate (%)",
        Field::DaysRemaining => "Days remaining",
        Field::TotalMaturityDays => "Term (days)",
        Field::PenaltyAmount => "Penalty",
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Low => Color::Green,
        Severity::Medium => Color::Yellow,
        Severity::High => Color::Red,
    }
}

struct ChartSeries {
    curve: Vec<(f64, f64)>,
    current: (f64, f64),
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Convert a schedule into Plotters series (x = days elapsed).
fn chart_series(schedule: &DecaySchedule) -> ChartSeries {
    let total = f64::from(schedule.request.total_maturity_days);
    let to_f64 = |v: Decimal| v.to_f64().unwrap_or(0.0);

    let curve: Vec<(f64, f64)> = schedule
        .points
        .iter()
        .map(|p| (total - f64::from(p.days_remaining), to_f64(p.penalty_amount)))
        .collect();
    let current = (
        total - f64::from(schedule.request.days_remaining),
        to_f64(schedule.current.penalty_amount),
    );

    let y_max = curve.iter().map(|&(_, y)| y).fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };
    let pad = y_max * 0.05;

    ChartSeries {
        curve,
        current,
        x_bounds: [0.0, total.max(1.0)],
        y_bounds: [-pad, y_max + pad],
    }
}
