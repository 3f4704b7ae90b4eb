use std::f64::consts::TAU;
use std::time::Instant;

use pomo::input::Field;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Clear, Paragraph, Widget, Wrap,
    },
};

use crate::App;

const ACCENT: Color = Color::Rgb(30, 58, 138);
const RING_SAMPLES: usize = 240;
const TOAST_MARGIN_TOP: u16 = 3;

/// Points on the unit circle split into (done, remaining), walking
/// clockwise from twelve o'clock.
pub fn ring_points(progress: f64, samples: usize) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let progress = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let to_xy = |t: f64| ((TAU * t).sin(), (TAU * t).cos());

    let mut done = Vec::new();
    let mut remaining = Vec::new();
    for i in 0..samples {
        let t = i as f64 / samples as f64;
        if t < progress {
            done.push(to_xy(t));
        } else {
            remaining.push(to_xy(t));
        }
    }
    (done, remaining)
}

/// Largest area centred in `area` whose cells make a roughly round ring
/// (terminal cells are about twice as tall as they are wide)
fn ring_area(area: Rect) -> Rect {
    let height = area.height.min(area.width / 2);
    let width = height * 2;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn control_span(label: &str, key: char, enabled: bool) -> Span<'static> {
    let style = if enabled {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };
    Span::styled(format!(" [{key}] {label} "), style)
}

fn field_spans<'a>(label: &'a str, text: &'a str, focused: bool) -> Vec<Span<'a>> {
    let value_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let cursor = if focused { "_" } else { "" };
    vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(format!("{text}{cursor}"), value_style),
        Span::raw(" min"),
    ]
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.controller.view();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(2)
            .constraints([
                Constraint::Length(2), // header
                Constraint::Length(1), // quote title
                Constraint::Length(2), // quote
                Constraint::Min(3),    // ring
                Constraint::Length(1), // mode
                Constraint::Length(1), // durations
                Constraint::Length(1), // controls
                Constraint::Length(1), // hint
            ])
            .split(area);

        Paragraph::new(Span::styled("Pomodoro", bold_style.fg(ACCENT)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
            .render(chunks[0], buf);

        Paragraph::new(Span::styled("Quote of the day:", bold_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(Span::styled(self.quote.as_str(), italic_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        let ring = ring_area(chunks[3]);
        if ring.height > 0 {
            let (done, remaining) = ring_points(view.progress, RING_SAMPLES);
            Canvas::default()
                .marker(Marker::Braille)
                .x_bounds([-1.1, 1.1])
                .y_bounds([-1.1, 1.1])
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &remaining,
                        color: Color::DarkGray,
                    });
                    ctx.layer();
                    ctx.draw(&Points {
                        coords: &done,
                        color: ACCENT,
                    });
                })
                .render(ring, buf);
        }

        let centre = Rect {
            y: chunks[3].y + chunks[3].height / 2,
            height: 1.min(chunks[3].height),
            ..chunks[3]
        };
        Paragraph::new(Span::styled(view.timer_text.as_str(), bold_style))
            .alignment(Alignment::Center)
            .render(centre, buf);

        Paragraph::new(Span::styled(
            view.mode.to_string().to_uppercase(),
            bold_style.fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        let focus = self.input.focus();
        let mut durations = field_spans(
            "Work:",
            &self.input.work.text,
            focus == Some(Field::Work),
        );
        durations.push(Span::raw("    "));
        durations.extend(field_spans(
            "Break:",
            &self.input.break_.text,
            focus == Some(Field::Break),
        ));
        Paragraph::new(Line::from(durations))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        let controls = view.controls;
        Paragraph::new(Line::from(vec![
            control_span("Start", 's', controls.start_enabled),
            control_span("Pause", 'p', controls.pause_enabled),
            control_span("Reset", 'r', controls.reset_enabled),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

        let hint = if focus.is_some() {
            "digits to edit, (enter) apply, (tab) next field"
        } else {
            "(w) work minutes (b) break minutes (q) quit"
        };
        Paragraph::new(Span::styled(
            hint,
            Style::default().add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);

        if let Some(message) = view.toast(Instant::now()) {
            let width = (message.len() as u16 + 4).min(area.width);
            let toast = Rect {
                x: area.x + (area.width - width) / 2,
                y: area.y + TOAST_MARGIN_TOP.min(area.height.saturating_sub(3)),
                width,
                height: 3.min(area.height),
            };
            Clear.render(toast, buf);
            Paragraph::new(Span::styled(message, bold_style.fg(Color::White)))
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .render(toast, buf);
        }
    }
}
