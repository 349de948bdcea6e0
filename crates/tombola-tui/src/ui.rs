#![forbid(unsafe_code)]

//! Frame rendering.
//!
//! Draws the wheel as a character-cell disc. Terminal cells are roughly
//! twice as tall as wide, so horizontal distances are halved before any
//! angle or radius math. For each cell inside the disc the screen angle
//! (clockwise from the top, where the pointer sits) is mapped into the
//! wheel's layout space and resolved to a segment exactly the way the
//! engine resolves the pointer, so what the player sees under the
//! pointer is what the engine reports.

use std::f64::consts::TAU;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use unicode_width::UnicodeWidthStr;

use tombola_core::arc::{arc_spans, normalize_angle};

use crate::app::{App, Mode};
use crate::theme;

/// Width of the right-hand panel.
const PANEL_WIDTH: u16 = 34;

const RIM: Color = Color::White;
const DIM: Color = Color::DarkGrey;

pub fn draw(out: &mut impl Write, app: &App, bell: bool, cols: u16, rows: u16) -> io::Result<()> {
    queue!(out, ResetColor, Clear(ClearType::All))?;
    if bell {
        queue!(out, Print('\u{7}'))?;
    }

    let wheel_cols = cols.saturating_sub(PANEL_WIDTH);
    draw_wheel(out, app, wheel_cols, rows.saturating_sub(1))?;
    draw_panel(out, app, wheel_cols.saturating_add(1), cols, rows)?;
    draw_status(out, app, cols, rows)?;
    if app.companion.is_visible() {
        draw_companion(out, app, rows)?;
    }
    if let Some(winner) = &app.result {
        draw_result_overlay(out, winner, cols, rows)?;
    }

    queue!(out, ResetColor)?;
    out.flush()
}

// ---------------------------------------------------------------------------
// Wheel disc
// ---------------------------------------------------------------------------

fn draw_wheel(out: &mut impl Write, app: &App, width: u16, height: u16) -> io::Result<()> {
    if width < 8 || height < 8 {
        return Ok(());
    }

    let options = app.wheel.expanded();
    let rotation = app.wheel.rotation();
    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;
    // Radius in row units; a column is half a row unit wide.
    let radius = (cy - 2.0).min(cx / 2.0 - 1.0);
    if radius < 2.0 {
        return Ok(());
    }

    let spans = arc_spans(options);
    let starts: Vec<f64> = spans
        .iter()
        .scan(0.0, |acc, span| {
            let start = *acc;
            *acc += span;
            Some(start)
        })
        .collect();

    for y in 0..height {
        for x in 0..width {
            let dx = (f64::from(x) - cx) * 0.5;
            let dy = f64::from(y) - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > radius + 0.25 {
                continue;
            }

            // Rim ring.
            if dist > radius - 0.5 {
                queue!(out, MoveTo(x, y), SetForegroundColor(RIM), Print('█'))?;
                continue;
            }

            if options.is_empty() {
                queue!(out, MoveTo(x, y), SetForegroundColor(DIM), Print('·'))?;
                continue;
            }

            // Screen angle clockwise from the top, mapped into layout
            // space.
            let screen = dx.atan2(-dy);
            let coord = normalize_angle(screen - rotation);
            let index = segment_for(&starts, &spans, coord);

            // White separator along each segment's leading edge.
            let into = coord - starts[index];
            let separator = options.len() > 1 && dist > 1.5 && into < 0.9 / dist;

            let color = if separator {
                RIM
            } else {
                cell_color(app, options, index)
            };
            queue!(out, MoveTo(x, y), SetForegroundColor(color), Print('█'))?;
        }
    }

    draw_labels(out, app, cx, cy, radius)?;

    // The pointer, fixed at angle 0.
    let px = cx.round() as u16;
    let py = (cy - radius - 1.0).max(0.0).round() as u16;
    queue!(
        out,
        MoveTo(px, py),
        SetForegroundColor(RIM),
        SetAttribute(Attribute::Bold),
        Print('▼'),
        SetAttribute(Attribute::Reset),
    )?;
    Ok(())
}

fn segment_for(starts: &[f64], spans: &[f64], coord: f64) -> usize {
    for (i, (&start, &span)) in starts.iter().zip(spans).enumerate() {
        if coord >= start && coord < start + span {
            return i;
        }
    }
    0
}

fn cell_color(app: &App, options: &[tombola_core::WheelOption], index: usize) -> Color {
    let option = &options[index];
    if option.boosted && option.multiplier > 1 {
        theme::rainbow_color(app.rainbow_time, index as f64 * 0.1)
    } else if !option.enabled {
        DIM
    } else {
        theme::segment_color(index)
    }
}

fn draw_labels(out: &mut impl Write, app: &App, cx: f64, cy: f64, radius: f64) -> io::Result<()> {
    let options = app.wheel.expanded();
    let rotation = app.wheel.rotation();
    let spans = arc_spans(options);

    let mut start = 0.0;
    for (i, span) in spans.iter().enumerate() {
        let center = start + span / 2.0;
        start += span;
        // Too thin to label.
        if *span < 0.35 {
            continue;
        }

        let screen = normalize_angle(center + rotation);
        let tr = radius * 0.6;
        let dx = tr * screen.sin();
        let dy = -tr * screen.cos();

        let label = truncate(&options[i].text, (radius * 0.8) as usize + 2);
        let width = label.width() as f64;
        let x = (cx + 2.0 * dx - width / 2.0).round();
        let y = (cy + dy).round();
        if x < 0.0 || y < 0.0 {
            continue;
        }
        queue!(
            out,
            MoveTo(x as u16, y as u16),
            SetBackgroundColor(cell_color(app, options, i)),
            SetForegroundColor(Color::Black),
            Print(&label),
            ResetColor,
        )?;
    }
    Ok(())
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut result = String::new();
    for c in text.chars() {
        let candidate = format!("{result}{c}");
        if candidate.width() + 1 > max_width {
            break;
        }
        result = candidate;
    }
    result.push('…');
    result
}

// ---------------------------------------------------------------------------
// Side panel
// ---------------------------------------------------------------------------

struct PanelLine {
    text: String,
    color: Color,
    bold: bool,
}

impl PanelLine {
    fn new(text: impl Into<String>, color: Color, bold: bool) -> Self {
        Self {
            text: text.into(),
            color,
            bold,
        }
    }
}

fn panel_lines(app: &App, width: usize) -> Vec<PanelLine> {
    let mut lines = Vec::new();
    lines.push(PanelLine::new("T O M B O L A", Color::Magenta, true));
    lines.push(PanelLine::new("─".repeat(width), DIM, false));

    if app.wheel.uses_defaults() {
        lines.push(PanelLine::new("A sample wheel is loaded.", DIM, false));
        lines.push(PanelLine::new("Press a to add your own options.", DIM, false));
    } else {
        lines.push(PanelLine::new(
            format!("Options ({})", app.wheel.base().len()),
            Color::White,
            true,
        ));
        for (i, opt) in app.wheel.base().iter().enumerate() {
            let cursor = if i == app.selected { '>' } else { ' ' };
            let boost = if opt.boosted { "[x2]" } else { "[  ]" };
            let text = match &app.mode {
                Mode::Renaming { buffer } if i == app.selected => format!("{buffer}▏"),
                _ => opt.text.clone(),
            };
            let marker = if opt.enabled { "" } else { " (off)" };
            let color = if opt.enabled { Color::White } else { DIM };
            lines.push(PanelLine::new(
                format!("{cursor} {boost} {text}{marker}"),
                color,
                false,
            ));
        }
    }

    lines.push(PanelLine::new("", DIM, false));
    lines.push(PanelLine::new(
        format!("Suspense: x{}", app.wheel.suspense()),
        Color::Cyan,
        false,
    ));

    lines.push(PanelLine::new("", DIM, false));
    lines.push(PanelLine::new(
        format!("Saved wheels ({})", app.saved.wheels().len()),
        Color::White,
        true,
    ));
    for wheel in app.saved.wheels() {
        let marker = if app.saved.current_id() == Some(wheel.id) {
            '*'
        } else {
            ' '
        };
        lines.push(PanelLine::new(
            format!("{marker} {} ({})", wheel.name, wheel.options.len()),
            Color::White,
            false,
        ));
    }

    if app.results.should_display(&app.wheel)
        && let Some(last) = app.results.last()
    {
        lines.push(PanelLine::new("", DIM, false));
        lines.push(PanelLine::new(format!("Last result: {last}"), Color::Green, false));
    }

    if let Mode::Adding { buffer } = &app.mode {
        lines.push(PanelLine::new("", DIM, false));
        lines.push(PanelLine::new(format!("New option: {buffer}▏"), Color::Yellow, true));
    }

    lines
}

fn draw_panel(out: &mut impl Write, app: &App, left: u16, cols: u16, rows: u16) -> io::Result<()> {
    if left >= cols {
        return Ok(());
    }
    let width = (cols - left) as usize;

    for (y, line) in panel_lines(app, width).into_iter().enumerate() {
        let y = y as u16;
        if y >= rows.saturating_sub(1) {
            break;
        }
        queue!(out, MoveTo(left, y), SetForegroundColor(line.color))?;
        if line.bold {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        queue!(
            out,
            Print(truncate(&line.text, width)),
            SetAttribute(Attribute::Reset),
            ResetColor,
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status line, overlay, companion
// ---------------------------------------------------------------------------

fn draw_status(out: &mut impl Write, app: &App, cols: u16, rows: u16) -> io::Result<()> {
    let y = rows.saturating_sub(1);
    let text = match (&app.notice, &app.mode) {
        (Some(notice), _) => notice.text.clone(),
        (None, Mode::Adding { .. }) => "enter: add  esc: done".to_string(),
        (None, Mode::Renaming { .. }) => "enter: rename  esc: cancel".to_string(),
        (None, Mode::Normal) => {
            "space spin · a add · r rename · d del · b boost · e enable · J/K move · +/- suspense \
             · u/U undo/redo · s save · n new · tab wheels · o/p export/import · c pal · q quit"
                .to_string()
        }
    };
    let color = match &app.notice {
        Some(notice) if notice.error => Color::Red,
        Some(_) => Color::Green,
        None => DIM,
    };
    queue!(
        out,
        MoveTo(0, y),
        SetForegroundColor(color),
        Print(truncate(&text, cols as usize)),
        ResetColor,
    )
}

fn draw_result_overlay(out: &mut impl Write, winner: &str, cols: u16, rows: u16) -> io::Result<()> {
    let text = truncate(winner, cols.saturating_sub(8) as usize);
    let inner = (text.width() as u16 + 6).max(26);
    let left = cols.saturating_sub(inner) / 2;
    let top = rows.saturating_sub(5) / 2;

    let pad = |s: &str| {
        let fill = (inner as usize).saturating_sub(s.width());
        format!("│{}{}{}│", " ".repeat(fill / 2), s, " ".repeat(fill - fill / 2))
    };
    queue!(out, SetForegroundColor(Color::Yellow), SetAttribute(Attribute::Bold))?;
    queue!(out, MoveTo(left, top), Print(format!("┌{}┐", "─".repeat(inner as usize))))?;
    queue!(out, MoveTo(left, top + 1), Print(pad("The wheel has spoken:")))?;
    queue!(out, MoveTo(left, top + 2), Print(pad(&text)))?;
    queue!(out, MoveTo(left, top + 3), Print(pad("enter: close   x: remove winner")))?;
    queue!(out, MoveTo(left, top + 4), Print(format!("└{}┘", "─".repeat(inner as usize))))?;
    queue!(out, SetAttribute(Attribute::Reset), ResetColor)
}

fn draw_companion(out: &mut impl Write, app: &App, rows: u16) -> io::Result<()> {
    let y = rows.saturating_sub(3);
    queue!(
        out,
        MoveTo(1, y),
        SetForegroundColor(Color::Magenta),
        Print(app.companion.glyph()),
        ResetColor,
    )?;
    if let Some(bubble) = app.companion.bubble() {
        queue!(
            out,
            MoveTo(1, y.saturating_sub(1)),
            SetForegroundColor(Color::White),
            Print(format!("({bubble})")),
            ResetColor,
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
