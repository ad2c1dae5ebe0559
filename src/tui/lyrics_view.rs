//! Lyric view: the active line centred with its neighbours dimmed around it.

use super::palette::Palette;
use crate::app::state::{Status, ViewState};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::ops::Range;

const FOOTER: &str = "Press q to quit";

pub fn render(frame: &mut Frame, state: &ViewState) {
    let palette = Palette::MONO;
    let title = state
        .title()
        .map(|t| format!(" {t} "))
        .unwrap_or_else(|| " lyricterm ".to_string());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(palette.border))
        .title(title)
        .title_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD));
    let area = frame.area();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Lyrics
            Constraint::Length(1), // Status
            Constraint::Length(1), // Footer
        ])
        .split(inner);

    render_lines(frame, state, &palette, rows[0]);

    let status = match (&state.status, &state.mirror_warning) {
        (Some(Status::Error(msg)), _) => Some((msg.as_str(), Style::default().fg(palette.error))),
        (Some(Status::Waiting(msg) | Status::Notice(msg)), _) => {
            Some((msg.trim(), Style::default().fg(palette.fg_secondary)))
        }
        (None, Some(warning)) => Some((warning.as_str(), Style::default().fg(palette.error))),
        (None, None) => None,
    };
    if let Some((text, style)) = status {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(text, style))).alignment(Alignment::Center),
            rows[1],
        );
    }

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            FOOTER,
            Style::default().fg(palette.fg_secondary),
        )))
        .alignment(Alignment::Center),
        rows[2],
    );
}

fn render_lines(frame: &mut Frame, state: &ViewState, palette: &Palette, area: Rect) {
    let Some(lyrics) = &state.lyrics else {
        return;
    };
    let Some(active) = state.active else {
        return;
    };

    let height = area.height as usize;
    let max_width = area.width.saturating_sub(2) as usize;
    let range = visible_range(lyrics.lines.len(), active, height);

    let mut display: Vec<Line> = Vec::with_capacity(height);
    // Pad the top so the active line sits in the middle row.
    display.extend(std::iter::repeat_n(Line::default(), (height / 2).saturating_sub(active - range.start)));

    for i in range {
        let text = lyrics.lines[i].text.as_str();
        let style = if i == active {
            Style::default()
                .fg(palette.fg_primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.fg_secondary)
        };
        display.push(Line::from(Span::styled(truncate_str(text, max_width), style)));
    }

    frame.render_widget(Paragraph::new(display).alignment(Alignment::Center), area);
}

/// Lines to show so that `active` lands in the middle of `height` rows.
fn visible_range(len: usize, active: usize, height: usize) -> Range<usize> {
    if len == 0 || height == 0 {
        return 0..0;
    }
    let active = active.min(len - 1);
    let start = active.saturating_sub(height / 2);
    let end = (start + height).min(len);
    start..end
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
