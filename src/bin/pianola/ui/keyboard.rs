//! Keyboard widget - one column per key, colored by what is holding it

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use pianola::synth::{
    keys::{is_black, key_name},
    ActivationTable, KeyId, Source,
};

/// Column width per key inside `area`
fn key_width(area: Rect, keys: usize) -> u16 {
    if keys == 0 {
        return 0;
    }
    (area.width / keys as u16).max(1)
}

/// Render the keyboard. Returns the inner area used for hit testing.
pub fn render_keyboard(frame: &mut Frame, area: Rect, keys: &ActivationTable) -> Rect {
    let block = Block::default()
        .title(" Keyboard (type letters, or click) ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = key_width(inner, keys.len());
    if width == 0 || inner.height == 0 {
        return inner;
    }

    for id in 0..keys.len() as KeyId {
        let x = inner.x + id as u16 * width;
        if x + width > inner.x + inner.width {
            break;
        }

        let state = keys.get(id);
        let black = is_black(id);
        // Black keys are shorter, as on a real keyboard
        let height = if black {
            (inner.height * 2 / 3).max(1)
        } else {
            inner.height
        };

        let color = if state.holds(Source::Manual) {
            Color::Cyan
        } else if state.holds(Source::Keyed) {
            Color::Green
        } else if state.holds(Source::Playback) {
            Color::Magenta
        } else if black {
            Color::Black
        } else {
            Color::Gray
        };
        let label_color = if black && !state.is_hot() {
            Color::Gray
        } else {
            Color::Black
        };

        let rect = Rect::new(x, inner.y, width, height);
        let label = Paragraph::new(format!("\n{}", key_name(id)))
            .alignment(Alignment::Center)
            .style(Style::default().bg(color).fg(label_color));
        frame.render_widget(label, rect);
    }

    inner
}

/// Key under a terminal cell, if any.
pub fn key_at(area: Rect, keys: usize, column: u16, row: u16) -> Option<KeyId> {
    let width = key_width(area, keys);
    if width == 0
        || column < area.x
        || row < area.y
        || column >= area.x + area.width
        || row >= area.y + area.height
    {
        return None;
    }
    let id = ((column - area.x) / width) as usize;
    (id < keys).then_some(id as KeyId)
}
