//! Transport bar widget - shows clock, recording, playback and output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Snapshot of everything the transport bar shows
pub struct TransportStats {
    pub seconds: f64,
    pub recorded_events: usize,
    pub playing_back: bool,
    /// 0.0 to 1.0
    pub peak: f32,
    pub dropped: u64,
    pub sample_rate: u32,
    pub channels: usize,
}

/// Width of the peak meter in cells
const METER_WIDTH: usize = 12;

fn meter(peak: f32) -> String {
    let filled = ((peak.clamp(0.0, 1.0) * METER_WIDTH as f32).round()) as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(METER_WIDTH - filled))
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, stats: &TransportStats) {
    let block = Block::default().title(" pianola ").borders(Borders::ALL);

    let (play_symbol, play_state) = if stats.playing_back {
        ("▶", "Replaying")
    } else {
        ("●", "Live")
    };

    let minutes = (stats.seconds / 60.0).floor();
    let secs = stats.seconds - minutes * 60.0;

    let mut spans = vec![
        Span::styled(
            format!(" {:02}:{:05.2}  ", minutes as u64, secs),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state),
            Style::default().fg(if stats.playing_back {
                Color::Magenta
            } else {
                Color::Green
            }),
        ),
        Span::styled(
            format!("Recorded: {} events  ", stats.recorded_events),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:.1}kHz {}ch  ", stats.sample_rate as f64 / 1000.0, stats.channels),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak {} {:.2}", meter(stats.peak), stats.peak),
            Style::default().fg(if stats.peak >= 1.0 {
                Color::Red
            } else {
                Color::Magenta
            }),
        ),
    ];

    if stats.dropped > 0 {
        spans.push(Span::styled(
            format!("  Dropped: {}", stats.dropped),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
