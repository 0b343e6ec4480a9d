use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::{GameKind, Phase, Status};

/// Draw the modal frame and status bar of a game; returns the board area.
pub fn game_frame(
    frame: &mut Frame,
    area: Rect,
    kind: GameKind,
    status: &Status,
    extra: Option<Span<'static>>,
) -> Rect {
    let accent = kind.accent();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .title(format!(" {} {} ", kind.icon(), kind.title()))
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(inner);

    let sep = || Span::styled(" │ ", Style::default().fg(Color::DarkGray));
    let mut spans = vec![
        Span::styled(
            format!(" Score: {} ", status.score),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(
            format!("Lives: {} ", "♥ ".repeat(status.lives as usize)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(format!("Level: {} ", status.level), Style::default().fg(Color::Green)),
        sep(),
        Span::styled(format!("🏆 High: {} ", status.best), Style::default().fg(Color::Cyan)),
    ];
    if let Some(extra) = extra {
        spans.push(sep());
        spans.push(extra);
    }
    if status.muted {
        spans.push(sep());
        spans.push(Span::styled("🔇 muted", Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let help = Paragraph::new(Line::from(Span::styled(
        format!(" {}", kind.controls()),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, chunks[2]);

    chunks[1]
}

/// Centered message over the board whenever the game is not running.
/// `ready_hint` is the headline shown before the first start.
pub fn overlay(frame: &mut Frame, board: Rect, status: &Status, ready_hint: &str) {
    let (headline, color, sub) = match status.phase {
        Phase::Playing => return,
        Phase::Ready => (ready_hint.to_string(), Color::White, "Space start • M mute • R restart"),
        Phase::Paused => ("⏸ PAUSED".to_string(), Color::Yellow, "Space to resume"),
        Phase::GameOver => (
            format!("💀 GAME OVER  •  Score {}", status.score),
            Color::Red,
            "R to restart • Esc to close",
        ),
        Phase::Won => (
            format!("🎉 YOU WIN!  •  Score {}", status.score),
            Color::Green,
            "Enter for next level • R restart",
        ),
    };

    let w = (headline.chars().count().max(sub.chars().count()) as u16 + 6).min(board.width);
    let h = 4u16.min(board.height);
    if w == 0 || h == 0 {
        return;
    }
    let x = board.x + (board.width.saturating_sub(w)) / 2;
    let y = board.y + (board.height.saturating_sub(h)) / 2;
    let popup = Rect::new(x, y, w, h);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines = vec![
        Line::from(Span::styled(headline, Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(sub, Style::default().fg(Color::Rgb(160, 160, 180)))),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}
