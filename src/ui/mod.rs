pub mod chrome;
pub mod home;
pub mod pad;
pub mod raster;
pub mod tabs;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab, MAX_NAME_LEN};
use crate::games::GameKind;

use pad::PadLayout;

pub fn render(frame: &mut Frame, app: &mut App) {
    let full = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),   // Content
        ])
        .split(full);

    tabs::render_tabs(frame, app, chunks[0]);

    match app.current_tab {
        Tab::Home => home::render_home(frame, chunks[1], app),
        Tab::Game(_) => render_game(frame, chunks[1], app),
    }

    // Name entry overlay (renders on top of everything)
    if app.entering_name {
        render_name_entry(frame, full, &app.name_buffer, app.name_game, app.name_score);
    }

    if let Some((message, _)) = &app.notice {
        render_notice(frame, full, message);
    }
}

fn render_game(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(active) = &app.active else {
        app.pad = None;
        return;
    };

    if !app.show_pad {
        active.game.render(frame, area);
        app.pad = None;
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(PadLayout::HEIGHT)])
        .split(area);
    active.game.render(frame, rows[0]);

    let pad = PadLayout::new(rows[1]);
    pad.render(frame, &app.input.snapshot());
    app.pad = Some(pad);
}

fn render_name_entry(frame: &mut Frame, area: Rect, name_buffer: &str, game: GameKind, score: u32) {
    let overlay_w = 44u16.min(area.width.saturating_sub(4));
    let overlay_h = 13u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(overlay_w)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_h)) / 2;
    let overlay_area = Rect::new(x, y, overlay_w, overlay_h);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 220, 80)))
        .title(" 🏆 SUBMIT YOUR SCORE ")
        .title_style(Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    // Typed chars, then underscores for what's left
    let remaining = MAX_NAME_LEN.saturating_sub(name_buffer.chars().count());
    let display_name = format!("{}{}", name_buffer, "_".repeat(remaining));

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {} ", game.icon()), Style::default()),
            Span::styled(game.title(), Style::default().fg(game.accent()).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  Score: {score}"),
            Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("  Enter your name (optional):", Style::default().fg(Color::Rgb(180, 180, 200)))),
        Line::from(""),
        Line::from(vec![
            Span::styled("    [ ", Style::default().fg(Color::Rgb(100, 100, 130))),
            Span::styled(display_name, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(" ]", Style::default().fg(Color::Rgb(100, 100, 130))),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
            Span::styled(" submit  ", Style::default().fg(Color::Rgb(100, 100, 130))),
            Span::styled("Esc", Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
            Span::styled(" submit as ???", Style::default().fg(Color::Rgb(100, 100, 130))),
        ]),
    ];

    let p = Paragraph::new(lines).style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}

/// One-line toast in the bottom-right corner
fn render_notice(frame: &mut Frame, area: Rect, message: &str) {
    let w = (message.chars().count() as u16 + 4).min(area.width);
    if w == 0 || area.height < 3 {
        return;
    }
    let rect = Rect::new(area.right() - w, area.bottom() - 3, w, 3);
    frame.render_widget(Clear, rect);
    let p = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Rgb(255, 220, 80)).bg(Color::Rgb(15, 15, 25)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(60, 150, 200))),
        );
    frame.render_widget(p, rect);
}
