use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Leaderboard};
use crate::games::GameKind;

const BANNER: &str = r#"
 ╔════════════════════════════════════════════════════╗
 ║  ▄▀█ █▀█ █▀▀ ▄▀█ █▀▄ █▀▀   █ █ ▄▀█ █ █ █   ▀█▀  ║
 ║  █▀█ █▀▄ █▄▄ █▀█ █▄▀ ██▄   ▀▄▀ █▀█ █▄█ █▄▄  █   ║
 ╚════════════════════════════════════════════════════╝"#;

const KEY: Color = Color::Rgb(80, 200, 255);
const DIM: Color = Color::Rgb(140, 140, 140);
const GOLD: Color = Color::Rgb(255, 220, 80);

fn render_tile(frame: &mut Frame, area: Rect, kind: GameKind, best: u32, selected: bool) {
    let accent = kind.accent();
    let (border_color, border_type) = if selected {
        (GOLD, BorderType::Double)
    } else {
        (Color::Rgb(60, 60, 80), BorderType::Rounded)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let name_color = if selected { Color::White } else { accent };
    let text_color = if selected { Color::Rgb(180, 180, 200) } else { Color::Rgb(90, 90, 110) };

    let mut lines: Vec<Line> = vec![Line::from("")];
    lines.push(Line::from(vec![
        Span::styled(format!("[{}] ", kind.index() + 1), Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{} ", kind.icon()), Style::default()),
        Span::styled(kind.title(), Style::default().fg(name_color).add_modifier(Modifier::BOLD)),
    ]));
    lines.push(Line::from(""));
    for blurb in kind.blurb().split('\n') {
        lines.push(Line::from(Span::styled(blurb, Style::default().fg(text_color))));
    }

    if selected {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Best {best}"),
            Style::default().fg(accent),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "▶ Enter to play",
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
        )));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(p, inner);
}

/// Selected game in the middle, its neighbours shrunk to either side
fn render_coverflow(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(" 🎮 Games · ← → Select, Enter to Play ")
        .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 2),
            Constraint::Ratio(1, 4),
        ])
        .split(inner);

    let count = GameKind::ALL.len();
    let centre = GameKind::from_index(app.selected_game);
    let prev = GameKind::from_index(app.selected_game + count - 1);
    let next = GameKind::from_index(app.selected_game + 1);

    for (kind, col) in [(prev, cols[0]), (next, cols[2])] {
        let side = col.inner(Margin { horizontal: 1, vertical: 2 });
        render_tile(frame, side, kind, app.best.get(kind.storage_key()), false);
    }
    render_tile(frame, cols[1], centre, app.best.get(centre.storage_key()), true);
}

fn navigation_lines(kind: GameKind) -> Vec<Line<'static>> {
    let row = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("    {key:<17}"), Style::default().fg(KEY)),
            Span::styled(what, Style::default().fg(DIM)),
        ])
    };
    let mut lines = vec![
        Line::from(""),
        row("← → / A D", "Rotate gallery"),
        row("Enter / 1-4", "Play"),
        row("Tab / Shift+Tab", "Switch tabs"),
        row("H", "Leaderboard"),
        row("R", "Refresh scores"),
        row("q / Ctrl+C", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {} {}", kind.icon(), kind.title()),
            Style::default().fg(kind.accent()).add_modifier(Modifier::BOLD),
        )),
    ];
    for part in kind.controls().split(" • ") {
        lines.push(Line::from(Span::styled(format!("    {part}"), Style::default().fg(DIM))));
    }
    lines
}

fn leaderboard_lines(app: &App, limit: usize) -> Vec<Line<'static>> {
    match &app.leaderboard {
        Leaderboard::Offline => vec![
            Line::from(""),
            Line::from(Span::styled("  Offline", Style::default().fg(Color::Rgb(100, 100, 130)))),
            Line::from(Span::styled(
                "  Start with --api-base to share scores",
                Style::default().fg(Color::Rgb(60, 60, 80)),
            )),
        ],
        Leaderboard::Loading => vec![
            Line::from(""),
            Line::from(Span::styled("  Loading scores…", Style::default().fg(KEY))),
        ],
        Leaderboard::Failed(message) => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(Color::Rgb(255, 90, 90)).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("  Press R to retry", Style::default().fg(DIM))),
        ],
        Leaderboard::Loaded(scores) if scores.is_empty() => vec![
            Line::from(""),
            Line::from(Span::styled("  No scores yet", Style::default().fg(Color::Rgb(60, 60, 80)))),
        ],
        Leaderboard::Loaded(_) => {
            let mut lines = vec![Line::from("")];
            for (rank, record) in app.leaderboard.top(None, limit).into_iter().enumerate() {
                let game = record.game.as_deref().unwrap_or("-");
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:>2}. ", rank + 1), Style::default().fg(Color::Rgb(100, 100, 130))),
                    Span::styled(
                        format!("{:<10}", record.name.as_deref().unwrap_or("???")),
                        Style::default().fg(Color::Rgb(200, 200, 220)),
                    ),
                    Span::styled(format!("{game:<12}"), Style::default().fg(DIM)),
                    Span::styled(record.score.to_string(), Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
                ]));
            }
            lines
        }
    }
}

pub fn render_home(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),  // Banner
            Constraint::Length(2),  // Subtitle
            Constraint::Length(14), // Coverflow
            Constraint::Min(8),    // Controls + leaderboard
            Constraint::Length(2),  // Footer
        ])
        .split(area);

    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(KEY))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let subtitle = Paragraph::new(Line::from(Span::styled(
        "  ⚡ Four games, one vault ⚡  ",
        Style::default().fg(GOLD).add_modifier(Modifier::BOLD | Modifier::ITALIC),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(subtitle, chunks[1]);

    render_coverflow(frame, chunks[2], app);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[3]);

    let selected = GameKind::from_index(app.selected_game);
    let controls = Paragraph::new(navigation_lines(selected)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .title(" ⌨ Controls ")
            .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(controls, bottom[0]);

    let rows = bottom[1].height.saturating_sub(3) as usize;
    let board = Paragraph::new(leaderboard_lines(app, rows.max(1))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(50, 100, 140)))
            .title(" 🏆 Leaderboard ")
            .title_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(board, bottom[1]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("  🦀 ", Style::default().fg(Color::Rgb(255, 100, 50))),
        Span::styled(concat!("v", env!("CARGO_PKG_VERSION")), Style::default().fg(Color::Rgb(80, 80, 100))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("H", Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
        Span::styled(" High Scores", Style::default().fg(Color::Rgb(100, 100, 130))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("© Arcade Vault", Style::default().fg(Color::Rgb(80, 80, 100))),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[4]);

    if app.show_leaderboard {
        render_high_scores_overlay(frame, area, app);
    }
}

fn render_high_scores_overlay(frame: &mut Frame, area: Rect, app: &App) {
    let overlay_w = 50u16.min(area.width.saturating_sub(4));
    let overlay_h = 28u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(overlay_w)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_h)) / 2;
    let overlay_area = Rect::new(x, y, overlay_w, overlay_h);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 200, 80)))
        .title(" 🏆 High Scores ")
        .title_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let medals = [
        ("🥇", Color::Rgb(255, 215, 0)),
        ("🥈", Color::Rgb(192, 192, 192)),
        ("🥉", Color::Rgb(205, 127, 50)),
    ];

    let mut lines: Vec<Line> = vec![Line::from("")];
    for kind in GameKind::ALL {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", kind.icon()), Style::default()),
            Span::styled(kind.title(), Style::default().fg(kind.accent()).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("   best here {}", app.best.get(kind.storage_key())),
                Style::default().fg(Color::Rgb(100, 100, 130)),
            ),
        ]));

        let top = app.leaderboard.top(Some(kind.slug()), medals.len());
        if top.is_empty() {
            lines.push(Line::from(Span::styled("    No scores yet", Style::default().fg(Color::Rgb(60, 60, 80)))));
        }
        for (record, (medal, color)) in top.into_iter().zip(medals) {
            lines.push(Line::from(vec![
                Span::styled(format!("    {medal} "), Style::default()),
                Span::styled(
                    format!("{:<9} ", record.name.as_deref().unwrap_or("???")),
                    Style::default().fg(Color::Rgb(200, 200, 220)),
                ),
                Span::styled(record.score.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ]));
        }
    }

    if let Leaderboard::Failed(message) = &app.leaderboard {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {message}"), Style::default().fg(Color::Rgb(255, 90, 90)))));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Press ", Style::default().fg(Color::Rgb(80, 80, 100))),
        Span::styled("H", Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
        Span::styled(" to close", Style::default().fg(Color::Rgb(80, 80, 100))),
    ]));

    let p = Paragraph::new(lines).style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}
