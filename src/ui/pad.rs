use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::input::{Button, ControlState};

const BUTTON_W: u16 = 7;
const GAP: u16 = 1;

/// On-screen controls: a d-pad row on the left, A/B on the right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PadLayout {
    buttons: Vec<(Button, Rect)>,
}

impl PadLayout {
    pub const HEIGHT: u16 = 3;

    pub fn new(area: Rect) -> Self {
        let h = Self::HEIGHT.min(area.height);
        let mut buttons = Vec::with_capacity(Button::ALL.len());

        let mut x = area.x + 1;
        for b in [Button::Left, Button::Up, Button::Down, Button::Right] {
            buttons.push((b, Rect::new(x, area.y, BUTTON_W, h)));
            x += BUTTON_W + GAP;
        }

        let right = area.x + area.width;
        let b_x = right.saturating_sub(BUTTON_W + 1).max(x);
        let a_x = b_x.saturating_sub(BUTTON_W + GAP).max(x);
        buttons.push((Button::Action, Rect::new(a_x, area.y, BUTTON_W, h)));
        buttons.push((Button::Start, Rect::new(b_x, area.y, BUTTON_W, h)));

        // Anything past the edge is clipped away
        let buttons = buttons
            .into_iter()
            .map(|(b, r)| (b, r.intersection(area)))
            .filter(|(_, r)| r.width > 0 && r.height > 0)
            .collect();
        Self { buttons }
    }

    pub fn hit(&self, col: u16, row: u16) -> Option<Button> {
        self.buttons
            .iter()
            .find(|(_, r)| col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height)
            .map(|(b, _)| *b)
    }

    pub fn centre_of(&self, button: Button) -> Option<(u16, u16)> {
        self.buttons
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, r)| (r.x + r.width / 2, r.y + r.height / 2))
    }

    pub fn render(&self, frame: &mut Frame, controls: &ControlState) {
        for (button, rect) in &self.buttons {
            let held = controls.get(*button);
            let (fg, bg) = if held {
                (Color::Rgb(15, 15, 25), Color::Rgb(255, 220, 80))
            } else {
                (Color::Rgb(180, 180, 200), Color::Reset)
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
                .style(Style::default().bg(bg));
            let label = Paragraph::new(label(*button))
                .alignment(Alignment::Center)
                .style(Style::default().fg(fg).add_modifier(Modifier::BOLD))
                .block(block);
            frame.render_widget(label, *rect);
        }
    }
}

fn label(button: Button) -> &'static str {
    match button {
        Button::Left => "◀",
        Button::Up => "▲",
        Button::Down => "▼",
        Button::Right => "▶",
        Button::Action => "A",
        Button::Start => "B",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_testing() {
        let pad = PadLayout::new(Rect::new(0, 20, 60, 3));
        assert_eq!(pad.hit(1, 21), Some(Button::Left));
        assert_eq!(pad.hit(9, 20), Some(Button::Up));
        assert_eq!(pad.hit(8, 21), None);
        assert_eq!(pad.hit(58, 22), Some(Button::Start));
        assert_eq!(pad.hit(1, 19), None);
    }

    #[test]
    fn test_every_button_has_a_centre_inside_it() {
        let pad = PadLayout::new(Rect::new(2, 5, 80, 3));
        for b in Button::ALL {
            let (col, row) = pad.centre_of(b).unwrap();
            assert_eq!(pad.hit(col, row), Some(b));
        }
    }

    #[test]
    fn test_narrow_area_clips_buttons() {
        let pad = PadLayout::new(Rect::new(0, 0, 20, 3));
        assert!(pad.centre_of(Button::Left).is_some());
        assert!(pad.centre_of(Button::Start).is_none());
        assert_eq!(pad.hit(25, 1), None);
    }
}
