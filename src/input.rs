//! Input sampling
//!
//! Terminal key and mouse events are folded into a `ControlState` snapshot
//! (what is held right now) plus discrete `Command`s (what was just pressed).
//! Last state wins: nothing is queued.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

/// How long a freshly pressed key stays held when the terminal cannot
/// report key releases. Longer than the OS delay before the first repeat.
pub const FIRST_HOLD_WINDOW: Duration = Duration::from_millis(550);

/// Same, once the key is auto-repeating
pub const HOLD_WINDOW: Duration = Duration::from_millis(180);

/// Pointer displacement (logical pixels) before a drag counts as a direction
pub const DEAD_ZONE: f32 = 12.0;

/// Logical pixels per terminal cell, used to measure drags
const CELL_W_PX: f32 = 4.0;
const CELL_H_PX: f32 = 8.0;

/// Logical inputs shared by keyboard, pointer and the on-screen pad
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Action,
    Start,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Action,
        Button::Start,
    ];

    fn index(self) -> usize {
        match self {
            Button::Up => 0,
            Button::Down => 1,
            Button::Left => 2,
            Button::Right => 3,
            Button::Action => 4,
            Button::Start => 5,
        }
    }

    /// Direction this button stands for, if any
    pub fn dir(self) -> Option<Dir> {
        match self {
            Button::Up => Some(Dir::Up),
            Button::Down => Some(Dir::Down),
            Button::Left => Some(Dir::Left),
            Button::Right => Some(Dir::Right),
            Button::Action | Button::Start => None,
        }
    }
}

/// Snapshot of which logical inputs are currently held
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub action: bool,
    pub start: bool,
}

impl ControlState {
    pub fn get(&self, button: Button) -> bool {
        match button {
            Button::Up => self.up,
            Button::Down => self.down,
            Button::Left => self.left,
            Button::Right => self.right,
            Button::Action => self.action,
            Button::Start => self.start,
        }
    }

    fn set(&mut self, button: Button, held: bool) {
        match button {
            Button::Up => self.up = held,
            Button::Down => self.down = held,
            Button::Left => self.left = held,
            Button::Right => self.right = held,
            Button::Action => self.action = held,
            Button::Start => self.start = held,
        }
    }

    /// -1.0 for left, 1.0 for right, 0.0 for neither or both
    pub fn horizontal(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }

    /// -1.0 for up, 1.0 for down, 0.0 for neither or both
    pub fn vertical(&self) -> f32 {
        (self.down as i8 - self.up as i8) as f32
    }

    /// First held direction, vertical before horizontal
    pub fn held_dir(&self) -> Option<Dir> {
        if self.up {
            Some(Dir::Up)
        } else if self.down {
            Some(Dir::Down)
        } else if self.left {
            Some(Dir::Left)
        } else if self.right {
            Some(Dir::Right)
        } else {
            None
        }
    }
}

/// Grid direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Right, Dir::Left, Dir::Down, Dir::Up];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Dir::Left | Dir::Right)
    }
}

/// One-shot commands produced on key press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Space: start, pause or resume
    Pause,
    /// M
    Mute,
    /// R
    Restart,
    /// Enter: start, or continue after a cleared board
    Start,
    /// A discrete directional press
    Tap(Dir),
}

/// Logical button for a key, `None` for keys the games ignore
pub fn button_for(code: KeyCode) -> Option<Button> {
    match code {
        KeyCode::Up => Some(Button::Up),
        KeyCode::Down => Some(Button::Down),
        KeyCode::Left => Some(Button::Left),
        KeyCode::Right => Some(Button::Right),
        KeyCode::Enter => Some(Button::Start),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Some(Button::Up),
            's' => Some(Button::Down),
            'a' => Some(Button::Left),
            'd' => Some(Button::Right),
            ' ' | 'z' | 'k' => Some(Button::Action),
            _ => None,
        },
        _ => None,
    }
}

fn command_for(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Enter => Some(Command::Start),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            ' ' => Some(Command::Pause),
            'm' => Some(Command::Mute),
            'r' => Some(Command::Restart),
            _ => None,
        },
        _ => None,
    }
}

/// Folds terminal events into a `ControlState`
#[derive(Debug)]
pub struct InputSampler {
    state: ControlState,
    /// When each button was last latched by a key; `None` for pointer/pad holds
    latched_at: [Option<Instant>; 6],
    /// The latch was refreshed by a repeat rather than a fresh press
    repeating: [bool; 6],
    release_events: bool,
    drag_origin: Option<(u16, u16)>,
}

impl InputSampler {
    /// `release_events` tells whether the terminal reports key releases.
    /// Without them, key holds expire after `FIRST_HOLD_WINDOW`, then
    /// `HOLD_WINDOW` once repeats are flowing.
    pub fn new(release_events: bool) -> Self {
        Self {
            state: ControlState::default(),
            latched_at: [None; 6],
            repeating: [false; 6],
            release_events,
            drag_origin: None,
        }
    }

    pub fn snapshot(&self) -> ControlState {
        self.state
    }

    /// Apply a key event. Returns the command it triggers, if any.
    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        let button = button_for(key.code);
        match key.kind {
            KeyEventKind::Release => {
                if let Some(b) = button {
                    self.release(b);
                }
                None
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if let Some(b) = button {
                    // Terminals without event types report repeats as presses
                    let held = self.latched_at[b.index()].is_some();
                    self.repeating[b.index()] = key.kind == KeyEventKind::Repeat || held;
                    self.state.set(b, true);
                    self.latched_at[b.index()] = Some(now);
                }
                // Repeats keep directions stepping but never re-toggle pause/mute
                if key.kind == KeyEventKind::Repeat {
                    return button.and_then(Button::dir).map(Command::Tap);
                }
                command_for(key.code).or_else(|| button.and_then(Button::dir).map(Command::Tap))
            }
        }
    }

    /// Press or release a button from the on-screen pad
    pub fn set_pressed(&mut self, button: Button, held: bool) {
        self.state.set(button, held);
        self.latched_at[button.index()] = None;
    }

    fn release(&mut self, button: Button) {
        self.state.set(button, false);
        self.latched_at[button.index()] = None;
        self.repeating[button.index()] = false;
    }

    pub fn on_pointer_down(&mut self, col: u16, row: u16) {
        self.drag_origin = Some((col, row));
    }

    /// Overwrites the four direction flags from the drag displacement.
    /// A direction that just crossed the dead zone is also a tap, dominant
    /// axis first, so swipes hop in the grid games.
    pub fn on_pointer_move(&mut self, col: u16, row: u16) -> Option<Command> {
        let (ox, oy) = self.drag_origin?;
        let dx = (col as f32 - ox as f32) * CELL_W_PX;
        let dy = (row as f32 - oy as f32) * CELL_H_PX;
        let before = self.state;
        self.state.left = dx < -DEAD_ZONE;
        self.state.right = dx > DEAD_ZONE;
        self.state.up = dy < -DEAD_ZONE;
        self.state.down = dy > DEAD_ZONE;
        for b in [Button::Up, Button::Down, Button::Left, Button::Right] {
            self.latched_at[b.index()] = None;
            self.repeating[b.index()] = false;
        }

        let order = if dx.abs() >= dy.abs() {
            [Button::Left, Button::Right, Button::Up, Button::Down]
        } else {
            [Button::Up, Button::Down, Button::Left, Button::Right]
        };
        order
            .into_iter()
            .find(|&b| self.state.get(b) && !before.get(b))
            .and_then(Button::dir)
            .map(Command::Tap)
    }

    pub fn on_pointer_up(&mut self) {
        if self.drag_origin.take().is_some() {
            for b in [Button::Up, Button::Down, Button::Left, Button::Right] {
                self.release(b);
            }
        }
    }

    /// Swipe handling for left-button mouse events. Returns the tap a drag
    /// produced, if any.
    pub fn on_mouse(&mut self, event: MouseEvent) -> Option<Command> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.on_pointer_down(event.column, event.row),
            MouseEventKind::Drag(MouseButton::Left) => return self.on_pointer_move(event.column, event.row),
            MouseEventKind::Up(MouseButton::Left) => self.on_pointer_up(),
            _ => {}
        }
        None
    }

    /// Drop key holds that were never released (terminals without release events)
    pub fn expire(&mut self, now: Instant) {
        if self.release_events {
            return;
        }
        for b in Button::ALL {
            if let Some(at) = self.latched_at[b.index()] {
                let window = if self.repeating[b.index()] { HOLD_WINDOW } else { FIRST_HOLD_WINDOW };
                if now.saturating_duration_since(at) > window {
                    self.release(b);
                }
            }
        }
    }

    pub fn release_all(&mut self) {
        self.state = ControlState::default();
        self.latched_at = [None; 6];
        self.repeating = [false; 6];
        self.drag_origin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_key_latches_until_release() {
        let now = Instant::now();
        let mut input = InputSampler::new(true);
        input.on_key(key(KeyCode::Left, KeyEventKind::Press), now);
        assert!(input.snapshot().left);

        // Releases are reported, so holds never expire on their own
        input.expire(now + Duration::from_secs(5));
        assert!(input.snapshot().left);

        input.on_key(key(KeyCode::Left, KeyEventKind::Release), now);
        assert!(!input.snapshot().left);
    }

    #[test]
    fn test_wasd_and_arrows_map_to_same_buttons() {
        let now = Instant::now();
        let mut input = InputSampler::new(true);
        input.on_key(key(KeyCode::Char('W'), KeyEventKind::Press), now);
        input.on_key(key(KeyCode::Char('d'), KeyEventKind::Press), now);
        let s = input.snapshot();
        assert!(s.up && s.right);
        assert!(!s.down && !s.left);
    }

    #[test]
    fn test_first_press_outlasts_repeat_delay() {
        let now = Instant::now();
        let mut input = InputSampler::new(false);
        input.on_key(key(KeyCode::Left, KeyEventKind::Press), now);
        // Typical OS delay before the first repeat
        input.expire(now + Duration::from_millis(450));
        assert!(input.snapshot().left);

        input.expire(now + Duration::from_millis(600));
        assert!(!input.snapshot().left);
    }

    #[test]
    fn test_repeated_presses_use_short_window() {
        let now = Instant::now();
        let mut input = InputSampler::new(false);
        // Without event types, repeats arrive as further presses
        input.on_key(key(KeyCode::Up, KeyEventKind::Press), now);
        input.on_key(key(KeyCode::Up, KeyEventKind::Press), now + Duration::from_millis(500));
        input.expire(now + Duration::from_millis(650));
        assert!(input.snapshot().up);
        input.expire(now + Duration::from_millis(700));
        assert!(!input.snapshot().up);
    }

    #[test]
    fn test_hold_expires_without_release_events() {
        let now = Instant::now();
        let mut input = InputSampler::new(false);
        input.on_key(key(KeyCode::Right, KeyEventKind::Press), now);
        input.expire(now + Duration::from_millis(100));
        assert!(input.snapshot().right);

        // A repeat refreshes the hold
        input.on_key(key(KeyCode::Right, KeyEventKind::Repeat), now + Duration::from_millis(150));
        input.expire(now + Duration::from_millis(300));
        assert!(input.snapshot().right);

        input.expire(now + Duration::from_millis(400));
        assert!(!input.snapshot().right);
    }

    #[test]
    fn test_commands() {
        let now = Instant::now();
        let mut input = InputSampler::new(true);
        assert_eq!(
            input.on_key(key(KeyCode::Char(' '), KeyEventKind::Press), now),
            Some(Command::Pause)
        );
        assert!(input.snapshot().action);
        assert_eq!(
            input.on_key(key(KeyCode::Char('M'), KeyEventKind::Press), now),
            Some(Command::Mute)
        );
        assert_eq!(
            input.on_key(key(KeyCode::Char('r'), KeyEventKind::Press), now),
            Some(Command::Restart)
        );
        assert_eq!(
            input.on_key(key(KeyCode::Up, KeyEventKind::Press), now),
            Some(Command::Tap(Dir::Up))
        );
        // Holding space must not flip pause on every repeat
        assert_eq!(input.on_key(key(KeyCode::Char(' '), KeyEventKind::Repeat), now), None);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let now = Instant::now();
        let mut input = InputSampler::new(false);
        let before = input.snapshot();
        assert_eq!(input.on_key(key(KeyCode::F(5), KeyEventKind::Press), now), None);
        assert_eq!(input.on_key(key(KeyCode::Char('q'), KeyEventKind::Press), now), None);
        assert_eq!(input.snapshot(), before);
    }

    #[test]
    fn test_drag_past_dead_zone() {
        let mut input = InputSampler::new(true);
        input.on_pointer_down(10, 10);

        // 2 columns = 8px, inside the dead zone
        assert_eq!(input.on_pointer_move(12, 10), None);
        assert_eq!(input.snapshot(), ControlState::default());

        // 4 columns = 16px right, 2 rows = 16px up
        assert_eq!(input.on_pointer_move(14, 8), Some(Command::Tap(Dir::Right)));
        let s = input.snapshot();
        assert!(s.right && s.up);
        assert!(!s.left && !s.down);

        // Already past the dead zone: no second tap
        assert_eq!(input.on_pointer_move(15, 8), None);

        input.on_pointer_up();
        assert_eq!(input.snapshot(), ControlState::default());
    }

    #[test]
    fn test_swipe_taps_along_dominant_axis() {
        let mut input = InputSampler::new(true);
        input.on_pointer_down(20, 20);
        // 10 rows up = 80px, far past the dead zone
        assert_eq!(input.on_pointer_move(20, 10), Some(Command::Tap(Dir::Up)));

        input.on_pointer_up();
        input.on_pointer_down(20, 20);
        // 6 columns left = 24px beats 2 rows down = 16px
        assert_eq!(input.on_pointer_move(14, 22), Some(Command::Tap(Dir::Left)));
    }

    #[test]
    fn test_move_without_pointer_down_does_nothing() {
        let mut input = InputSampler::new(true);
        assert_eq!(input.on_pointer_move(40, 40), None);
        assert_eq!(input.snapshot(), ControlState::default());
    }

    #[test]
    fn test_pad_presses() {
        let mut input = InputSampler::new(false);
        input.set_pressed(Button::Action, true);
        // Pad holds are released explicitly, never by expiry
        input.expire(Instant::now() + Duration::from_secs(1));
        assert!(input.snapshot().action);
        input.set_pressed(Button::Action, false);
        assert!(!input.snapshot().action);
    }
}
