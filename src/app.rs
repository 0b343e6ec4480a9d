use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::api::{self, ApiEvent, NewScore, ScoreClient, ScoreRecord};
use crate::assets::Assets;
use crate::audio::Speaker;
use crate::config::Config;
use crate::games::{Game, GameKind, Phase};
use crate::input::{Button, Command, InputSampler};
use crate::scores::BestScores;
use crate::ui::pad::PadLayout;

pub const MAX_NAME_LEN: usize = 9;
const DEFAULT_NAME: &str = "???";
const NOTICE_TIME: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Home,
    Game(GameKind),
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Home,
        Tab::Game(GameKind::Pong),
        Tab::Game(GameKind::Breakout),
        Tab::Game(GameKind::Pacman),
        Tab::Game(GameKind::ChickenRun),
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => " Home ",
            Tab::Game(GameKind::Pong) => " Pong ",
            Tab::Game(GameKind::Breakout) => " Breakout ",
            Tab::Game(GameKind::Pacman) => " Pacman ",
            Tab::Game(GameKind::ChickenRun) => " Chicken Run ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Game(kind) => kind.index() + 1,
        }
    }
}

/// What the leaderboard panel currently knows
#[derive(Clone, Debug, PartialEq)]
pub enum Leaderboard {
    /// No score service configured
    Offline,
    Loading,
    Loaded(Vec<ScoreRecord>),
    Failed(String),
}

impl Leaderboard {
    /// Best `n` loaded records, optionally for one game
    pub fn top(&self, game: Option<&str>, n: usize) -> Vec<&ScoreRecord> {
        let Leaderboard::Loaded(scores) = self else { return Vec::new() };
        scores
            .iter()
            .filter(|r| game.is_none() || r.game.as_deref() == game)
            .take(n)
            .collect()
    }
}

/// The game behind the open modal. Dropped on close.
pub struct ActiveGame {
    pub game: Box<dyn Game>,
    speaker: Speaker,
    /// The current run's end has been handled
    run_recorded: bool,
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    /// Centre of the coverflow
    pub selected_game: usize,
    pub active: Option<ActiveGame>,
    pub input: InputSampler,
    pub best: BestScores,
    pub show_leaderboard: bool,
    pub leaderboard: Leaderboard,
    // Name entry state
    pub entering_name: bool,
    pub name_buffer: String,
    pub name_game: GameKind,
    pub name_score: u32,
    pub notice: Option<(String, Instant)>,
    pub show_pad: bool,
    /// Where the pad was last drawn, for hit-testing
    pub pad: Option<PadLayout>,
    pad_held: Option<Button>,
    client: Option<ScoreClient>,
    api_tx: mpsc::Sender<ApiEvent>,
    api_rx: mpsc::Receiver<ApiEvent>,
    assets: Assets,
    sound: bool,
    seed: Option<u64>,
}

impl App {
    pub fn new(config: &Config, best: BestScores, release_events: bool) -> Self {
        let (api_tx, api_rx) = mpsc::channel();
        let client = config.api_base.as_deref().map(ScoreClient::new);
        let mut app = Self {
            should_quit: false,
            current_tab: Tab::Home,
            selected_game: 0,
            active: None,
            input: InputSampler::new(release_events),
            best,
            show_leaderboard: false,
            leaderboard: Leaderboard::Offline,
            entering_name: false,
            name_buffer: String::new(),
            name_game: GameKind::Pong,
            name_score: 0,
            notice: None,
            show_pad: config.pad,
            pad: None,
            pad_held: None,
            client,
            api_tx,
            api_rx,
            assets: Assets::load(config),
            sound: !config.no_sound,
            seed: config.seed,
        };
        app.refresh_leaderboard();
        app
    }

    pub fn is_game_running(&self) -> bool {
        !self.entering_name
            && self
                .active
                .as_ref()
                .is_some_and(|a| a.game.status().is_running())
    }

    pub fn open_game(&mut self, kind: GameKind) {
        self.close_game();
        let seed = self.seed.unwrap_or_else(rand::random);
        let mut game = kind.create(seed, &self.assets);
        game.status_mut().best = self.best.get(kind.storage_key());
        log::info!("Opening {} (seed {seed})", kind.title());

        self.active = Some(ActiveGame {
            game,
            speaker: Speaker::open(self.sound),
            run_recorded: false,
        });
        self.current_tab = Tab::Game(kind);
        self.selected_game = kind.index();
        self.input.release_all();
    }

    /// Drop the open game, keeping its best score
    pub fn close_game(&mut self) {
        if let Some(active) = self.active.take() {
            let kind = active.game.kind();
            self.best.record(kind.storage_key(), active.game.status().score);
            log::info!("Closed {}", kind.title());
        }
        self.current_tab = Tab::Home;
        self.input.release_all();
        self.pad = None;
        self.pad_held = None;
    }

    pub fn refresh_leaderboard(&mut self) {
        if let Some(client) = &self.client {
            self.leaderboard = Leaderboard::Loading;
            api::spawn_fetch(client, self.api_tx.clone());
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, now: Instant) {
        self.notice = Some((message.into(), now));
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.input.expire(now);
        self.poll_api(now);

        if self.notice.as_ref().is_some_and(|(_, at)| now.saturating_duration_since(*at) > NOTICE_TIME) {
            self.notice = None;
        }

        self.check_run_end();

        if let Some(active) = &mut self.active {
            let sounds = active.game.status_mut().take_sounds();
            active.speaker.play_all(sounds);
        }
    }

    /// One frame of simulation for the open game
    pub fn step_game(&mut self, dt: f32) {
        let controls = self.input.snapshot();
        if let Some(active) = &mut self.active {
            active.game.step(dt, &controls);
        }
    }

    fn poll_api(&mut self, now: Instant) {
        while let Ok(event) = self.api_rx.try_recv() {
            match event {
                ApiEvent::Scores(Ok(mut scores)) => {
                    scores.sort_by(|a, b| b.score.cmp(&a.score));
                    self.leaderboard = Leaderboard::Loaded(scores);
                }
                ApiEvent::Scores(Err(e)) => self.leaderboard = Leaderboard::Failed(e.to_string()),
                ApiEvent::Submitted(Ok(record)) => {
                    self.notify(format!("Score {} submitted", record.score), now);
                    self.refresh_leaderboard();
                }
                ApiEvent::Submitted(Err(e)) => self.notify(e.to_string(), now),
            }
        }
    }

    /// Save a finished run's best and, when a score service is set up,
    /// ask for a name to submit it under.
    fn check_run_end(&mut self) {
        let Some(active) = &mut self.active else { return };
        let status = active.game.status();
        if !status.is_finished() {
            active.run_recorded = false;
            return;
        }
        if active.run_recorded {
            return;
        }
        active.run_recorded = true;

        let kind = active.game.kind();
        let (score, phase) = (status.score, status.phase);
        if self.best.record(kind.storage_key(), score) {
            log::info!("New best for {}: {score}", kind.title());
        }
        if phase == Phase::GameOver && score > 0 && self.client.is_some() {
            // Prompt for name entry
            self.entering_name = true;
            self.name_buffer.clear();
            self.name_game = kind;
            self.name_score = score;
            self.input.release_all();
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) {
        // Releases only ever clear held buttons
        if key.kind == KeyEventKind::Release {
            self.input.on_key(key, now);
            return;
        }

        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // If entering a name, intercept all input
        if self.entering_name {
            if key.kind == KeyEventKind::Press {
                self.handle_name_input(key);
            }
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') if self.current_tab == Tab::Home => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.switch_tab(-1);
                return;
            }
            KeyCode::Tab => {
                self.switch_tab(1);
                return;
            }
            KeyCode::BackTab => {
                self.switch_tab(-1);
                return;
            }
            KeyCode::Esc if self.current_tab != Tab::Home => {
                self.close_game();
                return;
            }
            _ => {}
        }

        match self.current_tab {
            Tab::Home => self.on_home_key(key),
            Tab::Game(_) => {
                let command = self.input.on_key(key, now);
                if let (Some(cmd), Some(active)) = (command, &mut self.active) {
                    active.game.command(cmd);
                }
            }
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press || !key.modifiers.difference(KeyModifiers::SHIFT).is_empty() {
            return;
        }
        let count = GameKind::ALL.len();
        match key.code {
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.open_game(GameKind::from_index(idx));
            }
            KeyCode::Right | KeyCode::Char('d') => {
                self.selected_game = (self.selected_game + 1) % count;
            }
            KeyCode::Left | KeyCode::Char('a') => {
                self.selected_game = (self.selected_game + count - 1) % count;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.open_game(GameKind::from_index(self.selected_game));
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.show_leaderboard = !self.show_leaderboard;
                if self.show_leaderboard && matches!(self.leaderboard, Leaderboard::Failed(_)) {
                    self.refresh_leaderboard();
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.refresh_leaderboard();
            }
            _ => {}
        }
    }

    fn handle_name_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let name = if self.name_buffer.is_empty() {
                    DEFAULT_NAME.to_string()
                } else {
                    self.name_buffer.clone()
                };
                self.submit_name(name);
            }
            KeyCode::Backspace => {
                self.name_buffer.pop();
            }
            KeyCode::Esc => {
                // Cancel submits with the default name
                self.submit_name(DEFAULT_NAME.to_string());
            }
            KeyCode::Char(c) => {
                // Only allow printable ASCII characters, up to MAX_NAME_LEN
                if self.name_buffer.chars().count() < MAX_NAME_LEN && c.is_ascii_graphic() {
                    self.name_buffer.push(c.to_ascii_uppercase());
                }
            }
            _ => {}
        }
    }

    fn submit_name(&mut self, name: String) {
        self.entering_name = false;
        self.name_buffer.clear();
        if let Some(client) = &self.client {
            let score = NewScore::new(Some(name), self.name_score, Some(self.name_game.slug().to_string()));
            api::spawn_submit(client, score, self.api_tx.clone());
        }
    }

    pub fn on_mouse(&mut self, event: MouseEvent) {
        if self.entering_name || self.active.is_none() {
            return;
        }
        let command = match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let hit = self.pad.as_ref().and_then(|p| p.hit(event.column, event.row));
                match hit {
                    Some(button) => {
                        self.press_pad(button);
                        None
                    }
                    None => self.input.on_mouse(event),
                }
            }
            MouseEventKind::Up(MouseButton::Left) => match self.pad_held.take() {
                Some(button) => {
                    self.input.set_pressed(button, false);
                    None
                }
                None => self.input.on_mouse(event),
            },
            _ => self.input.on_mouse(event),
        };
        // Swipe taps
        if let (Some(cmd), Some(active)) = (command, &mut self.active) {
            active.game.command(cmd);
        }
    }

    fn press_pad(&mut self, button: Button) {
        self.input.set_pressed(button, true);
        self.pad_held = Some(button);
        let command = match button {
            Button::Action => Some(Command::Pause),
            Button::Start => Some(Command::Start),
            other => other.dir().map(Command::Tap),
        };
        if let (Some(cmd), Some(active)) = (command, &mut self.active) {
            active.game.command(cmd);
        }
    }

    fn switch_tab(&mut self, delta: isize) {
        let tabs = Tab::ALL;
        let len = tabs.len() as isize;
        let idx = (self.current_tab.index() as isize + delta).rem_euclid(len) as usize;
        match tabs[idx] {
            Tab::Home => self.close_game(),
            Tab::Game(kind) => self.open_game(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn offline() -> App {
        let config = Config { no_sound: true, seed: Some(7), ..Config::default() };
        App::new(&config, BestScores::in_memory(), false)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn test_enter_opens_selected_game() {
        let mut app = offline();
        let now = Instant::now();
        app.on_key(press(KeyCode::Right), now);
        app.on_key(press(KeyCode::Right), now);
        app.on_key(press(KeyCode::Enter), now);
        assert_eq!(app.current_tab, Tab::Game(GameKind::Pacman));
        assert_eq!(app.active.as_ref().unwrap().game.kind(), GameKind::Pacman);
        assert!(!app.is_game_running());
    }

    #[test]
    fn test_coverflow_wraps() {
        let mut app = offline();
        app.on_key(press(KeyCode::Left), Instant::now());
        assert_eq!(app.selected_game, GameKind::ALL.len() - 1);
    }

    #[test]
    fn test_space_starts_and_esc_closes() {
        let mut app = offline();
        let now = Instant::now();
        app.open_game(GameKind::Pong);
        app.on_key(press(KeyCode::Char(' ')), now);
        assert!(app.is_game_running());

        app.on_key(press(KeyCode::Esc), now);
        assert_eq!(app.current_tab, Tab::Home);
        assert!(app.active.is_none());
        assert!(!app.is_game_running());
    }

    #[test]
    fn test_best_score_survives_reopen() {
        let mut app = offline();
        app.open_game(GameKind::Breakout);
        app.active.as_mut().unwrap().game.status_mut().award(90);
        app.close_game();
        assert_eq!(app.best.get("av_breakout_high"), 90);

        app.open_game(GameKind::Breakout);
        let status = app.active.as_ref().unwrap().game.status();
        assert_eq!(status.best, 90);
        assert_eq!(status.score, 0);
    }

    #[test]
    fn test_game_over_records_best_once() {
        let mut app = offline();
        app.open_game(GameKind::Pong);
        {
            let status = app.active.as_mut().unwrap().game.status_mut();
            status.award(4);
            status.phase = Phase::GameOver;
        }
        app.on_tick(Instant::now());
        assert_eq!(app.best.get("av_pong_high"), 4);
        // Offline: no name prompt
        assert!(!app.entering_name);
        assert!(app.active.as_ref().unwrap().run_recorded);
    }

    #[test]
    fn test_q_only_quits_from_home() {
        let mut app = offline();
        app.open_game(GameKind::ChickenRun);
        app.on_key(press(KeyCode::Char('q')), Instant::now());
        assert!(!app.should_quit);
        app.close_game();
        app.on_key(press(KeyCode::Char('q')), Instant::now());
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_cycles_through_games() {
        let mut app = offline();
        let now = Instant::now();
        app.on_key(press(KeyCode::Tab), now);
        assert_eq!(app.current_tab, Tab::Game(GameKind::Pong));
        app.on_key(press(KeyCode::BackTab), now);
        assert_eq!(app.current_tab, Tab::Home);
        assert!(app.active.is_none());
        app.on_key(press(KeyCode::BackTab), now);
        assert_eq!(app.current_tab, Tab::Game(GameKind::ChickenRun));
    }

    #[test]
    fn test_name_entry_input() {
        let mut app = offline();
        app.entering_name = true;
        for c in "abcdefghijkl".chars() {
            app.on_key(press(KeyCode::Char(c)), Instant::now());
        }
        assert_eq!(app.name_buffer, "ABCDEFGHI");
        app.on_key(press(KeyCode::Backspace), Instant::now());
        assert_eq!(app.name_buffer, "ABCDEFGH");
        app.on_key(press(KeyCode::Enter), Instant::now());
        assert!(!app.entering_name);
        assert!(app.name_buffer.is_empty());
    }

    #[test]
    fn test_offline_leaderboard() {
        let app = offline();
        assert_eq!(app.leaderboard, Leaderboard::Offline);
    }

    #[test]
    fn test_leaderboard_top_per_game() {
        let record = |name: &str, score, game: &str| ScoreRecord {
            name: Some(name.into()),
            score,
            game: Some(game.into()),
            created: None,
        };
        let board = Leaderboard::Loaded(vec![
            record("ana", 90, "pong"),
            record("bo", 70, "pacman"),
            record("cy", 40, "pong"),
            record("di", 10, "pong"),
        ]);
        let pong: Vec<_> = board.top(Some("pong"), 2).iter().map(|r| r.score).collect();
        assert_eq!(pong, vec![90, 40]);
        assert_eq!(board.top(None, 10).len(), 4);
        assert!(Leaderboard::Loading.top(None, 3).is_empty());
    }

    #[test]
    fn test_held_key_expires_without_release_events() {
        let mut app = offline();
        let start = Instant::now();
        app.open_game(GameKind::Breakout);
        app.on_key(press(KeyCode::Left), start);
        assert!(app.input.snapshot().left);
        app.on_tick(start + Duration::from_millis(600));
        assert!(!app.input.snapshot().left);
    }

    #[test]
    fn test_swipe_reaches_the_game() {
        let mut app = offline();
        app.open_game(GameKind::ChickenRun);
        assert!(!app.is_game_running());

        app.on_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 20, 20));
        // Held flags alone never start a Chicken Run; the swipe's tap does
        app.on_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 20, 10));
        assert!(app.is_game_running());
        assert!(app.input.snapshot().up);

        app.on_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 20, 10));
        assert!(!app.input.snapshot().up);
    }

    #[test]
    fn test_pad_press_and_release() {
        let mut app = offline();
        app.open_game(GameKind::ChickenRun);
        let layout = PadLayout::new(ratatui::layout::Rect::new(0, 20, 60, 3));
        let (col, row) = layout.centre_of(Button::Up).unwrap();
        app.pad = Some(layout);

        app.on_mouse(mouse(MouseEventKind::Down(MouseButton::Left), col, row));
        assert!(app.input.snapshot().up);
        // The tap hopped the chicken and started the run
        assert!(app.is_game_running());

        app.on_mouse(mouse(MouseEventKind::Up(MouseButton::Left), col, row));
        assert!(!app.input.snapshot().up);
    }
}
