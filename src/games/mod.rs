pub mod breakout;
pub mod chicken_run;
pub mod pacman;
pub mod pong;

use ratatui::prelude::*;

use crate::assets::Assets;
use crate::input::{Command, ControlState};

/// Where a run currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Fresh board, waiting for the first start
    Ready,
    Playing,
    Paused,
    /// Lives ran out; stepping is frozen until restart
    GameOver,
    /// Board cleared (Pacman); continue or restart
    Won,
}

/// Short sound effects a game asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    Wall,
    Paddle,
    Brick,
    Pellet,
    PowerPellet,
    GhostEaten,
    Step,
    Pickup,
    LifeLost,
    LevelUp,
    Win,
}

impl Sound {
    /// (frequency Hz, duration ms) of the blip
    pub fn tone(self) -> (u32, u32) {
        match self {
            Sound::Wall => (520, 60),
            Sound::Paddle => (700, 60),
            Sound::Brick => (820, 60),
            Sound::Pellet => (740, 60),
            Sound::PowerPellet => (520, 60),
            Sound::GhostEaten => (300, 60),
            Sound::Step => (720, 40),
            Sound::Pickup => (900, 60),
            Sound::LifeLost => (180, 80),
            Sound::LevelUp => (960, 120),
            Sound::Win => (900, 120),
        }
    }
}

/// Score, lives, level and run flags shared by every game
#[derive(Clone, Debug)]
pub struct Status {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    /// Best score seen for this game, including the current run
    pub best: u32,
    pub phase: Phase,
    pub muted: bool,
    initial_lives: u32,
    sounds: Vec<Sound>,
}

impl Status {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            lives,
            level: 1,
            best: 0,
            phase: Phase::Ready,
            muted: false,
            initial_lives: lives,
            sounds: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::GameOver | Phase::Won)
    }

    /// Space: Ready/Paused start or resume, Playing pauses, finished runs ignore it
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Ready | Phase::Paused => Phase::Playing,
            Phase::Playing => Phase::Paused,
            other => other,
        };
    }

    pub fn resume(&mut self) {
        if matches!(self.phase, Phase::Ready | Phase::Paused) {
            self.phase = Phase::Playing;
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        if self.muted {
            self.sounds.clear();
        }
    }

    pub fn award(&mut self, points: u32) {
        self.score += points;
        self.best = self.best.max(self.score);
    }

    /// Take a life. Returns true when that was the last one.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.blip(Sound::LifeLost);
        if self.lives == 0 {
            self.phase = Phase::GameOver;
            true
        } else {
            self.phase = Phase::Paused;
            false
        }
    }

    pub fn blip(&mut self, sound: Sound) {
        if !self.muted {
            self.sounds.push(sound);
        }
    }

    pub fn take_sounds(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.sounds)
    }

    /// Back to a fresh run. Best score and mute survive.
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = self.initial_lives;
        self.level = 1;
        self.phase = Phase::Ready;
        self.sounds.clear();
    }
}

pub trait Game {
    fn kind(&self) -> GameKind;
    /// Advance the simulation by `dt` seconds. Only called while running.
    fn step(&mut self, dt: f32, controls: &ControlState);
    fn command(&mut self, cmd: Command) {
        handle_common(self, cmd);
    }
    fn render(&self, frame: &mut Frame, area: Rect);
    fn reset(&mut self);
    fn status(&self) -> &Status;
    fn status_mut(&mut self) -> &mut Status;
}

/// Pause, mute, restart and start handling every game shares
pub fn handle_common<G: Game + ?Sized>(game: &mut G, cmd: Command) {
    match cmd {
        Command::Pause => game.status_mut().toggle_pause(),
        Command::Mute => game.status_mut().toggle_mute(),
        Command::Restart => game.reset(),
        Command::Start => game.status_mut().resume(),
        Command::Tap(_) => {}
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameKind {
    Pong,
    Breakout,
    Pacman,
    ChickenRun,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Pong,
        GameKind::Breakout,
        GameKind::Pacman,
        GameKind::ChickenRun,
    ];

    pub fn index(self) -> usize {
        match self {
            GameKind::Pong => 0,
            GameKind::Breakout => 1,
            GameKind::Pacman => 2,
            GameKind::ChickenRun => 3,
        }
    }

    pub fn from_index(idx: usize) -> GameKind {
        Self::ALL[idx % Self::ALL.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Pong => "Pong",
            GameKind::Breakout => "Breakout",
            GameKind::Pacman => "Pacman",
            GameKind::ChickenRun => "Chicken Run",
        }
    }

    /// Game identifier sent to the score API
    pub fn slug(self) -> &'static str {
        match self {
            GameKind::Pong => "pong",
            GameKind::Breakout => "breakout",
            GameKind::Pacman => "pacman",
            GameKind::ChickenRun => "chicken-run",
        }
    }

    /// Key of the locally persisted best score
    pub fn storage_key(self) -> &'static str {
        match self {
            GameKind::Pong => "av_pong_high",
            GameKind::Breakout => "av_breakout_high",
            GameKind::Pacman => "av_pacman_high",
            GameKind::ChickenRun => "av_chicken_high",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            GameKind::Pong => "🏓",
            GameKind::Breakout => "🧱",
            GameKind::Pacman => "👻",
            GameKind::ChickenRun => "🐔",
        }
    }

    pub fn blurb(self) -> &'static str {
        match self {
            GameKind::Pong => "Classic paddle duel\nagainst the machine",
            GameKind::Breakout => "Smash every brick,\nlevel after level",
            GameKind::Pacman => "Eat the pellets,\nmind the ghosts",
            GameKind::ChickenRun => "Cross the traffic,\npeck the seeds",
        }
    }

    pub fn accent(self) -> Color {
        match self {
            GameKind::Pong => Color::Rgb(230, 230, 240),
            GameKind::Breakout => Color::Rgb(0, 229, 255),
            GameKind::Pacman => Color::Rgb(255, 224, 102),
            GameKind::ChickenRun => Color::Rgb(255, 159, 28),
        }
    }

    pub fn controls(self) -> &'static str {
        match self {
            GameKind::Pong => "↑↓/WS move • Space start/pause • M mute • R restart • Esc close",
            GameKind::Breakout => "←→/AD move • Space start/pause • M mute • R restart • Esc close",
            GameKind::Pacman => "Arrows/WASD steer • Space pause • M mute • R restart • Esc close",
            GameKind::ChickenRun => "Arrows/WASD hop • Space pause • M mute • R restart • Esc close",
        }
    }

    /// Fresh game instance for a newly opened modal
    pub fn create(self, seed: u64, assets: &Assets) -> Box<dyn Game> {
        match self {
            GameKind::Pong => Box::new(pong::Pong::with_seed(seed)),
            GameKind::Breakout => Box::new(breakout::Breakout::with_seed(seed)),
            GameKind::Pacman => Box::new(pacman::Pacman::with_seed(seed)),
            GameKind::ChickenRun => {
                Box::new(chicken_run::ChickenRun::with_seed(seed).with_sprite(assets.chicken))
            }
        }
    }
}
