use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::assets::SpriteSet;
use crate::games::{handle_common, Game, GameKind, Phase, Sound, Status};
use crate::input::{Command, ControlState, Dir};
use crate::ui::chrome;
use crate::ui::raster::Raster;

pub const COLS: i32 = 13;
pub const ROWS: i32 = 15;
const BASE_SPEED: f32 = 2.2;
const SPEED_PER_LEVEL: f32 = 0.35;
const SEED_CHANCE: f64 = 0.45;
const HALF_WIDTH: f32 = 0.4;
const LIVES: u32 = 3;

pub const SEED_POINTS: u32 = 25;
pub const FINISH_POINTS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lane {
    Finish,
    Road,
    Grass,
    Start,
}

/// Lanes from the top (finish) to the bottom (start)
const LANES: [Lane; ROWS as usize] = [
    Lane::Finish,
    Lane::Road,
    Lane::Grass,
    Lane::Road,
    Lane::Road,
    Lane::Grass,
    Lane::Road,
    Lane::Grass,
    Lane::Road,
    Lane::Road,
    Lane::Grass,
    Lane::Road,
    Lane::Road,
    Lane::Grass,
    Lane::Start,
];

pub fn lane(row: i32) -> Lane {
    LANES[row.clamp(0, ROWS - 1) as usize]
}

#[derive(Clone, Debug, PartialEq)]
pub struct Car {
    pub row: i32,
    pub x: f32,
    pub w: f32,
    pub speed: f32,
    /// +1.0 moving right, -1.0 moving left
    pub dir: f32,
}

impl Car {
    fn drive(&mut self, dt: f32) {
        self.x += self.dir * self.speed * dt;
        if self.dir > 0.0 && self.x > (COLS + 2) as f32 {
            self.x = -2.0;
        }
        if self.dir < 0.0 && self.x < -3.0 {
            self.x = (COLS + 2) as f32;
        }
    }

    fn covers(&self, centre: f32) -> bool {
        centre + HALF_WIDTH > self.x && centre - HALF_WIDTH < self.x + self.w
    }
}

pub struct ChickenRun {
    cars: Vec<Car>,
    seeds: BTreeSet<(i32, i32)>,
    col: i32,
    row: i32,
    facing: Dir,
    sprite: Option<SpriteSet>,
    status: Status,
    rng: StdRng,
}

impl ChickenRun {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut game = Self {
            cars: Vec::new(),
            seeds: BTreeSet::new(),
            col: COLS / 2,
            row: ROWS - 1,
            facing: Dir::Up,
            sprite: None,
            status: Status::new(LIVES),
            rng: StdRng::seed_from_u64(seed),
        };
        game.build_lanes();
        game
    }

    /// Use loaded sprite glyphs instead of the drawn chicken
    pub fn with_sprite(mut self, sprite: Option<SpriteSet>) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn position(&self) -> (i32, i32) {
        (self.col, self.row)
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    fn lane_speed(&self) -> f32 {
        BASE_SPEED + (self.status.level - 1) as f32 * SPEED_PER_LEVEL
    }

    fn build_lanes(&mut self) {
        let base = self.lane_speed();
        self.cars.clear();
        self.seeds.clear();
        for row in 0..ROWS {
            match lane(row) {
                Lane::Road => {
                    let dir = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                    let speed = base * self.rng.gen_range(0.8..1.4);
                    let count = self.rng.gen_range(2..=3);
                    for _ in 0..count {
                        let x = self.rng.gen_range(0.0..(COLS - 1) as f32);
                        let w = self.rng.gen_range(0.9..1.8);
                        self.cars.push(Car { row, x, w, speed, dir });
                    }
                }
                Lane::Grass => {
                    if self.rng.gen_bool(SEED_CHANCE) {
                        self.seeds.insert((self.rng.gen_range(0..COLS), row));
                    }
                }
                Lane::Finish | Lane::Start => {}
            }
        }
    }

    fn reset_player(&mut self) {
        self.col = COLS / 2;
        self.row = ROWS - 1;
        self.facing = Dir::Up;
    }

    fn hop(&mut self, dir: Dir) {
        let (dx, dy) = dir.delta();
        self.col = (self.col + dx).clamp(0, COLS - 1);
        self.row = (self.row + dy).clamp(0, ROWS - 1);
        self.facing = dir;
        self.status.blip(Sound::Step);

        if self.seeds.remove(&(self.col, self.row)) {
            self.status.award(SEED_POINTS);
            self.status.blip(Sound::Pickup);
        }

        if self.row == 0 {
            self.status.award(FINISH_POINTS);
            self.status.level += 1;
            self.build_lanes();
            self.reset_player();
            self.status.phase = Phase::Paused;
            self.status.blip(Sound::LevelUp);
        }
    }

    fn hit_by_car(&self) -> bool {
        let centre = self.col as f32 + 0.5;
        self.cars.iter().any(|c| c.row == self.row && c.covers(centre))
    }

    fn chicken_glyph(&self) -> String {
        match self.sprite {
            Some(sprite) => sprite.facing(self.facing).to_string(),
            None => match self.facing {
                Dir::Right => "(o>",
                Dir::Left => "<o)",
                Dir::Up => "/o\\",
                Dir::Down => "\\o/",
            }
            .to_string(),
        }
    }

    fn render_field(&self, raster: &mut Raster) {
        for row in 0..ROWS {
            let y = row as f32;
            let bg = match lane(row) {
                Lane::Road if row % 2 == 1 => Color::Rgb(43, 43, 43),
                Lane::Road => Color::Rgb(32, 32, 32),
                Lane::Finish => Color::Rgb(32, 54, 72),
                Lane::Grass | Lane::Start if row % 2 == 1 => Color::Rgb(30, 58, 42),
                Lane::Grass | Lane::Start => Color::Rgb(32, 69, 47),
            };
            raster.fill_rect(0.0, y, COLS as f32, 1.0, ' ', Style::default().bg(bg));
            if lane(row) == Lane::Road {
                let dash = Style::default().fg(Color::Rgb(90, 90, 90));
                for col in (0..COLS).step_by(2) {
                    raster.plot(col as f32 + 0.5, y + 0.5, '╌', dash);
                }
            }
        }
        if let Some((_, r)) = raster.to_cell(0.0, 0.5) {
            let label = "FINISH";
            let col = raster.cols().saturating_sub(label.len()) / 2;
            raster.text(col, r, label, Style::default().fg(Color::Rgb(160, 200, 255)).add_modifier(Modifier::BOLD));
        }

        let seed = Style::default().fg(Color::Rgb(255, 209, 102));
        for &(col, row) in &self.seeds {
            raster.plot(col as f32 + 0.5, row as f32 + 0.5, '•', seed);
        }

        let car = Style::default().fg(Color::Rgb(230, 57, 70));
        for c in &self.cars {
            raster.fill_rect(c.x, c.row as f32 + 0.1, c.w, 0.8, '█', car);
        }

        let glyph = self.chicken_glyph();
        let style = Style::default().fg(Color::Rgb(255, 248, 225)).add_modifier(Modifier::BOLD);
        if let Some((col, row)) = raster.to_cell(self.col as f32 + 0.5, self.row as f32 + 0.5) {
            let start = col.saturating_sub(glyph.chars().count() / 2);
            raster.text(start, row, &glyph, style);
        }
    }
}

impl Default for ChickenRun {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for ChickenRun {
    fn kind(&self) -> GameKind {
        GameKind::ChickenRun
    }

    /// Held directions do nothing here; the chicken only moves on taps.
    fn step(&mut self, dt: f32, _controls: &ControlState) {
        if !self.status.is_running() {
            return;
        }
        for car in &mut self.cars {
            car.drive(dt);
        }
        if self.hit_by_car() {
            self.status.lose_life();
            self.reset_player();
        }
    }

    fn command(&mut self, cmd: Command) {
        match cmd {
            Command::Tap(dir) => {
                if self.status.is_finished() {
                    return;
                }
                self.status.resume();
                self.hop(dir);
            }
            other => handle_common(self, other),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let board = chrome::game_frame(frame, area, self.kind(), &self.status, None);
        let mut raster = Raster::from_area(board, COLS as f32, ROWS as f32, Color::Black);
        self.render_field(&mut raster);
        frame.render_widget(Paragraph::new(raster.into_lines()), board);
        chrome::overlay(frame, board, &self.status, "Press an arrow or WASD");
    }

    fn reset(&mut self) {
        self.status.reset();
        self.build_lanes();
        self.reset_player();
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Playing, with the roads empty
    fn quiet(seed: u64) -> ChickenRun {
        let mut g = ChickenRun::with_seed(seed);
        g.cars.clear();
        g.seeds.clear();
        g.status.toggle_pause();
        g
    }

    #[test]
    fn test_lane_generation() {
        let g = ChickenRun::with_seed(11);
        for row in 0..ROWS {
            let cars: Vec<&Car> = g.cars.iter().filter(|c| c.row == row).collect();
            if lane(row) == Lane::Road {
                assert!((2..=3).contains(&cars.len()), "row {row} has {} cars", cars.len());
                let speed = cars[0].speed;
                assert!(cars.iter().all(|c| c.speed == speed && c.dir == cars[0].dir));
                assert!((BASE_SPEED * 0.8..=BASE_SPEED * 1.4).contains(&speed));
                assert!(cars.iter().all(|c| (0.9..1.8).contains(&c.w)));
            } else {
                assert!(cars.is_empty());
            }
        }
        assert!(g.seeds.iter().all(|&(_, row)| lane(row) == Lane::Grass));
    }

    #[test]
    fn test_upward_swipe_hops() {
        let mut g = ChickenRun::with_seed(4);
        g.cars.clear();
        let mut input = crate::input::InputSampler::new(true);
        input.on_pointer_down(20, 20);
        let tap = input.on_pointer_move(20, 10).unwrap();
        g.command(tap);
        assert_eq!(g.position(), (COLS / 2, ROWS - 2));
        assert!(g.status.is_running());

        // The held flag alone moves nothing
        let snap = input.snapshot();
        for _ in 0..30 {
            g.step(0.016, &snap);
        }
        assert_eq!(g.position(), (COLS / 2, ROWS - 2));
    }

    #[test]
    fn test_hops_are_clamped() {
        let mut g = quiet(1);
        g.command(Command::Tap(Dir::Down));
        assert_eq!(g.position(), (COLS / 2, ROWS - 1));
        for _ in 0..20 {
            g.command(Command::Tap(Dir::Left));
        }
        assert_eq!(g.position(), (0, ROWS - 1));
        assert_eq!(g.facing, Dir::Left);
    }

    #[test]
    fn test_tap_starts_the_run() {
        let mut g = ChickenRun::with_seed(2);
        assert_eq!(g.status.phase, Phase::Ready);
        g.command(Command::Tap(Dir::Up));
        assert_eq!(g.status.phase, Phase::Playing);
        assert_eq!(g.position(), (COLS / 2, ROWS - 2));
    }

    #[test]
    fn test_seed_pickup() {
        let mut g = quiet(3);
        g.seeds.insert((COLS / 2, ROWS - 2));
        g.command(Command::Tap(Dir::Up));
        assert_eq!(g.status.score, SEED_POINTS);
        assert!(g.seeds.is_empty());
    }

    #[test]
    fn test_finish_advances_level_once() {
        let mut g = quiet(4);
        g.row = 1;
        g.command(Command::Tap(Dir::Up));
        assert_eq!(g.status.score, FINISH_POINTS);
        assert_eq!(g.status.level, 2);
        assert_eq!(g.position(), (COLS / 2, ROWS - 1));
        assert_eq!(g.status.phase, Phase::Paused);
        assert!(!g.cars.is_empty());

        g.cars.clear();
        g.status.resume();
        g.step(0.05, &ControlState::default());
        assert_eq!(g.status.level, 2);
        assert_eq!(g.status.score, FINISH_POINTS);
    }

    #[test]
    fn test_car_hit_costs_life() {
        let mut g = quiet(5);
        g.row = 3;
        g.cars.push(Car { row: 3, x: COLS as f32 / 2.0 - 0.5, w: 1.0, speed: 1.0, dir: 1.0 });
        g.step(0.01, &ControlState::default());
        assert_eq!(g.status.lives, LIVES - 1);
        assert_eq!(g.status.phase, Phase::Paused);
        assert_eq!(g.position(), (COLS / 2, ROWS - 1));
    }

    #[test]
    fn test_car_in_other_row_is_harmless() {
        let mut g = quiet(6);
        g.row = 3;
        g.cars.push(Car { row: 4, x: COLS as f32 / 2.0 - 0.5, w: 1.0, speed: 1.0, dir: 1.0 });
        g.step(0.01, &ControlState::default());
        assert_eq!(g.status.lives, LIVES);
        assert_eq!(g.status.phase, Phase::Playing);
    }

    #[test]
    fn test_cars_wrap() {
        let mut right = Car { row: 1, x: 14.99, w: 1.0, speed: 1.0, dir: 1.0 };
        right.drive(0.05);
        assert_eq!(right.x, -2.0);

        let mut left = Car { row: 1, x: -2.99, w: 1.0, speed: 1.0, dir: -1.0 };
        left.drive(0.05);
        assert_eq!(left.x, (COLS + 2) as f32);
    }

    #[test]
    fn test_held_controls_do_not_move() {
        let mut g = quiet(7);
        let held = ControlState { up: true, left: true, ..Default::default() };
        g.step(0.05, &held);
        assert_eq!(g.position(), (COLS / 2, ROWS - 1));
    }

    #[test]
    fn test_sprite_and_fallback_glyphs() {
        let mut g = quiet(8);
        assert_eq!(g.chicken_glyph(), "/o\\");
        g = g.with_sprite(Some(SpriteSet { up: 'u', down: 'd', left: 'l', right: 'r' }));
        g.command(Command::Tap(Dir::Right));
        assert_eq!(g.chicken_glyph(), "r");
    }

    #[test]
    fn test_game_over_ignores_taps() {
        let mut g = quiet(9);
        g.status.lives = 1;
        g.row = 3;
        g.cars.push(Car { row: 3, x: COLS as f32 / 2.0 - 0.5, w: 1.0, speed: 0.0, dir: 1.0 });
        g.step(0.01, &ControlState::default());
        assert_eq!(g.status.phase, Phase::GameOver);
        g.command(Command::Tap(Dir::Up));
        assert_eq!(g.position(), (COLS / 2, ROWS - 1));
    }

    fn dir_strategy() -> impl Strategy<Value = Option<Dir>> {
        prop_oneof![
            Just(None),
            Just(Some(Dir::Up)),
            Just(Some(Dir::Down)),
            Just(Some(Dir::Left)),
            Just(Some(Dir::Right)),
        ]
    }

    proptest! {
        #[test]
        fn prop_player_and_cars_stay_in_range(
            seed in any::<u64>(),
            steps in prop::collection::vec((0.0f32..0.05, dir_strategy()), 1..300),
        ) {
            let mut g = ChickenRun::with_seed(seed);
            for (dt, tap) in steps {
                if let Some(d) = tap {
                    g.command(Command::Tap(d));
                }
                g.status.resume();
                g.step(dt, &ControlState::default());

                let (col, row) = g.position();
                prop_assert!((0..COLS).contains(&col) && (0..ROWS).contains(&row));
                for c in g.cars() {
                    prop_assert!(c.x >= -4.0 && c.x <= (COLS + 3) as f32);
                }
            }
        }
    }
}
