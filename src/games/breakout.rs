use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::driver::REFERENCE_FRAME;
use crate::games::{Game, GameKind, Phase, Sound, Status};
use crate::input::ControlState;
use crate::ui::chrome;
use crate::ui::raster::Raster;

const WIDTH: f32 = 960.0;
const HEIGHT: f32 = 540.0;
const PADDLE_WIDTH: f32 = 120.0;
const PADDLE_HEIGHT: f32 = 16.0;
const PADDLE_Y: f32 = HEIGHT - 40.0;
const PADDLE_SPEED: f32 = 9.0;
const BALL_RADIUS: f32 = 8.0;
const BALL_SPEED: f32 = 6.0;
const ENGLISH: f32 = 2.2;
const LIVES: u32 = 3;

const BRICK_COLS: usize = 12;
const BRICK_BASE_ROWS: usize = 5;
const BRICK_GAP: f32 = 8.0;
const BRICK_TOP: f32 = 80.0;
const BRICK_HEIGHT: f32 = 24.0;
const BRICK_MARGIN: f32 = 24.0;
pub const BRICK_REWARD: u32 = 10;

const BG: Color = Color::Rgb(11, 15, 26);

#[derive(Clone, Debug, PartialEq)]
pub struct Brick {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub hp: u32,
}

#[derive(Clone, Debug)]
struct Ball {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

/// Brick layout for a level: more rows every level (cycling), and one more
/// hit point every second level.
pub fn build_level(level: u32) -> Vec<Brick> {
    let lv = level.max(1) as usize;
    let rows = BRICK_BASE_ROWS + (lv - 1) % 3;
    let hp = 1 + (lv as u32 - 1) / 2;
    let brick_w = (WIDTH - BRICK_MARGIN * 2.0 - BRICK_GAP * (BRICK_COLS - 1) as f32) / BRICK_COLS as f32;

    let mut bricks = Vec::with_capacity(rows * BRICK_COLS);
    for r in 0..rows {
        for c in 0..BRICK_COLS {
            bricks.push(Brick {
                x: BRICK_MARGIN + c as f32 * (brick_w + BRICK_GAP),
                y: BRICK_TOP + r as f32 * (BRICK_HEIGHT + BRICK_GAP),
                w: brick_w,
                h: BRICK_HEIGHT,
                hp,
            });
        }
    }
    bricks
}

pub struct Breakout {
    paddle_x: f32,
    ball: Ball,
    bricks: Vec<Brick>,
    status: Status,
    rng: StdRng,
}

impl Breakout {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut b = Self {
            paddle_x: WIDTH / 2.0 - PADDLE_WIDTH / 2.0,
            ball: Ball { x: 0.0, y: 0.0, vx: 0.0, vy: 0.0 },
            bricks: build_level(1),
            status: Status::new(LIVES),
            rng: StdRng::seed_from_u64(seed),
        };
        b.reset_ball();
        b
    }

    fn serve_speed(&self) -> f32 {
        BALL_SPEED + (self.status.level - 1) as f32 * 0.6
    }

    fn max_speed(&self) -> f32 {
        BALL_SPEED + (self.status.level - 1) as f32 * 0.8 + 4.0
    }

    fn reset_ball(&mut self) {
        let speed = self.serve_speed();
        let side = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.ball = Ball {
            x: WIDTH / 2.0,
            y: HEIGHT - 80.0,
            vx: speed * side,
            vy: -speed,
        };
    }

    fn move_ball(&mut self, frames: f32) {
        let prev_bottom = self.ball.y + BALL_RADIUS;
        let ball = &mut self.ball;
        ball.x += ball.vx * frames;
        ball.y += ball.vy * frames;

        // Walls
        if ball.x < BALL_RADIUS {
            ball.x = BALL_RADIUS;
            ball.vx = -ball.vx;
            self.status.blip(Sound::Wall);
        }
        if ball.x > WIDTH - BALL_RADIUS {
            ball.x = WIDTH - BALL_RADIUS;
            ball.vx = -ball.vx;
            self.status.blip(Sound::Wall);
        }
        if ball.y < BALL_RADIUS {
            ball.y = BALL_RADIUS;
            ball.vy = -ball.vy;
            self.status.blip(Sound::Wall);
        }

        self.paddle_contact(prev_bottom);
        self.brick_contacts();

        // Fell past the paddle
        if self.ball.y >= HEIGHT {
            if !self.status.lose_life() {
                self.reset_ball();
            } else {
                self.ball.y = HEIGHT - BALL_RADIUS;
            }
            return;
        }

        if self.bricks.is_empty() {
            self.next_level();
        }
    }

    /// Swept against the paddle band: a fast ball that started the move
    /// above the band's bottom and ended at or past its top still connects.
    fn paddle_contact(&mut self, prev_bottom: f32) {
        let px = self.paddle_x;
        let ball = &mut self.ball;
        let bottom = ball.y + BALL_RADIUS;
        if ball.vy > 0.0
            && bottom >= PADDLE_Y
            && prev_bottom <= PADDLE_Y + PADDLE_HEIGHT
            && ball.x >= px
            && ball.x <= px + PADDLE_WIDTH
        {
            ball.y = PADDLE_Y - BALL_RADIUS;
            ball.vy = -ball.vy;
            // English from where it met the paddle
            let hit = (ball.x - (px + PADDLE_WIDTH / 2.0)) / (PADDLE_WIDTH / 2.0);
            ball.vx += hit * ENGLISH;

            let max_v = self.max_speed();
            let ball = &mut self.ball;
            let mag = ball.vx.hypot(ball.vy);
            if mag > max_v {
                let s = max_v / mag;
                ball.vx *= s;
                ball.vy *= s;
            }
            self.status.blip(Sound::Paddle);
        }
    }

    /// Reflect the axis with the smaller overlap, one hit point per contact.
    /// Bricks are visited last to first; a ball overlapping two bricks hits both.
    fn brick_contacts(&mut self) {
        for i in (0..self.bricks.len()).rev() {
            let b = &self.bricks[i];
            let ball = &self.ball;
            let overlapping = ball.x + BALL_RADIUS > b.x
                && ball.x - BALL_RADIUS < b.x + b.w
                && ball.y + BALL_RADIUS > b.y
                && ball.y - BALL_RADIUS < b.y + b.h;
            if !overlapping {
                continue;
            }

            let overlap_x = (ball.x + BALL_RADIUS - b.x).min(b.x + b.w - (ball.x - BALL_RADIUS));
            let overlap_y = (ball.y + BALL_RADIUS - b.y).min(b.y + b.h - (ball.y - BALL_RADIUS));
            if overlap_x < overlap_y {
                self.ball.vx = -self.ball.vx;
            } else {
                self.ball.vy = -self.ball.vy;
            }

            self.bricks[i].hp -= 1;
            self.status.blip(Sound::Brick);
            if self.bricks[i].hp == 0 {
                self.bricks.remove(i);
                self.status.award(BRICK_REWARD);
            }
        }
    }

    fn next_level(&mut self) {
        self.status.level += 1;
        self.bricks = build_level(self.status.level);
        self.reset_ball();
        self.status.phase = Phase::Paused;
        self.status.blip(Sound::LevelUp);
    }

    fn render_field(&self, raster: &mut Raster) {
        // Stars
        let star = Style::default().fg(Color::Rgb(40, 60, 90));
        for i in 0..80u32 {
            raster.plot(((i * 97) % WIDTH as u32) as f32, ((i * 53) % HEIGHT as u32) as f32, '·', star);
        }

        for brick in &self.bricks {
            let color = if brick.hp > 1 { Color::Rgb(255, 112, 141) } else { Color::Rgb(155, 255, 128) };
            raster.fill_rect(brick.x, brick.y, brick.w, brick.h, '█', Style::default().fg(color));
            // Right edge darker so neighbours read as separate bricks
            if let Some((col, row)) = raster.to_cell(brick.x + brick.w - 1.0, brick.y) {
                raster.put(col, row, '▌', Style::default().fg(color));
            }
        }

        raster.fill_rect(
            self.paddle_x,
            PADDLE_Y,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
            '▀',
            Style::default().fg(Color::Rgb(0, 229, 255)).add_modifier(Modifier::BOLD),
        );

        raster.plot(
            self.ball.x,
            self.ball.y,
            '●',
            Style::default().fg(Color::Rgb(255, 209, 102)).add_modifier(Modifier::BOLD),
        );
    }
}

impl Default for Breakout {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Breakout {
    fn kind(&self) -> GameKind {
        GameKind::Breakout
    }

    fn step(&mut self, dt: f32, controls: &ControlState) {
        if !self.status.is_running() {
            return;
        }
        let frames = dt / REFERENCE_FRAME;

        self.paddle_x += controls.horizontal() * PADDLE_SPEED * frames;
        self.paddle_x = self.paddle_x.clamp(0.0, WIDTH - PADDLE_WIDTH);

        self.move_ball(frames);
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let bricks = Span::styled(format!("Bricks: {} ", self.bricks.len()), Style::default().fg(Color::Magenta));
        let board = chrome::game_frame(frame, area, self.kind(), &self.status, Some(bricks));
        let mut raster = Raster::from_area(board, WIDTH, HEIGHT, BG);
        self.render_field(&mut raster);
        frame.render_widget(Paragraph::new(raster.into_lines()), board);
        chrome::overlay(frame, board, &self.status, "Press SPACE to Start");
    }

    fn reset(&mut self) {
        self.status.reset();
        self.paddle_x = WIDTH / 2.0 - PADDLE_WIDTH / 2.0;
        self.bricks = build_level(1);
        self.reset_ball();
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}
