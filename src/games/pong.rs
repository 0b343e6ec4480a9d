use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::driver::REFERENCE_FRAME;
use crate::games::{Game, GameKind, Sound, Status};
use crate::input::ControlState;
use crate::ui::chrome;
use crate::ui::raster::Raster;

// Board and tuning, per 60 Hz frame
const WIDTH: f32 = 480.0;
const HEIGHT: f32 = 320.0;
const PADDLE_WIDTH: f32 = 10.0;
const PADDLE_HEIGHT: f32 = 80.0;
const BALL_RADIUS: f32 = 8.0;
const PLAYER_X: f32 = 10.0;
const AI_X: f32 = WIDTH - PADDLE_WIDTH - 10.0;
const PLAYER_SPEED: f32 = 6.0;
const AI_SPEED: f32 = 4.0;
const AI_DEAD_ZONE: f32 = 10.0;
const SERVE_SPEED: f32 = 5.0;
const POINTS_PER_LEVEL: u32 = 5;
const LIVES: u32 = 3;

const BG: Color = Color::Rgb(0, 0, 0);

#[derive(Clone, Debug)]
struct Ball {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    speed: f32,
}

pub struct Pong {
    player_y: f32,
    ai_y: f32,
    ball: Ball,
    status: Status,
    rng: StdRng,
}

impl Pong {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut p = Self {
            player_y: HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0,
            ai_y: HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0,
            ball: Ball { x: 0.0, y: 0.0, vx: 0.0, vy: 0.0, speed: SERVE_SPEED },
            status: Status::new(LIVES),
            rng: StdRng::seed_from_u64(seed),
        };
        p.reset_ball();
        p
    }

    fn serve_speed(&self) -> f32 {
        SERVE_SPEED + (self.status.level - 1) as f32 * 0.5
    }

    /// Back to centre, random side, vertical velocity in [-2, 2)
    fn reset_ball(&mut self) {
        let speed = self.serve_speed();
        let side = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.ball = Ball {
            x: WIDTH / 2.0,
            y: HEIGHT / 2.0,
            vx: side * speed,
            vy: self.rng.gen_range(-2.0..2.0),
            speed,
        };
    }

    fn hits_paddle(&self, paddle_x: f32, paddle_y: f32) -> bool {
        let b = &self.ball;
        b.x - BALL_RADIUS < paddle_x + PADDLE_WIDTH
            && b.x + BALL_RADIUS > paddle_x
            && b.y + BALL_RADIUS > paddle_y
            && b.y - BALL_RADIUS < paddle_y + PADDLE_HEIGHT
    }

    /// Vertical "spin" from where the ball met the paddle, in [-1, 1]
    fn impact_offset(&self, paddle_y: f32) -> f32 {
        ((self.ball.y - (paddle_y + PADDLE_HEIGHT / 2.0)) / (PADDLE_HEIGHT / 2.0)).clamp(-1.0, 1.0)
    }

    fn move_ball(&mut self, frames: f32) {
        self.ball.x += self.ball.vx * frames;
        self.ball.y += self.ball.vy * frames;

        // Top/bottom walls
        if self.ball.y - BALL_RADIUS < 0.0 {
            self.ball.y = BALL_RADIUS;
            self.ball.vy = self.ball.vy.abs();
            self.status.blip(Sound::Wall);
        } else if self.ball.y + BALL_RADIUS > HEIGHT {
            self.ball.y = HEIGHT - BALL_RADIUS;
            self.ball.vy = -self.ball.vy.abs();
            self.status.blip(Sound::Wall);
        }

        if self.hits_paddle(PLAYER_X, self.player_y) {
            self.ball.vx = self.ball.vx.abs();
            self.ball.vy = self.ball.speed * self.impact_offset(self.player_y);
            self.status.blip(Sound::Paddle);
        }
        if self.hits_paddle(AI_X, self.ai_y) {
            self.ball.vx = -self.ball.vx.abs();
            self.ball.vy = self.ball.speed * self.impact_offset(self.ai_y);
            self.status.blip(Sound::Paddle);
        }

        // Out on either side
        if self.ball.x + BALL_RADIUS > WIDTH {
            self.status.award(1);
            self.status.level = 1 + self.status.score / POINTS_PER_LEVEL;
            self.status.blip(Sound::Pickup);
            self.reset_ball();
        } else if self.ball.x - BALL_RADIUS < 0.0 {
            self.status.lose_life();
            self.reset_ball();
        }
    }

    fn move_ai(&mut self, frames: f32) {
        let center = self.ai_y + PADDLE_HEIGHT / 2.0;
        if self.ball.y < center - AI_DEAD_ZONE {
            self.ai_y -= AI_SPEED * frames;
        } else if self.ball.y > center + AI_DEAD_ZONE {
            self.ai_y += AI_SPEED * frames;
        }
        self.ai_y = self.ai_y.clamp(0.0, HEIGHT - PADDLE_HEIGHT);
    }

    fn render_field(&self, raster: &mut Raster) {
        let white = Style::default().fg(Color::White);

        // Net
        let mut y = 0.0;
        while y < HEIGHT {
            raster.fill_rect(WIDTH / 2.0 - 1.0, y, 2.0, 10.0, '┆', Style::default().fg(Color::Gray));
            y += 20.0;
        }

        raster.fill_rect(PLAYER_X, self.player_y, PADDLE_WIDTH, PADDLE_HEIGHT, '█', white);
        raster.fill_rect(AI_X, self.ai_y, PADDLE_WIDTH, PADDLE_HEIGHT, '█', white);

        raster.plot(self.ball.x, self.ball.y, '●', white.add_modifier(Modifier::BOLD));
    }
}

impl Default for Pong {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Pong {
    fn kind(&self) -> GameKind {
        GameKind::Pong
    }

    fn step(&mut self, dt: f32, controls: &ControlState) {
        if !self.status.is_running() {
            return;
        }
        let frames = dt / REFERENCE_FRAME;

        self.player_y += controls.vertical() * PLAYER_SPEED * frames;
        self.player_y = self.player_y.clamp(0.0, HEIGHT - PADDLE_HEIGHT);

        self.move_ball(frames);
        self.move_ai(frames);
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let board = chrome::game_frame(frame, area, self.kind(), &self.status, None);
        let mut raster = Raster::from_area(board, WIDTH, HEIGHT, BG);
        self.render_field(&mut raster);
        frame.render_widget(Paragraph::new(raster.into_lines()), board);
        chrome::overlay(frame, board, &self.status, "Press SPACE to serve");
    }

    fn reset(&mut self) {
        self.status.reset();
        self.player_y = HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0;
        self.ai_y = HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0;
        self.reset_ball();
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}
