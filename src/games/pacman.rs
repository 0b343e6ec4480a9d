use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::{handle_common, Game, GameKind, Phase, Sound, Status};
use crate::input::{Command, ControlState, Dir};
use crate::ui::chrome;
use crate::ui::raster::Raster;

/// `1` and `0` are walls, `.` pellet, `3` power pellet, `9` player spawn,
/// `8` ghost spawn, anything else open floor.
const MAP: [&str; 13] = [
    "1111111111111111111111111",
    "1........1111111........1",
    "1.11111.1111111.11111..11",
    "1.3...1.2.....2.1...3..11",
    "1.111.1.111.111.1.111..11",
    "1.....2...9.8...2.....3.1",
    "11111.1111...1111.1111..1",
    "1000..1...222...1..0000.1",
    "11111.1.1111111.1.1111..1",
    "1.....1..2...2..1.....3.1",
    "1.11111.111.111.11111..11",
    "1.3...................3.1",
    "1111111111111111111111111",
];

const PLAYER_SPEED: f32 = 4.0;
const GHOST_SPEED: f32 = 3.6;
const GHOST_SPEED_PER_LEVEL: f32 = 0.2;
const FRIGHTENED_FACTOR: f32 = 0.6;
const FRIGHTENED_TIME: f32 = 6.0;
const RUNNER_UP_CHANCE: f64 = 0.2;
const EAT_RADIUS: f32 = 0.35;
const CONTACT_RADIUS: f32 = 0.7;
const LIVES: u32 = 3;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_POINTS: u32 = 50;
pub const GHOST_POINTS: u32 = 200;

const GHOST_COLORS: [Color; 4] = [
    Color::Rgb(255, 89, 94),
    Color::Rgb(138, 201, 38),
    Color::Rgb(255, 202, 58),
    Color::Rgb(25, 130, 196),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Pellet,
    Power,
}

#[derive(Clone, Debug)]
pub struct Board {
    cols: i32,
    rows: i32,
    tiles: Vec<Tile>,
}

impl Board {
    pub fn parse(rows: &[&str]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len()) as i32;
        let tiles = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|ch| match ch {
                '1' | '0' => Tile::Wall,
                '.' => Tile::Pellet,
                '3' => Tile::Power,
                _ => Tile::Floor,
            })
            .collect();
        Self { cols, rows: rows.len() as i32, tiles }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Anything off the grid reads as wall
    pub fn tile(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col >= self.cols || row >= self.rows {
            return Tile::Wall;
        }
        self.tiles[(row * self.cols + col) as usize]
    }

    pub fn is_open(&self, col: i32, row: i32) -> bool {
        self.tile(col, row) != Tile::Wall
    }

    fn clear(&mut self, col: i32, row: i32) {
        if self.is_open(col, row) {
            self.tiles[(row * self.cols + col) as usize] = Tile::Floor;
        }
    }

    pub fn pellets_remaining(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| matches!(t, Tile::Pellet | Tile::Power))
            .count()
    }
}

fn spawns(rows: &[&str]) -> ((i32, i32), Vec<(i32, i32)>) {
    let mut player = (1, 1);
    let mut ghosts = Vec::new();
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            match ch {
                '9' => player = (x as i32, y as i32),
                '8' => ghosts.push((x as i32, y as i32)),
                _ => {}
            }
        }
    }
    (player, ghosts)
}

/// Something that walks the maze from cell centre to cell centre.
/// `progress` is how far it is from `(col, row)` toward the next cell along `dir`.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub col: i32,
    pub row: i32,
    pub dir: Option<Dir>,
    progress: f32,
}

impl Actor {
    fn at(col: i32, row: i32, dir: Dir) -> Self {
        Self { col, row, dir: Some(dir), progress: 0.0 }
    }

    /// Continuous position in tile units
    pub fn pos(&self) -> (f32, f32) {
        let (dx, dy) = self.dir.map_or((0, 0), Dir::delta);
        (
            self.col as f32 + 0.5 + dx as f32 * self.progress,
            self.row as f32 + 0.5 + dy as f32 * self.progress,
        )
    }

    pub fn at_centre(&self) -> bool {
        self.progress == 0.0
    }
}

/// Move an actor `dist` tiles. At every cell centre `choose` picks the next
/// direction; a blocked or missing choice stops the actor there.
fn advance(actor: &mut Actor, mut dist: f32, board: &Board, mut choose: impl FnMut(&Actor) -> Option<Dir>) {
    while dist > 0.0 {
        if actor.at_centre() {
            let next = choose(&*actor).filter(|d| {
                let (dx, dy) = d.delta();
                board.is_open(actor.col + dx, actor.row + dy)
            });
            actor.dir = next;
        }
        let Some(dir) = actor.dir else { break };

        let room = 1.0 - actor.progress;
        if dist < room {
            actor.progress += dist;
            break;
        }
        dist -= room;
        let (dx, dy) = dir.delta();
        actor.col += dx;
        actor.row += dy;
        actor.progress = 0.0;
    }
}

/// Open moves from a centre, best first: closest to `target` when chasing,
/// farthest when frightened. Reversing is only offered when nothing else is open.
pub fn rank_moves(board: &Board, actor: &Actor, target: (f32, f32), frightened: bool) -> Vec<Dir> {
    let open: Vec<Dir> = Dir::ALL
        .into_iter()
        .filter(|d| {
            let (dx, dy) = d.delta();
            board.is_open(actor.col + dx, actor.row + dy)
        })
        .collect();
    let forward: Vec<Dir> = open
        .iter()
        .copied()
        .filter(|d| actor.dir.map_or(true, |cur| *d != cur.opposite()))
        .collect();
    let mut moves = if forward.is_empty() { open } else { forward };

    let dist = |d: &Dir| {
        let (dx, dy) = d.delta();
        let x = (actor.col + dx) as f32 + 0.5;
        let y = (actor.row + dy) as f32 + 0.5;
        (x - target.0).hypot(y - target.1)
    };
    moves.sort_by(|a, b| {
        let ord = dist(a).total_cmp(&dist(b));
        if frightened {
            ord.reverse()
        } else {
            ord
        }
    });
    moves
}

#[derive(Clone, Debug)]
struct Ghost {
    actor: Actor,
    spawn: (i32, i32),
    start_dir: Dir,
}

impl Ghost {
    fn home(&mut self) {
        self.actor = Actor::at(self.spawn.0, self.spawn.1, self.start_dir);
    }
}

pub struct Pacman {
    board: Board,
    player: Actor,
    pending: Option<Dir>,
    player_spawn: (i32, i32),
    ghosts: Vec<Ghost>,
    pellets_left: usize,
    /// Seconds of frightened time left
    frightened: f32,
    status: Status,
    rng: StdRng,
}

impl Pacman {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        let board = Board::parse(&MAP);
        let (player_spawn, ghost_spawns) = spawns(&MAP);
        let ghosts = ghost_spawns
            .into_iter()
            .enumerate()
            .map(|(i, spawn)| {
                let start_dir = if i % 2 == 1 { Dir::Left } else { Dir::Right };
                Ghost { actor: Actor::at(spawn.0, spawn.1, start_dir), spawn, start_dir }
            })
            .collect();
        let pellets_left = board.pellets_remaining();
        Self {
            board,
            player: Actor::at(player_spawn.0, player_spawn.1, Dir::Right),
            pending: None,
            player_spawn,
            ghosts,
            pellets_left,
            frightened: 0.0,
            status: Status::new(LIVES),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pellets_left(&self) -> usize {
        self.pellets_left
    }

    pub fn is_frightened(&self) -> bool {
        self.frightened > 0.0
    }

    fn ghost_speed(&self) -> f32 {
        let base = GHOST_SPEED + (self.status.level - 1) as f32 * GHOST_SPEED_PER_LEVEL;
        if self.is_frightened() {
            base * FRIGHTENED_FACTOR
        } else {
            base
        }
    }

    fn reset_positions(&mut self) {
        self.player = Actor::at(self.player_spawn.0, self.player_spawn.1, Dir::Right);
        self.pending = None;
        for ghost in &mut self.ghosts {
            ghost.home();
        }
    }

    fn restore_board(&mut self) {
        self.board = Board::parse(&MAP);
        self.pellets_left = self.board.pellets_remaining();
        self.frightened = 0.0;
        self.reset_positions();
    }

    fn next_level(&mut self) {
        self.status.level += 1;
        self.restore_board();
        self.status.phase = Phase::Playing;
        self.status.blip(Sound::LevelUp);
    }

    fn move_player(&mut self, dt: f32) {
        let pending = self.pending;
        let board = &self.board;
        advance(&mut self.player, PLAYER_SPEED * dt, board, |a| {
            let turn = pending.filter(|d| {
                let (dx, dy) = d.delta();
                board.is_open(a.col + dx, a.row + dy)
            });
            turn.or(a.dir)
        });
    }

    fn eat(&mut self) {
        let (x, y) = self.player.pos();
        let (col, row) = (x.floor() as i32, y.floor() as i32);
        let off = (x - (col as f32 + 0.5)).hypot(y - (row as f32 + 0.5));
        if off >= EAT_RADIUS {
            return;
        }
        match self.board.tile(col, row) {
            Tile::Pellet => {
                self.board.clear(col, row);
                self.pellets_left -= 1;
                self.status.award(PELLET_POINTS);
                self.status.blip(Sound::Pellet);
            }
            Tile::Power => {
                self.board.clear(col, row);
                self.pellets_left -= 1;
                self.status.award(POWER_POINTS);
                self.status.blip(Sound::PowerPellet);
                self.frightened = FRIGHTENED_TIME;
            }
            Tile::Wall | Tile::Floor => {}
        }
    }

    fn move_ghosts(&mut self, dt: f32) {
        let target = self.player.pos();
        let frightened = self.is_frightened();
        let dist = self.ghost_speed() * dt;
        let board = &self.board;
        let rng = &mut self.rng;
        for ghost in &mut self.ghosts {
            advance(&mut ghost.actor, dist, board, |a| {
                let moves = rank_moves(board, a, target, frightened);
                if moves.len() > 1 && rng.gen_bool(RUNNER_UP_CHANCE) {
                    Some(moves[1])
                } else {
                    moves.first().copied()
                }
            });
        }
    }

    fn ghost_contacts(&mut self) {
        let (px, py) = self.player.pos();
        for i in 0..self.ghosts.len() {
            let (gx, gy) = self.ghosts[i].actor.pos();
            if (gx - px).hypot(gy - py) >= CONTACT_RADIUS {
                continue;
            }
            if self.is_frightened() {
                self.status.award(GHOST_POINTS);
                self.status.blip(Sound::GhostEaten);
                self.ghosts[i].home();
            } else {
                self.status.lose_life();
                self.frightened = 0.0;
                self.reset_positions();
                return;
            }
        }
    }

    fn render_field(&self, raster: &mut Raster) {
        let wall = Style::default().fg(Color::Rgb(30, 43, 90));
        let pellet = Style::default().fg(Color::Rgb(255, 209, 102));
        let power = Style::default().fg(Color::Rgb(255, 106, 213)).add_modifier(Modifier::BOLD);

        for row in 0..self.board.rows {
            for col in 0..self.board.cols {
                let (x, y) = (col as f32, row as f32);
                match self.board.tile(col, row) {
                    Tile::Wall => raster.fill_rect(x, y, 1.0, 1.0, '█', wall),
                    Tile::Pellet => raster.plot(x + 0.5, y + 0.5, '·', pellet),
                    Tile::Power => raster.plot(x + 0.5, y + 0.5, '●', power),
                    Tile::Floor => {}
                }
            }
        }

        let frightened = self.is_frightened();
        for (i, ghost) in self.ghosts.iter().enumerate() {
            let color = if frightened {
                Color::Rgb(107, 211, 255)
            } else {
                GHOST_COLORS[i % GHOST_COLORS.len()]
            };
            let (x, y) = ghost.actor.pos();
            raster.plot(x, y, 'ᗣ', Style::default().fg(color).add_modifier(Modifier::BOLD));
        }

        let glyph = match self.player.dir {
            Some(Dir::Left) => 'ᗤ',
            Some(Dir::Up) => 'ᗢ',
            Some(Dir::Down) => 'ᗣ',
            _ => 'ᗧ',
        };
        let (x, y) = self.player.pos();
        raster.plot(
            x,
            y,
            glyph,
            Style::default().fg(Color::Rgb(255, 224, 102)).add_modifier(Modifier::BOLD),
        );
    }
}

impl Default for Pacman {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Pacman {
    fn kind(&self) -> GameKind {
        GameKind::Pacman
    }

    fn step(&mut self, dt: f32, controls: &ControlState) {
        if !self.status.is_running() {
            return;
        }
        if let Some(d) = controls.held_dir() {
            self.pending = Some(d);
        }
        self.frightened = (self.frightened - dt).max(0.0);

        self.move_player(dt);
        self.eat();
        if self.pellets_left == 0 {
            self.status.phase = Phase::Won;
            self.status.blip(Sound::Win);
            return;
        }

        self.move_ghosts(dt);
        self.ghost_contacts();
    }

    fn command(&mut self, cmd: Command) {
        match cmd {
            Command::Start | Command::Pause if self.status.phase == Phase::Won => self.next_level(),
            Command::Tap(d) => {
                self.pending = Some(d);
                self.status.resume();
            }
            other => handle_common(self, other),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let extra = if self.is_frightened() {
            Span::styled(format!("⚡ {:.1}s ", self.frightened), Style::default().fg(Color::LightBlue))
        } else {
            Span::styled(format!("Pellets: {} ", self.pellets_left), Style::default().fg(Color::Magenta))
        };
        let board = chrome::game_frame(frame, area, self.kind(), &self.status, Some(extra));
        let mut raster = Raster::from_area(
            board,
            self.board.cols as f32,
            self.board.rows as f32,
            Color::Rgb(10, 15, 31),
        );
        self.render_field(&mut raster);
        frame.render_widget(Paragraph::new(raster.into_lines()), board);
        chrome::overlay(frame, board, &self.status, "Press an arrow or WASD");
    }

    fn reset(&mut self) {
        self.status.reset();
        self.restore_board();
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

    /// Playing, with no ghosts in the way
    fn solo() -> Pacman {
        let mut p = Pacman::with_seed(1);
        p.ghosts.clear();
        p.status.toggle_pause();
        p
    }

    fn idle() -> ControlState {
        ControlState::default()
    }

    #[test]
    fn test_pellet_count_matches_map() {
        let p = Pacman::with_seed(0);
        let expected = MAP
            .iter()
            .flat_map(|r| r.chars())
            .filter(|c| *c == '.' || *c == '3')
            .count();
        assert_eq!(p.pellets_left(), expected);
        assert_eq!(p.board().pellets_remaining(), expected);
    }

    #[test]
    fn test_single_ghost_spawns_beside_player() {
        let p = Pacman::with_seed(0);
        assert_eq!(p.ghosts.len(), 1);
        assert_eq!(p.ghosts[0].spawn, (12, 5));
        assert_eq!(p.player_spawn, (10, 5));
        // The house below is bare floor
        let board = Board::parse(&MAP);
        for col in 10..13 {
            assert_eq!(board.tile(col, 7), Tile::Floor);
        }
    }

    #[test]
    fn test_off_grid_is_wall() {
        let board = Board::parse(&MAP);
        assert_eq!(board.tile(-1, 3), Tile::Wall);
        assert_eq!(board.tile(25, 3), Tile::Wall);
        assert_eq!(board.tile(3, 13), Tile::Wall);
        // '0' cells are walls too
        assert_eq!(board.tile(1, 7), Tile::Wall);
    }

    #[test]
    fn test_eating_pellet_scores() {
        let mut p = solo();
        // Spawn faces right toward a pellet one tile away
        p.step(0.25, &idle());
        assert_eq!((p.player.col, p.player.row), (11, 5));
        assert_eq!(p.status.score, PELLET_POINTS);
        assert_eq!(p.board.tile(11, 5), Tile::Floor);
        assert_eq!(p.pellets_left, p.board.pellets_remaining());
    }

    #[test]
    fn test_stops_at_wall() {
        let mut p = solo();
        // Straight up from the spawn is a wall
        p.player = Actor::at(10, 5, Dir::Up);
        p.step(0.5, &idle());
        assert_eq!((p.player.col, p.player.row), (10, 5));
        assert_eq!(p.player.dir, None);
        assert!(p.player.at_centre());
    }

    #[test]
    fn test_pending_turn_waits_for_centre() {
        let mut p = solo();
        p.player = Actor::at(11, 5, Dir::Right);
        p.step(0.125, &idle());
        // Half way to (12, 5); the turn down is only taken at the next centre
        p.command(Command::Tap(Dir::Down));
        p.step(0.0625, &idle());
        assert_eq!(p.player.dir, Some(Dir::Right));
        p.step(0.0625, &idle());
        p.step(0.125, &idle());
        assert_eq!((p.player.col, p.player.row), (12, 5));
        assert_eq!(p.player.dir, Some(Dir::Down));
    }

    #[test]
    fn test_last_pellet_wins() {
        let mut p = solo();
        for row in 0..p.board.rows {
            for col in 0..p.board.cols {
                if (col, row) != (11, 5) {
                    p.board.clear(col, row);
                }
            }
        }
        p.pellets_left = p.board.pellets_remaining();
        assert_eq!(p.pellets_left, 1);

        p.step(0.25, &idle());
        assert_eq!(p.status.phase, Phase::Won);
        assert!(p.status.is_finished());

        // Frozen until the next level is started
        let before = p.player.clone();
        p.step(0.25, &idle());
        assert_eq!(p.player, before);
    }

    #[test]
    fn test_start_after_win_advances_level() {
        let mut p = solo();
        let speed = p.ghost_speed();
        p.status.phase = Phase::Won;
        p.command(Command::Start);
        assert_eq!(p.status.level, 2);
        assert_eq!(p.status.phase, Phase::Playing);
        assert_eq!(p.pellets_left, p.board.pellets_remaining());
        assert!(p.ghost_speed() > speed);
    }

    #[test]
    fn test_power_pellet_frightens_for_six_seconds() {
        let mut p = solo();
        p.player = Actor::at(3, 3, Dir::Left);
        // (2, 3) is a power pellet
        p.step(0.25, &idle());
        assert_eq!(p.status.score, POWER_POINTS);
        assert!(p.is_frightened());

        p.step(5.9, &idle());
        assert!(p.is_frightened());
        p.step(0.2, &idle());
        assert!(!p.is_frightened());
    }

    #[test]
    fn test_frightened_contact_eats_ghost() {
        let mut p = Pacman::with_seed(3);
        p.status.toggle_pause();
        p.frightened = FRIGHTENED_TIME;
        p.ghosts.truncate(1);
        p.ghosts[0].spawn = (11, 7);
        p.ghosts[0].actor = Actor::at(p.player.col, p.player.row, Dir::Left);

        p.step(0.01, &idle());
        assert_eq!(p.status.lives, LIVES);
        assert_eq!(p.status.score, GHOST_POINTS);
        assert_eq!((p.ghosts[0].actor.col, p.ghosts[0].actor.row), (11, 7));
        assert_eq!(p.status.phase, Phase::Playing);
    }

    #[test]
    fn test_ghost_contact_costs_life() {
        let mut p = Pacman::with_seed(4);
        p.status.toggle_pause();
        p.ghosts.truncate(1);
        p.player = Actor::at(3, 11, Dir::Right);
        p.ghosts[0].actor = Actor::at(3, 11, Dir::Left);

        p.step(0.01, &idle());
        assert_eq!(p.status.lives, LIVES - 1);
        assert_eq!(p.status.phase, Phase::Paused);
        assert_eq!((p.player.col, p.player.row), p.player_spawn);
        assert_eq!((p.ghosts[0].actor.col, p.ghosts[0].actor.row), p.ghosts[0].spawn);
    }

    #[test]
    fn test_ghost_ranking() {
        let board = Board::parse(&MAP);
        let ghost = Actor::at(12, 5, Dir::Right);
        let target = (10.5, 5.5);
        // Left would be a reversal
        assert_eq!(rank_moves(&board, &ghost, target, false), vec![Dir::Down, Dir::Right]);
        assert_eq!(rank_moves(&board, &ghost, target, true), vec![Dir::Right, Dir::Down]);
    }

    #[test]
    fn test_ghost_reverses_only_in_dead_end() {
        let board = Board::parse(&["111", "1.1", "1.1", "111"]);
        let ghost = Actor::at(1, 1, Dir::Up);
        assert_eq!(rank_moves(&board, &ghost, (1.5, 2.5), false), vec![Dir::Down]);
    }

    #[test]
    fn test_pause_only_changes_phase() {
        let mut p = solo();
        p.step(0.1, &idle());
        let (player, score) = (p.player.clone(), p.status.score);
        p.command(Command::Pause);
        p.command(Command::Pause);
        assert_eq!(p.player, player);
        assert_eq!(p.status.score, score);
        assert_eq!(p.status.phase, Phase::Playing);
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
        fn prop_actors_stay_on_open_cells(
            seed in any::<u64>(),
            steps in prop::collection::vec((0.0f32..0.05, dir_strategy()), 1..300),
        ) {
            let mut p = Pacman::with_seed(seed);
            for (dt, tap) in steps {
                if let Some(d) = tap {
                    p.command(Command::Tap(d));
                }
                p.status.resume();
                p.step(dt, &ControlState::default());

                prop_assert!(p.board.is_open(p.player.col, p.player.row));
                for g in &p.ghosts {
                    prop_assert!(p.board.is_open(g.actor.col, g.actor.row));
                }
                prop_assert_eq!(p.pellets_left, p.board.pellets_remaining());
            }
        }
    }
}
