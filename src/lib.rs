//! Arcade Vault - a coverflow of four mini-games in the terminal
//!
//! Core modules:
//! - `games`: the four simulations behind one `Game` trait
//! - `input`: keyboard/pointer sampling into a `ControlState`
//! - `driver`: the frame loop shared by every game
//! - `ui`: ratatui rendering (coverflow, HUD, overlays, touch pad)
//! - `api`: high score HTTP client
//! - `scores`: locally persisted best scores

pub mod api;
pub mod app;
pub mod assets;
pub mod audio;
pub mod config;
pub mod driver;
pub mod event;
pub mod games;
pub mod input;
pub mod scores;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use driver::{FrameDelta, LoopDriver};
pub use games::{Game, GameKind, Phase, Status};
pub use input::{Command, ControlState, Dir, InputSampler};
