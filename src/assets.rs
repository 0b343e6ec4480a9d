use std::fs;
use std::path::Path;

use anyhow::{bail, Context};

use crate::config::Config;
use crate::input::Dir;

/// One glyph per facing direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteSet {
    pub up: char,
    pub down: char,
    pub left: char,
    pub right: char,
}

impl SpriteSet {
    pub fn facing(&self, dir: Dir) -> char {
        match dir {
            Dir::Up => self.up,
            Dir::Down => self.down,
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    /// First four non-whitespace characters of `text`, in up/down/left/right order
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let glyphs: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).take(4).collect();
        let [up, down, left, right] = glyphs[..] else {
            bail!("expected 4 glyphs, found {}", glyphs.len());
        };
        Ok(Self { up, down, left, right })
    }

    /// Load a sprite file. Any failure is logged and yields `None` so the
    /// caller can draw its fallback.
    pub fn load(path: &Path) -> Option<Self> {
        let loaded = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|text| Self::parse(&text));
        match loaded {
            Ok(sprite) => {
                log::info!("Loaded sprite glyphs from {}", path.display());
                Some(sprite)
            }
            Err(e) => {
                log::warn!("Sprite unavailable, using fallback: {e:#}");
                None
            }
        }
    }
}

/// Optional artwork shared by the games
#[derive(Clone, Copy, Debug, Default)]
pub struct Assets {
    pub chicken: Option<SpriteSet>,
}

impl Assets {
    pub fn load(config: &Config) -> Self {
        Self {
            chicken: config.chicken_sprite.as_deref().and_then(SpriteSet::load),
        }
    }
}
