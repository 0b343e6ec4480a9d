//! Sound effects.
//!
//! A terminal has no oscillator, so blips are rung on the terminal bell and
//! rate-limited so a burst of brick hits doesn't turn into a buzz.

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use crate::games::Sound;

const MIN_GAP: Duration = Duration::from_millis(80);

pub trait AudioSink {
    fn play(&mut self, sound: Sound);
}

/// Rings BEL on stdout
pub struct TerminalBell {
    last: Option<Instant>,
}

impl TerminalBell {
    pub fn open() -> io::Result<Self> {
        if !io::stdout().is_terminal() {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "stdout is not a terminal"));
        }
        Ok(Self { last: None })
    }
}

impl AudioSink for TerminalBell {
    fn play(&mut self, sound: Sound) {
        let now = Instant::now();
        if self.last.is_some_and(|t| now.duration_since(t) < MIN_GAP) {
            return;
        }
        self.last = Some(now);
        let (freq, ms) = sound.tone();
        log::trace!("blip {sound:?} {freq}Hz {ms}ms");
        let mut out = io::stdout();
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            log::debug!("bell write failed: {e}");
        }
    }
}

/// Owns the sink for one open game; dropping it releases the output.
pub struct Speaker {
    sink: Option<Box<dyn AudioSink + Send>>,
}

impl Speaker {
    /// Try to open the bell. Failure leaves the speaker silent.
    pub fn open(enabled: bool) -> Self {
        if !enabled {
            return Self::silent();
        }
        match TerminalBell::open() {
            Ok(bell) => Self { sink: Some(Box::new(bell)) },
            Err(e) => {
                log::warn!("Failed to open audio output - audio disabled: {e}");
                Self::silent()
            }
        }
    }

    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn with_sink(sink: Box<dyn AudioSink + Send>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn is_silent(&self) -> bool {
        self.sink.is_none()
    }

    pub fn play_all(&mut self, sounds: Vec<Sound>) {
        let Some(sink) = &mut self.sink else { return };
        for sound in sounds {
            sink.play(sound);
        }
    }
}
