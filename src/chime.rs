use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ChimeError {
    #[error("failed to start sound player `{player}`: {source}")]
    Player {
        player: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to ring terminal bell: {0}")]
    Bell(#[from] io::Error),
}

/// Best-effort end-of-session signal
pub trait Chime {
    fn signal_session_ended(&mut self) -> Result<(), ChimeError>;
}

impl<C: Chime + ?Sized> Chime for Box<C> {
    fn signal_session_ended(&mut self) -> Result<(), ChimeError> {
        (**self).signal_session_ended()
    }
}

/// Players tried in order when a sound file is configured
const PLAYERS: [&str; 3] = ["paplay", "aplay", "afplay"];

/// Plays a sound file when one is configured and a player is installed,
/// otherwise rings the terminal bell.
///
/// Spawned players are kept and reaped once exited, on the next signal.
#[derive(Debug, Default)]
pub struct SoundChime {
    sound_file: Option<PathBuf>,
    players: Vec<Child>,
}

impl SoundChime {
    pub fn new(sound_file: Option<PathBuf>) -> Self {
        Self {
            sound_file,
            players: Vec::new(),
        }
    }

    pub fn sound_file(&self) -> Option<&Path> {
        self.sound_file.as_deref()
    }

    /// Number of player processes that have not been reaped yet
    pub fn players_running(&self) -> usize {
        self.players.len()
    }

    fn reap_players(&mut self) {
        self.players.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), %status, "chime player exited");
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(pid = child.id(), error = %e, "failed to poll chime player");
                false
            }
        });
    }

    fn play(&mut self, path: &Path) -> Result<bool, ChimeError> {
        for player in PLAYERS {
            match Command::new(player)
                .arg(path)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => {
                    debug!(player, path = %path.display(), "playing chime");
                    self.players.push(child);
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(ChimeError::Player { player, source }),
            }
        }
        Ok(false)
    }
}

impl Chime for SoundChime {
    fn signal_session_ended(&mut self) -> Result<(), ChimeError> {
        self.reap_players();
        if let Some(path) = self.sound_file.clone().filter(|p| p.exists()) {
            if self.play(&path)? {
                return Ok(());
            }
            debug!("no sound player found, falling back to terminal bell");
        }
        ring_bell(&mut io::stdout())
    }
}

/// Used with `--no-sound`
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn signal_session_ended(&mut self) -> Result<(), ChimeError> {
        Ok(())
    }
}

fn ring_bell<W: Write>(out: &mut W) -> Result<(), ChimeError> {
    out.write_all(b"\x07")?;
    out.flush()?;
    Ok(())
}
