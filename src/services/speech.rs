use std::cell::Cell;
use std::io::ErrorKind;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

pub const DEFAULT_PROGRAM: &str = "espeak-ng";
pub const DEFAULT_RATE: f64 = 0.75;
pub const DEFAULT_PITCH: f64 = 1.0;
pub const DEFAULT_VOLUME: f64 = 1.0;

/// espeak-ng baselines that a factor of 1.0 maps onto
const BASE_WORDS_PER_MINUTE: f64 = 175.0;
const BASE_PITCH: f64 = 50.0;
const BASE_AMPLITUDE: f64 = 100.0;

/// Something that can say a word out loud. Fire-and-forget: no completion
/// is reported and an unavailable backend silently does nothing.
pub trait Speaker {
    fn speak(&self, text: &str);
}

/// Voice parameters as factors of the synthesizer's defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub rate: f64,
    pub pitch: f64,
    pub volume: f64,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl Voice {
    /// espeak-ng `-s -p -a` arguments
    pub fn espeak_args(&self) -> Vec<String> {
        let words_per_minute = (BASE_WORDS_PER_MINUTE * self.rate).round().max(1.0);
        let pitch = (BASE_PITCH * self.pitch).round().clamp(0.0, 99.0);
        let amplitude = (BASE_AMPLITUDE * self.volume).round().clamp(0.0, 200.0);

        vec![
            "-s".to_string(),
            format!("{}", words_per_minute as u32),
            "-p".to_string(),
            format!("{}", pitch as u32),
            "-a".to_string(),
            format!("{}", amplitude as u32),
        ]
    }
}

/// Speaks by spawning an external synthesizer process per word
#[derive(Debug)]
pub struct ProcessSpeaker {
    program: String,
    voice: Voice,
    available: Cell<bool>,
}

impl ProcessSpeaker {
    pub fn new(program: impl Into<String>, voice: Voice) -> Self {
        Self {
            program: program.into(),
            voice,
            available: Cell::new(true),
        }
    }

    pub fn command_for(&self, text: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        // Words such as "-tion" must not be taken for options
        cmd.args(self.voice.espeak_args())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Default for ProcessSpeaker {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, Voice::default())
    }
}

impl Speaker for ProcessSpeaker {
    fn speak(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() || !self.available.get() {
            return;
        }

        match self.command_for(text).spawn() {
            Ok(child) => {
                debug!("Speaking '{}' (pid {})", text, child.id());
                // Reap in the background so the child does not linger as a zombie
                std::thread::spawn(move || {
                    let mut child = child;
                    let _ = child.wait();
                });
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Speech disabled: '{}' not found", self.program);
                self.available.set(false);
            }
            Err(e) => {
                debug!("Speech failed for '{}': {}", text, e);
            }
        }
    }
}
