use crate::mode_control::signal::ControlCommand;
use crate::{event, info, warn};
use std::io::BufRead;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

/// One interpreted key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Command(ControlCommand),
    Quit,
}

impl KeyInput {
    fn from_key(key: char) -> Self {
        match key.to_ascii_lowercase() {
            't' => KeyInput::Command(ControlCommand::Thrust),
            's' => KeyInput::Command(ControlCommand::Start),
            'h' => KeyInput::Command(ControlCommand::Instructions),
            'q' => KeyInput::Quit,
            _ => KeyInput::Command(ControlCommand::Other),
        }
    }
}

/// Interprets one line of terminal input. A bare enter starts the mission,
/// otherwise every non-blank character is a key press.
pub fn parse_line(line: &str) -> Vec<KeyInput> {
    if line.trim().is_empty() {
        return vec![KeyInput::Command(ControlCommand::Start)];
    }
    line.chars().filter(|c| !c.is_whitespace()).map(KeyInput::from_key).collect()
}

/// Forwards key presses from `input` until it ends, `q` is pressed or the
/// receiver goes away. Cancels `c_tok` on the way out.
pub fn forward_keys<R: BufRead>(input: R, tx: &Sender<ControlCommand>, c_tok: &CancellationToken) {
    'lines: for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read keyboard input: {e}");
                break;
            }
        };
        for key in parse_line(&line) {
            match key {
                KeyInput::Quit => {
                    info!("Quit requested.");
                    break 'lines;
                }
                KeyInput::Command(cmd) => {
                    if cmd == ControlCommand::Other {
                        event!("Unmapped key in '{}'.", line.trim());
                    }
                    if tx.blocking_send(cmd).is_err() {
                        break 'lines;
                    }
                }
            }
        }
    }
    c_tok.cancel();
}

/// Reads stdin on a detached thread; a blocked read never holds up shutdown.
pub fn spawn_reader(tx: Sender<ControlCommand>, c_tok: CancellationToken) {
    std::thread::spawn(move || forward_keys(std::io::stdin().lock(), &tx, &c_tok));
}
