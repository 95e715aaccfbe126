// Where the session writes what the operator sees
use p2pchat_core::Notice;
use std::io::{self, Write};

pub const INPUT_PROMPT: &str = "You: ";
pub const PEER_TAG: &str = "Peer: ";

pub trait Transcript {
    /// Text received from the peer, one call per decoded chunk.
    fn peer_message(&mut self, text: &str);
    fn notice(&mut self, notice: &Notice);
    /// Shown before each line of local input is read.
    fn prompt(&mut self);
}

/// Writes the transcript to stdout. Stateless, so both loops can hold one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalTranscript;

impl Transcript for TerminalTranscript {
    fn peer_message(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        // Overwrite the pending prompt, then put it back under the message
        let _ = write!(out, "\r{}{}\n{}", PEER_TAG, text, INPUT_PROMPT);
        let _ = out.flush();
    }

    fn notice(&mut self, notice: &Notice) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "\r{}", notice);
        let _ = out.flush();
    }

    fn prompt(&mut self) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "{}", INPUT_PROMPT);
        let _ = out.flush();
    }
}
