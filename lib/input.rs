// Operator input, delivered as whole lines over a channel
use crossbeam::channel::{Receiver, Sender};
use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// One line, without its line terminator.
    Line(String),
    /// No more input will arrive.
    End,
    /// The operator interrupted.
    Cancelled,
}

pub trait LineSource {
    /// Block until the next line, end of input or cancellation.
    fn next_line(&mut self) -> Input;
}

impl LineSource for Receiver<Input> {
    fn next_line(&mut self) -> Input {
        // Every sender gone means nothing can ever arrive
        self.recv().unwrap_or(Input::End)
    }
}

/// Read stdin line by line on a detached thread, forwarding into `tx`.
/// Sends `Input::End` once stdin is exhausted or unreadable.
pub fn spawn_stdin_reader(tx: Sender<Input>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("chat-stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            forward_lines(stdin.lock(), &tx);
        })
}

fn forward_lines<R: BufRead>(mut reader: R, tx: &Sender<Input>) {
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed_len = line.trim_end_matches(&['\r', '\n'][..]).len();
                line.truncate(trimmed_len);
                if tx.send(Input::Line(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                break;
            }
        }
    }
    let _ = tx.send(Input::End);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::unbounded;

    #[test]
    fn lines_are_forwarded_without_terminators() {
        let (tx, mut rx) = unbounded();
        forward_lines("hello\r\nworld\nlast".as_bytes(), &tx);

        assert_eq!(rx.next_line(), Input::Line("hello".into()));
        assert_eq!(rx.next_line(), Input::Line("world".into()));
        assert_eq!(rx.next_line(), Input::Line("last".into()));
        assert_eq!(rx.next_line(), Input::End);
    }

    #[test]
    fn dropped_senders_read_as_end() {
        let (tx, mut rx) = unbounded::<Input>();
        drop(tx);
        assert_eq!(rx.next_line(), Input::End);
    }

    #[test]
    fn unreadable_input_ends() {
        let (tx, mut rx) = unbounded();
        forward_lines(&b"ok\n\xff\xfe\n"[..], &tx);
        assert_eq!(rx.next_line(), Input::Line("ok".into()));
        assert_eq!(rx.next_line(), Input::End);
    }
}
