// Duplex session: one reader thread, one writer loop, one stream
use crate::input::{Input, LineSource};
use crate::transcript::Transcript;
use crate::DEFAULT_RECV_BUFFER;
use p2pchat_core::{is_exit_command, Notice, Role, Utf8ChunkDecoder};
use p2pchat_transport::Transport;
use std::io::{self, ErrorKind};
use std::thread;

/// Why the inbound loop stopped.
#[derive(Debug)]
pub enum InboundEnd {
    /// Zero-length read: the peer closed its side.
    PeerClosed,
    /// The peer reset or aborted the connection.
    Reset,
    /// Any other read failure.
    Failed(io::Error),
    /// Our own side closed the stream, so there was nothing left to read.
    LocallyClosed,
}

/// Why the outbound loop stopped.
#[derive(Debug)]
pub enum OutboundEnd {
    ExitCommand,
    EndOfInput,
    Cancelled,
    WriteFailed(io::Error),
}

impl OutboundEnd {
    pub fn is_error(&self) -> bool {
        matches!(self, OutboundEnd::WriteFailed(_))
    }
}

/// The single live connection of a run.
pub struct Session<T: Transport> {
    transport: T,
    role: Role,
    recv_buffer: usize,
}

impl<T: Transport + 'static> Session<T> {
    pub fn new(transport: T, role: Role) -> Self {
        Session {
            transport,
            role,
            recv_buffer: DEFAULT_RECV_BUFFER,
        }
    }

    pub fn with_recv_buffer(mut self, size: usize) -> Self {
        self.recv_buffer = size.max(1);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Run both directions until the local side ends.
    ///
    /// The inbound loop gets its own handle on the stream and a thread of its
    /// own; when it stops it hands its reason to `on_inbound_end`, which is
    /// where the caller decides whether the whole process goes down. The
    /// outbound loop runs here and this returns as soon as it stops, without
    /// waiting for the inbound thread.
    pub fn run<I, D, F>(
        self,
        input: &mut I,
        transcript: D,
        on_inbound_end: F,
    ) -> io::Result<OutboundEnd>
    where
        I: LineSource,
        D: Transcript + Clone + Send + 'static,
        F: FnOnce(InboundEnd) + Send + 'static,
    {
        let reader = match self.transport.try_clone() {
            Ok(reader) => reader,
            Err(e) => {
                let _ = self.transport.close();
                return Err(e);
            }
        };

        let recv_buffer = self.recv_buffer;
        let mut inbound_transcript = transcript.clone();
        let spawned = thread::Builder::new()
            .name("chat-inbound".to_string())
            .spawn(move || {
                let end = run_inbound(reader, &mut inbound_transcript, recv_buffer);
                on_inbound_end(end);
            });
        if let Err(e) = spawned {
            let _ = self.transport.close();
            return Err(e);
        }

        tracing::debug!(role = %self.role, "session started");
        let mut transcript = transcript;
        Ok(run_outbound(self.transport, input, &mut transcript))
    }
}

/// Display every chunk the peer sends until the stream ends, then close it.
pub fn run_inbound<T, D>(mut transport: T, transcript: &mut D, buf_size: usize) -> InboundEnd
where
    T: Transport,
    D: Transcript,
{
    let mut buf = vec![0u8; buf_size.max(1)];
    let mut decoder = Utf8ChunkDecoder::new();

    let end = loop {
        match transport.receive(&mut buf) {
            Ok(0) if transport.is_closed() => break InboundEnd::LocallyClosed,
            Ok(0) => {
                let tail = decoder.finish();
                if !tail.is_empty() {
                    transcript.peer_message(&tail);
                }
                transcript.notice(&Notice::PeerDisconnected);
                break InboundEnd::PeerClosed;
            }
            Ok(n) => {
                let text = decoder.decode(&buf[..n]);
                if !text.is_empty() {
                    transcript.peer_message(&text);
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) if transport.is_closed() => break InboundEnd::LocallyClosed,
            Err(e) if matches!(e.kind(), ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted) => {
                transcript.notice(&Notice::PeerReset);
                break InboundEnd::Reset;
            }
            Err(e) => {
                transcript.notice(&Notice::ReceiveError(e.to_string()));
                break InboundEnd::Failed(e);
            }
        }
    };

    if let Err(e) = transport.close() {
        tracing::warn!(error = %e, "failed to close stream after inbound loop");
    }
    tracing::debug!(?end, "inbound loop finished");
    end
}

/// Send each line the operator types until `exit`, end of input,
/// cancellation or a write failure, then close the stream.
pub fn run_outbound<T, I, D>(mut transport: T, input: &mut I, transcript: &mut D) -> OutboundEnd
where
    T: Transport,
    I: LineSource,
    D: Transcript,
{
    let end = loop {
        transcript.prompt();
        match input.next_line() {
            Input::Line(line) => {
                if is_exit_command(&line) {
                    transcript.notice(&Notice::UserExit);
                    break OutboundEnd::ExitCommand;
                }

                let message = line.trim_end_matches(&['\r', '\n'][..]);
                if message.is_empty() {
                    continue;
                }
                if let Err(e) = transport.send(message.as_bytes()) {
                    transcript.notice(&Notice::SendError(e.to_string()));
                    break OutboundEnd::WriteFailed(e);
                }
            }
            Input::End => {
                transcript.notice(&Notice::Disconnecting);
                break OutboundEnd::EndOfInput;
            }
            Input::Cancelled => {
                transcript.notice(&Notice::Disconnecting);
                break OutboundEnd::Cancelled;
            }
        }
    };

    if let Err(e) = transport.close() {
        tracing::warn!(error = %e, "failed to close stream after outbound loop");
    }
    tracing::debug!(?end, "outbound loop finished");
    end
}
