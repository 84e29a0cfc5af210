//! Blocking event sources for the input loop.
//!
//! The input loop never blocks indefinitely: it asks its [`EventSource`] for
//! the next event with a timeout, so a cleared active flag is noticed within
//! one poll interval.

use crate::input::decoder::{KeyDecoder, VtDecoder, split_sequences};
use crate::input::key::{Event, Key};
use crate::terminal::{RawModeGuard, is_tty, poll_readable, read_fd};
use std::collections::VecDeque;
use std::io;
use std::os::unix::io::AsRawFd;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// How long to wait for the rest of a split escape sequence.
const ESCAPE_GRACE: Duration = Duration::from_millis(25);

/// Outcome of one read attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// A decoded event.
    Event(Event),
    /// Nothing arrived before the timeout.
    Timeout,
    /// The source is exhausted and will never produce another event.
    Closed,
}

/// Something the input loop can read events from.
pub trait EventSource {
    /// Wait up to `timeout` for the next event.
    fn read_event(&mut self, timeout: Duration) -> io::Result<Input>;
}

/// Create a channel-backed source and its sender.
///
/// Useful for tests and for feeding synthetic input from other threads.
#[must_use]
pub fn channel() -> (EventSender, ChannelEvents) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, ChannelEvents { rx })
}

/// Sending half of [`channel`].
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Queue an event. Returns `false` once the source has been dropped.
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Queue a synthetic key event.
    pub fn send_key(&self, key: Key) -> bool {
        self.send(Event::key(key))
    }

    /// Decode raw bytes with [`VtDecoder`] and queue one event per keystroke.
    pub fn send_bytes(&self, bytes: &[u8]) -> bool {
        let (parts, _) = split_sequences(bytes);
        parts
            .into_iter()
            .all(|part| self.send(VtDecoder.decode_bytes(part)))
    }
}

/// Receiving half of [`channel`]. Closed once every sender is dropped.
#[derive(Debug)]
pub struct ChannelEvents {
    rx: Receiver<Event>,
}

impl EventSource for ChannelEvents {
    fn read_event(&mut self, timeout: Duration) -> io::Result<Input> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Input::Event(event)),
            Err(RecvTimeoutError::Timeout) => Ok(Input::Timeout),
            Err(RecvTimeoutError::Disconnected) => Ok(Input::Closed),
        }
    }
}

/// Events read from a terminal file descriptor (stdin by default).
///
/// Raw mode is entered when the descriptor is a TTY and restored on drop.
/// Each read is split into keystrokes and decoded with `D`.
pub struct TerminalEvents<F: AsRawFd = io::Stdin, D: KeyDecoder = VtDecoder> {
    input: F,
    decoder: D,
    pending: VecDeque<Event>,
    buf: Vec<u8>,
    _raw: Option<RawModeGuard>,
}

impl TerminalEvents {
    /// Read from stdin, entering raw mode if it is a terminal.
    pub fn stdin() -> io::Result<Self> {
        Self::new(io::stdin(), VtDecoder)
    }
}

impl<F: AsRawFd, D: KeyDecoder> TerminalEvents<F, D> {
    /// Read from `input` with a custom decoder.
    pub fn new(input: F, decoder: D) -> io::Result<Self> {
        let raw = if is_tty(&input) {
            Some(RawModeGuard::new(&input)?)
        } else {
            None
        };
        Ok(Self {
            input,
            decoder,
            pending: VecDeque::new(),
            buf: vec![0; 1024],
            _raw: raw,
        })
    }

    fn fill(&mut self) -> io::Result<usize> {
        let n = read_fd(&self.input, &mut self.buf)?;
        if n == 0 {
            return Ok(0);
        }
        let mut data = self.buf[..n].to_vec();

        // An escape sequence can straddle two reads.
        if split_sequences(&data).1 && poll_readable(&self.input, ESCAPE_GRACE)? {
            let more = read_fd(&self.input, &mut self.buf)?;
            data.extend_from_slice(&self.buf[..more]);
        }

        let (parts, _) = split_sequences(&data);
        for part in parts {
            self.pending.push_back(self.decoder.decode_bytes(part));
        }
        Ok(n)
    }
}

impl<F: AsRawFd, D: KeyDecoder> EventSource for TerminalEvents<F, D> {
    fn read_event(&mut self, timeout: Duration) -> io::Result<Input> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Input::Event(event));
        }
        if !poll_readable(&self.input, timeout)? {
            return Ok(Input::Timeout);
        }
        if self.fill()? == 0 {
            return Ok(Input::Closed);
        }
        Ok(self
            .pending
            .pop_front()
            .map_or(Input::Timeout, Input::Event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::os::unix::io::FromRawFd;

    #[test]
    fn test_channel_delivers_in_order() {
        let (tx, mut rx) = channel();
        assert!(tx.send_key(Key::Up));
        assert!(tx.send(Event::char('x')));

        let timeout = Duration::from_millis(10);
        assert_eq!(rx.read_event(timeout).unwrap(), Input::Event(Event::key(Key::Up)));
        assert_eq!(rx.read_event(timeout).unwrap(), Input::Event(Event::char('x')));
        assert_eq!(rx.read_event(timeout).unwrap(), Input::Timeout);
    }

    #[test]
    fn test_channel_closes_when_senders_drop() {
        let (tx, mut rx) = channel();
        drop(tx);
        assert_eq!(rx.read_event(Duration::from_millis(10)).unwrap(), Input::Closed);
    }

    #[test]
    fn test_send_bytes_splits_keystrokes() {
        let (tx, mut rx) = channel();
        assert!(tx.send_bytes(b"\x1b[Bq"));
        let timeout = Duration::from_millis(10);
        let Input::Event(first) = rx.read_event(timeout).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(first.key, Some(Key::Down));
        let Input::Event(second) = rx.read_event(timeout).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(second.key, Some(Key::Char('q')));
    }

    #[test]
    fn test_escape_then_return_in_one_send() {
        let (tx, mut rx) = channel();
        assert!(tx.send_bytes(b"\x1b\r"));
        let timeout = Duration::from_millis(10);
        let keys: Vec<_> = (0..2)
            .map(|_| match rx.read_event(timeout).unwrap() {
                Input::Event(ev) => ev.key,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(keys, vec![Some(Key::Escape), Some(Key::Return)]);
    }

    #[test]
    fn test_terminal_events_from_pipe() {
        let (read_end, mut write_end) = create_pipe();
        let mut source = TerminalEvents::new(read_end, VtDecoder).unwrap();

        write_end.write_all(b"a\x1b[A\r").unwrap();
        let timeout = Duration::from_millis(500);
        let keys: Vec<_> = (0..3)
            .map(|_| match source.read_event(timeout).unwrap() {
                Input::Event(ev) => ev.key,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(keys, vec![Some(Key::Char('a')), Some(Key::Up), Some(Key::Return)]);
    }

    #[test]
    fn test_terminal_events_timeout_and_close() {
        let (read_end, write_end) = create_pipe();
        let mut source = TerminalEvents::new(read_end, VtDecoder).unwrap();
        assert_eq!(source.read_event(Duration::from_millis(10)).unwrap(), Input::Timeout);
        drop(write_end);
        assert_eq!(source.read_event(Duration::from_millis(500)).unwrap(), Input::Closed);
    }

    fn create_pipe() -> (File, File) {
        let mut fds = [0i32; 2];
        // SAFETY: fds has room for the two descriptors pipe() writes
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        // SAFETY: pipe() succeeded, so both fds are valid and owned here
        unsafe { (File::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) }
    }
}
