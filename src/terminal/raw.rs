//! Raw mode and low-level descriptor I/O.
//!
//! Raw mode disables line buffering, echo and signal keys so every keystroke
//! (Ctrl-C included) reaches the input loop as bytes. Output post-processing
//! is disabled too, which is why frames carry explicit `\r\n` row breaks.
//!
//! # Safety
//! This module uses unsafe code for FFI calls to libc (termios, poll, read,
//! ioctl). Every call site passes pointers to live, correctly sized values.

#![allow(unsafe_code)]
#![allow(clippy::borrow_as_ptr)]

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

/// Saved terminal state, restored on drop.
#[derive(Debug)]
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    /// Enter raw mode on the given file descriptor.
    pub fn new<F: AsRawFd>(fd: &F) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        let original = get_termios(fd)?;
        set_termios(fd, &raw_termios(original))?;
        Ok(Self { fd, original })
    }

    fn restore(&self) -> io::Result<()> {
        set_termios(self.fd, &self.original)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// Reads are driven by poll(2), so read(2) may return as soon as one byte is in.
fn raw_termios(mut raw: libc::termios) -> libc::termios {
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    raw.c_cc[libc::VMIN] = 1;
    raw.c_cc[libc::VTIME] = 0;
    raw
}

/// Enter raw mode for stdin.
pub fn enable_raw_mode() -> io::Result<RawModeGuard> {
    RawModeGuard::new(&io::stdin())
}

/// Check if the given file descriptor is a TTY.
#[must_use]
pub fn is_tty<F: AsRawFd>(fd: &F) -> bool {
    // SAFETY: isatty is safe to call with any fd
    unsafe { libc::isatty(fd.as_raw_fd()) == 1 }
}

/// Get the terminal size as `(columns, rows)`.
///
/// Zero dimensions are reported as an error.
pub fn terminal_size() -> io::Result<(u16, u16)> {
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };

    // SAFETY: size is a live winsize for TIOCGWINSZ to fill
    cvt(unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) })?;

    if size.ws_col == 0 || size.ws_row == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "terminal reported zero dimensions",
        ));
    }
    Ok((size.ws_col, size.ws_row))
}

/// Wait until `fd` has input or `timeout` passes.
///
/// Returns `Ok(false)` on timeout or when interrupted by a signal. Hang-up and
/// error conditions count as readable so the following read reports them.
pub fn poll_readable<F: AsRawFd>(fd: &F, timeout: Duration) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd: fd.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

    // SAFETY: pfd is a valid pollfd and nfds is 1
    match cvt(unsafe { libc::poll(&mut pfd, 1, millis) }) {
        Ok(ready) => Ok(ready > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0),
        Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(false),
        Err(err) => Err(err),
    }
}

/// Read available bytes from `fd`, bypassing std's stdin buffer.
pub fn read_fd<F: AsRawFd>(fd: &F, buf: &mut [u8]) -> io::Result<usize> {
    // SAFETY: buf is valid for writes of buf.len() bytes
    let result = unsafe { libc::read(fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) };

    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result.unsigned_abs())
    }
}

/// Map a libc `-1` return to the thread's last OS error.
fn cvt(result: libc::c_int) -> io::Result<libc::c_int> {
    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result)
    }
}

fn get_termios(fd: RawFd) -> io::Result<libc::termios> {
    // SAFETY: termios is plain data; tcgetattr fills every field on success
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };
    cvt(unsafe { libc::tcgetattr(fd, &mut termios) })?;
    Ok(termios)
}

fn set_termios(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    // SAFETY: termios points to a live struct for the duration of the call
    cvt(unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) }).map(drop)
}
