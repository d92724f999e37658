//! Serial port handling
//!
//! Owns the OS file descriptor of a serial device node and drives it through
//! the tokio reactor. A port moves from unopened to open to closed exactly
//! once; reconnecting means building a new `SerialPort`.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::unix::AsyncFd;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::{termios, LineSettings, TransportError};

enum PortState {
    Unopened,
    Open(AsyncFd<File>),
    Closed,
}

/// Serial device node with exclusive, non-blocking access
pub struct SerialPort {
    path: String,
    state: PortState,
}

impl SerialPort {
    /// Create a port for `path` without opening it
    pub fn new(path: impl Into<String>) -> Result<Self, TransportError> {
        let path = path.into();
        if path.is_empty() {
            return Err(TransportError::InvalidPath);
        }
        Ok(Self {
            path,
            state: PortState::Unopened,
        })
    }

    /// Open the device node.
    ///
    /// The node is opened without becoming the controlling terminal and is
    /// locked for exclusive use. Must be called from within a tokio runtime.
    pub fn open(&mut self, receive: bool, transmit: bool) -> Result<(), TransportError> {
        if !receive && !transmit {
            return Err(TransportError::MustReceiveOrTransmit);
        }
        match self.state {
            PortState::Open(_) => return Err(TransportError::AlreadyOpen),
            PortState::Closed => return Err(TransportError::PortClosed),
            PortState::Unopened => {}
        }

        #[allow(unused_mut)]
        let mut flags = libc::O_NOCTTY | libc::O_NONBLOCK;
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        {
            flags |= libc::O_EXLOCK;
        }

        let file = OpenOptions::new()
            .read(receive)
            .write(transmit)
            .custom_flags(flags)
            .open(&self.path)
            .map_err(|e| open_failed(&e))?;

        // SAFETY: file owns a valid descriptor for the duration of the call
        if unsafe { libc::ioctl(file.as_raw_fd(), libc::TIOCEXCL as _) } != 0 {
            return Err(open_failed(&io::Error::last_os_error()));
        }

        let fd = AsyncFd::new(file).map_err(|e| open_failed(&e))?;
        self.state = PortState::Open(fd);
        tracing::info!("Opened serial port {} (rx={}, tx={})", self.path, receive, transmit);
        Ok(())
    }

    /// Replace the line discipline. Does nothing if the port is not open.
    pub fn apply_settings(&mut self, settings: &LineSettings) -> Result<(), TransportError> {
        let PortState::Open(fd) = &self.state else {
            return Ok(());
        };
        termios::apply(fd.as_raw_fd(), settings)?;
        tracing::debug!("Applied line settings to {}: {:?}", self.path, settings);
        Ok(())
    }

    /// Release the descriptor. Safe to call more than once.
    pub fn close(&mut self) {
        if let PortState::Open(_) = std::mem::replace(&mut self.state, PortState::Closed) {
            tracing::info!("Closed serial port {}", self.path);
        }
    }

    /// Device path this port was created for
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the descriptor is currently held
    pub fn is_open(&self) -> bool {
        matches!(self.state, PortState::Open(_))
    }

    fn fd(&self) -> io::Result<&AsyncFd<File>> {
        match &self.state {
            PortState::Open(fd) => Ok(fd),
            _ => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "serial port is not open",
            )),
        }
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Every failure while acquiring the descriptor is reported with its errno
fn open_failed(err: &io::Error) -> TransportError {
    TransportError::OpenFailed(err.raw_os_error().unwrap_or(libc::EIO))
}

impl AsyncRead for SerialPort {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let fd = self.get_mut().fd()?;
        loop {
            let mut guard = ready!(fd.poll_read_ready(cx))?;
            let unfilled = buf.initialize_unfilled();
            match guard.try_io(|inner| inner.get_ref().read(unfilled)) {
                Ok(Ok(len)) => {
                    buf.advance(len);
                    return Poll::Ready(Ok(()));
                }
                Ok(Err(err)) => return Poll::Ready(Err(err)),
                Err(_would_block) => continue,
            }
        }
    }
}

impl AsyncWrite for SerialPort {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let fd = self.get_mut().fd()?;
        loop {
            let mut guard = ready!(fd.poll_write_ready(cx))?;
            match guard.try_io(|inner| inner.get_ref().write(buf)) {
                Ok(result) => return Poll::Ready(result),
                Err(_would_block) => continue,
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        // Writes go straight to the tty driver; nothing is buffered here
        Poll::Ready(self.get_mut().fd().map(|_| ()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
