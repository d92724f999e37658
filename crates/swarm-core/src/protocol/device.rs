//! Device session
//!
//! Sends frames to a Swarm device and reads its replies. One session owns one
//! transport; every operation takes `&mut self`, so requests are strictly
//! sequential.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{
    DecodeMessage, DeviceError, EncodeMessage, Frame, Message, DEFAULT_TIMEOUT_MS,
    LINE_TERMINATOR, MAX_INTERLEAVED_FRAMES,
};
use crate::transport::Transport;
#[cfg(unix)]
use crate::{config::DeviceConfig, transport::SerialPort};

/// A session with one Swarm device
#[derive(Debug)]
pub struct Device<S> {
    transport: Transport<S>,
    response_timeout: Duration,
}

impl<S> Device<S> {
    /// Wrap an already-open duplex stream
    pub fn new(stream: S) -> Self {
        Self {
            transport: Transport::new(stream),
            response_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Set how long [`request`](Self::request) waits for a reply
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Current reply timeout
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Access the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        self.transport.get_mut()
    }

    /// End the session and return the underlying stream
    pub fn into_inner(self) -> S {
        self.transport.into_inner()
    }
}

#[cfg(unix)]
impl Device<SerialPort> {
    /// Open the serial device described by `config` for reading and writing
    pub fn open(config: &DeviceConfig) -> Result<Self, DeviceError> {
        let mut port = SerialPort::new(config.path.as_str())?;
        port.open(true, true)?;
        port.apply_settings(&config.line)?;
        Ok(Self::new(port).with_response_timeout(config.response_timeout()))
    }

    /// Close the serial port. Further I/O fails with `NotOpen`.
    pub fn close(&mut self) {
        self.transport.get_mut().close();
    }
}

impl<S: AsyncWrite + Unpin> Device<S> {
    /// Send one frame followed by CRLF
    pub async fn send(&mut self, frame: &Frame) -> Result<(), DeviceError> {
        let mut line = frame.to_string().into_bytes();
        line.extend_from_slice(LINE_TERMINATOR);

        let expected = frame.encoded_len() + LINE_TERMINATOR.len();
        let written = self.transport.write_bytes(&line).await?;
        if written != expected {
            return Err(DeviceError::PartialWrite { expected, written });
        }
        tracing::debug!("-> {}", frame);
        Ok(())
    }

    /// Encode and send a typed command
    pub async fn send_message<M: EncodeMessage>(&mut self, message: &M) -> Result<(), DeviceError> {
        let frame = message.to_frame()?;
        self.send(&frame).await
    }
}

impl<S: AsyncRead + Unpin> Device<S> {
    /// Read one line, without its `\n` or a trailing `\r`
    pub async fn receive_line(&mut self) -> Result<String, DeviceError> {
        let mut line = self.transport.read_until(b'\n').await?;
        if line.ends_with('\r') {
            line.pop();
        }
        tracing::trace!("raw line {:?}", line);
        Ok(line)
    }

    /// Read one line and parse it as a frame
    pub async fn receive_frame(&mut self) -> Result<Frame, DeviceError> {
        let line = self.receive_line().await?;
        match Frame::parse(&line) {
            Some(frame) => {
                tracing::debug!("<- {}", frame);
                Ok(frame)
            }
            None => Err(DeviceError::InvalidData(line.into_bytes())),
        }
    }

    /// Read one frame and decode it as `T`
    pub async fn receive<T: DecodeMessage>(&mut self) -> Result<T, DeviceError> {
        let frame = self.receive_frame().await?;
        T::from_frame(&frame).ok_or_else(|| DeviceError::InvalidData(frame.to_string().into_bytes()))
    }

    /// Next well-formed frame, decoded. Garbled lines are dropped.
    pub async fn next_message(&mut self) -> Result<Message, DeviceError> {
        loop {
            match self.receive_frame().await {
                Ok(frame) => return Ok(Message::decode(&frame)),
                Err(DeviceError::InvalidData(raw)) => {
                    tracing::debug!("Dropped garbled line {:?}", String::from_utf8_lossy(&raw));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Wait for the next frame of `T`'s type, skipping anything else
    async fn await_reply<T: DecodeMessage>(&mut self) -> Result<T, DeviceError> {
        for _ in 0..=MAX_INTERLEAVED_FRAMES {
            let frame = match self.receive_frame().await {
                Ok(frame) => frame,
                Err(DeviceError::InvalidData(raw)) => {
                    tracing::debug!("Dropped garbled line {:?}", String::from_utf8_lossy(&raw));
                    continue;
                }
                Err(e) => return Err(e),
            };
            if *frame.message_type() != T::MESSAGE_TYPE {
                tracing::warn!(
                    "Skipping unsolicited {} while waiting for ${}",
                    frame,
                    T::MESSAGE_TYPE
                );
                continue;
            }
            return T::from_frame(&frame)
                .ok_or_else(|| DeviceError::InvalidData(frame.to_string().into_bytes()));
        }
        Err(DeviceError::NoResponse(T::MESSAGE_TYPE))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Device<S> {
    /// Send `frame` and wait for the reply of type `T`.
    ///
    /// Unrelated frames (boot banners, unsolicited reports) and garbled lines
    /// are skipped. Gives up with [`DeviceError::NoResponse`] after
    /// [`MAX_INTERLEAVED_FRAMES`] of them, or [`DeviceError::Timeout`] once
    /// the response timeout elapses.
    pub async fn request<T: DecodeMessage>(&mut self, frame: &Frame) -> Result<T, DeviceError> {
        self.send(frame).await?;
        let timeout = self.response_timeout;
        tokio::time::timeout(timeout, self.await_reply::<T>())
            .await
            .map_err(|_| DeviceError::Timeout)?
    }

    /// Send a typed command and wait for the reply of type `T`
    pub async fn request_message<M, T>(&mut self, message: &M) -> Result<T, DeviceError>
    where
        M: EncodeMessage,
        T: DecodeMessage,
    {
        let frame = message.to_frame()?;
        self.request(&frame).await
    }
}
