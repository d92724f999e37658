//! Device session tests over an in-memory duplex pipe standing in for the modem

use pretty_assertions::assert_eq;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use swarm_core::protocol::messages::{
    DateTimeCommand, DateTimeResponse, DeviceConfiguration, DeviceId, DeviceKind,
    FirmwareVersion, GeospatialResponse,
};
use swarm_core::protocol::{Device, DeviceError, Frame, Message, MessageType};
use swarm_core::transport::{Transport, TransportError};
use tokio::io::{duplex, AsyncWrite, AsyncWriteExt, DuplexStream};

fn session() -> (Device<DuplexStream>, Transport<DuplexStream>) {
    let (host, modem) = duplex(1024);
    (Device::new(host), Transport::new(modem))
}

#[tokio::test]
async fn test_sent_frame_is_terminated_with_crlf() {
    let (mut device, mut modem) = session();
    device
        .send(&Frame::query(MessageType::FIRMWARE_VERSION))
        .await
        .unwrap();
    assert_eq!(modem.read_until(b'\n').await.unwrap(), "$FV*10\r");
}

#[tokio::test]
async fn test_request_configuration() {
    let (mut device, mut modem) = session();
    let responder = tokio::spawn(async move {
        let command = modem.read_until(b'\n').await.unwrap();
        assert_eq!(command, "$CS*10\r");
        modem
            .write_bytes(b"$CS DI=0x006c0e,DN=M138*24\r\n")
            .await
            .unwrap();
        modem
    });

    let config: DeviceConfiguration = device
        .request(&Frame::query(MessageType::CONFIGURATION))
        .await
        .unwrap();
    assert_eq!(
        config,
        DeviceConfiguration {
            id: DeviceId(0x006c0e),
            kind: DeviceKind::M138,
        }
    );
    responder.await.unwrap();
}

#[tokio::test]
async fn test_request_skips_unsolicited_frames() {
    let (mut device, mut modem) = session();
    let responder = tokio::spawn(async move {
        modem.read_until(b'\n').await.unwrap();
        modem
            .write_bytes(
                b"$M138 DATETIME*56\r\n\
                  garbage on the line\r\n\
                  $GN 30*2a\r\n\
                  $DT OK*35\r\n\
                  $DT 60*36\r\n",
            )
            .await
            .unwrap();
        modem
    });

    let response: DateTimeResponse = device
        .request_message(&DateTimeCommand::QueryRate)
        .await
        .unwrap();
    assert_eq!(response, DateTimeResponse::Rate(60));
    responder.await.unwrap();
}

#[tokio::test]
async fn test_request_gives_up_after_interleaved_frames() {
    let (mut device, mut modem) = session();
    let responder = tokio::spawn(async move {
        modem.read_until(b'\n').await.unwrap();
        for _ in 0..32 {
            modem.write_bytes(b"$GN 10*28\r\n").await.unwrap();
        }
        modem
    });

    let result = device
        .request::<FirmwareVersion>(&Frame::query(MessageType::FIRMWARE_VERSION))
        .await;
    match result {
        Err(DeviceError::NoResponse(message_type)) => {
            assert_eq!(message_type, MessageType::FIRMWARE_VERSION)
        }
        other => panic!("expected NoResponse, got {other:?}"),
    }
    responder.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_request_times_out_when_device_is_silent() {
    let (host, _modem) = duplex(64);
    let mut device = Device::new(host).with_response_timeout(Duration::from_secs(2));
    let result = device
        .request::<GeospatialResponse>(&Frame::query(MessageType::GEOSPATIAL))
        .await;
    assert!(matches!(result, Err(DeviceError::Timeout)));
}

#[tokio::test]
async fn test_receive_reports_invalid_data() {
    let (mut device, modem) = session();
    let mut modem = modem.into_inner();
    modem.write_all(b"$DT 300*04\r\n$GN ERR*6c\r\n").await.unwrap();

    match device.receive_frame().await {
        Err(DeviceError::InvalidData(raw)) => assert_eq!(raw, b"$DT 300*04"),
        other => panic!("expected InvalidData, got {other:?}"),
    }
    assert_eq!(
        device.receive::<GeospatialResponse>().await.unwrap(),
        GeospatialResponse::Error
    );
}

#[tokio::test]
async fn test_next_message_decodes_stream() {
    let (mut device, modem) = session();
    let mut modem = modem.into_inner();
    modem
        .write_all(b"$TILE BOOT,RUNNING*49\r\nnoise\r\n$DT 20190408195123,I*5e\r\n")
        .await
        .unwrap();
    drop(modem);

    match device.next_message().await.unwrap() {
        Message::Other(frame) => assert_eq!(frame.body(), Some("BOOT,RUNNING")),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        device.next_message().await.unwrap(),
        Message::DateTime(DateTimeResponse::DateTime(_, _))
    ));
    assert!(matches!(
        device.next_message().await,
        Err(DeviceError::Transport(TransportError::Disconnected))
    ));
}

#[tokio::test]
async fn test_send_after_peer_closed_fails() {
    let (host, modem) = duplex(64);
    drop(modem);
    let mut device = Device::new(host);
    assert!(device
        .send(&Frame::query(MessageType::CONFIGURATION))
        .await
        .is_err());
}

/// Writer that accepts a fixed number of bytes, then reports zero-length writes
struct ShortWriter {
    capacity: usize,
    accepted: Vec<u8>,
}

impl AsyncWrite for ShortWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let n = buf.len().min(this.capacity - this.accepted.len());
        this.accepted.extend_from_slice(&buf[..n]);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_short_write_is_partial_write() {
    let mut device = Device::new(ShortWriter {
        capacity: 5,
        accepted: Vec::new(),
    });
    match device.send(&Frame::query(MessageType::CONFIGURATION)).await {
        Err(DeviceError::PartialWrite { expected, written }) => {
            assert_eq!((expected, written), (8, 5));
        }
        other => panic!("expected PartialWrite, got {other:?}"),
    }
    assert_eq!(device.into_inner().accepted, b"$CS*1");
}

#[tokio::test]
async fn test_full_write_is_not_partial() {
    let mut device = Device::new(ShortWriter {
        capacity: 64,
        accepted: Vec::new(),
    });
    device
        .send(&Frame::with_body(MessageType::DATE_TIME, "60").unwrap())
        .await
        .unwrap();
    assert_eq!(device.into_inner().accepted, b"$DT 60*36\r\n");
}
