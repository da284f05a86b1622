// src/queue/unix.rs
use std::io::ErrorKind;
use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::traits::{ExecutionQueue, TransportError};

/// Queue backed by a connected Unix datagram socket.
///
/// Each message is one datagram, so the peer never sees a partial command.
/// Sends give up after the write timeout when the peer stops reading.
#[derive(Debug)]
pub struct UnixQueue {
    name: String,
    socket: UnixDatagram,
    write_timeout: Duration,
}

impl UnixQueue {
    /// Connect to the peer socket at `path`.
    pub fn connect(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        write_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let socket = UnixDatagram::unbound()?;
        socket.connect(path)?;
        socket.set_write_timeout(Some(write_timeout))?;

        let name = name.into();
        debug!(
            queue = %name,
            path = %path.display(),
            timeout_ms = write_timeout.as_millis() as u64,
            "Connected execution queue"
        );

        Ok(UnixQueue {
            name,
            socket,
            write_timeout,
        })
    }
}

impl ExecutionQueue for UnixQueue {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, message: &str) -> Result<(), TransportError> {
        let bytes = message.as_bytes();
        let written = match self.socket.send(bytes) {
            Ok(n) => n,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(TransportError::Timeout(self.write_timeout));
            }
            Err(e) => return Err(e.into()),
        };

        if written != bytes.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_millis(50);

    #[test]
    fn test_send_delivers_datagram() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("execq");
        let peer = UnixDatagram::bind(&path).unwrap();

        let queue = UnixQueue::connect("execq", &path, TIMEOUT).unwrap();
        queue.send("host-deny root 10.0.0.5").unwrap();

        let mut buf = [0u8; 128];
        let n = peer.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"host-deny root 10.0.0.5");
        assert_eq!(queue.name(), "execq");
    }

    #[test]
    fn test_connect_missing_peer() {
        let dir = TempDir::new().unwrap();
        let result = UnixQueue::connect("arq", dir.path().join("missing"), TIMEOUT);

        assert!(matches!(result, Err(TransportError::Io(_))));
    }

    #[test]
    fn test_send_after_peer_gone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arq");
        let peer = UnixDatagram::bind(&path).unwrap();

        let queue = UnixQueue::connect("arq", &path, TIMEOUT).unwrap();
        drop(peer);

        assert!(queue.send("agent01 R 007 firewall-drop  10.0.0.5").is_err());
    }

    #[test]
    fn test_stalled_peer_times_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("execq");
        // Bound but never read, so its receive queue fills up
        let _peer = UnixDatagram::bind(&path).unwrap();

        let queue = UnixQueue::connect("execq", &path, TIMEOUT).unwrap();

        let mut outcome = Ok(());
        for _ in 0..10_000 {
            outcome = queue.send("host-deny root 10.0.0.5");
            if outcome.is_err() {
                break;
            }
        }

        assert!(matches!(outcome, Err(TransportError::Timeout(t)) if t == TIMEOUT));
    }
}
