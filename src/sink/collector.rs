//! Fire-and-forget network collector sink.

use super::Sink;
use crate::config::{CollectorConfig, CollectorProtocol, OutputMode};
use std::io::{self, Write};
use std::net::{TcpStream, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Connect timeout for the TCP transport. Kept short so a dead collector
/// cannot stall the first log call for long; subsequent writes are
/// nonblocking.
const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Sink sending record lines to a remote log collector.
///
/// Delivery is best-effort: construction never connects, the transport is
/// established lazily on first write, and every send failure is counted
/// and swallowed. A slow or unreachable collector drops records instead of
/// blocking the caller.
pub struct CollectorSink {
    config: CollectorConfig,
    transport: Mutex<Option<Transport>>,
    dropped: AtomicU64,
}

enum Transport {
    Udp(UdpSocket),
    Tcp(TcpStream),
}

impl CollectorSink {
    /// Create a collector sink. Performs no network I/O.
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            transport: Mutex::new(None),
            dropped: AtomicU64::new(0),
        }
    }

    /// The collector this sink targets.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Number of records dropped because the collector was unreachable.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn connect(&self) -> io::Result<Transport> {
        let addr = (self.config.host.as_str(), self.config.port);
        match self.config.protocol {
            CollectorProtocol::Udp => {
                let socket = UdpSocket::bind(("0.0.0.0", 0))?;
                socket.connect(addr)?;
                socket.set_nonblocking(true)?;
                Ok(Transport::Udp(socket))
            }
            CollectorProtocol::Tcp => {
                use std::net::ToSocketAddrs;
                let resolved = addr
                    .to_socket_addrs()?
                    .next()
                    .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host resolved to nothing"))?;
                let stream = TcpStream::connect_timeout(&resolved, CONNECT_TIMEOUT)?;
                stream.set_nonblocking(true)?;
                Ok(Transport::Tcp(stream))
            }
        }
    }

    fn try_send(&self, line: &str) -> io::Result<()> {
        let mut guard = self
            .transport
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "collector lock poisoned"))?;

        if guard.is_none() {
            *guard = Some(self.connect()?);
        }

        let result = match guard.as_mut().expect("transport was just connected") {
            Transport::Udp(socket) => socket.send(line.as_bytes()).map(|_| ()),
            Transport::Tcp(stream) => {
                stream.write_all(line.as_bytes()).and_then(|()| stream.write_all(b"\n"))
            }
        };

        // Drop a broken transport so the next write reconnects.
        if result.is_err() {
            *guard = None;
        }
        result
    }
}

impl Sink for CollectorSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        if self.try_send(line).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        // Fire-and-forget: loss is the accepted trade-off.
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        if let Ok(mut guard) = self.transport.lock() {
            if let Some(Transport::Tcp(stream)) = guard.as_mut() {
                let _ = stream.flush();
            }
        }
        Ok(())
    }

    fn mode(&self) -> OutputMode {
        OutputMode::Collector
    }
}

impl std::fmt::Debug for CollectorSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorSink")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("protocol", &self.config.protocol)
            .field("dropped", &self.dropped_count())
            .finish()
    }
}
