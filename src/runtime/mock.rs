//! Scripted in-memory socket for tests.

use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::AsyncUdpSocket;

/// What the next receive call observes.
#[derive(Debug)]
pub(crate) enum Scripted {
    Reply(Vec<u8>, SocketAddr),
    Silence,
    Fail(io::ErrorKind),
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<Scripted>,
    sent: Vec<(Vec<u8>, SocketAddr)>,
    waits: Vec<Duration>,
    broadcast: bool,
    fail_sends: bool,
}

/// A socket whose receive side replays a script.
///
/// Clones share state, so a test can keep a handle after moving the socket
/// into a session. An exhausted script behaves like permanent silence.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockSocket {
    state: Arc<Mutex<MockState>>,
}

impl MockSocket {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, step: Scripted) -> &Self {
        self.state.lock().unwrap().script.push_back(step);
        self
    }

    pub(crate) fn reply(&self, body: &str) -> &Self {
        self.reply_from(body, peer(10, 38899))
    }

    pub(crate) fn reply_from(&self, body: &str, from: SocketAddr) -> &Self {
        self.push(Scripted::Reply(body.as_bytes().to_vec(), from))
    }

    pub(crate) fn silence(&self, times: usize) -> &Self {
        for _ in 0..times {
            self.push(Scripted::Silence);
        }
        self
    }

    pub(crate) fn fail_sends(&self) {
        self.state.lock().unwrap().fail_sends = true;
    }

    pub(crate) fn sent(&self) -> Vec<(String, SocketAddr)> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(bytes, addr)| (String::from_utf8_lossy(bytes).into_owned(), *addr))
            .collect()
    }

    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.state.lock().unwrap().waits.clone()
    }

    pub(crate) fn broadcast(&self) -> bool {
        self.state.lock().unwrap().broadcast
    }

    fn next(&self, buf: &mut [u8], wait: Option<Duration>) -> io::Result<Option<(usize, SocketAddr)>> {
        let mut state = self.state.lock().unwrap();
        if let Some(wait) = wait {
            state.waits.push(wait);
        }
        match state.script.pop_front().unwrap_or(Scripted::Silence) {
            Scripted::Reply(bytes, from) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok(Some((len, from)))
            }
            Scripted::Silence => Ok(None),
            Scripted::Fail(kind) => Err(io::Error::new(kind, "scripted failure")),
        }
    }
}

/// An IPv4 peer on 192.168.1.0/24.
pub(crate) fn peer(host: u8, port: u16) -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, host), port))
}

impl AsyncUdpSocket for MockSocket {
    async fn bind(_addr: SocketAddr) -> io::Result<Self> {
        Ok(Self::new())
    }

    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sends {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "send refused"));
        }
        state.sent.push((buf.to_vec(), addr));
        Ok(buf.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.next(buf, None)?
            .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
    }

    fn set_broadcast(&self, broadcast: bool) -> io::Result<()> {
        self.state.lock().unwrap().broadcast = broadcast;
        Ok(())
    }

    async fn recv_from_within(
        &self,
        buf: &mut [u8],
        wait: Duration,
    ) -> io::Result<Option<(usize, SocketAddr)>> {
        self.next(buf, Some(wait))
    }
}
