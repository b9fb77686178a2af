//! Device discovery via UDP broadcast.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use log::{debug, warn};

use crate::PORT;
use crate::bulb::Bulb;
use crate::codec::{self, Params, extract_str};
use crate::errors::Error;
use crate::runtime::{AsyncUdpSocket, Instant, UdpSocket};

type Result<T> = std::result::Result<T, Error>;

/// Hardware id sent in our own announcement. Bulbs do not check it.
const ANNOUNCE_MAC: &str = "001122334455";

/// A discovered WiZ bulb on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBulb {
    /// Address the reply came from
    pub ip: Ipv4Addr,
    /// MAC address the bulb reported
    pub mac: String,
}

impl DiscoveredBulb {
    /// Open a [`Bulb`] session for this device.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut registry = BulbRegistry::new();
    /// discover_bulbs(&mut registry, "255.255.255.255", Duration::from_secs(5)).await?;
    /// for found in &registry {
    ///     let mut bulb = found.connect().await?;
    ///     bulb.turn_on().await?;
    /// }
    /// ```
    pub async fn connect(&self) -> Result<Bulb> {
        Bulb::new(self.ip).await
    }
}

/// Discovered bulbs, unique by MAC, in the order they first answered.
#[derive(Debug, Default, Clone)]
pub struct BulbRegistry {
    bulbs: Vec<DiscoveredBulb>,
}

impl BulbRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bulb unless its MAC is already known.
    ///
    /// The first registration for a MAC wins; later ones are dropped.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use cwiz::BulbRegistry;
    ///
    /// let mut registry = BulbRegistry::new();
    /// assert!(registry.insert(Ipv4Addr::new(10, 0, 0, 5), "a8bb50d46a1c"));
    /// assert!(!registry.insert(Ipv4Addr::new(10, 0, 0, 9), "a8bb50d46a1c"));
    /// assert_eq!(registry.len(), 1);
    /// assert_eq!(registry.get_by_mac("a8bb50d46a1c").unwrap().ip, Ipv4Addr::new(10, 0, 0, 5));
    /// ```
    pub fn insert(&mut self, ip: Ipv4Addr, mac: &str) -> bool {
        if self.get_by_mac(mac).is_some() {
            return false;
        }
        self.bulbs.push(DiscoveredBulb {
            ip,
            mac: mac.to_string(),
        });
        true
    }

    pub fn get_by_mac(&self, mac: &str) -> Option<&DiscoveredBulb> {
        self.bulbs.iter().find(|bulb| bulb.mac == mac)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiscoveredBulb> {
        self.bulbs.iter()
    }

    pub fn len(&self) -> usize {
        self.bulbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bulbs.is_empty()
    }
}

impl<'a> IntoIterator for &'a BulbRegistry {
    type Item = &'a DiscoveredBulb;
    type IntoIter = std::slice::Iter<'a, DiscoveredBulb>;

    fn into_iter(self) -> Self::IntoIter {
        self.bulbs.iter()
    }
}

impl IntoIterator for BulbRegistry {
    type Item = DiscoveredBulb;
    type IntoIter = std::vec::IntoIter<DiscoveredBulb>;

    fn into_iter(self) -> Self::IntoIter {
        self.bulbs.into_iter()
    }
}

/// Discover WiZ bulbs on the local network using UDP broadcast.
///
/// Broadcasts one registration announcement to `broadcast_address` on the
/// protocol port, then records every reply that carries a `mac` field. The
/// run ends when no datagram arrives for `timeout`, once `timeout` has
/// passed since the announcement, or on the first receive error. Bulbs found
/// before that stay registered. Returns the number of bulbs now in
/// `registry`.
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use cwiz::{BulbRegistry, discover_bulbs};
///
/// let mut registry = BulbRegistry::new();
/// let found = discover_bulbs(&mut registry, "192.168.1.255", Duration::from_secs(5)).await?;
/// println!("Found {} bulbs", found);
/// for bulb in &registry {
///     println!("  {} - {}", bulb.ip, bulb.mac);
/// }
/// ```
pub async fn discover_bulbs(
    registry: &mut BulbRegistry,
    broadcast_address: &str,
    timeout: Duration,
) -> Result<usize> {
    let broadcast: Ipv4Addr = broadcast_address
        .parse()
        .map_err(|_| Error::invalid_address(broadcast_address))?;
    let local_ip = local_ipv4(broadcast);

    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
        .await
        .map_err(|e| Error::socket("bind", e))?;

    let dest = SocketAddr::V4(SocketAddrV4::new(broadcast, PORT));
    collect(&socket, registry, dest, local_ip, timeout).await
}

/// Announce on `socket` and gather replies into `registry`.
pub(crate) async fn collect<S: AsyncUdpSocket>(
    socket: &S,
    registry: &mut BulbRegistry,
    dest: SocketAddr,
    local_ip: Ipv4Addr,
    window: Duration,
) -> Result<usize> {
    socket
        .set_broadcast(true)
        .map_err(|e| Error::socket("set_broadcast", e))?;

    let msg = announcement(local_ip)?;
    socket
        .send_to(msg.as_bytes(), dest)
        .await
        .map_err(|e| Error::socket("send_to", e))?;
    debug!("sent registration to {dest}");

    let start = Instant::now();
    let mut buffer = [0u8; 2048];

    while start.elapsed() < window {
        match socket.recv_from_within(&mut buffer, window).await {
            Ok(Some((size, from))) => register_reply(registry, &buffer[..size], from),
            Ok(None) => {
                debug!("no reply for {window:?}, ending discovery");
                break;
            }
            Err(e) => {
                warn!("discovery receive failed, ending discovery: {e}");
                break;
            }
        }
    }

    Ok(registry.len())
}

fn announcement(local_ip: Ipv4Addr) -> Result<String> {
    let mut params = Params::new();
    params
        .str("phoneMac", ANNOUNCE_MAC)
        .bool("register", false)
        .str("phoneIp", &local_ip.to_string())
        .str("id", "1");
    codec::encode("registration", Some(&params.finish()))
}

fn register_reply(registry: &mut BulbRegistry, payload: &[u8], from: SocketAddr) {
    let SocketAddr::V4(from) = from else {
        debug!("ignoring reply from non-IPv4 sender {from}");
        return;
    };
    let Ok(body) = std::str::from_utf8(payload) else {
        warn!("ignoring non-UTF-8 reply from {from}");
        return;
    };
    let Some(mac) = extract_str(body, "mac").filter(|mac| !mac.is_empty()) else {
        debug!("ignoring reply without mac from {from}");
        return;
    };

    if registry.insert(*from.ip(), mac) {
        debug!("discovered {mac} at {}", from.ip());
    } else {
        debug!("{mac} already registered, ignoring reply from {}", from.ip());
    }
}

/// Best-effort address of the interface that routes to `broadcast`.
///
/// Only asks the OS for a route; nothing is sent. The probe socket is closed
/// before discovery opens its own.
fn local_ipv4(broadcast: Ipv4Addr) -> Ipv4Addr {
    let probe = || -> std::io::Result<Ipv4Addr> {
        let socket = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.set_broadcast(true)?;
        socket.connect((broadcast, PORT))?;
        match socket.local_addr()? {
            SocketAddr::V4(addr) => Ok(*addr.ip()),
            SocketAddr::V6(_) => Ok(Ipv4Addr::UNSPECIFIED),
        }
    };
    probe().unwrap_or_else(|e| {
        debug!("could not determine local address: {e}");
        Ipv4Addr::UNSPECIFIED
    })
}
