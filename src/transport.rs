//! Request/response exchange over an unreliable datagram socket.

use std::net::SocketAddr;
use std::time::Duration;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::errors::Error;
use crate::runtime::AsyncUdpSocket;

type Result<T> = std::result::Result<T, Error>;

/// Receive buffer size for a single reply.
const REPLY_BUFFER_LEN: usize = 4096;

/// Retry schedule for a single request.
///
/// Attempt `n` (from zero) waits `initial_wait + n * wait_step`, never more
/// than `default_timeout`. With the defaults that is 0.75s, 3.75s, 6.75s,
/// 9.75s, 12.75s and 13s.
///
/// Durations (de)serialize as integer milliseconds and missing fields take
/// their default. A `max_attempts` of zero is treated as one.
///
/// ```
/// use cwiz::RetryPolicy;
///
/// let policy: RetryPolicy = serde_json::from_str(
///     r#"{"max_attempts":2,"initial_wait":100,"wait_step":50,"default_timeout":120}"#,
/// ).unwrap();
/// assert_eq!(policy.max_attempts, 2);
/// assert_eq!(policy.wait_for(1).as_millis(), 120);
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub initial_wait: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub wait_step: Duration,
    /// Per-attempt cap, also the idle receive bound of a session.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub default_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_wait: Duration::from_millis(750),
            wait_step: Duration::from_secs(3),
            default_timeout: Duration::from_secs(13),
        }
    }
}

impl RetryPolicy {
    /// Wait bound for the given zero-based attempt.
    pub fn wait_for(&self, attempt: u32) -> Duration {
        self.initial_wait
            .saturating_add(self.wait_step.saturating_mul(attempt))
            .min(self.default_timeout)
    }

    /// Number of attempts actually made, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Longest time a fully unanswered request can block.
    pub fn worst_case(&self) -> Duration {
        (0..self.attempts()).map(|n| self.wait_for(n)).sum()
    }
}

/// Send `request` to `dest` and wait for any datagram in reply.
///
/// The first non-empty datagram that arrives during an attempt's wait bound
/// is the reply, whoever sent it; callers keep at most one request in flight
/// per socket. A failed transmit ends the exchange immediately. A receive
/// error or an empty datagram counts as a missed attempt.
pub async fn send_and_await<S: AsyncUdpSocket>(
    socket: &S,
    dest: SocketAddr,
    request: &[u8],
    policy: &RetryPolicy,
) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; REPLY_BUFFER_LEN];
    let attempts = policy.attempts();

    for attempt in 0..attempts {
        socket
            .send_to(request, dest)
            .await
            .map_err(|e| Error::socket("send_to", e))?;

        let wait = policy.wait_for(attempt);
        debug!(
            "sent {} bytes to {dest}, attempt {}/{}, waiting {wait:?}",
            request.len(),
            attempt + 1,
            attempts
        );

        match socket.recv_from_within(&mut buffer, wait).await {
            Ok(Some((size, from))) if size > 0 => {
                debug!("received {size} bytes from {from}");
                if size == buffer.len() {
                    warn!("reply from {from} filled the {size} byte buffer and may be truncated");
                }
                trace!("reply: {}", String::from_utf8_lossy(&buffer[..size]));
                buffer.truncate(size);
                return Ok(buffer);
            }
            Ok(Some((_, from))) => warn!("ignoring empty datagram from {from}"),
            Ok(None) => debug!("no reply from {dest} within {wait:?}"),
            Err(e) => warn!("receive from {dest} failed: {e}"),
        }
    }

    Err(Error::TimedOut { attempts })
}
