//! Individual bulb sessions.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use log::debug;

use crate::codec::{self, Params};
use crate::errors::Error;
use crate::info::BulbInfo;
use crate::pilot::PilotBuilder;
use crate::runtime::{AsyncUdpSocket, UdpSocket};
use crate::state::BulbState;
use crate::transport::{self, RetryPolicy};
use crate::types::{Brightness, ColorRGBWW, Kelvin, PowerMode};
use crate::PORT;

type Result<T> = std::result::Result<T, Error>;

/// A session with a single WiZ bulb.
///
/// A `Bulb` owns one UDP socket for its whole life and talks to one address
/// on the protocol port. It keeps a cached [`BulbState`], updated after every
/// acknowledged command and merged on [`Bulb::refresh_state`], plus the
/// [`BulbInfo`] returned by [`Bulb::fetch_info`].
///
/// Every operation takes `&mut self`, so a session never has more than one
/// request in flight. Share a session between tasks behind a mutex.
///
/// # Example
///
/// ```no_run
/// use cwiz::Bulb;
///
/// # async fn run() -> Result<(), cwiz::Error> {
/// let mut bulb = Bulb::create("192.168.1.100").await?;
/// bulb.set_brightness(60).await?;
/// bulb.refresh_state().await?;
/// println!("on: {}", bulb.state().emitting());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bulb<S: AsyncUdpSocket = UdpSocket> {
    addr: SocketAddrV4,
    socket: S,
    policy: RetryPolicy,
    state: BulbState,
    info: Option<BulbInfo>,
}

impl Bulb<UdpSocket> {
    /// Open a session for a dotted IPv4 address such as `"192.168.1.100"`.
    ///
    /// The address is validated before any socket is opened.
    pub async fn create(ip_address: &str) -> Result<Self> {
        let ip: Ipv4Addr = ip_address
            .parse()
            .map_err(|_| Error::invalid_address(ip_address))?;
        Self::new(ip).await
    }

    /// Open a session for `ip` with the default retry policy.
    pub async fn new(ip: Ipv4Addr) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
            .await
            .map_err(|e| Error::socket("bind", e))?;
        Ok(Self::with_socket(ip, socket, RetryPolicy::default()))
    }
}

impl<S: AsyncUdpSocket> Bulb<S> {
    /// Build a session around an already open socket.
    pub fn with_socket(ip: Ipv4Addr, socket: S, policy: RetryPolicy) -> Self {
        Bulb {
            addr: SocketAddrV4::new(ip, PORT),
            socket,
            policy,
            state: BulbState::default(),
            info: None,
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        *self.addr.ip()
    }

    pub fn addr(&self) -> SocketAddrV4 {
        self.addr
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The cached state. No network traffic; may be stale.
    pub fn state(&self) -> &BulbState {
        &self.state
    }

    /// Identity from the last [`Bulb::fetch_info`], if any.
    pub fn info(&self) -> Option<&BulbInfo> {
        self.info.as_ref()
    }

    pub async fn turn_on(&mut self) -> Result<()> {
        self.set_power(PowerMode::On).await
    }

    pub async fn turn_off(&mut self) -> Result<()> {
        self.set_power(PowerMode::Off).await
    }

    pub async fn set_power(&mut self, power: PowerMode) -> Result<()> {
        let mut pilot = PilotBuilder::new();
        pilot.state(power.is_on());
        self.apply(&pilot).await
    }

    /// Set brightness, clamped to 10-100. Also turns the light on.
    pub async fn set_brightness(&mut self, brightness: u8) -> Result<()> {
        let mut pilot = PilotBuilder::new();
        pilot.brightness(brightness);
        self.apply(&pilot).await?;
        self.state.set_emitting(true);
        Ok(())
    }

    /// Set an RGB color. Channels are sent as given.
    pub async fn set_rgb(&mut self, red: u8, green: u8, blue: u8) -> Result<()> {
        let mut pilot = PilotBuilder::new();
        pilot.rgb(red, green, blue);
        self.apply(&pilot).await
    }

    /// Set RGB plus explicit cool and warm white channels.
    pub async fn set_rgbcw(&mut self, color: ColorRGBWW) -> Result<()> {
        let mut params = Params::new();
        params
            .int("r", color.red)
            .int("g", color.green)
            .int("b", color.blue)
            .int("c", color.cool)
            .int("w", color.warm);

        self.send_command("setPilot", Some(&params.finish())).await?;
        self.state.set_rgbcw(color);
        Ok(())
    }

    /// Set the color temperature, clamped to 2200-6500 K.
    pub async fn set_temperature(&mut self, kelvin: u16) -> Result<()> {
        let mut pilot = PilotBuilder::new();
        pilot.temperature(kelvin);
        self.apply(&pilot).await
    }

    /// Start a scene. Ids outside [`crate::SceneMode`] are sent anyway.
    pub async fn set_scene(&mut self, scene_id: u16) -> Result<()> {
        let mut pilot = PilotBuilder::new();
        pilot.scene(scene_id);
        self.apply(&pilot).await
    }

    /// Send every field present in `pilot` as one `setPilot` command.
    ///
    /// On acknowledgment, exactly those fields are updated in the cache. An
    /// empty builder is rejected without touching the network.
    pub async fn apply(&mut self, pilot: &PilotBuilder) -> Result<()> {
        if pilot.is_empty() {
            return Err(Error::NoAttribute);
        }

        self.send_command("setPilot", Some(&pilot.to_params())).await?;
        self.state.update_from_pilot(pilot);
        Ok(())
    }

    /// Query the bulb and merge the fields it reports into the cache.
    pub async fn refresh_state(&mut self) -> Result<&BulbState> {
        let reply = self.send_command("getPilot", None).await?;
        ensure_object(&reply)?;
        self.state.merge_reply(&reply);
        Ok(&self.state)
    }

    /// Query the bulb's identity (`getSystemConfig`).
    pub async fn fetch_info(&mut self) -> Result<&BulbInfo> {
        let reply = self.send_command("getSystemConfig", None).await?;
        ensure_object(&reply)?;
        Ok(&*self.info.insert(BulbInfo::from_reply(&reply)))
    }

    async fn send_command(&self, method: &str, params: Option<&str>) -> Result<String> {
        let msg = codec::encode(method, params)?;
        debug!("{} <- {}", self.addr, msg);

        let reply = transport::send_and_await(
            &self.socket,
            SocketAddr::V4(self.addr),
            msg.as_bytes(),
            &self.policy,
        )
        .await?;

        String::from_utf8(reply).map_err(Error::Utf8Decode)
    }
}

/// A query reply that is not even object-shaped cannot be read.
fn ensure_object(reply: &str) -> Result<()> {
    if reply.trim_start().starts_with('{') {
        Ok(())
    } else {
        Err(Error::MalformedReply(reply.chars().take(64).collect()))
    }
}

/// Clamp a brightness value the way the session does before sending.
pub fn clamp_brightness(value: u8) -> u8 {
    Brightness::clamped(value).value()
}

/// Clamp a color temperature the way the session does before sending.
pub fn clamp_temperature(kelvin: u16) -> u16 {
    Kelvin::clamped(kelvin).kelvin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::runtime::mock::MockSocket;
    use crate::types::Color;

    const ACK: &str = r#"{"method":"setPilot","env":"pro","result":{"success":true}}"#;
    const PILOT: &str = r#"{"method":"getPilot","env":"pro","result":{"mac":"a8bb50d46a1c","rssi":-70,"src":"","state":false,"sceneId":11,"speed":100,"temp":3000,"dimming":40,"r":0,"g":0,"b":0}}"#;

    fn bulb() -> (Bulb<MockSocket>, MockSocket) {
        let socket = MockSocket::new();
        let bulb = Bulb::with_socket(
            Ipv4Addr::new(192, 168, 1, 20),
            socket.clone(),
            RetryPolicy::default(),
        );
        (bulb, socket)
    }

    fn last_sent(socket: &MockSocket) -> String {
        socket.sent().last().map(|(msg, _)| msg.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_set_brightness_clamps_and_turns_on() {
        let (mut bulb, socket) = bulb();
        socket.reply("anything at all");

        bulb.set_brightness(5).await.unwrap();

        let sent = socket.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, r#"{"method":"setPilot","params":{"dimming":10}}"#);
        assert_eq!(sent[0].1, "192.168.1.20:38899".parse().unwrap());
        assert_eq!(bulb.state().brightness().value(), 10);
        assert!(bulb.state().emitting());
    }

    #[tokio::test]
    async fn test_power() {
        let (mut bulb, socket) = bulb();
        socket.reply(ACK).reply(ACK);

        bulb.turn_on().await.unwrap();
        assert_eq!(last_sent(&socket), r#"{"method":"setPilot","params":{"state":true}}"#);
        assert!(bulb.state().emitting());

        bulb.turn_off().await.unwrap();
        assert_eq!(last_sent(&socket), r#"{"method":"setPilot","params":{"state":false}}"#);
        assert!(!bulb.state().emitting());
    }

    #[tokio::test]
    async fn test_set_temperature_and_scene() {
        let (mut bulb, socket) = bulb();
        socket.reply(ACK).reply(ACK);

        bulb.set_temperature(9000).await.unwrap();
        assert_eq!(last_sent(&socket), r#"{"method":"setPilot","params":{"temp":6500}}"#);
        assert_eq!(bulb.state().temp().kelvin(), 6500);

        bulb.set_scene(999).await.unwrap();
        assert_eq!(last_sent(&socket), r#"{"method":"setPilot","params":{"sceneId":999}}"#);
        assert_eq!(bulb.state().scene_id(), 999);
    }

    #[tokio::test]
    async fn test_set_rgb_and_rgbcw() {
        let (mut bulb, socket) = bulb();
        socket.reply(ACK).reply(ACK);

        bulb.set_rgb(255, 0, 7).await.unwrap();
        assert_eq!(
            last_sent(&socket),
            r#"{"method":"setPilot","params":{"r":255,"g":0,"b":7}}"#
        );
        assert_eq!(bulb.state().color(), Color::rgb(255, 0, 7));

        let five = ColorRGBWW::from_rgb_and_temperature(Color::rgb(1, 2, 3), 6500);
        bulb.set_rgbcw(five).await.unwrap();
        assert_eq!(
            last_sent(&socket),
            r#"{"method":"setPilot","params":{"r":1,"g":2,"b":3,"c":255,"w":0}}"#
        );
        assert_eq!(bulb.state().rgbcw(), five);
        assert_eq!(bulb.state().color(), Color::rgb(1, 2, 3));
    }

    #[tokio::test]
    async fn test_set_rgb_after_rgbcw_keeps_one_color() {
        let (mut bulb, socket) = bulb();
        socket.reply(ACK).reply(ACK);

        bulb.set_rgbcw(ColorRGBWW::new(1, 2, 3, 0, 255)).await.unwrap();
        bulb.set_rgb(200, 100, 50).await.unwrap();

        let state = bulb.state();
        assert_eq!(state.color(), Color::rgb(200, 100, 50));
        assert_eq!(state.rgbcw().to_rgb(), state.color());
        assert_eq!((state.rgbcw().cool, state.rgbcw().warm), (0, 255));
    }

    #[tokio::test]
    async fn test_deserialized_pilot_is_clamped() {
        let (mut bulb, socket) = bulb();
        socket.reply(ACK);

        let pilot: PilotBuilder =
            serde_json::from_str(r#"{"brightness":5,"temp":100}"#).unwrap();
        bulb.apply(&pilot).await.unwrap();

        assert_eq!(
            last_sent(&socket),
            r#"{"method":"setPilot","params":{"dimming":10,"temp":2200}}"#
        );
        assert_eq!(bulb.state().brightness().value(), 10);
        assert_eq!(bulb.state().temp().kelvin(), 2200);
    }

    #[tokio::test]
    async fn test_timeout_leaves_cache_untouched() {
        let (mut bulb, socket) = bulb();
        socket.reply(PILOT);
        bulb.refresh_state().await.unwrap();
        let before = bulb.state().clone();

        let err = bulb.set_brightness(80).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
        assert_eq!(bulb.state(), &before);
        // one getPilot plus six setPilot attempts
        assert_eq!(socket.sent().len(), 7);
    }

    #[tokio::test]
    async fn test_apply_updates_only_present_fields() {
        let (mut bulb, socket) = bulb();
        socket.reply(PILOT).reply(ACK);
        bulb.refresh_state().await.unwrap();

        let mut pilot = PilotBuilder::new();
        pilot.brightness(75).rgb(128, 0, 255);
        bulb.apply(&pilot).await.unwrap();

        assert_eq!(
            last_sent(&socket),
            r#"{"method":"setPilot","params":{"dimming":75,"r":128,"g":0,"b":255}}"#
        );
        let state = bulb.state();
        assert_eq!(state.brightness().value(), 75);
        assert_eq!(state.color(), Color::rgb(128, 0, 255));
        assert_eq!(state.temp().kelvin(), 3000);
        assert_eq!(state.scene_id(), 11);
        assert!(!state.emitting());
    }

    #[tokio::test]
    async fn test_apply_empty_is_rejected_before_io() {
        let (mut bulb, socket) = bulb();
        let err = bulb.apply(&PilotBuilder::new()).await.unwrap_err();
        assert_eq!(err, Error::NoAttribute);
        assert!(socket.sent().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_state_is_sparse() {
        let (mut bulb, socket) = bulb();
        socket
            .reply(PILOT)
            .reply(r#"{"method":"getPilot","result":{"dimming":90,"rssi":-1}}"#);

        bulb.refresh_state().await.unwrap();
        assert_eq!(last_sent(&socket), r#"{"method":"getPilot"}"#);
        assert_eq!(bulb.state().rssi(), Some(-70));

        let state = bulb.refresh_state().await.unwrap();
        assert_eq!(state.brightness().value(), 90);
        assert_eq!(state.rssi(), Some(-1));
        assert_eq!(state.temp().kelvin(), 3000);
        assert_eq!(state.scene_id(), 11);
    }

    #[tokio::test]
    async fn test_refresh_rejects_unreadable_reply() {
        let (mut bulb, socket) = bulb();
        socket.reply("garbage");
        let err = bulb.refresh_state().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[tokio::test]
    async fn test_fetch_info() {
        let (mut bulb, socket) = bulb();
        assert!(bulb.info().is_none());
        socket.reply(r#"{"result":{"mac":"a8bb50d46a1c","moduleName":"ESP01_SHRGB1C_31","fwVersion":"1.21.0"}}"#);

        let info = bulb.fetch_info().await.unwrap();
        assert_eq!(info.module_name.as_deref(), Some("ESP01_SHRGB1C_31"));
        assert_eq!(last_sent(&socket), r#"{"method":"getSystemConfig"}"#);
        assert_eq!(bulb.info().and_then(|i| i.mac.as_deref()), Some("a8bb50d46a1c"));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_address() {
        for bad in ["", "192.168.1", "256.1.1.1", "bulb.local"] {
            let err = Bulb::create(bad).await.unwrap_err();
            assert_eq!(err, Error::invalid_address(bad));
        }
    }

    #[test]
    fn test_clamp_helpers() {
        assert_eq!(clamp_brightness(0), 10);
        assert_eq!(clamp_brightness(101), 100);
        assert_eq!(clamp_temperature(2199), 2200);
        assert_eq!(clamp_temperature(6501), 6500);
    }
}
