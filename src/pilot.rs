//! Partial updates combined into one `setPilot` command.

use serde::{Deserialize, Serialize};

use crate::codec::Params;
use crate::types::{Brightness, Color, Kelvin, SceneMode};

/// An accumulator of optional pilot fields.
///
/// Each setter marks its field present; calling it again replaces the value.
/// Brightness and temperature are clamped when set. Applying the builder to
/// a [`crate::Bulb`] sends exactly the present fields in one command and
/// updates exactly those fields in the bulb's cached state.
///
/// ```
/// use cwiz::PilotBuilder;
///
/// let mut pilot = PilotBuilder::new();
/// assert!(pilot.is_empty());
///
/// pilot.speed(120).brightness(5).state(true);
/// assert_eq!(pilot.to_params(), r#"{"state":true,"dimming":10,"speed":120}"#);
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PilotBuilder {
    pub(crate) state: Option<bool>,
    pub(crate) brightness: Option<Brightness>,
    pub(crate) color: Option<Color>,
    pub(crate) temp: Option<Kelvin>,
    pub(crate) scene_id: Option<u16>,
    pub(crate) speed: Option<u8>,
}

impl PilotBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether no field has been set.
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.brightness.is_none()
            && self.color.is_none()
            && self.temp.is_none()
            && self.scene_id.is_none()
            && self.speed.is_none()
    }

    /// Set the power state.
    pub fn state(&mut self, on: bool) -> &mut Self {
        self.state = Some(on);
        self
    }

    /// Set the brightness, clamped to 10-100.
    pub fn brightness(&mut self, brightness: u8) -> &mut Self {
        self.brightness = Some(Brightness::clamped(brightness));
        self
    }

    /// Set the RGB color. Channels are sent as given.
    pub fn rgb(&mut self, red: u8, green: u8, blue: u8) -> &mut Self {
        self.color(&Color::rgb(red, green, blue))
    }

    pub fn color(&mut self, color: &Color) -> &mut Self {
        self.color = Some(*color);
        self
    }

    /// Set the color temperature, clamped to 2200-6500 K.
    pub fn temperature(&mut self, kelvin: u16) -> &mut Self {
        self.temp = Some(Kelvin::clamped(kelvin));
        self
    }

    /// Set a scene by numeric id. The id is not checked against
    /// [`SceneMode`].
    pub fn scene(&mut self, scene_id: u16) -> &mut Self {
        self.scene_id = Some(scene_id);
        self
    }

    pub fn scene_mode(&mut self, scene: &SceneMode) -> &mut Self {
        self.scene(scene.id())
    }

    /// Set the scene animation speed.
    pub fn speed(&mut self, speed: u8) -> &mut Self {
        self.speed = Some(speed);
        self
    }

    /// Serialize the present fields as a parameter object.
    ///
    /// Field order is state, dimming, r/g/b, temp, sceneId, speed. An empty
    /// builder renders as `{}`.
    pub fn to_params(&self) -> String {
        let mut params = Params::new();
        if let Some(on) = self.state {
            params.bool("state", on);
        }
        if let Some(brightness) = self.brightness {
            params.int("dimming", brightness.value());
        }
        if let Some(color) = self.color {
            params
                .int("r", color.red())
                .int("g", color.green())
                .int("b", color.blue());
        }
        if let Some(temp) = self.temp {
            params.int("temp", temp.kelvin());
        }
        if let Some(scene_id) = self.scene_id {
            params.int("sceneId", scene_id);
        }
        if let Some(speed) = self.speed {
            params.int("speed", speed);
        }
        params.finish()
    }
}

impl From<&SceneMode> for PilotBuilder {
    fn from(scene: &SceneMode) -> Self {
        let mut p = PilotBuilder::new();
        p.scene_mode(scene);
        p
    }
}

impl From<&Color> for PilotBuilder {
    fn from(color: &Color) -> Self {
        let mut p = PilotBuilder::new();
        p.color(color);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order_is_fixed() {
        let mut pilot = PilotBuilder::new();
        pilot
            .speed(50)
            .scene(4)
            .temperature(3000)
            .rgb(1, 2, 3)
            .brightness(40)
            .state(false);

        assert_eq!(
            pilot.to_params(),
            r#"{"state":false,"dimming":40,"r":1,"g":2,"b":3,"temp":3000,"sceneId":4,"speed":50}"#
        );
    }

    #[test]
    fn test_setters_replace_values() {
        let mut pilot = PilotBuilder::new();
        pilot.brightness(20).brightness(30).temperature(100);
        assert_eq!(pilot.to_params(), r#"{"dimming":30,"temp":2200}"#);
    }

    #[test]
    fn test_empty_builder() {
        let pilot = PilotBuilder::new();
        assert!(pilot.is_empty());
        assert_eq!(pilot.to_params(), "{}");
    }

    #[test]
    fn test_unknown_scene_ids_pass_through() {
        let mut pilot = PilotBuilder::from(&SceneMode::Club);
        assert_eq!(pilot.to_params(), r#"{"sceneId":26}"#);
        pilot.scene(4242);
        assert_eq!(pilot.to_params(), r#"{"sceneId":4242}"#);
    }

    #[test]
    fn test_from_color() {
        let pilot = PilotBuilder::from(&Color::rgb(128, 0, 255));
        assert!(!pilot.is_empty());
        assert_eq!(pilot.to_params(), r#"{"r":128,"g":0,"b":255}"#);
    }
}
