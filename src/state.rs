//! Cached bulb state.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec::{extract_bool, extract_int, extract_str};
use crate::pilot::PilotBuilder;
use crate::types::{Brightness, Color, ColorRGBWW, Kelvin};

/// Last known settings of a bulb.
///
/// The snapshot is a cache. Commands update it once the bulb acknowledges
/// them, without checking that the bulb applied the exact values, and a
/// state refresh only overwrites the fields present in the bulb's reply.
/// It can therefore be stale or partially stale.
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct BulbState {
    emitting: bool,
    brightness: Brightness,
    scene_id: u16,
    speed: u8,
    temp: Kelvin,
    color: Color,
    rgbcw: ColorRGBWW,
    src: Option<String>,
    rssi: Option<i32>,
}

impl BulbState {
    /// Whether the light is on.
    pub fn emitting(&self) -> bool {
        self.emitting
    }

    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Active scene id, 0 when no scene is running.
    pub fn scene_id(&self) -> u16 {
        self.scene_id
    }

    /// Scene animation speed.
    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn temp(&self) -> Kelvin {
        self.temp
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// RGB plus cool and warm white channels.
    pub fn rgbcw(&self) -> ColorRGBWW {
        self.rgbcw
    }

    /// What caused the last change, as reported by the bulb (e.g. "udp").
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Signal strength in dBm from the last refresh.
    pub fn rssi(&self) -> Option<i32> {
        self.rssi
    }

    pub(crate) fn set_emitting(&mut self, on: bool) {
        self.emitting = on;
    }

    pub(crate) fn set_rgbcw(&mut self, rgbcw: ColorRGBWW) {
        self.color = rgbcw.to_rgb();
        self.rgbcw = rgbcw;
    }

    /// Record the fields of an acknowledged pilot command.
    pub(crate) fn update_from_pilot(&mut self, pilot: &PilotBuilder) {
        if let Some(on) = pilot.state {
            self.emitting = on;
        }
        if let Some(brightness) = pilot.brightness {
            self.brightness = brightness;
        }
        if let Some(color) = pilot.color {
            self.color = color;
            self.rgbcw.red = color.red;
            self.rgbcw.green = color.green;
            self.rgbcw.blue = color.blue;
        }
        if let Some(temp) = pilot.temp {
            self.temp = temp;
        }
        if let Some(scene_id) = pilot.scene_id {
            self.scene_id = scene_id;
        }
        if let Some(speed) = pilot.speed {
            self.speed = speed;
        }
    }

    /// Merge the fields present in a `getPilot` reply.
    ///
    /// Absent fields keep their cached value. Readings outside a field's
    /// domain are clamped into it. Returns how many fields were merged.
    pub(crate) fn merge_reply(&mut self, body: &str) -> usize {
        let mut merged = 0;

        if let Some(on) = extract_bool(body, "state") {
            self.emitting = on;
            merged += 1;
        }
        if let Some(dimming) = extract_int(body, "dimming") {
            self.brightness = Brightness::from_reading(dimming);
            merged += 1;
        }
        if let Some(temp) = extract_int(body, "temp") {
            self.temp = Kelvin::from_reading(temp);
            merged += 1;
        }
        if let Some(scene_id) = extract_int(body, "sceneId") {
            self.scene_id = scene_id.clamp(0, i64::from(u16::MAX)) as u16;
            merged += 1;
        }
        if let Some(speed) = extract_int(body, "speed") {
            self.speed = channel(speed);
            merged += 1;
        }
        if let Some(red) = extract_int(body, "r") {
            self.color.red = channel(red);
            self.rgbcw.red = channel(red);
            merged += 1;
        }
        if let Some(green) = extract_int(body, "g") {
            self.color.green = channel(green);
            self.rgbcw.green = channel(green);
            merged += 1;
        }
        if let Some(blue) = extract_int(body, "b") {
            self.color.blue = channel(blue);
            self.rgbcw.blue = channel(blue);
            merged += 1;
        }
        if let Some(cool) = extract_int(body, "c") {
            self.rgbcw.cool = channel(cool);
            merged += 1;
        }
        if let Some(warm) = extract_int(body, "w") {
            self.rgbcw.warm = channel(warm);
            merged += 1;
        }
        if let Some(rssi) = extract_int(body, "rssi") {
            self.rssi = Some(rssi.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32);
            merged += 1;
        }
        if let Some(src) = extract_str(body, "src") {
            self.src = Some(src.to_string());
            merged += 1;
        }

        debug!("merged {merged} fields from state reply");
        merged
    }
}

fn channel(value: i64) -> u8 {
    value.clamp(0, i64::from(u8::MAX)) as u8
}
