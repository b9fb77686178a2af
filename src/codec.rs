//! Wire encoding and tolerant field extraction.
//!
//! Requests are tiny and fixed in shape, so they are composed directly as
//! text. Replies are never fully parsed: individual scalar fields are pulled
//! out by key, and anything unreadable is simply reported as absent.

use std::fmt::Write;

use serde_json::Value;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Largest envelope the session will send, in bytes.
pub const MAX_MESSAGE_LEN: usize = 512;

const JSON_WS: [char; 4] = [' ', '\t', '\n', '\r'];

/// Build a command envelope bounded by [`MAX_MESSAGE_LEN`].
///
/// # Examples
///
/// ```
/// use cwiz::codec;
///
/// assert_eq!(codec::encode("getPilot", None).unwrap(), r#"{"method":"getPilot"}"#);
/// assert_eq!(
///     codec::encode("setPilot", Some(r#"{"dimming":50}"#)).unwrap(),
///     r#"{"method":"setPilot","params":{"dimming":50}}"#
/// );
/// ```
pub fn encode(method: &str, params: Option<&str>) -> Result<String> {
    encode_with_capacity(method, params, MAX_MESSAGE_LEN)
}

/// Build a command envelope that must fit in `capacity` bytes.
///
/// `params` is an already serialized object literal. An empty body is treated
/// the same as no body. Never truncates: an envelope that would not fit is
/// rejected with [`Error::MessageTooLarge`].
pub fn encode_with_capacity(method: &str, params: Option<&str>, capacity: usize) -> Result<String> {
    let envelope = match params.filter(|p| !p.is_empty()) {
        Some(params) => format!(r#"{{"method":"{method}","params":{params}}}"#),
        None => format!(r#"{{"method":"{method}"}}"#),
    };

    if envelope.len() > capacity {
        return Err(Error::MessageTooLarge {
            len: envelope.len(),
            capacity,
        });
    }
    Ok(envelope)
}

/// Incremental writer for a flat parameter object.
///
/// Fields are written in call order, comma separated, with no trailing
/// separator.
///
/// ```
/// use cwiz::codec::Params;
///
/// let mut params = Params::new();
/// params.bool("state", true).int("dimming", 40);
/// assert_eq!(params.finish(), r#"{"state":true,"dimming":40}"#);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Params {
    body: String,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(&mut self, key: &str, value: impl Into<i64>) -> &mut Self {
        self.field(key, value.into())
    }

    pub fn bool(&mut self, key: &str, value: bool) -> &mut Self {
        self.field(key, value)
    }

    /// Write a string field, quoted and escaped.
    pub fn str(&mut self, key: &str, value: &str) -> &mut Self {
        self.field(key, Value::String(value.to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn finish(&self) -> String {
        format!("{{{}}}", self.body)
    }

    fn field(&mut self, key: &str, value: impl std::fmt::Display) -> &mut Self {
        if !self.body.is_empty() {
            self.body.push(',');
        }
        // Writing into a String cannot fail.
        let _ = write!(self.body, r#""{key}":{value}"#);
        self
    }
}

/// Read an integer field.
///
/// Parsing follows leading-numeral rules: an optional sign, then digits up to
/// the first non-digit. A value with no digits reads as 0. Out-of-range
/// values saturate.
///
/// ```
/// use cwiz::codec::extract_int;
///
/// let body = r#"{"result":{"dimming": 50,"rssi":-1}}"#;
/// assert_eq!(extract_int(body, "dimming"), Some(50));
/// assert_eq!(extract_int(body, "rssi"), Some(-1));
/// assert_eq!(extract_int(body, "sceneId"), None);
/// ```
pub fn extract_int(body: &str, key: &str) -> Option<i64> {
    find_value(body, key).map(leading_int)
}

/// Read a boolean field. Anything starting with `t` or `T` is true.
pub fn extract_bool(body: &str, key: &str) -> Option<bool> {
    find_value(body, key).map(|value| value.starts_with(['t', 'T']))
}

/// Read a string or bare scalar field as raw text.
///
/// Quoted values are returned without their quotes (escapes are not
/// interpreted). Bare values run until the next separator.
pub fn extract_str<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    let value = find_value(body, key)?;
    match value.strip_prefix('"') {
        Some(quoted) => quoted.find('"').map(|end| &quoted[..end]),
        None => {
            let end = value
                .find(|c: char| matches!(c, ',' | '}' | ']') || JSON_WS.contains(&c))
                .unwrap_or(value.len());
            Some(&value[..end])
        }
    }
}

/// Locate the text following the first genuine `"key":` in `body`.
///
/// An occurrence is genuine when the nearest non-whitespace character before
/// it opens an object or separates members. Other occurrences are skipped.
fn find_value<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!(r#""{key}":"#);
    let mut from = 0;

    while let Some(pos) = body[from..].find(&needle) {
        let at = from + pos;
        if is_key_start(body, at) {
            return Some(body[at + needle.len()..].trim_start_matches(JSON_WS));
        }
        from = at + 1;
    }
    None
}

fn is_key_start(body: &str, at: usize) -> bool {
    if at == 0 {
        return true;
    }
    matches!(
        body[..at].trim_end_matches(JSON_WS).chars().last(),
        Some('{') | Some(',')
    )
}

fn leading_int(text: &str) -> i64 {
    let (negative, digits) = match text.as_bytes().split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, text.as_bytes()),
    };

    let magnitude = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}
