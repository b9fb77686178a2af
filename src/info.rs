//! Bulb identity from `getSystemConfig`.

use serde::{Deserialize, Serialize};

use crate::codec::extract_str;

/// Identity of a WiZ bulb.
///
/// Populated only by [`crate::Bulb::fetch_info`]. Grouping ids are kept as the
/// raw text the bulb reported.
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulbInfo {
    pub mac: Option<String>,
    pub module_name: Option<String>,
    pub fw_version: Option<String>,
    pub home_id: Option<String>,
    pub room_id: Option<String>,
    pub group_id: Option<String>,
}

impl BulbInfo {
    /// Extract whichever identity fields the reply carries.
    pub(crate) fn from_reply(body: &str) -> Self {
        let field = |key: &str| extract_str(body, key).map(String::from);
        BulbInfo {
            mac: field("mac"),
            module_name: field("moduleName"),
            fw_version: field("fwVersion"),
            home_id: field("homeId"),
            room_id: field("roomId"),
            group_id: field("groupId"),
        }
    }
}
