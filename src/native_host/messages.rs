use crate::commands::CommandResponse;
use crate::tracker::IdleState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Browser events and UI requests forwarded by the extension.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IncomingMessage {
    #[serde(rename_all = "camelCase")]
    TabActivated {
        tab_id: i64,
        #[serde(default)]
        url: Option<String>,
    },
    /// `changedUrl` is only set when the update changed the URL; `url` is
    /// the tab's current URL.
    #[serde(rename_all = "camelCase")]
    TabUpdated {
        tab_id: i64,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        changed_url: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
    IdleStateChanged { state: IdleState },
    Alarm { name: String },
    Request { id: u64, payload: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutgoingMessage {
    #[serde(rename_all = "camelCase")]
    Ready {
        alarm_name: String,
        alarm_period_secs: u32,
    },
    #[serde(rename_all = "camelCase")]
    Redirect { tab_id: i64, url: String },
    Response {
        id: u64,
        #[serde(flatten)]
        response: CommandResponse,
    },
    Error { message: String },
}
