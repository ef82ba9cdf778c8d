// src/commands/dtos.rs

use crate::models::TimedBlock;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedUntilResponse {
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStateResponse {
    pub permanent: Vec<String>,
    pub timed: Vec<TimedBlock>,
    /// Most recent timed block or focus session end, epoch ms
    pub focus_session_end_time: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub unlocked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinStatusResponse {
    pub has_pin: bool,
}
