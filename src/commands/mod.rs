// src/commands/mod.rs
//
// Requests sent by the popup and the options page, and their handling.

mod dtos;

pub use dtos::*;

use crate::blocking::BlockRegistry;
use crate::clock::Clock;
use crate::error::AppError;
use crate::models::ViolationLog;
use crate::pin::PinGate;
use crate::stats::{load_daily_report, load_weekly_report};
use crate::store::Store;
use crate::validation::{validate_date, validate_domain, validate_domains};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Every action the UI may request, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    BlockSite { domain: String, duration_minutes: i64 },
    #[serde(rename_all = "camelCase")]
    StartFocusSession { domains: Vec<String>, duration_minutes: i64 },
    CancelTimedBlock { domain: String },
    AddPermanentBlock { domain: String },
    RemovePermanentBlock { domain: String },
    GetBlockState,
    GetViolationLog,
    GetDailyReport {
        #[serde(default)]
        date: Option<String>,
    },
    GetWeeklyReport,
    GetPinStatus,
    UnlockDashboard { pin: String },
}

const ACTIONS: &[&str] = &[
    "blockSite",
    "startFocusSession",
    "cancelTimedBlock",
    "addPermanentBlock",
    "removePermanentBlock",
    "getBlockState",
    "getViolationLog",
    "getDailyReport",
    "getWeeklyReport",
    "getPinStatus",
    "unlockDashboard",
];

impl Command {
    /// Decode a request payload, naming the action in every rejection.
    pub fn parse(payload: Value) -> Result<Self, String> {
        let action = match payload.get("action") {
            Some(Value::String(action)) => action.clone(),
            Some(_) => return Err("'action' must be a string".to_string()),
            None => return Err("Missing 'action'".to_string()),
        };
        if !ACTIONS.contains(&action.as_str()) {
            return Err(format!("Unknown action '{action}'"));
        }
        serde_json::from_value(payload).map_err(|e| format!("Invalid payload for '{action}': {e}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CommandResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    pub fn with_data<T: Serialize>(data: &T) -> Result<Self, AppError> {
        Ok(Self {
            success: true,
            error: None,
            data: Some(serde_json::to_value(data)?),
        })
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            data: None,
        }
    }
}

pub struct CommandHandler {
    registry: BlockRegistry,
    pin_gate: PinGate,
    store: Store,
    clock: Arc<dyn Clock>,
}

impl CommandHandler {
    pub fn new(registry: BlockRegistry, store: Store) -> Self {
        Self {
            registry,
            pin_gate: PinGate::new(store.clone()),
            clock: Arc::clone(store.clock()),
            store,
        }
    }

    pub fn handle(&self, command: Command) -> CommandResponse {
        self.execute(command).unwrap_or_else(|e| {
            warn!("Command failed: {e}");
            CommandResponse::failed(e)
        })
    }

    fn execute(&self, command: Command) -> Result<CommandResponse, AppError> {
        match command {
            Command::BlockSite { domain, duration_minutes } => {
                let domain = validate_domain(&domain)?;
                let expires_at = self.registry.add_temporary_block(&domain, duration_minutes)?;
                CommandResponse::with_data(&BlockedUntilResponse { expires_at })
            }
            Command::StartFocusSession { domains, duration_minutes } => {
                let domains = validate_domains(&domains)?;
                let expires_at = self.registry.start_focus_session(&domains, duration_minutes)?;
                CommandResponse::with_data(&BlockedUntilResponse { expires_at })
            }
            Command::CancelTimedBlock { domain } => {
                let domain = validate_domain(&domain)?;
                if self.registry.cancel_temporary_block(&domain)? {
                    Ok(CommandResponse::ok())
                } else {
                    Ok(CommandResponse::failed(format!("No timed block on {domain}")))
                }
            }
            Command::AddPermanentBlock { domain } => {
                let domain = validate_domain(&domain)?;
                self.registry.add_permanent_block(&domain)?;
                Ok(CommandResponse::ok())
            }
            Command::RemovePermanentBlock { domain } => {
                let domain = validate_domain(&domain)?;
                self.registry.remove_permanent_block(&domain)?;
                Ok(CommandResponse::ok())
            }
            Command::GetBlockState => CommandResponse::with_data(&BlockStateResponse {
                permanent: self.registry.permanent_blocks()?,
                timed: self.registry.active_timed_blocks()?,
                focus_session_end_time: self.registry.focus_session_end_time()?,
            }),
            Command::GetViolationLog => {
                CommandResponse::with_data(&ViolationLog::load(&self.store)?)
            }
            Command::GetDailyReport { date } => {
                let date = match date {
                    Some(date) => validate_date(&date)?.to_string(),
                    None => self.clock.today(),
                };
                CommandResponse::with_data(&load_daily_report(&self.store, &date)?)
            }
            Command::GetWeeklyReport => CommandResponse::with_data(&load_weekly_report(&self.store)?),
            Command::GetPinStatus => CommandResponse::with_data(&PinStatusResponse {
                has_pin: self.pin_gate.has_pin()?,
            }),
            Command::UnlockDashboard { pin } => {
                let unlocked = self.pin_gate.unlock(&pin)?;
                CommandResponse::with_data(&UnlockResponse { unlocked })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ledger::UsageLedger;
    use crate::test_utils::{setup_test_store, TEST_DATE, TEST_START_MS};
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (CommandHandler, Store, Arc<ManualClock>, TempDir) {
        let (store, clock, dir) = setup_test_store();
        let handler = CommandHandler::new(BlockRegistry::new(store.clone()), store.clone());
        (handler, store, clock, dir)
    }

    fn run(handler: &CommandHandler, payload: Value) -> CommandResponse {
        handler.handle(Command::parse(payload).unwrap())
    }

    #[test]
    fn test_parse_block_site() {
        let command = Command::parse(json!({
            "action": "blockSite", "domain": "x.com", "durationMinutes": 10
        }))
        .unwrap();
        assert_eq!(
            command,
            Command::BlockSite { domain: "x.com".into(), duration_minutes: 10 }
        );
    }

    #[test]
    fn test_parse_unit_and_optional_fields() {
        assert_eq!(Command::parse(json!({"action": "getBlockState"})).unwrap(), Command::GetBlockState);
        assert_eq!(
            Command::parse(json!({"action": "getDailyReport"})).unwrap(),
            Command::GetDailyReport { date: None }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let err = Command::parse(json!({"action": "deleteEverything"})).unwrap_err();
        assert_eq!(err, "Unknown action 'deleteEverything'");
    }

    #[test]
    fn test_parse_rejects_missing_action() {
        assert!(Command::parse(json!({"domain": "x.com"})).is_err());
        assert!(Command::parse(json!({"action": 3})).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let err = Command::parse(json!({"action": "blockSite", "domain": "x.com"})).unwrap_err();
        assert!(err.starts_with("Invalid payload for 'blockSite'"), "got {err}");
    }

    #[test]
    fn test_block_site_blocks_until_expiry() {
        let (handler, _store, _clock, _dir) = setup();
        let response = run(&handler, json!({"action": "blockSite", "domain": "www.X.com", "durationMinutes": 10}));

        assert!(response.success);
        assert_eq!(response.data, Some(json!({"expiresAt": TEST_START_MS + 600_000})));
        assert!(handler.registry.is_blocked("x.com").unwrap().is_blocked());
    }

    #[test]
    fn test_block_site_rejects_non_positive_duration() {
        let (handler, store, _clock, _dir) = setup();
        let response = run(&handler, json!({"action": "blockSite", "domain": "x.com", "durationMinutes": 0}));

        assert!(!response.success);
        assert!(response.error.unwrap().contains("durationMinutes"));
        assert!(store.get::<Value>(crate::store::StoreKey::TempBlocklist).unwrap().is_none());
    }

    #[test]
    fn test_start_focus_session() {
        let (handler, _store, _clock, _dir) = setup();
        let response = run(
            &handler,
            json!({"action": "startFocusSession", "domains": ["a.com", "b.com"], "durationMinutes": 25}),
        );

        assert!(response.success);
        let timed = handler.registry.active_timed_blocks().unwrap();
        assert_eq!(timed.len(), 2);
        assert!(timed.iter().all(|b| b.expires_at == TEST_START_MS + 25 * 60_000));
    }

    #[test]
    fn test_start_focus_session_requires_domains() {
        let (handler, _store, _clock, _dir) = setup();
        let response = run(
            &handler,
            json!({"action": "startFocusSession", "domains": [], "durationMinutes": 25}),
        );
        assert!(!response.success);
    }

    #[test]
    fn test_cancel_timed_block() {
        let (handler, _store, _clock, _dir) = setup();
        run(&handler, json!({"action": "blockSite", "domain": "x.com", "durationMinutes": 10}));

        assert!(run(&handler, json!({"action": "cancelTimedBlock", "domain": "x.com"})).success);
        let again = run(&handler, json!({"action": "cancelTimedBlock", "domain": "x.com"}));
        assert!(!again.success);
    }

    #[test]
    fn test_permanent_block_add_and_remove() {
        let (handler, _store, _clock, _dir) = setup();
        assert!(run(&handler, json!({"action": "addPermanentBlock", "domain": "y.com"})).success);
        assert!(run(&handler, json!({"action": "addPermanentBlock", "domain": "y.com"})).success);
        assert_eq!(handler.registry.permanent_blocks().unwrap(), vec!["y.com".to_string()]);

        assert!(run(&handler, json!({"action": "removePermanentBlock", "domain": "y.com"})).success);
        assert!(handler.registry.permanent_blocks().unwrap().is_empty());
    }

    #[test]
    fn test_get_block_state() {
        let (handler, _store, clock, _dir) = setup();
        run(&handler, json!({"action": "addPermanentBlock", "domain": "y.com"}));
        run(&handler, json!({"action": "blockSite", "domain": "x.com", "durationMinutes": 1}));
        clock.advance_secs(30);

        let response = run(&handler, json!({"action": "getBlockState"}));
        let data = response.data.unwrap();
        assert_eq!(data["permanent"], json!(["y.com"]));
        assert_eq!(data["timed"][0]["domain"], "x.com");
        assert_eq!(data["timed"][0]["remainingSecs"], 30);
        assert_eq!(data["focusSessionEndTime"], TEST_START_MS + 60_000);
    }

    #[test]
    fn test_get_daily_report_defaults_to_today() {
        let (handler, store, clock, _dir) = setup();
        let ledger = UsageLedger::new(store, 7);
        let start = clock.now_millis();
        clock.advance_secs(90);
        ledger.accumulate(Some("github.com"), Some(start), None).unwrap();

        let response = run(&handler, json!({"action": "getDailyReport"}));
        let data = response.data.unwrap();
        assert_eq!(data["date"], TEST_DATE);
        assert_eq!(data["totalTimeSecs"], 90);

        let bad = run(&handler, json!({"action": "getDailyReport", "date": "21/09/2025"}));
        assert!(!bad.success);
    }

    #[test]
    fn test_unlock_dashboard() {
        let (handler, _store, _clock, _dir) = setup();
        let first = run(&handler, json!({"action": "unlockDashboard", "pin": "1234"}));
        assert_eq!(first.data, Some(json!({"unlocked": true})));

        let wrong = run(&handler, json!({"action": "unlockDashboard", "pin": "0000"}));
        assert!(wrong.success);
        assert_eq!(wrong.data, Some(json!({"unlocked": false})));
    }

    #[test]
    fn test_pin_status_tracks_first_unlock() {
        let (handler, _store, _clock, _dir) = setup();
        let before = run(&handler, json!({"action": "getPinStatus"}));
        assert_eq!(before.data, Some(json!({"hasPin": false})));

        run(&handler, json!({"action": "unlockDashboard", "pin": "1234"}));
        let after = run(&handler, json!({"action": "getPinStatus"}));
        assert_eq!(after.data, Some(json!({"hasPin": true})));
    }

    #[test]
    fn test_every_listed_action_parses() {
        for action in ACTIONS {
            let payload = json!({
                "action": action,
                "domain": "x.com",
                "domains": ["x.com"],
                "durationMinutes": 5,
                "pin": "1234",
            });
            assert!(Command::parse(payload).is_ok(), "'{action}' should parse");
        }
    }

    #[test]
    fn test_response_shape() {
        let json = serde_json::to_value(CommandResponse::ok()).unwrap();
        assert_eq!(json, json!({"success": true}));
        let json = serde_json::to_value(CommandResponse::failed("nope")).unwrap();
        assert_eq!(json, json!({"success": false, "error": "nope"}));
    }
}
