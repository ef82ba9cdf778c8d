//! Native messaging host.
//!
//! The extension forwards tab, idle and alarm events plus UI requests over
//! stdin; replies and redirects go back over stdout. Each frame is a
//! little-endian `u32` byte length followed by that many bytes of JSON.

mod messages;

pub use messages::{IncomingMessage, OutgoingMessage};

use crate::blocking::BlockRegistry;
use crate::commands::{Command, CommandHandler, CommandResponse};
use crate::config::GuardConfig;
use crate::constants::{ALARM_PERIOD_SECS, MAX_MESSAGE_SIZE, PERIODIC_SAVE_ALARM};
use crate::guard::{NavigationGuard, NavigationOutcome, TabChange};
use crate::ledger::UsageLedger;
use crate::store::Store;
use crate::tracker::ActiveSessionTracker;
use log::{debug, error, info, warn};
use std::io::{self, Read, Write};
use std::sync::Arc;

pub struct NativeHost {
    tracker: ActiveSessionTracker,
    guard: NavigationGuard,
    commands: CommandHandler,
}

impl NativeHost {
    pub fn new(store: Store, config: &GuardConfig) -> Self {
        let registry = BlockRegistry::new(store.clone());
        let ledger = UsageLedger::new(store.clone(), config.retention_days);
        let tracker = ActiveSessionTracker::new(ledger, Arc::clone(store.clock()));
        let guard = NavigationGuard::new(
            registry.clone(),
            store.clone(),
            &config.blocked_page,
            config.violation_log_cap,
        );
        Self {
            tracker,
            guard,
            commands: CommandHandler::new(registry, store),
        }
    }

    pub fn tracker(&self) -> &ActiveSessionTracker {
        &self.tracker
    }

    /// Serve the extension over stdin/stdout until it disconnects.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(&mut stdin.lock(), &mut stdout.lock())
    }

    /// Announce readiness, then handle frames until `input` closes.
    ///
    /// Undecodable frames are answered with an error message. An oversized
    /// frame or an I/O failure ends the session with an error.
    pub fn serve<R: Read, W: Write>(&mut self, input: &mut R, output: &mut W) -> io::Result<()> {
        write_message(
            output,
            &OutgoingMessage::Ready {
                alarm_name: PERIODIC_SAVE_ALARM.to_string(),
                alarm_period_secs: ALARM_PERIOD_SECS,
            },
        )?;
        info!("Native host ready");

        while let Some(frame) = read_frame(input)? {
            let reply = match serde_json::from_slice::<IncomingMessage>(&frame) {
                Ok(message) => self.handle_message(message),
                Err(e) => {
                    warn!("Undecodable message: {e}");
                    Some(OutgoingMessage::Error {
                        message: format!("Invalid message: {e}"),
                    })
                }
            };
            if let Some(reply) = reply {
                write_message(output, &reply)?;
            }
        }

        // Extension went away; keep what the current tab has accrued
        self.tracker.periodic_save();
        info!("Extension disconnected");
        Ok(())
    }

    pub fn handle_message(&mut self, message: IncomingMessage) -> Option<OutgoingMessage> {
        match message {
            IncomingMessage::TabActivated { tab_id, url } => {
                self.tracker.switch_to(tab_id, url.as_deref());
                None
            }
            IncomingMessage::TabUpdated {
                tab_id,
                status,
                changed_url,
                url,
            } => {
                let change = TabChange {
                    status,
                    url: changed_url,
                };
                match self
                    .guard
                    .on_tab_updated(tab_id, &change, url.as_deref(), &mut self.tracker)
                {
                    Ok(NavigationOutcome::Redirect { tab_id, url }) => {
                        Some(OutgoingMessage::Redirect { tab_id, url })
                    }
                    Ok(NavigationOutcome::Allowed | NavigationOutcome::Ignored) => None,
                    Err(e) => {
                        error!("Failed to check navigation in tab {tab_id}: {e}");
                        None
                    }
                }
            }
            IncomingMessage::IdleStateChanged { state } => {
                self.tracker.idle_state_changed(state);
                None
            }
            IncomingMessage::Alarm { name } => {
                if name == PERIODIC_SAVE_ALARM {
                    self.tracker.periodic_save();
                } else {
                    debug!("Ignoring alarm '{name}'");
                }
                None
            }
            IncomingMessage::Request { id, payload } => {
                let response = match Command::parse(payload) {
                    Ok(command) => self.commands.handle(command),
                    Err(reason) => {
                        warn!("Rejected request {id}: {reason}");
                        CommandResponse::failed(reason)
                    }
                };
                Some(OutgoingMessage::Response { id, response })
            }
        }
    }
}

/// Read one frame. Returns `None` when the input closes between frames; a
/// header cut off partway is an `UnexpectedEof` error.
fn read_frame<R: Read>(input: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    let mut filled = 0;
    while let Some(rest) = len_bytes.get_mut(filled..).filter(|rest| !rest.is_empty()) {
        match input.read(rest) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("Length header truncated after {filled} bytes"),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    let len = usize::try_from(u32::from_le_bytes(len_bytes))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)"),
        ));
    }

    let mut buffer = vec![0u8; len];
    input.read_exact(&mut buffer)?;
    Ok(Some(buffer))
}

fn write_message<W: Write>(output: &mut W, message: &OutgoingMessage) -> io::Result<()> {
    let json = serde_json::to_vec(message)?;
    let len = u32::try_from(json.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    output.write_all(&len.to_le_bytes())?;
    output.write_all(&json)?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::models::UsageData;
    use crate::test_utils::{setup_test_store, TEST_DATE};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn setup() -> (NativeHost, Store, Arc<ManualClock>, TempDir) {
        let (store, clock, dir) = setup_test_store();
        let host = NativeHost::new(store.clone(), &GuardConfig::default());
        (host, store, clock, dir)
    }

    fn frame(value: &Value) -> Vec<u8> {
        let body = serde_json::to_vec(value).unwrap();
        let mut bytes = u32::try_from(body.len()).unwrap().to_le_bytes().to_vec();
        bytes.extend(body);
        bytes
    }

    fn decode_all(mut bytes: &[u8]) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Some(body) = read_frame(&mut bytes).unwrap() {
            messages.push(serde_json::from_slice(&body).unwrap());
        }
        messages
    }

    #[test]
    fn test_read_frame_clean_eof() {
        let mut empty: &[u8] = &[];
        assert!(read_frame(&mut empty).unwrap().is_none());
    }

    #[test]
    fn test_read_frame_rejects_oversized() {
        let len = u32::try_from(MAX_MESSAGE_SIZE + 1).unwrap();
        let bytes = len.to_le_bytes();
        let err = read_frame(&mut &bytes[..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_read_frame_truncated_header() {
        let bytes = [7u8, 0];
        let err = read_frame(&mut &bytes[..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_read_frame_truncated_body() {
        let mut bytes = 10u32.to_le_bytes().to_vec();
        bytes.extend(b"abc");
        let err = read_frame(&mut &bytes[..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_write_message_frames_json() {
        let mut out = Vec::new();
        write_message(&mut out, &OutgoingMessage::Error { message: "x".into() }).unwrap();
        let decoded = decode_all(&out);
        assert_eq!(decoded, vec![json!({"type": "error", "message": "x"})]);
    }

    #[test]
    fn test_serve_sends_ready_first() {
        let (mut host, _store, _clock, _dir) = setup();
        let mut out = Vec::new();
        host.serve(&mut &[][..], &mut out).unwrap();

        let messages = decode_all(&out);
        assert_eq!(
            messages,
            vec![json!({"type": "ready", "alarmName": "periodicSave", "alarmPeriodSecs": 30})]
        );
    }

    #[test]
    fn test_serve_answers_garbage_and_continues() {
        let (mut host, _store, _clock, _dir) = setup();
        let mut input = 5u32.to_le_bytes().to_vec();
        input.extend(b"nope!");
        input.extend(frame(&json!({"type": "request", "id": 1, "payload": {"action": "getBlockState"}})));

        let mut out = Vec::new();
        host.serve(&mut &input[..], &mut out).unwrap();

        let messages = decode_all(&out);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["type"], "error");
        assert_eq!(messages[2]["type"], "response");
        assert_eq!(messages[2]["success"], true);
    }

    #[test]
    fn test_request_unknown_action() {
        let (mut host, _store, _clock, _dir) = setup();
        let reply = host.handle_message(IncomingMessage::Request {
            id: 9,
            payload: json!({"action": "selfDestruct"}),
        });
        assert_eq!(
            reply,
            Some(OutgoingMessage::Response {
                id: 9,
                response: CommandResponse::failed("Unknown action 'selfDestruct'"),
            })
        );
    }

    #[test]
    fn test_tab_updated_redirects_blocked_domain() {
        let (mut host, _store, _clock, _dir) = setup();
        host.handle_message(IncomingMessage::Request {
            id: 1,
            payload: json!({"action": "addPermanentBlock", "domain": "y.com"}),
        });

        let reply = host.handle_message(IncomingMessage::TabUpdated {
            tab_id: 4,
            status: Some("loading".into()),
            changed_url: Some("https://y.com/feed".into()),
            url: Some("https://y.com/feed".into()),
        });
        assert_eq!(
            reply,
            Some(OutgoingMessage::Redirect { tab_id: 4, url: "blocked.html".into() })
        );
    }

    #[test]
    fn test_alarm_flushes_only_periodic_save() {
        let (mut host, store, clock, _dir) = setup();
        host.handle_message(IncomingMessage::TabActivated {
            tab_id: 1,
            url: Some("https://github.com".into()),
        });
        clock.advance_secs(30);

        host.handle_message(IncomingMessage::Alarm { name: "somethingElse".into() });
        let usage = UsageData::load(&store).unwrap();
        assert_eq!(usage.site(TEST_DATE, "github.com").unwrap().time_spent_secs, 0);

        host.handle_message(IncomingMessage::Alarm { name: PERIODIC_SAVE_ALARM.into() });
        let usage = UsageData::load(&store).unwrap();
        assert_eq!(usage.site(TEST_DATE, "github.com").unwrap().time_spent_secs, 30);
        assert_eq!(host.tracker().state().start_time, Some(clock.now_millis()));
    }
}
