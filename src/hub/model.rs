//! Wire model for the hub's `/status` and new-session-queue responses
//!
//! Only the fields the collector aggregates are typed. Browser capability
//! and stereotype bags are kept as opaque JSON maps so schema drift in
//! fields we never read cannot break a decode. Every struct defaults its
//! fields, matching the leniency of the upstream schema across hub
//! versions, and every document is freshly allocated per decode.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// `{"value": {...}}` envelope around the grid status document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub value: GridStatus,
}

/// The hub's self-reported state
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridStatus {
    pub ready: bool,
    pub message: String,
    pub nodes: Vec<NodeStatus>,
}

/// One worker machine registered with the hub
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeStatus {
    pub id: String,
    pub uri: String,
    pub version: String,
    pub availability: String,
    pub max_sessions: i64,
    pub os_info: OsInfo,
    pub heartbeat_period: i64,
    pub slots: Vec<NodeSlot>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OsInfo {
    pub arch: String,
    pub name: String,
    pub version: String,
}

/// A unit of capacity on a node; occupied iff `session` is present
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeSlot {
    pub id: SlotId,
    pub last_started: Option<DateTime<Utc>>,
    pub stereotype: Stereotype,
    pub session: Option<NodeSession>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotId {
    pub host_id: String,
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stereotype {
    pub browser_name: String,
    pub platform_name: String,
}

/// An active browser session running in a slot
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeSession {
    pub session_id: String,
    pub start: Option<DateTime<Utc>>,
    pub uri: String,
    pub stereotype: Map<String, Value>,
    pub capabilities: Option<Map<String, Value>>,
}

/// `{"value": [...]}` envelope around the pending session requests
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueueResponse {
    pub value: Vec<QueueEntry>,
}

/// A session request not yet matched to a free slot
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueueEntry {
    pub request_id: String,
    pub capabilities: Vec<BrowserCapability>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowserCapability {
    pub browser_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_BODY: &str = r#"{
        "value": {
            "ready": true,
            "message": "Selenium Grid ready.",
            "nodes": [
                {
                    "id": "6cda04a4-b9b4-4ca5-a5d4-58c1fd23f9b3",
                    "uri": "http://192.168.1.10:5555",
                    "maxSessions": 2,
                    "osInfo": {
                        "arch": "amd64",
                        "name": "Linux",
                        "version": "5.15.0"
                    },
                    "heartbeatPeriod": 60000,
                    "availability": "UP",
                    "version": "4.8.0 (revision 1d1a83c)",
                    "slots": [
                        {
                            "id": {
                                "hostId": "6cda04a4-b9b4-4ca5-a5d4-58c1fd23f9b3",
                                "id": "a1f7c9d2-92f3-4a34-b1f5-0f2b3c4d5e6f"
                            },
                            "lastStarted": "2023-01-06T22:16:24.178Z",
                            "session": {
                                "capabilities": {
                                    "acceptInsecureCerts": true,
                                    "browserName": "chrome",
                                    "goog:chromeOptions": {
                                        "debuggerAddress": "localhost:33481"
                                    },
                                    "se:cdp": "ws://192.168.1.10:4444/session/abc/se/cdp",
                                    "timeouts": { "implicit": 0, "pageLoad": 300000 }
                                },
                                "sessionId": "f2a9e3c1d4b5a6f7e8d9c0b1a2f3e4d5",
                                "start": "2023-01-06T22:16:24.178Z",
                                "stereotype": {
                                    "browserName": "chrome",
                                    "platformName": "linux"
                                },
                                "uri": "http://192.168.1.10:5555"
                            },
                            "stereotype": {
                                "browserName": "chrome",
                                "platformName": "linux"
                            }
                        },
                        {
                            "id": {
                                "hostId": "6cda04a4-b9b4-4ca5-a5d4-58c1fd23f9b3",
                                "id": "b2e8d0c3-03a4-4b45-c2a6-1a3c4d5e6f70"
                            },
                            "lastStarted": "1970-01-01T00:00:00Z",
                            "session": null,
                            "stereotype": {
                                "browserName": "firefox",
                                "platformName": "linux"
                            }
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn decodes_status_document() {
        let response: StatusResponse = serde_json::from_str(STATUS_BODY).unwrap();
        let status = response.value;

        assert!(status.ready);
        assert_eq!(status.message, "Selenium Grid ready.");
        assert_eq!(status.nodes.len(), 1);

        let node = &status.nodes[0];
        assert_eq!(node.max_sessions, 2);
        assert_eq!(node.availability, "UP");
        assert_eq!(node.os_info.name, "Linux");
        assert_eq!(node.slots.len(), 2);
    }

    #[test]
    fn session_presence_is_an_option() {
        let response: StatusResponse = serde_json::from_str(STATUS_BODY).unwrap();
        let slots = &response.value.nodes[0].slots;

        let occupied = slots[0].session.as_ref().unwrap();
        assert_eq!(occupied.session_id, "f2a9e3c1d4b5a6f7e8d9c0b1a2f3e4d5");
        assert!(occupied.start.is_some());

        assert!(slots[1].session.is_none());
    }

    #[test]
    fn capability_bags_pass_through_untyped() {
        let response: StatusResponse = serde_json::from_str(STATUS_BODY).unwrap();
        let session = response.value.nodes[0].slots[0].session.as_ref().unwrap();

        let capabilities = session.capabilities.as_ref().unwrap();
        assert!(capabilities.contains_key("goog:chromeOptions"));
        assert!(capabilities.contains_key("se:cdp"));
        assert_eq!(session.stereotype["browserName"], "chrome");
    }

    #[test]
    fn missing_session_field_decodes_to_none() {
        let body = r#"{"value": {"ready": false, "nodes": [{"maxSessions": 1, "slots": [{"id": {"hostId": "h", "id": "s"}}]}]}}"#;

        let response: StatusResponse = serde_json::from_str(body).unwrap();
        assert!(!response.value.ready);
        assert!(response.value.nodes[0].slots[0].session.is_none());
    }

    #[test]
    fn empty_object_decodes_to_defaults() {
        let response: StatusResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.value.ready);
        assert!(response.value.nodes.is_empty());
    }

    #[test]
    fn decodes_queue_document() {
        let body = r#"{
            "value": [
                {
                    "capabilities": [{"browserName": "chrome"}],
                    "requestId": "de0438a7-c3b8-4d05-b348-27c0e465a85f"
                },
                {
                    "capabilities": [{"browserName": "firefox"}, {"browserName": "chrome"}],
                    "requestId": "1d24b2d2-8ee7-4c67-8y7a-5ba77e432e5e"
                }
            ]
        }"#;

        let response: QueueResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.value.len(), 2);
        assert_eq!(
            response.value[0].request_id,
            "de0438a7-c3b8-4d05-b348-27c0e465a85f"
        );
        assert_eq!(response.value[1].capabilities.len(), 2);
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert!(serde_json::from_str::<StatusResponse>("42").is_err());
        assert!(serde_json::from_str::<QueueResponse>("\"queue\"").is_err());
    }
}
