//! Client and wire model for the Selenium Grid hub HTTP API

mod client;
mod model;

pub use client::{FetchError, HubClient};
pub use model::{
    BrowserCapability, GridStatus, NodeSession, NodeSlot, NodeStatus, OsInfo, QueueEntry,
    QueueResponse, SlotId, StatusResponse, Stereotype,
};
