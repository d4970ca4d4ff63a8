//! The collection-and-aggregation routine behind each scrape
//!
//! One scrape drives one [`GridCollector::collect`] cycle: fetch the two
//! hub documents, decode each independently, fold the node/slot/session
//! tree into scalar aggregates, and report the outcome as a fixed set of
//! gauges. Upstream failures never fail the scrape; they are encoded in
//! the emitted (or deliberately omitted) gauge values.

use prometheus::{IntGauge, Opts, Registry};
use tracing::{debug, warn};

use crate::hub::{GridStatus, HubClient, QueueResponse, StatusResponse};

const NAMESPACE: &str = "selenium_grid";

/// Gauges produced by one collection cycle.
///
/// `None` means the gauge is omitted from the scrape entirely rather than
/// reported as zero: a hub we could not reach has an unknown node count,
/// not a node count of zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GridObservations {
    pub hub_accessible: i64,
    pub deserialization_error: Option<i64>,
    pub ready: Option<i64>,
    pub num_nodes: Option<i64>,
    pub max_sessions_aggregated: Option<i64>,
    pub num_sessions_aggregated: Option<i64>,
    pub queue_deserialization_error: Option<i64>,
    pub queue_size: Option<i64>,
}

impl GridObservations {
    /// Build a fresh registry holding only the gauges present this cycle.
    ///
    /// A per-scrape registry keeps omission semantics exact and lets
    /// overlapping scrapes proceed without any shared mutable gauge state.
    pub fn to_registry(&self) -> Result<Registry, prometheus::Error> {
        let registry = Registry::new();

        register_gauge(
            &registry,
            "accessible",
            "Set to 1 if the last ping to the hub was successful, and 0 otherwise",
            Some(self.hub_accessible),
        )?;
        register_gauge(
            &registry,
            "deserialization_error",
            "Set to 1 if there was an error deserializing the last status response from the hub, and 0 otherwise",
            self.deserialization_error,
        )?;
        register_gauge(
            &registry,
            "ready",
            "Set to 1 if the hub indicates it is ready to receive requests, and 0 otherwise",
            self.ready,
        )?;
        register_gauge(
            &registry,
            "num_nodes",
            "The current number of nodes within the Selenium Grid cluster",
            self.num_nodes,
        )?;
        register_gauge(
            &registry,
            "num_sessions_aggregated",
            "The aggregated number of sessions running within this Selenium Grid cluster",
            self.num_sessions_aggregated,
        )?;
        register_gauge(
            &registry,
            "max_sessions_aggregated",
            "The aggregated maximum number of sessions able to be run within this Selenium Grid cluster",
            self.max_sessions_aggregated,
        )?;
        register_gauge(
            &registry,
            "queue_size",
            "The size of the new session queue within your Selenium Grid hub",
            self.queue_size,
        )?;
        register_gauge(
            &registry,
            "queue_deserialization_error",
            "Set to 1 if there was an error deserializing the last queue status response from the hub, and 0 otherwise",
            self.queue_deserialization_error,
        )?;

        Ok(registry)
    }
}

fn register_gauge(
    registry: &Registry,
    name: &str,
    help: &str,
    value: Option<i64>,
) -> Result<(), prometheus::Error> {
    let Some(value) = value else {
        return Ok(());
    };

    let gauge = IntGauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    registry.register(Box::new(gauge.clone()))?;
    gauge.set(value);

    Ok(())
}

/// Aggregate counters folded out of the node list in one pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeSummary {
    pub nodes: i64,
    pub max_sessions: i64,
    pub used_sessions: i64,
}

/// Fold the node/slot tree into scalar aggregates.
///
/// A slot counts as used iff its `session` is present. `max_sessions` is
/// summed as advertised and never reconciled against the slot count: a
/// node may report a max different from its physical slots, and both
/// numbers are exported as-is.
pub fn aggregate(status: &GridStatus) -> NodeSummary {
    let mut summary = NodeSummary {
        nodes: status.nodes.len() as i64,
        ..Default::default()
    };

    for node in &status.nodes {
        summary.max_sessions += node.max_sessions;
        summary.used_sessions += node
            .slots
            .iter()
            .filter(|slot| slot.session.is_some())
            .count() as i64;
    }

    summary
}

/// Polls the hub once per scrape and reports what it saw
pub struct GridCollector {
    client: HubClient,
}

impl GridCollector {
    pub fn new(client: HubClient) -> Self {
        Self { client }
    }

    /// Run one collection cycle.
    ///
    /// The two fetches are independent: a failing status endpoint does not
    /// gate the queue branch. Every cycle decodes into fresh documents, so
    /// a failed decode leaves nothing behind for the next scrape to pick
    /// up.
    pub async fn collect(&self) -> GridObservations {
        let mut observations = GridObservations::default();

        match self.client.status().await {
            Err(error) => {
                warn!(%error, "hub status fetch failed");
                observations.hub_accessible = 0;
            }
            Ok(body) => {
                observations.hub_accessible = 1;

                match serde_json::from_slice::<StatusResponse>(&body) {
                    Err(error) => {
                        warn!(%error, "hub status response did not match the grid schema");
                        observations.deserialization_error = Some(1);
                    }
                    Ok(response) => {
                        observations.deserialization_error = Some(0);

                        let status = response.value;
                        let summary = aggregate(&status);

                        observations.ready = Some(i64::from(status.ready));
                        observations.num_nodes = Some(summary.nodes);
                        observations.max_sessions_aggregated = Some(summary.max_sessions);
                        observations.num_sessions_aggregated = Some(summary.used_sessions);
                    }
                }
            }
        }

        match self.client.queue().await {
            // Older hubs do not serve the queue endpoint at all, so a
            // transport failure here skips the queue gauges silently
            // instead of asserting an explicit zero.
            Err(error) => {
                debug!(%error, "queue fetch failed, skipping queue gauges");
            }
            Ok(body) => match serde_json::from_slice::<QueueResponse>(&body) {
                Err(error) => {
                    warn!(%error, "queue response did not match the grid schema");
                    observations.queue_deserialization_error = Some(1);
                }
                Ok(response) => {
                    observations.queue_deserialization_error = Some(0);
                    observations.queue_size = Some(response.value.len() as i64);
                }
            },
        }

        observations
    }
}
