//! Per-route request statistics and a rolling log of recent requests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use axum::http::{Method, Uri};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::health::{format_timestamp, ServiceClock};

/// How many completed requests the rolling log keeps.
pub const RECENT_CAPACITY: usize = 100;

/// How many recent requests a snapshot exposes.
pub const RECENT_IN_SNAPSHOT: usize = 20;

/// Aggregation key for a request: method plus the matched route template
/// (`GET /api/users/:id`), or the bare path when no route matched.
pub fn route_key(method: &Method, matched_path: Option<&str>, uri: &Uri) -> String {
    format!("{} {}", method, matched_path.unwrap_or_else(|| uri.path()))
}

/// One finished request as seen by the metrics middleware.
#[derive(Debug, Clone)]
pub struct RequestObservation {
    pub method: String,
    pub route_key: String,
    /// Raw path including the query string
    pub path: String,
    pub status: u16,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteStat {
    pub count: u64,
    pub total_duration_ms: f64,
    pub statuses: BTreeMap<u16, u64>,
}

impl RouteStat {
    fn observe(&mut self, status: u16, duration_ms: f64) {
        self.count += 1;
        self.total_duration_ms += duration_ms;
        *self.statuses.entry(status).or_default() += 1;
    }

    pub fn average_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            round_tenths(self.total_duration_ms / self.count as f64)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRequest {
    pub timestamp: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub route: String,
    pub count: u64,
    pub avg_ms: f64,
    pub statuses: BTreeMap<u16, u64>,
}

/// Body of `GET /api/_stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub started_at: String,
    pub uptime_sec: u64,
    pub total_requests: u64,
    pub routes: Vec<RouteSummary>,
    pub recent: Vec<RecentRequest>,
}

#[derive(Debug, Default)]
struct MetricsState {
    total_requests: u64,
    routes: HashMap<String, RouteStat>,
    recent: VecDeque<RecentRequest>,
}

#[derive(Debug)]
pub struct MetricsCollector {
    clock: ServiceClock,
    state: RwLock<MetricsState>,
}

impl MetricsCollector {
    pub fn new(clock: ServiceClock) -> Self {
        Self {
            clock,
            state: RwLock::new(MetricsState {
                recent: VecDeque::with_capacity(RECENT_CAPACITY),
                ..MetricsState::default()
            }),
        }
    }

    pub async fn record_request(&self, observation: RequestObservation) {
        let duration_ms = observation.duration.as_secs_f64() * 1000.0;
        let mut state = self.state.write().await;

        state.total_requests += 1;
        state
            .routes
            .entry(observation.route_key)
            .or_default()
            .observe(observation.status, duration_ms);

        if state.recent.len() == RECENT_CAPACITY {
            state.recent.pop_front();
        }
        state.recent.push_back(RecentRequest {
            timestamp: format_timestamp(Utc::now()),
            method: observation.method,
            path: observation.path,
            status: observation.status,
            duration_ms: round_tenths(duration_ms),
        });
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        let state = self.state.read().await;

        let mut routes: Vec<RouteSummary> = state
            .routes
            .iter()
            .map(|(route, stat)| RouteSummary {
                route: route.clone(),
                count: stat.count,
                avg_ms: stat.average_ms(),
                statuses: stat.statuses.clone(),
            })
            .collect();
        routes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.route.cmp(&b.route)));

        MetricsSnapshot {
            started_at: self.clock.started_at(),
            uptime_sec: self.clock.uptime_secs(),
            total_requests: state.total_requests,
            routes,
            recent: state
                .recent
                .iter()
                .rev()
                .take(RECENT_IN_SNAPSHOT)
                .cloned()
                .collect(),
        }
    }

    /// Everything still held in the rolling log, oldest first.
    #[cfg(test)]
    async fn retained(&self) -> Vec<RecentRequest> {
        self.state.read().await.recent.iter().cloned().collect()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(ServiceClock::start())
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
