use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub ok: bool,
    pub uptime_sec: u64,
    pub started_at: String,
}

/// Wall-clock start time plus a monotonic reference for uptime.
#[derive(Debug, Clone, Copy)]
pub struct ServiceClock {
    started_at: DateTime<Utc>,
    started: Instant,
}

impl ServiceClock {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn started_at(&self) -> String {
        format_timestamp(self.started_at)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn check_health(&self) -> HealthStatus {
        HealthStatus {
            ok: true,
            uptime_sec: self.uptime_secs(),
            started_at: self.started_at(),
        }
    }
}

impl Default for ServiceClock {
    fn default() -> Self {
        Self::start()
    }
}

/// RFC 3339, UTC, millisecond precision (`2024-01-01T00:00:00.000Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus {
            ok: true,
            uptime_sec: 3600,
            started_at: "2024-05-01T12:00:00.000Z".to_string(),
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["uptimeSec"], 3600);
        assert_eq!(json["startedAt"], "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        assert_eq!(format_timestamp(at), "2024-05-01T12:30:05.000Z");
    }

    #[test]
    fn test_fresh_clock_reports_ok() {
        let health = ServiceClock::start().check_health();
        assert!(health.ok);
        assert_eq!(health.uptime_sec, 0);
    }
}
