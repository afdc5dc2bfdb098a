use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MetricStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn from_score(score: i32) -> Self {
        if score >= 80 {
            Self::Healthy
        } else if score >= 50 {
            Self::Degraded
        } else {
            Self::Unhealthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite platform health.
///
/// `score` starts at 100 and loses a fixed penalty per breached category.
/// Penalties add up across categories and are not clamped, so the score can
/// go negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformHealth {
    pub score: i32,
    pub status: HealthStatus,
    pub issues: Vec<String>,
}

impl PlatformHealth {
    /// Score the trailing-window aggregates of API latency, error samples
    /// and DB query time.
    pub fn evaluate(api: &MetricStats, errors: &MetricStats, db: &MetricStats) -> Self {
        let mut score = 100;
        let mut issues = Vec::new();

        if api.has_data() && api.avg > 1000.0 {
            score -= 20;
            issues.push(format!("High API response time: {:.0}ms", api.avg));
        } else if api.has_data() && api.avg > 500.0 {
            score -= 10;
            issues.push(format!("Elevated API response time: {:.0}ms", api.avg));
        }

        if errors.count > 20 {
            score -= 30;
            issues.push(format!("High error count: {}", errors.count));
        } else if errors.count > 5 {
            score -= 15;
            issues.push(format!("Elevated error count: {}", errors.count));
        }

        if db.has_data() && db.avg > 500.0 {
            score -= 20;
            issues.push(format!("Slow database queries: {:.0}ms", db.avg));
        }

        Self {
            score,
            status: HealthStatus::from_score(score),
            issues,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avg(value: f64) -> MetricStats {
        MetricStats {
            count: 1,
            avg: value,
            min: value,
            max: value,
            p95: value,
        }
    }

    fn count(n: usize) -> MetricStats {
        MetricStats {
            count: n,
            avg: 1.0,
            min: 1.0,
            max: 1.0,
            p95: 1.0,
        }
    }

    #[test]
    fn test_no_data_is_healthy() {
        let empty = MetricStats::default();
        let health = PlatformHealth::evaluate(&empty, &empty, &empty);

        assert_eq!(health.score, 100);
        assert!(health.is_healthy());
        assert!(health.issues.is_empty());
    }

    #[test]
    fn test_penalties_add_across_categories() {
        let health = PlatformHealth::evaluate(&avg(1200.0), &count(25), &avg(600.0));

        assert_eq!(health.score, 30);
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.issues.len(), 3);
    }

    #[test]
    fn test_lower_tiers() {
        let empty = MetricStats::default();
        let health = PlatformHealth::evaluate(&avg(700.0), &count(6), &empty);

        assert_eq!(health.score, 75);
        assert_eq!(health.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(HealthStatus::from_score(80), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_score(79), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_score(50), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_score(49), HealthStatus::Unhealthy);
        assert_eq!(HealthStatus::from_score(-10), HealthStatus::Unhealthy);
    }
}
