use std::fmt;

use serde::{Deserialize, Serialize};

/// Warning and critical levels for one metric. A value at or above a level
/// trips it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

/// Metric names the platform records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    ApiResponseTime,
    ErrorCount,
    DbQueryTime,
    MemoryUsage,
    CpuUsage,
    UserAction,
    StripeOperationTime,
    StripeErrors,
}

impl MetricKind {
    pub const ALL: [MetricKind; 8] = [
        Self::ApiResponseTime,
        Self::ErrorCount,
        Self::DbQueryTime,
        Self::MemoryUsage,
        Self::CpuUsage,
        Self::UserAction,
        Self::StripeOperationTime,
        Self::StripeErrors,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ApiResponseTime => "api.response_time",
            Self::ErrorCount => "errors.count",
            Self::DbQueryTime => "db.query_time",
            Self::MemoryUsage => "memory.usage",
            Self::CpuUsage => "cpu.usage",
            Self::UserAction => "user.actions",
            Self::StripeOperationTime => "stripe.operation_time",
            Self::StripeErrors => "stripe.errors",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Static alert levels. Kinds without an entry never alert on record.
    pub fn thresholds(&self) -> Option<Thresholds> {
        let (warning, critical) = match self {
            Self::ApiResponseTime => (1000.0, 3000.0),
            Self::ErrorCount => (10.0, 50.0),
            Self::DbQueryTime => (500.0, 2000.0),
            Self::MemoryUsage => (80.0, 95.0),
            Self::CpuUsage => (70.0, 90.0),
            Self::UserAction | Self::StripeOperationTime | Self::StripeErrors => return None,
        };
        Some(Thresholds { warning, critical })
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
