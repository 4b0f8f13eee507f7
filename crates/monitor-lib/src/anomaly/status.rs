//! Global status aggregation

use std::collections::BTreeMap;

use crate::models::{Anomaly, Breach, GlobalStatus, Resource};

/// Aggregated severity and the resource that decided it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusVerdict {
    pub status: GlobalStatus,
    pub cause: Option<Resource>,
}

/// Reduces per-resource anomalies to one severity, critical first
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusAggregator;

impl StatusAggregator {
    pub fn aggregate(&self, anomalies: &BTreeMap<Resource, Anomaly>) -> StatusVerdict {
        let first = |pred: &dyn Fn(Resource, &Anomaly) -> bool| {
            Resource::ALL
                .into_iter()
                .find(|r| anomalies.get(r).is_some_and(|a| pred(*r, a)))
        };

        let verdict = |status, cause| StatusVerdict {
            status,
            cause: Some(cause),
        };

        if let Some(r) = first(&|_, a| a.breach == Breach::Critical) {
            return verdict(GlobalStatus::Critical, r);
        }
        if let Some(r) = first(&|_, a| a.breach == Breach::Warning) {
            return verdict(GlobalStatus::Warning, r);
        }
        if let Some(r) = first(&|r, a| r.spike_eligible() && a.spike) {
            return verdict(GlobalStatus::Spike, r);
        }

        StatusVerdict {
            status: GlobalStatus::Normal,
            cause: None,
        }
    }

    pub fn status(&self, anomalies: &BTreeMap<Resource, Anomaly>) -> GlobalStatus {
        self.aggregate(anomalies).status
    }
}
