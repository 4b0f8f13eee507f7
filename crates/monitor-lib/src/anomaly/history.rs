//! Bounded per-resource sample history

use crate::buffer::RingBuffer;
use crate::config::HistoryCapacity;
use crate::models::{MetricSample, Resource};

/// Ring buffer of samples for every resource, sized by volatility class
#[derive(Debug, Clone)]
pub struct MetricHistory {
    buffers: [RingBuffer<MetricSample>; Resource::COUNT],
}

impl MetricHistory {
    pub fn new(capacity: HistoryCapacity) -> Self {
        Self {
            buffers: Resource::ALL.map(|r| RingBuffer::new(capacity.for_resource(r))),
        }
    }

    fn buffer(&self, resource: Resource) -> &RingBuffer<MetricSample> {
        &self.buffers[resource as usize]
    }

    /// Insert at the tail, evicting the oldest sample when at capacity
    pub fn append(&mut self, sample: MetricSample) {
        self.buffers[sample.resource as usize].push(sample);
    }

    /// Values oldest first, newest last
    pub fn values(&self, resource: Resource) -> Vec<f64> {
        self.buffer(resource).iter().map(|s| s.value).collect()
    }

    pub fn samples(&self, resource: Resource) -> impl Iterator<Item = &MetricSample> + '_ {
        self.buffer(resource).iter()
    }

    /// Newest value, `None` if the resource never reported
    pub fn latest(&self, resource: Resource) -> Option<f64> {
        self.buffer(resource).latest().map(|s| s.value)
    }

    pub fn len(&self, resource: Resource) -> usize {
        self.buffer(resource).len()
    }

    pub fn capacity(&self, resource: Resource) -> usize {
        self.buffer(resource).capacity()
    }

    pub fn is_empty(&self, resource: Resource) -> bool {
        self.buffer(resource).is_empty()
    }
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(HistoryCapacity::default())
    }
}
