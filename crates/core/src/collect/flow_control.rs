use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::CollectorConfig;
use crate::error::CollectError;

#[derive(Clone)]
pub struct FlowControlConfig {
    pub max_in_flight: usize,
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        Self { max_in_flight: 64 }
    }
}

impl From<&CollectorConfig> for FlowControlConfig {
    fn from(value: &CollectorConfig) -> Self {
        Self {
            max_in_flight: value.max_in_flight,
        }
    }
}

/// Gate on simultaneous filesystem operations.
///
/// A permit covers exactly one listing, status query or read. Callers must
/// release it before recursing, otherwise a deep tree can starve itself.
#[derive(Clone)]
pub struct FlowController {
    in_flight: Arc<Semaphore>,
    capacity: usize,
}

impl FlowController {
    pub fn new(config: &FlowControlConfig) -> Self {
        let capacity = config.max_in_flight.max(1);
        Self {
            in_flight: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub async fn acquire_in_flight(&self) -> Result<OwnedSemaphorePermit, CollectError> {
        self.in_flight
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CollectError::FlowControl("in-flight flow controller closed".to_string()))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.in_flight.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_clamped() {
        let flow = FlowController::new(&FlowControlConfig { max_in_flight: 0 });
        assert_eq!(flow.capacity(), 1);
    }

    #[tokio::test]
    async fn test_permits_are_returned_on_drop() {
        let flow = FlowController::new(&FlowControlConfig { max_in_flight: 2 });
        let first = flow.acquire_in_flight().await.unwrap();
        let _second = flow.acquire_in_flight().await.unwrap();
        assert_eq!(flow.available(), 0);

        drop(first);
        assert_eq!(flow.available(), 1);
    }

    #[test]
    fn test_from_collector_config() {
        let config = CollectorConfig::default().with_max_in_flight(8);
        let flow = FlowControlConfig::from(&config);
        assert_eq!(flow.max_in_flight, 8);
    }
}
