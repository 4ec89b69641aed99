//! The process-wide current-city cell.
//!
//! One writer path (`commit`, called by the shell on confirmed selection);
//! children read or subscribe. Components never learn the city from
//! storage directly.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CurrentCity {
    tx: Arc<watch::Sender<String>>,
}

impl CurrentCity {
    pub fn new(initial: &str) -> Self {
        let (tx, _rx) = watch::channel(initial.to_string());
        Self { tx: Arc::new(tx) }
    }

    pub fn read(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Record a confirmed selection. No-op when the city is unchanged.
    pub fn commit(&self, city: &str) {
        let unchanged = *self.tx.borrow() == city;
        if unchanged {
            return;
        }
        tracing::info!("Current city -> {}", city);
        self.tx.send_replace(city.to_string());
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_updates_readers() {
        let cell = CurrentCity::new("Coimbatore");
        assert_eq!(cell.read(), "Coimbatore");

        cell.commit("London");
        assert_eq!(cell.read(), "London");
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let cell = CurrentCity::new("Coimbatore");
        let mut rx = cell.subscribe();

        cell.commit("London");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "London");
    }

    #[tokio::test]
    async fn recommitting_same_city_does_not_notify() {
        let cell = CurrentCity::new("London");
        let mut rx = cell.subscribe();

        cell.commit("London");
        assert!(!rx.has_changed().unwrap());
    }
}
