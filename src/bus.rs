use crate::model::ViewModel;
use tokio::sync::watch;

/// Observation channel for the read model. The aggregator publishes the full
/// `ViewModel` after every applied event; observers always see the latest
/// state and may skip intermediates (watch semantics).
#[derive(Clone)]
pub struct ModelBus {
    tx: watch::Sender<ViewModel>,
}

impl ModelBus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewModel::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.tx.subscribe()
    }

    pub fn publish(&self, model: ViewModel) {
        // send_replace never fails, even with no live subscribers.
        self.tx.send_replace(model);
    }

    pub fn latest(&self) -> ViewModel {
        self.tx.borrow().clone()
    }
}

impl Default for ModelBus {
    fn default() -> Self {
        Self::new()
    }
}
