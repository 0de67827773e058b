use super::service::ResonanceService;
use crate::domain::resonance::NormalizedEvent;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

struct SymbolWorker {
    tx: UnboundedSender<NormalizedEvent>,
    handle: JoinHandle<()>,
}

/// Fans incoming events out to one sequential worker per symbol.
///
/// A symbol's events are handled strictly in arrival order; different
/// symbols progress in parallel. Per-symbol queues are unbounded so the
/// routing loop never waits on a busy symbol; backpressure applies on the
/// inbound channel only.
pub struct SymbolDispatcher {
    service: Arc<ResonanceService>,
    event_rx: Receiver<NormalizedEvent>,
    workers: HashMap<String, SymbolWorker>,
}

impl SymbolDispatcher {
    pub fn new(service: Arc<ResonanceService>, event_rx: Receiver<NormalizedEvent>) -> Self {
        Self {
            service,
            event_rx,
            workers: HashMap::new(),
        }
    }

    /// Runs until the inbound channel closes, then drains every worker.
    pub async fn run(mut self) {
        info!("SymbolDispatcher started.");

        while let Some(event) = self.event_rx.recv().await {
            if self.service.config().timeframes_for(&event.symbol).is_none() {
                continue;
            }
            self.route(event);
        }

        info!(
            "SymbolDispatcher: inbound stream closed, draining {} worker(s)",
            self.workers.len()
        );
        for (symbol, worker) in self.workers.drain() {
            drop(worker.tx);
            if let Err(e) = worker.handle.await {
                error!("SymbolDispatcher: worker for {} panicked: {}", symbol, e);
            }
        }
    }

    fn route(&mut self, event: NormalizedEvent) {
        let symbol = event.symbol.clone();
        let worker = self
            .workers
            .entry(symbol.clone())
            .or_insert_with(|| spawn_worker(self.service.clone(), &symbol));

        if let Err(e) = worker.tx.send(event) {
            warn!("SymbolDispatcher: worker for {} is gone: {}", symbol, e);
            self.workers.remove(&symbol);
        }
    }
}

fn spawn_worker(service: Arc<ResonanceService>, symbol: &str) -> SymbolWorker {
    let (tx, mut rx) = mpsc::unbounded_channel::<NormalizedEvent>();
    let symbol = symbol.to_string();
    let handle = tokio::spawn(async move {
        info!("SymbolDispatcher: worker for {} started", symbol);
        while let Some(event) = rx.recv().await {
            service.handle_event(event).await;
        }
    });
    SymbolWorker { tx, handle }
}
