use std::collections::VecDeque;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tower::{Service, ServiceExt};
use tracing::{debug, info, warn};

use crate::common::GeneratedImage;
use crate::error::GenerationError;
use crate::generation::request::{GenerationEvent, GenerationRequest};

pub type EventSender = mpsc::UnboundedSender<GenerationEvent>;

/// Drains a list of requests with a fixed number of workers.
///
/// Every request produces exactly one [`GenerationEvent`]. A failed request
/// only ends its own label; the worker moves on to the next one.
pub struct GenerationQueue<S> {
    service: S,
    workers: usize,
    runtime: Handle,
}

impl<S> GenerationQueue<S>
where
    S: Service<GenerationRequest, Response = GeneratedImage, Error = GenerationError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    pub fn new(service: S, workers: usize, runtime: Handle) -> Self {
        Self {
            service,
            workers: workers.max(1),
            runtime,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn spawn(&self, requests: Vec<GenerationRequest>, events: EventSender) -> Vec<JoinHandle<()>> {
        info!(
            "Queueing {} generation requests on {} workers",
            requests.len(),
            self.workers
        );
        let pending = Arc::new(Mutex::new(VecDeque::from(requests)));
        (0..self.workers)
            .map(|worker| {
                let pending = pending.clone();
                let service = self.service.clone();
                let events = events.clone();
                self.runtime
                    .spawn(Self::worker_loop(worker, pending, service, events))
            })
            .collect()
    }

    /// Spawns the workers and waits for all of them to drain the queue.
    pub async fn run(&self, requests: Vec<GenerationRequest>, events: EventSender) {
        for result in futures::future::join_all(self.spawn(requests, events)).await {
            if let Err(e) = result {
                warn!("Generation worker ended abnormally: {}", e);
            }
        }
    }

    async fn worker_loop(
        worker: usize,
        pending: Arc<Mutex<VecDeque<GenerationRequest>>>,
        mut service: S,
        events: EventSender,
    ) {
        loop {
            let Some(request) = pending.lock().await.pop_front() else {
                break;
            };
            debug!("Worker {} picked '{}'", worker, request.label);
            let outcome = call_service(&mut service, request.clone()).await;
            if events.send(GenerationEvent::new(&request, outcome)).is_err() {
                debug!("Event receiver dropped, worker {} stopping", worker);
                break;
            }
        }
        debug!("Worker {} finished", worker);
    }
}

/// Runs a single request outside the bulk queue.
pub fn regenerate<S>(runtime: &Handle, service: S, request: GenerationRequest, events: EventSender) -> JoinHandle<()>
where
    S: Service<GenerationRequest, Response = GeneratedImage, Error = GenerationError>
        + Send
        + 'static,
    S::Future: Send,
{
    info!("Regenerating '{}'", request.label);
    runtime.spawn(async move {
        let mut service = service;
        let outcome = call_service(&mut service, request.clone()).await;
        if events.send(GenerationEvent::new(&request, outcome)).is_err() {
            debug!("Event receiver dropped before '{}' finished", request.label);
        }
    })
}

async fn call_service<S>(service: &mut S, request: GenerationRequest) -> Result<GeneratedImage, GenerationError>
where
    S: Service<GenerationRequest, Response = GeneratedImage, Error = GenerationError>,
{
    let label = request.label.clone();
    let outcome = match service.ready().await {
        Ok(ready) => ready.call(request).await,
        Err(e) => Err(e),
    };
    match &outcome {
        Ok(_) => info!("Generated '{}'", label),
        Err(e) => warn!("Generation for '{}' failed: {}", label, e),
    }
    outcome
}
