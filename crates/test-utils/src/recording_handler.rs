use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dagrun::engine::TaskName;
use dagrun::exec::{HandlerFuture, TaskHandler};

/// What the recording handler observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerEvent {
    Started(TaskName),
    Finished(TaskName),
    Failed(TaskName),
}

#[derive(Debug, Clone, Default)]
struct Behaviour {
    failing: HashSet<TaskName>,
    panicking: HashSet<TaskName>,
    delays: HashMap<TaskName, Duration>,
}

/// A handler that:
/// - records when each task starts and finishes
/// - tracks how many tasks were running at the same time
/// - fails or panics on request for specific task ids
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    behaviour: Arc<Behaviour>,
    events: Arc<Mutex<Vec<HandlerEvent>>>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, task: &str) -> Self {
        Arc::make_mut(&mut self.behaviour)
            .failing
            .insert(task.to_string());
        self
    }

    pub fn panicking_on(mut self, task: &str) -> Self {
        Arc::make_mut(&mut self.behaviour)
            .panicking
            .insert(task.to_string());
        self
    }

    pub fn with_delay(mut self, task: &str, delay: Duration) -> Self {
        Arc::make_mut(&mut self.behaviour)
            .delays
            .insert(task.to_string(), delay);
        self
    }

    pub fn events(&self) -> Vec<HandlerEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Task ids in the order their handler was entered.
    pub fn started(&self) -> Vec<TaskName> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HandlerEvent::Started(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Number of times the handler was invoked for `task`.
    pub fn invocations(&self, task: &str) -> usize {
        self.started().iter().filter(|t| *t == task).count()
    }

    /// Index of `event` in the event log.
    pub fn position(&self, event: &HandlerEvent) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    /// Highest number of handler invocations that were in progress at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn push(&self, event: HandlerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl TaskHandler for RecordingHandler {
    fn handle(&self, task: TaskName) -> HandlerFuture {
        let this = self.clone();

        Box::pin(async move {
            this.push(HandlerEvent::Started(task.clone()));
            let now = this.running.fetch_add(1, Ordering::SeqCst) + 1;
            this.peak.fetch_max(now, Ordering::SeqCst);

            match this.behaviour.delays.get(&task) {
                Some(delay) => tokio::time::sleep(*delay).await,
                None => tokio::task::yield_now().await,
            }

            this.running.fetch_sub(1, Ordering::SeqCst);

            if this.behaviour.panicking.contains(&task) {
                panic!("recording handler asked to panic on '{task}'");
            }

            if this.behaviour.failing.contains(&task) {
                this.push(HandlerEvent::Failed(task.clone()));
                anyhow::bail!("recording handler asked to fail on '{task}'");
            }

            this.push(HandlerEvent::Finished(task));
            Ok(())
        })
    }
}
