//! Task group owning the background work of one open session.
//!
//! Tasks are isolated from each other: a panic is caught and logged instead of
//! tearing down the group. Shutting the group down cancels every task at its
//! next suspension point.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use log::{debug, error, warn};
use tokio::runtime::Handle;
use tokio::task::JoinSet;

pub(crate) struct TaskGroup {
    name: &'static str,
    tasks: JoinSet<()>,
    runtime: Handle,
}

impl TaskGroup {
    pub(crate) fn new(name: &'static str, runtime: Handle) -> Self {
        Self {
            name,
            tasks: JoinSet::new(),
            runtime,
        }
    }

    /// Spawns `future` into the group, logging instead of propagating panics.
    pub(crate) fn spawn<F>(&mut self, task_name: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let group = self.name;
        self.tasks.spawn_on(
            async move {
                if let Err(panic) = AssertUnwindSafe(future).catch_unwind().await {
                    error!(
                        "Task '{}' in group '{}' panicked: {}",
                        task_name,
                        group,
                        panic_message(panic.as_ref())
                    );
                }
            },
            &self.runtime,
        );
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Cancels every task and drains the group in the background.
    pub(crate) fn shutdown(self) {
        let TaskGroup {
            name,
            mut tasks,
            runtime,
        } = self;

        tasks.abort_all();
        if tasks.is_empty() {
            return;
        }

        runtime.spawn(async move {
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    if !e.is_cancelled() {
                        warn!("Task in group '{}' failed during shutdown: {}", name, e);
                    }
                }
            }
            debug!("Task group '{}' drained", name);
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
