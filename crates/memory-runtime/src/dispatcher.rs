//! Dedicated callback thread.
//!
//! Jobs run one at a time, in submission order, on a single named thread.
//! The thread exits once the dispatcher is dropped and the queue is drained.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use log::{debug, error, warn};

use crate::error::{Result, RuntimeError};

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Flush(mpsc::Sender<()>),
}

pub(crate) struct CallbackDispatcher {
    sender: mpsc::Sender<Message>,
}

impl CallbackDispatcher {
    pub(crate) fn start(thread_name: &str) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let name = thread_name.to_string();
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || run(&name, receiver))
            .map_err(RuntimeError::Thread)?;
        Ok(Self { sender })
    }

    /// Queues `job` behind every previously queued job.
    pub(crate) fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.sender.send(Message::Run(Box::new(job))).is_err() {
            warn!("Callback thread has stopped, dropping callback");
        }
    }

    /// Blocks until every job queued before this call has run.
    ///
    /// Must not be called from the callback thread itself.
    pub(crate) fn flush(&self) {
        let (ack, done) = mpsc::channel();
        if self.sender.send(Message::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }
}

fn run(name: &str, receiver: mpsc::Receiver<Message>) {
    debug!("Callback thread '{}' started", name);
    for message in receiver {
        match message {
            Message::Run(job) => {
                if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    error!(
                        "Callback on '{}' panicked: {}",
                        name,
                        panic_message(panic.as_ref())
                    );
                }
            }
            Message::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("Callback thread '{}' stopped", name);
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_jobs_run_in_order() {
        let dispatcher = CallbackDispatcher::start("test-callbacks").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..20 {
            let seen = seen.clone();
            dispatcher.dispatch(move || seen.lock().unwrap().push(i));
        }
        dispatcher.flush();

        assert_eq!(*seen.lock().unwrap(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_panicking_job_does_not_stop_the_thread() {
        let dispatcher = CallbackDispatcher::start("test-callbacks").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        dispatcher.dispatch(|| panic!("listener blew up"));
        let after = seen.clone();
        dispatcher.dispatch(move || after.lock().unwrap().push("after"));
        dispatcher.flush();

        assert_eq!(*seen.lock().unwrap(), vec!["after"]);
    }

    #[test]
    fn test_flush_on_idle_thread_returns() {
        let dispatcher = CallbackDispatcher::start("test-callbacks").unwrap();
        dispatcher.flush();
        dispatcher.flush();
    }
}
