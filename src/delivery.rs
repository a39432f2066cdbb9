//! Delivery path
//!
//! Records reach the engine either synchronously (the caller thread takes
//! the engine lock) or through a bounded queue drained by one dedicated
//! writer thread:
//! - FIFO, single consumer
//! - a full queue blocks producers (`Overflow::Block`) or rejects the
//!   record (`Overflow::Reject`)
//! - flush markers travel through the same queue

use crate::constants::{DEFAULT_QUEUE_CAPACITY, WRITER_THREAD_NAME};
use crate::diagnostics;
use crate::engine::Engine;
use crate::error::{LogError, Result};
use crate::header::Record;
use crate::stats::Stats;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// What a producer does when the async queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Wait for space (backpressure)
    #[default]
    Block,
    /// Drop the record and report `QueueSaturated`
    Reject,
}

fn default_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

/// Delivery discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Delivery {
    /// Write on the calling thread under the engine lock
    #[default]
    Sync,
    /// Enqueue and return; one writer thread performs the writes
    Async {
        #[serde(default = "default_capacity")]
        capacity: usize,
        #[serde(default)]
        overflow: Overflow,
    },
}

enum Command {
    Record(Record),
    Flush(SyncSender<Result<()>>),
}

/// Hands rendered records to the engine
pub(crate) enum Dispatcher {
    Sync(Arc<Engine>),
    Async(AsyncWriter),
}

impl Dispatcher {
    pub(crate) fn new(delivery: Delivery, engine: Arc<Engine>, stats: Arc<Stats>) -> Result<Self> {
        match delivery {
            Delivery::Sync => Ok(Self::Sync(engine)),
            Delivery::Async { capacity, overflow } => Ok(Self::Async(AsyncWriter::spawn(
                engine, capacity, overflow, stats,
            )?)),
        }
    }

    pub(crate) fn dispatch(&self, record: Record) -> Result<()> {
        match self {
            Self::Sync(engine) => engine.deliver(record),
            Self::Async(writer) => writer.enqueue(record),
        }
    }

    /// Block until every record dispatched so far has been written
    pub(crate) fn flush(&self) -> Result<()> {
        match self {
            Self::Sync(engine) => engine.flush(),
            Self::Async(writer) => writer.flush(),
        }
    }
}

pub(crate) struct AsyncWriter {
    tx: Option<SyncSender<Command>>,
    worker: Option<JoinHandle<()>>,
    overflow: Overflow,
    stats: Arc<Stats>,
}

impl AsyncWriter {
    fn spawn(
        engine: Arc<Engine>,
        capacity: usize,
        overflow: Overflow,
        stats: Arc<Stats>,
    ) -> Result<Self> {
        let (tx, rx) = sync_channel::<Command>(capacity.max(1));

        let worker = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || run_writer(rx, engine))
            .map_err(|source| LogError::Io {
                path: WRITER_THREAD_NAME.into(),
                source,
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            overflow,
            stats,
        })
    }

    fn sender(&self) -> Result<&SyncSender<Command>> {
        self.tx.as_ref().ok_or(LogError::WorkerStopped)
    }

    fn enqueue(&self, record: Record) -> Result<()> {
        let tx = self.sender()?;
        match self.overflow {
            Overflow::Block => tx
                .send(Command::Record(record))
                .map_err(|_| LogError::WorkerStopped),
            Overflow::Reject => match tx.try_send(Command::Record(record)) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => {
                    self.stats.add_dropped();
                    Err(LogError::QueueSaturated)
                }
                Err(TrySendError::Disconnected(_)) => Err(LogError::WorkerStopped),
            },
        }
    }

    fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = sync_channel(1);
        self.sender()?
            .send(Command::Flush(ack_tx))
            .map_err(|_| LogError::WorkerStopped)?;
        ack_rx.recv().map_err(|_| LogError::WorkerStopped)?
    }
}

impl Drop for AsyncWriter {
    fn drop(&mut self) {
        // Closing the queue lets the writer drain what is left and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_writer(rx: Receiver<Command>, engine: Arc<Engine>) {
    for command in rx {
        match command {
            Command::Record(record) => {
                if let Err(e) = engine.deliver(record) {
                    diagnostics::report(&e);
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(engine.flush());
            }
        }
    }
    if let Err(e) = engine.flush() {
        diagnostics::report(&e);
    }
}
