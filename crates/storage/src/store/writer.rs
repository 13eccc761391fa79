#![forbid(unsafe_code)]

use super::{SharedConnection, StoreError, lock_connection, tickets};
use pt_core::TicketStatus;
use pt_core::ids::TicketId;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use uuid::Uuid;

const THREAD_NAME: &str = "pt-storage-writer";

#[derive(Debug)]
pub(crate) enum WriteJob {
    TicketUpdate {
        id: TicketId,
        status: TicketStatus,
        picker: Option<Uuid>,
    },
    Barrier(Sender<()>),
}

/// Fire-and-forget writes. Submitters get no completion handle; `flush` is the only way
/// to wait for queued work.
#[derive(Debug)]
pub(crate) struct BackgroundWriter {
    jobs: Option<Sender<WriteJob>>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundWriter {
    pub(crate) fn spawn(conn: SharedConnection) -> Result<Self, StoreError> {
        let (jobs, inbox) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(conn, inbox))?;
        Ok(Self {
            jobs: Some(jobs),
            worker: Some(worker),
        })
    }

    pub(crate) fn submit(&self, job: WriteJob) {
        let sent = match self.jobs.as_ref() {
            Some(jobs) => jobs.send(job).is_ok(),
            None => false,
        };
        if !sent {
            tracing::warn!("background writer is gone; update dropped");
        }
    }

    pub(crate) fn flush(&self) -> Result<(), StoreError> {
        let (ack, done) = mpsc::channel();
        let jobs = self.jobs.as_ref().ok_or(StoreError::WriterStopped)?;
        jobs.send(WriteJob::Barrier(ack)).map_err(|_| StoreError::WriterStopped)?;
        done.recv().map_err(|_| StoreError::WriterStopped)
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish the queue and exit.
        self.jobs.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("background writer panicked");
        }
    }
}

fn run(conn: SharedConnection, inbox: Receiver<WriteJob>) {
    for job in inbox {
        match job {
            WriteJob::TicketUpdate { id, status, picker } => {
                let result = lock_connection(&conn)
                    .and_then(|conn| tickets::update_status_and_picker(&conn, id, status, picker));
                match result {
                    Ok(0) => tracing::warn!(%id, "background update matched no ticket"),
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(%id, error = %err, "background ticket update failed")
                    }
                }
            }
            WriteJob::Barrier(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
