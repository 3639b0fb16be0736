//! Owning handle for the render worker thread

use std::thread::{self, JoinHandle};

use scrim_config::ScrimConfig;
use scrim_ipc::{WorkerCommand, WorkerEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::canvas::CanvasSet;
use crate::error::WorkerError;
use crate::fetch::ImageFetcher;
use crate::worker::{Envelope, RenderWorker};

const THREAD_NAME: &str = "render-worker";

/// Handle to a render worker running on its own thread.
///
/// Commands are delivered in the order they are posted. Dropping the handle
/// closes the command channel and joins the thread.
pub struct WorkerHandle {
    commands: Option<UnboundedSender<Envelope>>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Start a worker on a dedicated thread with its own single-threaded
    /// runtime. Returns the handle and the worker's event stream.
    pub fn spawn<F: ImageFetcher>(
        config: ScrimConfig,
        fetcher: F,
    ) -> Result<(Self, UnboundedReceiver<WorkerEvent>), WorkerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::Spawn)?;

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let (worker, internal_rx) = RenderWorker::new(config, fetcher, events_tx);
                    worker.run(commands_rx, internal_rx).await;
                });
            })
            .map_err(WorkerError::Spawn)?;

        info!("Spawned {} thread", THREAD_NAME);
        let handle = Self {
            commands: Some(commands_tx),
            thread: Some(thread),
        };
        Ok((handle, events_rx))
    }

    /// Post a command
    pub fn post(&self, command: WorkerCommand) -> Result<(), WorkerError> {
        self.send(Envelope::new(command))
    }

    /// Post a command together with ownership of the drawing surfaces
    pub fn post_with_transfer(
        &self,
        command: WorkerCommand,
        canvases: CanvasSet,
    ) -> Result<(), WorkerError> {
        self.send(Envelope::with_transfer(command, canvases))
    }

    fn send(&self, envelope: Envelope) -> Result<(), WorkerError> {
        let Some(commands) = self.commands.as_ref() else {
            return Err(WorkerError::Closed);
        };
        commands.send(envelope).map_err(|_| WorkerError::Closed)
    }

    pub fn is_running(&self) -> bool {
        self.commands.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Close the command channel and wait for the worker to finish
    pub fn shutdown(&mut self) {
        self.commands.take();
        if let Some(thread) = self.thread.take() {
            debug!("Joining {} thread", THREAD_NAME);
            if thread.join().is_err() {
                error!("{} thread panicked", THREAD_NAME);
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;

    #[test]
    fn test_post_after_shutdown_fails() {
        let (mut handle, mut events) =
            WorkerHandle::spawn(ScrimConfig::default(), MemoryFetcher::new()).unwrap();
        assert!(handle.is_running());
        handle.post(WorkerCommand::Clear).unwrap();

        handle.shutdown();
        assert!(!handle.is_running());
        assert!(matches!(handle.post(WorkerCommand::Clear), Err(WorkerError::Closed)));
        // The worker dropped its event sender on exit
        assert!(events.blocking_recv().is_none());
    }
}
