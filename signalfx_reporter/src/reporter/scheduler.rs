use std::sync::{Arc, Mutex};

use tokio::{select, sync::oneshot, task::JoinHandle};

use super::exporter::Exporter;

struct RunningLoop {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the background loop that triggers aligned exports.
#[derive(Default)]
pub(crate) struct Scheduler {
    running: Mutex<Option<RunningLoop>>,
}

impl Scheduler {
    /// Spawn the loop on the current tokio runtime, unless it is already looping.
    pub(crate) fn start(&self, exporter: &Arc<Exporter>) {
        let mut running = self
            .running
            .lock()
            .expect("local mutex should not be poisoned");
        if running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
        {
            exporter.log(log::Level::Debug, format_args!("reporter already running"));
            return;
        }

        let (stop, stopped) = oneshot::channel();
        let handle = tokio::spawn(report_forever(exporter.clone(), stopped));
        *running = Some(RunningLoop { stop, handle });
    }

    /// Stop scheduling and wait for the loop to exit. Flushes already spawned keep going.
    pub(crate) async fn stop(&self) {
        let running = self
            .running
            .lock()
            .expect("local mutex should not be poisoned")
            .take();
        let Some(RunningLoop { stop, handle }) = running else {
            return;
        };
        // The loop may already be gone, in which case there is nobody to tell.
        let _ = stop.send(());
        if let Err(e) = handle.await {
            log::error!("reporter loop ended abnormally: {e}");
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
            .lock()
            .expect("local mutex should not be poisoned")
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}

/// Wake on every aligned boundary and kick off a flush without waiting for it.
async fn report_forever(exporter: Arc<Exporter>, mut stopped: oneshot::Receiver<()>) {
    loop {
        select! {
            _ = exporter.aligner().wait_for_next_boundary() => {
                let exporter = exporter.clone();
                tokio::spawn(async move {
                    exporter.try_flush().await;
                });
            }
            _ = &mut stopped => {
                exporter.log(log::Level::Info, format_args!("quitting reporter loop"));
                break;
            }
        }
    }
}
