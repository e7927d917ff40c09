use planpin_core::sync::ConnectivityProbe;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

#[derive(Debug)]
pub enum TriggerEvent {
    ConnectivityRegained,
}

/// Watches the connectivity probe and emits an event on the offline-to-online
/// edge, so the daemon drains the queue as soon as the network returns
/// instead of waiting for the next periodic pass.
pub struct ConnectivityTrigger {
    rx: UnboundedReceiver<TriggerEvent>,
}

impl ConnectivityTrigger {
    pub fn spawn<P: ConnectivityProbe + 'static>(probe: P, interval: Duration) -> Self {
        let (tx, rx) = unbounded_channel();
        tokio::spawn(run_watcher(probe, interval, tx));
        Self { rx }
    }

    pub async fn recv(&mut self) -> Option<TriggerEvent> {
        self.rx.recv().await
    }
}

async fn run_watcher<P: ConnectivityProbe>(
    probe: P,
    interval: Duration,
    tx: UnboundedSender<TriggerEvent>,
) {
    let mut was_online = probe.is_online().await;
    loop {
        tokio::time::sleep(interval).await;
        let online = probe.is_online().await;
        if online && !was_online {
            debug!("connectivity regained");
            if tx.send(TriggerEvent::ConnectivityRegained).is_err() {
                break;
            }
        }
        was_online = online;
    }
}
