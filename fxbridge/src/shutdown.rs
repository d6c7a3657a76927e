use tokio::sync::watch;

pub trait AsyncShutdown {
    type Result;
    fn shutdown(self) -> impl Future<Output = Self::Result>;
}

/// Construct a connected [`ShutdownTrigger`] & [`ShutdownListener`] pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownListener) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownListener { rx })
}

/// Sets the cooperative shutdown flag observed by every [`ShutdownListener`].
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is requested.
    ///
    /// A dropped [`ShutdownTrigger`] is treated as a shutdown request.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|shutdown| *shutdown).await;
    }
}
