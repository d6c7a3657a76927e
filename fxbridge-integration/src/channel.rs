use derive_more::Constructor;
use std::marker::PhantomData;

pub trait Tx
where
    Self: Clone + Send,
{
    type Item;
    type Error;
    fn send(&self, item: Self::Item) -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub struct UnboundedTx<T, Error> {
    pub tx: tokio::sync::mpsc::UnboundedSender<T>,
    phantom: PhantomData<Error>,
}

impl<T, Error> Clone for UnboundedTx<T, Error> {
    fn clone(&self) -> Self {
        Self::new(self.tx.clone())
    }
}

impl<T, Error> UnboundedTx<T, Error> {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<T>) -> Self {
        Self {
            tx,
            phantom: PhantomData,
        }
    }
}

impl<T, Error> Tx for UnboundedTx<T, Error>
where
    T: Send,
    Error: From<tokio::sync::mpsc::error::SendError<T>> + Send,
{
    type Item = T;
    type Error = Error;

    fn send(&self, item: Self::Item) -> Result<(), Self::Error> {
        self.tx.send(item).map_err(Error::from)
    }
}

#[derive(Debug, Constructor)]
pub struct UnboundedRx<T> {
    pub rx: tokio::sync::mpsc::UnboundedReceiver<T>,
}

impl<T> UnboundedRx<T> {
    /// Non-blocking receive of the next queued item.
    ///
    /// Returns `Ok(None)` if the queue is currently empty, and `Err(Disconnected)` once every
    /// sender has been dropped and the queue is drained.
    pub fn try_next(&mut self) -> Result<Option<T>, Disconnected> {
        match self.rx.try_recv() {
            Ok(item) => Ok(Some(item)),
            Err(tokio::sync::mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected) => Err(Disconnected),
        }
    }

    /// Drain every item currently queued without waiting for more.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain { rx: self }
    }

    /// Wait for the next item, returning `None` once every sender has been dropped.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

/// Every [`UnboundedTx`] associated with an [`UnboundedRx`] has been dropped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Disconnected;

/// Non-blocking [`Iterator`] over the items currently queued in an [`UnboundedRx`].
#[derive(Debug)]
pub struct Drain<'a, T> {
    rx: &'a mut UnboundedRx<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.try_next().ok().flatten()
    }
}

pub fn mpsc_unbounded<T, Error>() -> (UnboundedTx<T, Error>, UnboundedRx<T>) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    (UnboundedTx::new(tx), UnboundedRx::new(rx))
}
