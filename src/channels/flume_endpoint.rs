//! Flume-backed channel endpoints.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ChannelEndpoint, ChannelError};
use crate::tensor::Tensor;
use crate::types::{DType, Shape};

/// One end of a full-duplex channel built from a pair of bounded flume
/// queues.
///
/// [`FlumeEndpoint::pair`] produces the two ends of a producer/consumer link:
/// frames sent on one end arrive at the other. [`FlumeEndpoint::loopback`]
/// wires an endpoint to itself, which is convenient for probes and tests.
///
/// `stop()` drops this end's sender and marks the whole link as stopping, so
/// a peer blocked in `recv` drains the buffer and then observes
/// [`ChannelError::Closed`] rather than hanging.
pub struct FlumeEndpoint {
    name: String,
    shape: Shape,
    dtype: DType,
    capacity: usize,
    started: AtomicBool,
    stopping: Arc<AtomicBool>,
    tx: Mutex<Option<flume::Sender<Tensor>>>,
    rx: Mutex<Option<flume::Receiver<Tensor>>>,
}

impl FlumeEndpoint {
    /// Create both ends of a link. Frames sent on `a` arrive at `b` and vice
    /// versa; each end is named for the port attribute it will bind to.
    pub fn pair(
        a_name: impl Into<String>,
        b_name: impl Into<String>,
        shape: Shape,
        dtype: DType,
        capacity: usize,
    ) -> (Arc<Self>, Arc<Self>) {
        let (tx_ab, rx_ab) = flume::bounded(capacity);
        let (tx_ba, rx_ba) = flume::bounded(capacity);
        let stopping = Arc::new(AtomicBool::new(false));
        let a = Arc::new(FlumeEndpoint {
            name: a_name.into(),
            shape: shape.clone(),
            dtype,
            capacity,
            started: AtomicBool::new(false),
            stopping: Arc::clone(&stopping),
            tx: Mutex::new(Some(tx_ab)),
            rx: Mutex::new(Some(rx_ba)),
        });
        let b = Arc::new(FlumeEndpoint {
            name: b_name.into(),
            shape,
            dtype,
            capacity,
            started: AtomicBool::new(false),
            stopping,
            tx: Mutex::new(Some(tx_ba)),
            rx: Mutex::new(Some(rx_ab)),
        });
        (a, b)
    }

    /// An endpoint whose sends arrive at its own receiver.
    pub fn loopback(
        name: impl Into<String>,
        shape: Shape,
        dtype: DType,
        capacity: usize,
    ) -> Arc<Self> {
        let (tx, rx) = flume::bounded(capacity);
        Arc::new(FlumeEndpoint {
            name: name.into(),
            shape,
            dtype,
            capacity,
            started: AtomicBool::new(false),
            stopping: Arc::new(AtomicBool::new(false)),
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
        })
    }

    fn end_of_stream(&self) -> ChannelError {
        if self.stopping.load(Ordering::Acquire) {
            ChannelError::Closed {
                endpoint: self.name.clone(),
            }
        } else {
            ChannelError::Disconnected {
                endpoint: self.name.clone(),
            }
        }
    }

    fn sender(&self) -> Option<flume::Sender<Tensor>> {
        self.tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn receiver(&self) -> Option<flume::Receiver<Tensor>> {
        self.rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChannelEndpoint for FlumeEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn start(&self) {
        self.started.store(true, Ordering::Release);
        tracing::debug!(endpoint = %self.name, "channel endpoint started");
    }

    fn stop(&self) {
        self.stopping.store(true, Ordering::Release);
        // Dropping the sender lets peers drain and then observe Closed.
        self.tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        tracing::debug!(endpoint = %self.name, "channel endpoint stopped");
    }

    async fn send(&self, frame: Tensor) -> Result<(), ChannelError> {
        if !self.started.load(Ordering::Acquire) {
            return Err(ChannelError::NotStarted {
                endpoint: self.name.clone(),
            });
        }
        let Some(tx) = self.sender() else {
            return Err(self.end_of_stream());
        };
        tx.send_async(frame)
            .await
            .map_err(|_| self.end_of_stream())
    }

    async fn recv(&self) -> Result<Tensor, ChannelError> {
        if !self.started.load(Ordering::Acquire) {
            return Err(ChannelError::NotStarted {
                endpoint: self.name.clone(),
            });
        }
        let Some(rx) = self.receiver() else {
            return Err(self.end_of_stream());
        };
        rx.recv_async().await.map_err(|_| self.end_of_stream())
    }
}
