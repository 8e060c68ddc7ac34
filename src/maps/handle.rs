use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use super::capability::MapsCapability;

/// Load state of the mapping provider.
#[derive(Clone)]
pub enum CapabilityStatus {
    Loading,
    Ready(Arc<dyn MapsCapability>),
    Failed(String),
}

impl CapabilityStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CapabilityStatus::Loading => "loading",
            CapabilityStatus::Ready(_) => "ready",
            CapabilityStatus::Failed(_) => "failed",
        }
    }
}

impl fmt::Debug for CapabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityStatus::Loading => write!(f, "Loading"),
            CapabilityStatus::Ready(capability) => write!(f, "Ready({})", capability.name()),
            CapabilityStatus::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

/// Read side: cloned into every adapter.
#[derive(Clone)]
pub struct CapabilityHandle {
    rx: watch::Receiver<CapabilityStatus>,
}

/// Write side, held by whatever loads the provider. Resolves at most once.
pub struct CapabilityLoader {
    tx: watch::Sender<CapabilityStatus>,
}

pub fn capability_channel() -> (CapabilityLoader, CapabilityHandle) {
    let (tx, rx) = watch::channel(CapabilityStatus::Loading);
    (CapabilityLoader { tx }, CapabilityHandle { rx })
}

impl CapabilityLoader {
    pub fn ready(&self, capability: Arc<dyn MapsCapability>) -> bool {
        self.resolve(CapabilityStatus::Ready(capability))
    }

    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.resolve(CapabilityStatus::Failed(reason.into()))
    }

    fn resolve(&self, next: CapabilityStatus) -> bool {
        self.tx.send_if_modified(|current| {
            if matches!(current, CapabilityStatus::Loading) {
                *current = next;
                true
            } else {
                false
            }
        })
    }
}

impl CapabilityHandle {
    /// A handle that is ready from the start.
    pub fn ready(capability: Arc<dyn MapsCapability>) -> Self {
        let (loader, handle) = capability_channel();
        loader.ready(capability);
        handle
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        let (loader, handle) = capability_channel();
        loader.fail(reason);
        handle
    }

    pub fn status(&self) -> CapabilityStatus {
        self.rx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.rx.borrow(), CapabilityStatus::Ready(_))
    }

    /// Waits until the status leaves `Loading`. If the loader goes away
    /// first, the last status is returned as is.
    pub async fn resolved(&self) -> CapabilityStatus {
        let mut rx = self.rx.clone();
        if rx
            .wait_for(|status| !matches!(status, CapabilityStatus::Loading))
            .await
            .is_err()
        {
            tracing::debug!("capability loader dropped before resolving");
        }
        let status = rx.borrow().clone();
        status
    }
}

impl fmt::Debug for CapabilityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityHandle").field("status", &*self.rx.borrow()).finish()
    }
}
