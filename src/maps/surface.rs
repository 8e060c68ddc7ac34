use std::sync::atomic::{AtomicBool, Ordering};

/// The region a map is drawn into.
pub trait DisplaySurface: Send + Sync {
    fn id(&self) -> &str;

    fn is_attached(&self) -> bool;

    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);
}

/// Surface of a map modal. Attached while the modal is on screen.
#[derive(Debug)]
pub struct ModalSurface {
    id: String,
    width: u32,
    height: u32,
    attached: AtomicBool,
}

impl ModalSurface {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            attached: AtomicBool::new(false),
        }
    }

    pub fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}

impl DisplaySurface for ModalSurface {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
