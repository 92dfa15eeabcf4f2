// GestLock — Touch Input

/// Panel coordinates of a touch, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

/// Polled touch controller.
pub trait TouchPanel: Send {
    /// Current touch, `None` while nothing touches the panel.
    fn read(&mut self) -> anyhow::Result<Option<TouchPoint>>;
}

/// Board without a touch controller: never touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTouch;

impl TouchPanel for NoTouch {
    fn read(&mut self) -> anyhow::Result<Option<TouchPoint>> {
        Ok(None)
    }
}
