//! Resolved touch-screen control events

/// Control surface trait — hit-testing happens behind this boundary.
pub trait ControlSurface {
    /// Poll for a resolved control event (non-blocking)
    fn poll_event(&mut self) -> Option<ControlEvent>;
}

/// Player controls a touch can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    /// Toggle pause/resume
    PausePlay,
    /// Skip to the next track
    Skip,
    /// Volume up one step
    VolumeUp,
    /// Volume down one step
    VolumeDown,
}
