/// Events delivered to the host over the controller's broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerEvent {
    /// An accepted (non-duplicate) detection. Fired exactly once per
    /// activation; the scanner has already stopped itself when this arrives.
    Detected { code: String },

    /// A classified, user-presentable failure. The session may or may not
    /// still be active; see `StateChange`.
    Error { message: String },

    /// The scanner became active or returned to idle.
    StateChange { active: bool },
}
