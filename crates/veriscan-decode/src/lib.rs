pub mod debounce;
pub mod decoder;
pub mod scripted;

pub use debounce::{DetectionDebouncer, DEFAULT_DUPLICATE_COOLDOWN};
pub use decoder::BarcodeDecoder;
pub use scripted::{ScriptedDecoder, ScriptedOutcome};
