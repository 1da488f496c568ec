pub mod clock;
pub mod error;
pub mod frame;
pub mod state;

pub use clock::*;
pub use error::*;
pub use frame::*;
pub use state::*;
