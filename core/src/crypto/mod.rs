
pub mod types;
pub mod rng;
pub mod envelope;
pub mod keystream;

pub use types::*;
pub use rng::*;
pub use envelope::*;
pub use keystream::*;
