// Purpose: Voices, key activation and the block render engine
// This layer turns key states into PCM and owns the sample clock

pub mod activation;
pub mod clock;
pub mod engine;
pub mod keys;
pub mod message;
pub mod readback;
pub mod voice;

pub use activation::{ActivationTable, Source};
pub use keys::KeyId;
