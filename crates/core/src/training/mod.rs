//! Simulated training runs and their progress streams.

mod noise;
pub mod schedule;
mod sink;
mod streamer;

pub use noise::{FixedNoise, NoiseSource, SequenceNoise, UniformNoise};
pub use sink::{ProgressSink, StreamError};
pub use streamer::{ProgressStreamer, StreamOutcome};
