//! Types and traits for recording training metrics.
//!
//! A [`Record`] is a bag of named values produced by the environment, the
//! agent and the trainer. Records are delivered to a [`Recorder`], which writes
//! them somewhere: memory ([`BufferedRecorder`]), nowhere ([`NullRecorder`])
//! or a TFRecord file (`seeker_tensorboard::TensorboardRecorder`).
//!
//! ```rust
//! use seeker_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(10.0));
//! record.insert("avg_reward", RecordValue::Scalar(-3.2));
//! assert_eq!(record.get_scalar("episode").unwrap(), 10.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
