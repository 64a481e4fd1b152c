//! Tensorboard recorder.
use log::warn;
use seeker_core::record::{Record, RecordValue, Recorder};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Key of the record value used as the step of the scalars.
pub const STEP_KEY: &str = "episode";

/// Write records to TFRecord.
///
/// Scalars are written as `add_scalar(key, value, step)`, where `step` is the
/// value of [`STEP_KEY`] in the record. Other values are ignored.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// Records without a scalar step key are dropped with a warning.
    fn write(&mut self, record: Record) {
        let step = match record.get(STEP_KEY) {
            Some(RecordValue::Scalar(v)) => *v as usize,
            _ => {
                warn!("Record without scalar {:?} is dropped", STEP_KEY);
                return;
            }
        };

        for (k, v) in record.iter() {
            match v {
                RecordValue::Scalar(v) if k != STEP_KEY => self.writer.add_scalar(k, *v, step),
                _ => {}
            }
        }
    }

    fn flush(&mut self) {
        self.writer.flush();
    }
}
