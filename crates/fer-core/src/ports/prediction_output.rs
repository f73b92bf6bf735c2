use crate::domain::PredictionRecord;

/// Port for emitting prediction records.
pub trait PredictionOutput: Send + Sync {
    /// Writes one record.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, record: &PredictionRecord) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
