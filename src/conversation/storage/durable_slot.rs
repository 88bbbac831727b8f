//! Whole-content storage slot abstraction.

use std::io;

/// A single durable location holding one text document.
///
/// Writes replace the whole content. Implementations must never leave a
/// partially written document visible to a later `read`.
pub trait DurableSlot: Send + Sync {
    /// Human-readable location used in logs and errors.
    fn describe(&self) -> String;

    /// Read the stored document, or `None` if nothing has been stored.
    ///
    /// # Errors
    /// Returns an error if the slot exists but cannot be read. Content that
    /// is not valid UTF-8 is reported as `io::ErrorKind::InvalidData`.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the stored document.
    ///
    /// # Errors
    /// Returns an error if the document could not be stored.
    fn write(&self, contents: &str) -> io::Result<()>;

    /// Remove the stored document. Removing an empty slot succeeds.
    ///
    /// # Errors
    /// Returns an error if an existing document could not be removed.
    fn remove(&self) -> io::Result<()>;
}
