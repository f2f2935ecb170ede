use thiserror::Error;

/// The error returned when removing a key that is not present in the tree.
///
/// Removal of a missing key is a no-op; the tree is left exactly as it was.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Error)]
#[error("key not found in tree")]
pub struct KeyNotFound;
