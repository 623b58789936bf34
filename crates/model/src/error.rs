/// The kind of error that occurred during an exchange.
///
/// Callers are not expected to recover differently per kind, it is mostly
/// useful for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be delivered, or the connection broke before
    /// a response was received.
    Transport,
    /// The service answered with a non-successful status.
    Status,
    /// The service answered, but the body is not a usable completion.
    Malformed,
    /// Any other errors.
    Other,
}
