/// Classification for retry policy.
///
/// Used by the live adapter to decide how to respond to a failed request.
///
/// | Class | Try Next API Key? |
/// |-------|-------------------|
/// | `Never` | No |
/// | `NextKey` | Yes, until the key list is exhausted |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad symbol, unreadable payload, or transport failure.
    Never,

    /// The current key was throttled (429) or refused (401/403).
    /// Another key from the configured list may still succeed.
    NextKey,
}
