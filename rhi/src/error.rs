use std::fmt;

/// Non-fatal status returned alongside a successful value.
///
/// Several operations overload "success" with a shade of meaning the caller
/// may want to act on (a swapchain that still works but should be recreated
/// soon, an adapter list that got truncated). `Status::Success` is the
/// ordinary case; the others are still `Ok(..)` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation completed exactly as requested.
    Success,
    /// The operation completed but truncated its output (e.g. a buffer that
    /// was too small for every available entry).
    Incomplete,
    /// The operation completed but the surface it touched should be
    /// recreated soon (e.g. an occluded swapchain).
    Suboptimal,
}

impl Default for Status {
    fn default() -> Self {
        Status::Success
    }
}

/// The error taxonomy shared by every backend.
///
/// Variants map 1:1 onto the result codes a native backend returns; backend
/// crates are responsible for translating `HRESULT`s or other native error
/// codes into one of these at the boundary. The core never leaks a raw
/// native error code across the public API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller violated a documented API contract (illegal state
    /// transition, non-increasing timeline signal, mismatched object
    /// ownership). The call that returned this is a no-op beyond it.
    #[error("invalid API usage: {0}")]
    InvalidApiUsage(String),

    /// Host or device memory was exhausted.
    #[error("out of memory")]
    OutOfMemory,

    /// The backend or adapter cannot satisfy the request.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The GPU device was lost (removed, reset, or hung). Every subsequent
    /// operation on the owning device must also return this.
    #[error("device removed")]
    DeviceRemoved,

    /// The underlying driver returned an error the core does not have a
    /// more specific mapping for; the device itself is still valid.
    #[error("system failure: {0}")]
    SystemFailure(String),

    /// A fence wait did not complete within the requested timeout.
    #[error("wait timed out")]
    Timeout,
}

impl Error {
    /// `true` for every variant; kept as an associated function (rather than
    /// bare `true`) so call sites read the same as the original ABI's
    /// `vri_is_error(result)` helper.
    pub fn is_error(&self) -> bool {
        true
    }
}

/// The result type returned by every fallible entry point.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Incomplete => write!(f, "incomplete"),
            Status::Suboptimal => write!(f, "suboptimal"),
        }
    }
}
