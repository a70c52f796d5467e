//! Structured context describing where a fault happened.

/// Where in the dissection a fault was raised.
///
/// # Examples
///
/// ```
/// use dissect_core::fault::FaultContext;
///
/// let ctx = FaultContext::new()
///     .with_frame_number(7)
///     .with_protocol("UDP")
///     .with_depth(3);
///
/// assert_eq!(ctx.frame_number, Some(7));
/// assert_eq!(ctx.protocol.as_deref(), Some("UDP"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaultContext {
    /// Frame being dissected.
    pub frame_number: Option<u64>,

    /// Short name of the protocol whose dissector faulted.
    pub protocol: Option<String>,

    /// Registered name of the faulting handle, if it has one.
    pub dissector: Option<String>,

    /// Nesting depth of the faulting invocation; the root dissector is depth 1.
    pub depth: usize,
}

impl FaultContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set the frame number.
    #[must_use]
    pub fn with_frame_number(mut self, frame_number: u64) -> Self {
        self.frame_number = Some(frame_number);
        self
    }

    /// Set the protocol short name.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the dissector name.
    #[must_use]
    pub fn with_dissector(mut self, dissector: impl Into<String>) -> Self {
        self.dissector = Some(dissector.into());
        self
    }

    /// Set the nesting depth.
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }
}
