/// Deep link formatting
///
/// Renders the canonical invitation URI `<scheme>://invite/<identifier>`
/// for both invite codes and QR identities. The URI shape is identical
/// for the two paths; consumers distinguish them only by which endpoint
/// they call.
///
/// The scheme is one process-wide configured value injected here, never
/// a literal duplicated at call sites.

/// Default URI scheme when none is configured
pub const DEFAULT_SCHEME: &str = "stridelink";

/// Formats invitation deep links with a configured scheme
///
/// # Example
///
/// ```
/// use stridelink_shared::invite::deeplink::DeepLinkFormatter;
///
/// let links = DeepLinkFormatter::new("stridelink");
/// assert_eq!(
///     links.format("ucXKeBTSLkyVZJWVnOYCWg"),
///     "stridelink://invite/ucXKeBTSLkyVZJWVnOYCWg"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct DeepLinkFormatter {
    scheme: String,
}

impl DeepLinkFormatter {
    /// Creates a formatter with the given URI scheme
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    /// The configured URI scheme
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Renders the invitation URI for a code or QR identifier
    ///
    /// Pure function; no I/O.
    pub fn format(&self, identifier: &str) -> String {
        format!("{}://invite/{}", self.scheme, identifier)
    }
}

impl Default for DeepLinkFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME)
    }
}
