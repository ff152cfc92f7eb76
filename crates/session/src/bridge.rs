//! Contract with the external proxy encoder.
//!
//! The proxy engine is a pre-built collaborator that loads asynchronously
//! relative to the shell. Until it is ready the bridge reports unavailable
//! and every launch fails with [`SessionError::EngineNotReady`]; nothing is
//! retried automatically, the user re-invokes launch.

use url::Url;

use crate::{SessionError, SessionResult};

/// The external proxy engine's URL-encoding surface.
pub trait EncoderBridge: Send + Sync {
    /// Whether the engine has finished loading.
    fn available(&self) -> bool;

    /// Path prefix the proxy transport serves encoded addresses under,
    /// e.g. `/service/`.
    fn prefix(&self) -> String;

    /// Encode an absolute destination URL into the transport's address form.
    fn encode_url(&self, url: &str) -> String;
}

/// Produce the absolute proxied address for a destination URL.
///
/// Concatenates the bridge's prefix with its encoded form of the URL and
/// resolves the result against the outer page origin.
pub fn proxied_address(
    bridge: &dyn EncoderBridge,
    origin: &Url,
    absolute_url: &str,
) -> SessionResult<Url> {
    if !bridge.available() {
        return Err(SessionError::EngineNotReady);
    }

    let encoded = format!("{}{}", bridge.prefix(), bridge.encode_url(absolute_url));
    let proxied = origin.join(&encoded)?;
    Ok(proxied)
}
