//! Default User-Agent for download requests.

/// Product token sent with every request unless the config overrides it.
const PRODUCT: &str = "update-downloader";

/// Default User-Agent for download requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version} (single-file-fetch)")
}
