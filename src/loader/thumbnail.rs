use std::time::Duration;

use tracing::debug;

use crate::classify::{Thumbnail, ThumbnailState};

/// First thumbnail URL that answers a HEAD request: the primary, then the
/// fallback once. `None` means the thumbnail should be hidden.
pub fn probe_thumbnail(thumbnail: &Thumbnail, timeout: Duration) -> Option<String> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let mut state = ThumbnailState::default();

    while let Some(url) = thumbnail.url(state) {
        match agent.head(url).call() {
            Ok(_) => return Some(url.to_string()),
            Err(e) => {
                debug!(url, "Thumbnail unavailable: {}", e);
                state = state.on_load_failure();
            }
        }
    }
    None
}
