//! Plain-text usage page served on `GET /`.

use super::paste::request_host;
use crate::AppState;
use axum::{extract::State, http::HeaderMap};

const MANPAGE_TEMPLATE: &str = "NAME
\tpaast - create pastes with different methods

SYNOPSIS
\tcat code.txt | curl {HOST} --data-binary @-
\tcat code.txt | curl {HOST} -F 'foo=<-'
\tcat code.txt | curl {HOST} -F '=<-'
\tcat code.txt | http {HOST}

LIMITS
\tMaximum allowed request body size is {MAX_SIZE}.
\tCreating pastes has a {COOLDOWN}-second cooldown.

STATUS CODES
\t200 - paste created, URL returned in response
\t400 - bad request or empty paste input
\t413 - paste input too large
\t429 - attempt to create too many pastes, please wait {COOLDOWN} seconds
\t500 - internal server error
";

fn human_size(bytes: usize) -> String {
    const MIB: usize = 1 << 20;
    const KIB: usize = 1 << 10;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

pub(crate) fn render_manpage(host: &str, max_paste_size: usize, cooldown_secs: u64) -> String {
    MANPAGE_TEMPLATE
        .replace("{HOST}", host)
        .replace("{MAX_SIZE}", &human_size(max_paste_size))
        .replace("{COOLDOWN}", &cooldown_secs.to_string())
}

/// Render the usage page for the requesting host.
pub async fn manpage(State(state): State<AppState>, headers: HeaderMap) -> String {
    render_manpage(
        request_host(&headers, state.config.trust_proxy_headers),
        state.config.max_paste_size,
        state.config.paste_cooldown_secs,
    )
}

#[cfg(test)]
mod tests {
    use super::{human_size, render_manpage};

    #[test]
    fn manpage_substitutes_host_and_limits() {
        let page = render_manpage("paste.example", 1 << 20, 5);
        assert!(page.contains("curl paste.example --data-binary @-"));
        assert!(page.contains("request body size is 1 MB."));
        assert!(page.contains("has a 5-second cooldown"));
        assert!(!page.contains('{'));
    }

    #[test]
    fn human_size_prefers_whole_units() {
        assert_eq!(human_size(1 << 20), "1 MB");
        assert_eq!(human_size(64 * 1024), "64 KB");
        assert_eq!(human_size(1000), "1000 bytes");
    }
}
