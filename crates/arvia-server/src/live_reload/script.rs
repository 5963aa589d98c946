//! Live reload client script and HTML injection.

use std::borrow::Cow;

/// Path of the WebSocket endpoint browsers connect to.
pub(crate) const RELOAD_ENDPOINT: &str = "/ws";

/// The only message a session ever sends.
pub(crate) const RELOAD_MESSAGE: &str = "reload";

/// Marker the script is inserted in front of.
const BODY_CLOSE: &[u8] = b"</body>";

/// Build the client script for a server listening on `port`.
pub(crate) fn reload_script(port: u16) -> String {
    format!(
        "<script>
    (function () {{
        const ws = new WebSocket('ws://' + location.hostname + ':{port}{RELOAD_ENDPOINT}');
        ws.onmessage = function (event) {{
            if (event.data === '{RELOAD_MESSAGE}') {{
                location.reload();
            }}
        }};
    }})();
</script>"
    )
}

/// Insert `script` immediately before the last `</body>` of `html`.
///
/// Works on raw bytes, so documents that are not valid UTF-8 pass through
/// untouched apart from the insertion. Without a closing body tag the input
/// is returned unchanged.
pub(crate) fn inject_reload_script<'a>(html: &'a [u8], script: &str) -> Cow<'a, [u8]> {
    let Some(pos) = html
        .windows(BODY_CLOSE.len())
        .rposition(|window| window == BODY_CLOSE)
    else {
        return Cow::Borrowed(html);
    };

    let mut out = Vec::with_capacity(html.len() + script.len());
    out.extend_from_slice(&html[..pos]);
    out.extend_from_slice(script.as_bytes());
    out.extend_from_slice(&html[pos..]);
    Cow::Owned(out)
}
