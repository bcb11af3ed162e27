use tracing::debug;
use url::Url;

/// Rewrite every URI line of an HLS playlist so it points back at the relay.
///
/// Lines are processed one at a time with their terminators (`\n` or `\r\n`)
/// kept verbatim. Tag lines (`#...`), blank lines and lines starting with
/// whitespace pass through untouched. For any other line the leading
/// non-whitespace token is resolved against `base` and replaced with
/// `<relay_base>?url=<absolute>&referer=<referer>`, both percent-encoded.
/// A token that cannot be resolved is left as is.
pub fn rewrite_playlist(body: &str, base: &Url, relay_base: &str, referer: &str) -> String {
    let separator = if relay_base.contains('?') { '&' } else { '?' };
    let encoded_referer = urlencoding::encode(referer);
    let mut output = String::with_capacity(body.len() * 2);

    for line in body.split_inclusive('\n') {
        let content = line.trim_end_matches(['\r', '\n']);
        let terminator = &line[content.len()..];

        let Some((token, rest)) = candidate(content) else {
            output.push_str(line);
            continue;
        };

        match base.join(token) {
            Ok(absolute) => {
                output.push_str(relay_base);
                output.push(separator);
                output.push_str("url=");
                output.push_str(&urlencoding::encode(absolute.as_str()));
                output.push_str("&referer=");
                output.push_str(&encoded_referer);
                output.push_str(rest);
                output.push_str(terminator);
            }
            Err(e) => {
                debug!("Leaving unresolvable playlist entry {:?}: {}", token, e);
                output.push_str(line);
            }
        }
    }

    output
}

/// Split a line into its URI token and the remainder, if it is a URI line
fn candidate(content: &str) -> Option<(&str, &str)> {
    let first = content.chars().next()?;
    if first == '#' || first.is_whitespace() {
        return None;
    }
    let end = content
        .find(char::is_whitespace)
        .unwrap_or(content.len());
    Some(content.split_at(end))
}
