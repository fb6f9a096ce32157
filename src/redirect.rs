/// Shorts playback redirect: `/shorts/<id>` → `/watch?v=<id>`
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn shorts_path() -> &'static Regex {
    static SHORTS_PATH: OnceLock<Regex> = OnceLock::new();
    SHORTS_PATH.get_or_init(|| {
        Regex::new(r"^/shorts/([A-Za-z0-9_-]+)/?$").expect("shorts path pattern is valid")
    })
}

fn is_video_host(host: &str) -> bool {
    host == "youtube.com" || host.ends_with(".youtube.com")
}

/// Regular player URL for a Shorts URL, or `None` if `url` is not a Shorts page
pub fn watch_url_for_shorts(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    if !matches!(parsed.scheme(), "http" | "https") || !is_video_host(parsed.host_str()?) {
        return None;
    }

    let video_id = shorts_path()
        .captures(parsed.path())?
        .get(1)?
        .as_str()
        .to_string();

    let mut watch = parsed;
    watch.set_path("/watch");
    watch.set_fragment(None);
    watch.query_pairs_mut().clear().append_pair("v", &video_id);

    Some(watch.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorts_url_is_rewritten() {
        assert_eq!(
            watch_url_for_shorts("https://www.youtube.com/shorts/abc_DEF-12"),
            Some("https://www.youtube.com/watch?v=abc_DEF-12".to_string())
        );
    }

    #[test]
    fn test_query_and_trailing_slash_are_dropped() {
        assert_eq!(
            watch_url_for_shorts("https://m.youtube.com/shorts/xyz987/?feature=share#t=3"),
            Some("https://m.youtube.com/watch?v=xyz987".to_string())
        );
    }

    #[test]
    fn test_non_shorts_urls_are_ignored() {
        assert_eq!(watch_url_for_shorts("https://www.youtube.com/watch?v=abc"), None);
        assert_eq!(watch_url_for_shorts("https://www.youtube.com/shorts/"), None);
        assert_eq!(watch_url_for_shorts("https://www.youtube.com/shorts/a/b"), None);
        assert_eq!(watch_url_for_shorts("https://example.com/shorts/abc"), None);
        assert_eq!(watch_url_for_shorts("https://notyoutube.com/shorts/abc"), None);
        assert_eq!(watch_url_for_shorts("chrome://extensions"), None);
        assert_eq!(watch_url_for_shorts("not a url"), None);
    }
}
