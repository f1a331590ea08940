use std::sync::LazyLock;

use regex::Regex;

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
        .expect("youtube id pattern is valid")
});

/// Video id usable in `https://www.youtube.com/embed/{id}`.
pub fn youtube_id(url: &str) -> Option<String> {
    YOUTUBE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn watch_url() {
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?v=ZVnjOPwW4ZA&t=42").as_deref(),
            Some("ZVnjOPwW4ZA")
        );
    }

    #[test]
    fn short_and_embed_urls() {
        assert_eq!(youtube_id("https://youtu.be/abc123?si=x").as_deref(), Some("abc123"));
        assert_eq!(
            youtube_id("https://www.youtube.com/embed/xyz#start").as_deref(),
            Some("xyz")
        );
    }

    #[test]
    fn other_hosts_have_no_id() {
        assert_eq!(youtube_id("https://vimeo.com/12345"), None);
        assert_eq!(youtube_id("https://youtu.be/"), None);
    }
}
