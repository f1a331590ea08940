use std::sync::LazyLock;

use regex::Regex;

static DROPPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9_\s\x{0E01}-\x{0E59}]").expect("slug filter pattern is valid")
});

static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

pub fn generate_slug(title: &str, now_millis: i64) -> String {
    let lowered = title.to_lowercase();
    let kept = DROPPED.replace_all(&lowered, "");
    let dashed = SPACES.replace_all(&kept, "-");

    format!("{dashed}-{}", to_base36(now_millis.max(0) as u64))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return String::from("0");
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slug_from_plain_title() {
        assert_eq!(generate_slug("Next.js Fundamentals", 35), "nextjs-fundamentals-z");
    }

    #[test]
    fn slug_collapses_whitespace_and_drops_symbols() {
        assert_eq!(
            generate_slug("  React  +  TypeScript!  ", 36),
            "-react-typescript--10"
        );
    }

    #[test]
    fn slug_keeps_thai_letters() {
        assert_eq!(generate_slug("คอร์ส ฟรี", 0), "คอร์ส-ฟรี-0");
    }

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }
}
