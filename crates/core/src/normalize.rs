//! Presentation rules for shared contact values.
//!
//! The same rules feed the disclosure snapshot and the contact card, so both
//! outputs always agree. Every rule is idempotent: feeding a normalized value
//! back in returns it unchanged.

use crate::field::ShareField;

/// Normalize a raw profile value for `field`.
///
/// Returns `None` when nothing presentable remains (blank input, a bare `@`,
/// a WhatsApp number without digits).
#[must_use]
pub fn normalize(field: ShareField, raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    match field {
        ShareField::Phone | ShareField::Email => Some(value.to_owned()),
        ShareField::Website => Some(ensure_scheme(value)),
        ShareField::Instagram => handle_url(value, &["instagram.com/"], '@', |h| {
            format!("https://instagram.com/{h}")
        }),
        ShareField::Tiktok => {
            handle_url(value, &["tiktok.com/"], '@', |h| format!("https://tiktok.com/@{h}"))
        }
        ShareField::Snapchat => handle_url(value, &["snapchat.com/"], '@', |h| {
            format!("https://snapchat.com/add/{h}")
        }),
        ShareField::Venmo => {
            handle_url(value, &["venmo.com/"], '@', |h| format!("https://venmo.com/u/{h}"))
        }
        ShareField::X => handle_url(value, &["x.com/", "twitter.com/"], '@', |h| {
            format!("https://x.com/{h}")
        }),
        ShareField::Linkedin => handle_url(value, &["linkedin.com/"], '@', |h| {
            format!("https://linkedin.com/in/{h}")
        }),
        ShareField::Youtube => youtube(value),
        ShareField::Whatsapp => whatsapp(value),
        ShareField::Cashapp => {
            handle_url(value, &["cash.app/"], '$', |h| format!("https://cash.app/${h}"))
        }
    }
}

/// Link target for an already-normalized value.
#[must_use]
pub fn href_for(field: ShareField, normalized: &str) -> String {
    match field {
        ShareField::Phone => {
            let compact: String = normalized.split_whitespace().collect();
            format!("tel:{compact}")
        }
        ShareField::Email => format!("mailto:{normalized}"),
        _ => normalized.to_owned(),
    }
}

fn has_scheme(value: &str) -> bool {
    value.contains("://")
}

fn ensure_scheme(value: &str) -> String {
    if has_scheme(value) {
        value.to_owned()
    } else {
        format!("https://{value}")
    }
}

/// URLs and host-qualified paths pass through; anything else is a handle.
fn handle_url(
    value: &str,
    hosts: &[&str],
    sigil: char,
    build: impl Fn(&str) -> String,
) -> Option<String> {
    if has_scheme(value) {
        return Some(value.to_owned());
    }
    let lower = value.to_ascii_lowercase();
    if hosts.iter().any(|host| lower.contains(host)) {
        return Some(ensure_scheme(value));
    }
    let handle = value.trim_start_matches(sigil).trim();
    if handle.is_empty() {
        None
    } else {
        Some(build(handle))
    }
}

fn youtube(value: &str) -> Option<String> {
    if has_scheme(value) {
        return Some(value.to_owned());
    }
    let lower = value.to_ascii_lowercase();
    if lower.contains("youtube.com/") || lower.contains("youtu.be/") {
        return Some(ensure_scheme(value));
    }
    let path = value.trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    if path.starts_with('@') {
        return (path.len() > 1).then(|| format!("https://youtube.com/{path}"));
    }
    if ["channel/", "c/", "user/"]
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return Some(format!("https://youtube.com/{path}"));
    }
    Some(format!("https://youtube.com/@{path}"))
}

fn whatsapp(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("https://wa.me/{digits}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(field: ShareField, raw: &str) -> Option<String> {
        normalize(field, raw)
    }

    #[test]
    fn documented_examples() {
        assert_eq!(
            n(ShareField::Instagram, "@tyler").as_deref(),
            Some("https://instagram.com/tyler")
        );
        assert_eq!(
            n(ShareField::Cashapp, "$tyler").as_deref(),
            Some("https://cash.app/$tyler")
        );
        assert_eq!(
            n(ShareField::Whatsapp, "+1 (555) 123-4567").as_deref(),
            Some("https://wa.me/15551234567")
        );
    }

    #[test]
    fn website_gets_scheme_once() {
        assert_eq!(n(ShareField::Website, "tyler.dev").as_deref(), Some("https://tyler.dev"));
        assert_eq!(
            n(ShareField::Website, "http://tyler.dev").as_deref(),
            Some("http://tyler.dev")
        );
    }

    #[test]
    fn handle_platforms_build_profile_urls() {
        assert_eq!(n(ShareField::Tiktok, "@tyler").as_deref(), Some("https://tiktok.com/@tyler"));
        assert_eq!(n(ShareField::Tiktok, "tyler").as_deref(), Some("https://tiktok.com/@tyler"));
        assert_eq!(
            n(ShareField::Snapchat, "tyler").as_deref(),
            Some("https://snapchat.com/add/tyler")
        );
        assert_eq!(n(ShareField::Venmo, "@tyler").as_deref(), Some("https://venmo.com/u/tyler"));
    }

    #[test]
    fn x_passes_urls_and_builds_handles() {
        assert_eq!(n(ShareField::X, "@tyler").as_deref(), Some("https://x.com/tyler"));
        assert_eq!(
            n(ShareField::X, "https://twitter.com/tyler").as_deref(),
            Some("https://twitter.com/tyler")
        );
    }

    #[test]
    fn linkedin_rules() {
        assert_eq!(
            n(ShareField::Linkedin, "tyler").as_deref(),
            Some("https://linkedin.com/in/tyler")
        );
        assert_eq!(
            n(ShareField::Linkedin, "linkedin.com/in/tyler-b").as_deref(),
            Some("https://linkedin.com/in/tyler-b")
        );
        assert_eq!(
            n(ShareField::Linkedin, "https://www.linkedin.com/company/acme").as_deref(),
            Some("https://www.linkedin.com/company/acme")
        );
    }

    #[test]
    fn youtube_rules() {
        assert_eq!(
            n(ShareField::Youtube, "@tyler").as_deref(),
            Some("https://youtube.com/@tyler")
        );
        assert_eq!(
            n(ShareField::Youtube, "channel/UC123").as_deref(),
            Some("https://youtube.com/channel/UC123")
        );
        assert_eq!(
            n(ShareField::Youtube, "c/tylerclips").as_deref(),
            Some("https://youtube.com/c/tylerclips")
        );
        assert_eq!(
            n(ShareField::Youtube, "user/tyler").as_deref(),
            Some("https://youtube.com/user/tyler")
        );
        assert_eq!(n(ShareField::Youtube, "tyler").as_deref(), Some("https://youtube.com/@tyler"));
        assert_eq!(
            n(ShareField::Youtube, "https://youtu.be/xyz").as_deref(),
            Some("https://youtu.be/xyz")
        );
    }

    #[test]
    fn whatsapp_without_digits_is_omitted() {
        assert_eq!(n(ShareField::Whatsapp, "call me"), None);
    }

    #[test]
    fn blank_and_bare_sigils_are_omitted() {
        assert_eq!(n(ShareField::Phone, "   "), None);
        assert_eq!(n(ShareField::Instagram, "@"), None);
        assert_eq!(n(ShareField::Cashapp, "$"), None);
        assert_eq!(n(ShareField::Youtube, "@"), None);
        assert_eq!(n(ShareField::Youtube, "/"), None);
        assert_eq!(n(ShareField::Youtube, "///"), None);
    }

    #[test]
    fn phone_and_email_pass_through() {
        assert_eq!(n(ShareField::Phone, " 555 0100 ").as_deref(), Some("555 0100"));
        assert_eq!(n(ShareField::Email, "t@x.io").as_deref(), Some("t@x.io"));
    }

    #[test]
    fn hrefs() {
        assert_eq!(href_for(ShareField::Phone, "+1 555 0100"), "tel:+15550100");
        assert_eq!(href_for(ShareField::Email, "t@x.io"), "mailto:t@x.io");
        assert_eq!(
            href_for(ShareField::Instagram, "https://instagram.com/t"),
            "https://instagram.com/t"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            (ShareField::Website, "tyler.dev"),
            (ShareField::Instagram, "@tyler"),
            (ShareField::Tiktok, "tyler"),
            (ShareField::Snapchat, "@tyler"),
            (ShareField::Venmo, "tyler"),
            (ShareField::X, "@tyler"),
            (ShareField::Linkedin, "tyler"),
            (ShareField::Youtube, "channel/UC1"),
            (ShareField::Youtube, "tyler"),
            (ShareField::Whatsapp, "+1 (555) 123-4567"),
            (ShareField::Cashapp, "$tyler"),
            (ShareField::Phone, "555-0100"),
            (ShareField::Email, "t@x.io"),
        ];
        for (field, raw) in samples {
            let once = normalize(field, raw).unwrap();
            let twice = normalize(field, &once).unwrap();
            assert_eq!(once, twice, "{field} not idempotent for {raw:?}");
        }
    }
}
