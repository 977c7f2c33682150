//! vCard 3.0 export of a share snapshot.

use crate::field::ShareField;
use crate::snapshot::ShareSnapshot;

/// MIME type of a rendered card.
pub const VCARD_CONTENT_TYPE: &str = "text/vcard; charset=utf-8";

/// A rendered contact card ready to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCard {
    /// Suggested download name, e.g. `tyler-b.vcf`.
    pub filename: String,
    /// Card text with CRLF line endings.
    pub body: String,
}

impl ContactCard {
    /// Render `snapshot` as a card.
    ///
    /// Phone, email and website become direct properties; every social or
    /// payment handle becomes a labeled `itemN.URL`.
    #[must_use]
    pub fn from_snapshot(snapshot: &ShareSnapshot) -> Self {
        let mut lines: Vec<String> = vec![
            "BEGIN:VCARD".into(),
            "VERSION:3.0".into(),
            format!("FN:{}", escape(&snapshot.display_name)),
            format!("N:{}", structured_name(&snapshot.display_name)),
        ];

        let mut group = 0;
        for item in &snapshot.items {
            match item.field {
                ShareField::Phone => lines.push(format!("TEL;TYPE=CELL:{}", escape(&item.value))),
                ShareField::Email => {
                    lines.push(format!("EMAIL;TYPE=INTERNET:{}", escape(&item.value)));
                }
                ShareField::Website => lines.push(format!("URL:{}", url_value(&item.value))),
                _ => {
                    group += 1;
                    lines.push(format!("item{group}.URL:{}", url_value(&item.value)));
                    lines.push(format!("item{group}.X-ABLabel:{}", escape(&item.label)));
                }
            }
        }
        lines.push("END:VCARD".into());

        let mut body = String::new();
        for line in &lines {
            body.push_str(line);
            body.push_str("\r\n");
        }

        Self {
            filename: filename_for(&snapshot.display_name),
            body,
        }
    }
}

/// Escape a text value per RFC 6350 section 3.4.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// URI values are not text-escaped, but control characters would break the
/// line structure and are dropped.
fn url_value(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

/// `N` property: last word is the family name, the rest the given names.
fn structured_name(display_name: &str) -> String {
    let words: Vec<&str> = display_name.split_whitespace().collect();
    match words.split_last() {
        Some((family, given)) if !given.is_empty() => {
            format!("{};{};;;", escape(family), escape(&given.join(" ")))
        }
        Some((only, _)) => format!(";{};;;", escape(only)),
        None => ";;;;".to_owned(),
    }
}

/// Lowercase ASCII slug of the display name plus `.vcf`.
fn filename_for(display_name: &str) -> String {
    let mut slug = String::new();
    for c in display_name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "contact.vcf".to_owned()
    } else {
        format!("{slug}.vcf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSet;
    use crate::profile::Profile;
    use crate::snapshot::SnapshotItem;

    fn snapshot() -> ShareSnapshot {
        let profile = Profile::new("u1")
            .with_name("Tyler Brooks")
            .with(ShareField::Phone, "555-0100")
            .with(ShareField::Email, "t@x.io")
            .with(ShareField::Website, "tyler.dev")
            .with(ShareField::Instagram, "@tyler")
            .with(ShareField::Cashapp, "$tyler");
        let fields: FieldSet = ShareField::ALL.into_iter().collect();
        ShareSnapshot::build(Some(&profile), &fields)
    }

    #[test]
    fn renders_direct_and_labeled_fields() {
        let card = ContactCard::from_snapshot(&snapshot());
        let lines: Vec<&str> = card.body.split("\r\n").collect();
        assert_eq!(lines[0], "BEGIN:VCARD");
        assert_eq!(lines[1], "VERSION:3.0");
        assert!(lines.contains(&"FN:Tyler Brooks"));
        assert!(lines.contains(&"N:Brooks;Tyler;;;"));
        assert!(lines.contains(&"TEL;TYPE=CELL:555-0100"));
        assert!(lines.contains(&"EMAIL;TYPE=INTERNET:t@x.io"));
        assert!(lines.contains(&"URL:https://tyler.dev"));
        assert!(lines.contains(&"item1.URL:https://instagram.com/tyler"));
        assert!(lines.contains(&"item1.X-ABLabel:Instagram"));
        assert!(lines.contains(&"item2.URL:https://cash.app/$tyler"));
        assert!(lines.contains(&"item2.X-ABLabel:Cash App"));
        assert!(card.body.ends_with("END:VCARD\r\n"));
    }

    #[test]
    fn filename_derives_from_display_name() {
        assert_eq!(filename_for("Tyler Brooks"), "tyler-brooks.vcf");
        assert_eq!(filename_for("  Zoë & Co. "), "zo-co.vcf");
        assert_eq!(filename_for("!!!"), "contact.vcf");
    }

    #[test]
    fn text_values_are_escaped() {
        assert_eq!(escape("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }

    #[test]
    fn url_values_cannot_inject_properties() {
        let card = ContactCard::from_snapshot(&ShareSnapshot {
            display_name: "Tyler".into(),
            items: vec![SnapshotItem {
                field: ShareField::Website,
                label: "Website".into(),
                value: "https://tyler.dev\r\nNOTE:injected".into(),
                href: None,
            }],
        });
        assert!(card.body.contains("URL:https://tyler.devNOTE:injected\r\n"));
        assert!(!card.body.contains("\r\nNOTE:"));
    }

    #[test]
    fn single_word_name() {
        assert_eq!(structured_name("Cher"), ";Cher;;;");
        assert_eq!(structured_name(""), ";;;;");
    }

    #[test]
    fn card_without_items_still_has_identity_line() {
        let card = ContactCard::from_snapshot(&ShareSnapshot {
            display_name: "Shared contact".into(),
            items: vec![],
        });
        assert!(card.body.contains("FN:Shared contact\r\n"));
        assert_eq!(card.filename, "shared-contact.vcf");
    }
}
