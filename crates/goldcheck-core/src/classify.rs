//! Classification of string values that betray a particular run or machine.
//!
//! Rules are evaluated in a fixed order and the first match wins, so a value
//! is attributed to exactly one kind.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// The one datetime literal fixtures may carry.
pub const EPOCH_SENTINEL: &str = "1970-01-01T00:00:00Z";

/// File URIs rooted here are stand-ins, not real locations.
pub const PLACEHOLDER_FILE_URI: &str = "file:///placeholder";

const FILE_URI_SCHEME: &str = "file:///";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Datetime,
    Uuid,
    FileUri,
    AbsolutePath,
}

impl ValueKind {
    /// Label used in violation messages (`contains <label>`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Datetime => "datetime",
            Self::Uuid => "UUID",
            Self::FileUri => "file URI",
            Self::AbsolutePath => "absolute path",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A predicate paired with the kind it reports.
#[derive(Clone, Copy)]
pub struct Rule {
    pub kind: ValueKind,
    pub matches: fn(&str) -> bool,
}

/// Precedence order. Earlier rules shadow later ones.
pub const RULES: [Rule; 4] = [
    Rule {
        kind: ValueKind::Datetime,
        matches: is_datetime,
    },
    Rule {
        kind: ValueKind::Uuid,
        matches: is_uuid,
    },
    Rule {
        kind: ValueKind::FileUri,
        matches: is_disallowed_file_uri,
    },
    Rule {
        kind: ValueKind::AbsolutePath,
        matches: is_absolute_path,
    },
];

fn datetime_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("datetime regex must compile")
    })
}

fn uuid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("uuid regex must compile")
    })
}

/// `YYYY-MM-DDTHH:MM:SS` prefix, except the epoch sentinel itself.
pub fn is_datetime(value: &str) -> bool {
    value != EPOCH_SENTINEL && datetime_prefix_re().is_match(value)
}

/// Whole value is a lowercase 8-4-4-4-12 UUID.
pub fn is_uuid(value: &str) -> bool {
    uuid_re().is_match(value)
}

/// `file:///…` outside the placeholder root.
pub fn is_disallowed_file_uri(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(PLACEHOLDER_FILE_URI) else {
        return value.starts_with(FILE_URI_SCHEME);
    };
    !(rest.is_empty() || rest.starts_with('/'))
}

/// `/` followed by a lowercase letter, or `C:\`-style drive roots.
pub fn is_absolute_path(value: &str) -> bool {
    match value.as_bytes() {
        [b'/', second, ..] => second.is_ascii_lowercase(),
        [drive, b':', b'\\', ..] => drive.is_ascii_uppercase(),
        _ => false,
    }
}

/// Returns the kind of the first rule that fires, if any.
pub fn classify(value: &str) -> Option<ValueKind> {
    RULES
        .iter()
        .find(|rule| (rule.matches)(value))
        .map(|rule| rule.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_sentinel_is_not_a_datetime() {
        assert_eq!(classify(EPOCH_SENTINEL), None);
        assert!(!is_datetime(EPOCH_SENTINEL));
    }

    #[test]
    fn any_other_timestamp_is_a_datetime() {
        for value in [
            "2024-03-01T12:00:00Z",
            "1970-01-01T00:00:00.000Z",
            "1970-01-01T00:00:00+00:00",
            "2024-03-01T12:00:00 and trailing text",
        ] {
            assert_eq!(classify(value), Some(ValueKind::Datetime), "{value}");
        }
    }

    #[test]
    fn date_without_time_is_accepted() {
        assert_eq!(classify("2024-03-01"), None);
        assert_eq!(classify("2024-03-01 12:00:00"), None);
    }

    #[test]
    fn uuid_must_be_lowercase_and_whole_value() {
        assert_eq!(
            classify("550e8400-e29b-41d4-a716-446655440000"),
            Some(ValueKind::Uuid)
        );
        assert_eq!(classify("550E8400-E29B-41D4-A716-446655440000"), None);
        assert_eq!(classify("id-550e8400-e29b-41d4-a716-446655440000"), None);
        assert_eq!(classify("550e8400-e29b-41d4-a716-446655440000x"), None);
    }

    #[test]
    fn placeholder_file_uris_are_allowed() {
        assert_eq!(classify("file:///placeholder"), None);
        assert_eq!(classify("file:///placeholder/assets/cover.png"), None);
    }

    #[test]
    fn other_file_uris_are_flagged() {
        for value in [
            "file:///tmp/out.mp4",
            "file:///home/alice/render.json",
            "file:///placeholderx/evil",
        ] {
            assert_eq!(classify(value), Some(ValueKind::FileUri), "{value}");
        }
        assert_eq!(classify("file://host/share"), None);
    }

    #[test]
    fn absolute_paths_are_flagged() {
        assert_eq!(classify("/home/alice"), Some(ValueKind::AbsolutePath));
        assert_eq!(classify("C:\\Users\\alice"), Some(ValueKind::AbsolutePath));
        assert_eq!(classify("/Users/alice"), None);
        assert_eq!(classify("relative/path"), None);
        assert_eq!(classify("c:\\lower"), None);
        assert_eq!(classify("/"), None);
    }

    #[test]
    fn earlier_rule_wins() {
        // A datetime-shaped value is never reported as anything else.
        let value = "2024-03-01T12:00:00-550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(classify(value), Some(ValueKind::Datetime));
        let fired: Vec<ValueKind> = RULES
            .iter()
            .filter(|rule| (rule.matches)("file:///tmp"))
            .map(|rule| rule.kind)
            .collect();
        assert_eq!(fired, vec![ValueKind::FileUri]);
    }

    #[test]
    fn plain_prose_is_accepted() {
        assert_eq!(classify("The detective opens the door."), None);
        assert_eq!(classify(""), None);
    }
}
