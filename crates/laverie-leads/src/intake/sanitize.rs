use std::sync::OnceLock;

use regex::Regex;

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"))
}

/// Strip markup from one untrusted field.
///
/// The stripping rule is fixed: remove `<...>` spans, then any angle bracket
/// left over from an unterminated tag, then control characters, then trim.
/// `"<script>alert(1)</script>Marie"` becomes `"alert(1)Marie"`.
pub fn sanitize_text(raw: &str) -> String {
    let stripped = tag_pattern().replace_all(raw, "");
    let cleaned: String = stripped
        .chars()
        .filter(|c| *c != '<' && *c != '>' && !c.is_control())
        .collect();
    cleaned.trim().to_string()
}

/// Recursive sanitization over string-bearing structures.
///
/// The form payload is flat in practice, but the trait keeps the rule
/// reusable for nested shapes (optional fields, repeated groups).
pub trait Sanitize {
    fn sanitize(self) -> Self;
}

impl Sanitize for String {
    fn sanitize(self) -> Self {
        sanitize_text(&self)
    }
}

impl<T: Sanitize> Sanitize for Option<T> {
    fn sanitize(self) -> Self {
        self.map(Sanitize::sanitize)
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(self) -> Self {
        self.into_iter().map(Sanitize::sanitize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags_and_angle_brackets() {
        assert_eq!(
            sanitize_text("<script>alert(1)</script>Marie"),
            "alert(1)Marie"
        );
    }

    #[test]
    fn removes_unterminated_tag_brackets() {
        assert_eq!(sanitize_text("a <b c"), "a b c");
    }

    #[test]
    fn bracketed_spans_count_as_tags() {
        assert_eq!(sanitize_text("1 < 2 > 0"), "1  0");
    }

    #[test]
    fn trims_and_drops_control_characters() {
        assert_eq!(sanitize_text("  Marie\r\n"), "Marie");
        assert_eq!(sanitize_text("Du\x00pont"), "Dupont");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_text("Saint-Nazaire"), "Saint-Nazaire");
    }

    #[test]
    fn sanitize_recurses_through_options_and_vecs() {
        let nested = vec![Some("<i>a</i>".to_string()), None];
        assert_eq!(nested.sanitize(), vec![Some("a".to_string()), None]);
    }
}
