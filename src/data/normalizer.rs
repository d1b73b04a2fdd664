// ============================================================
// Layer 4: Line Normalizers
// ============================================================
// Turn one raw log line into its canonical template.
// Two independent policies, one per pipeline. Both are pure
// and deterministic.
//
// AggregationNormalizer (pipeline A), steps in order:
//   1. Drop every whitespace-delimited token holding a digit
//   2. Digits and ASCII punctuation → space, letters → lowercase
//   3. Collapse whitespace runs to one space, trim both ends
//   4. Empty result → no template
//
//   "ERROR 123 disk-failure: sda1"  →  "error disk failure"
//
// VectorizerNormalizer (pipeline B):
//   - first token is the alert tag and is kept aside verbatim
//   - all-digit / all-hex tokens       → "<*>"
//   - tokens starting or ending in '"' → "<*>"
//   - anything else stays as it is, in its original position
//
//   "- RAS KERNEL 0x1f \"node\" up"  →  tag "-", "RAS KERNEL 0x1f <*> up"
//
// Character classes are explicit ASCII scans, no regex engine.
// Tokens are split on ASCII whitespace only (C `isspace`, which
// includes vertical tab); U+00A0 and friends stay inside a token.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use crate::domain::template::{Template, WILDCARD};

// ─── Policy A ─────────────────────────────────────────────────────────────────
/// Maximally collapsed signature used for pure deduplication.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregationNormalizer;

impl AggregationNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a raw line. Returns None when nothing is left.
    pub fn normalize(&self, line: &str) -> Option<Template> {
        let mut out = String::with_capacity(line.len());

        // Step 1: identifier-like tokens disappear entirely
        let kept = tokens(line).filter(|tok| !tok.bytes().any(|b| b.is_ascii_digit()));

        for tok in kept {
            // Steps 2 + 3: separators become word boundaries, and
            // words are re-joined with exactly one space
            for word in tok.split(is_separator).filter(|w| !w.is_empty()) {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.extend(word.chars().map(|c| c.to_ascii_lowercase()));
            }
        }

        // Step 4
        if out.is_empty() {
            None
        } else {
            Some(Template::from_canonical(out))
        }
    }
}

/// Whitespace-delimited tokens of a line, skipping empty runs
fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(is_token_boundary).filter(|tok| !tok.is_empty())
}

fn is_token_boundary(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

/// Characters replaced by a space under the aggregation policy
fn is_separator(c: char) -> bool {
    c.is_ascii_digit() || c.is_ascii_punctuation()
}

// ─── Policy B ─────────────────────────────────────────────────────────────────
/// A log line split into its alert tag and its template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub alert_tag: String,
    pub template:  Template,
}

/// Position-preserving normalizer used by the vectorizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorizerNormalizer;

impl VectorizerNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw line. Returns None for lines without any token.
    pub fn parse(&self, line: &str) -> Option<ParsedLine> {
        let mut tokens = tokens(line);
        let alert_tag  = tokens.next()?;

        Some(ParsedLine {
            alert_tag: alert_tag.to_string(),
            template:  Template::from_tokens(tokens.map(normalize_token)),
        })
    }
}

/// Mask a single message token
fn normalize_token(tok: &str) -> &str {
    if is_numeric_or_hex(tok) || is_quoted(tok) {
        WILDCARD
    } else {
        tok
    }
}

/// All ASCII decimal digits, or all ASCII hex digits
fn is_numeric_or_hex(tok: &str) -> bool {
    // decimal digits are a subset of hex digits
    !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_quoted(tok: &str) -> bool {
    tok.starts_with('"') || tok.ends_with('"')
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn agg(line: &str) -> Option<String> {
        AggregationNormalizer::new()
            .normalize(line)
            .map(|t| t.as_str().to_string())
    }

    fn vec_tpl(line: &str) -> Option<(String, String)> {
        VectorizerNormalizer::new()
            .parse(line)
            .map(|p| (p.alert_tag, p.template.as_str().to_string()))
    }

    #[test]
    fn test_digit_tokens_are_removed_not_masked() {
        assert_eq!(agg("ERROR 123 disk failure").as_deref(), Some("error disk failure"));
        assert_eq!(agg("ERROR 456 disk failure"), agg("ERROR 123 disk failure"));
    }

    #[test]
    fn test_mixed_identifier_tokens_are_removed() {
        // node123 and 2006-03-02 both carry digits
        assert_eq!(agg("2006-03-02 node123 link up").as_deref(), Some("link up"));
    }

    #[test]
    fn test_punctuation_becomes_space_and_collapses() {
        assert_eq!(agg("  Disk-Failure:   on,sda  ").as_deref(), Some("disk failure on sda"));
    }

    #[test]
    fn test_non_ascii_passes_through() {
        assert_eq!(agg("Ошибка диска").as_deref(), Some("Ошибка диска"));
    }

    #[test]
    fn test_aggregation_splits_on_ascii_whitespace_only() {
        // the no-break space keeps "foo\u{a0}bar1" one token, which holds a digit
        assert_eq!(agg("foo\u{a0}bar1 baz").as_deref(), Some("baz"));
        assert_eq!(agg("disk\x0bfailure\x0c1").as_deref(), Some("disk failure"));
    }

    #[test]
    fn test_empty_result_is_discarded() {
        assert_eq!(agg(""), None);
        assert_eq!(agg("   \t "), None);
        assert_eq!(agg("12 0x1f 2006-03-02"), None);
        assert_eq!(agg("::: ---"), None);
    }

    #[test]
    fn test_vectorizer_keeps_positions() {
        let (tag, tpl) = vec_tpl("- 2006-03-02 node123 FetchError 42").unwrap();
        assert_eq!(tag, "-");
        // Four positions survive; only the all-digit token is masked
        assert_eq!(tpl, "2006-03-02 node123 FetchError <*>");
        assert_eq!(tpl.split(' ').count(), 4);
    }

    #[test]
    fn test_vectorizer_masks_hex_and_quoted() {
        let (tag, tpl) = vec_tpl("KERNDTLB deadbeef \"R08-M0\" x\" \"y ok").unwrap();
        assert_eq!(tag, "KERNDTLB");
        assert_eq!(tpl, "<*> <*> <*> <*> ok");
    }

    #[test]
    fn test_vectorizer_hex_scan_is_whole_token() {
        // "faced" is all hex too; "faces" is not
        let (_, tpl) = vec_tpl("- face faced faces").unwrap();
        assert_eq!(tpl, "<*> <*> faces");
    }

    #[test]
    fn test_vectorizer_splits_on_ascii_whitespace_only() {
        let (_, tpl) = vec_tpl("- node\u{a0}123 up").unwrap();
        assert_eq!(tpl, "node\u{a0}123 up");

        let (tag, tpl) = vec_tpl("KERNDTLB\x0b42\tup").unwrap();
        assert_eq!(tag, "KERNDTLB");
        assert_eq!(tpl, "<*> up");
    }

    #[test]
    fn test_vectorizer_tag_only_line_has_empty_template() {
        let (tag, tpl) = vec_tpl("APPREAD").unwrap();
        assert_eq!(tag, "APPREAD");
        assert_eq!(tpl, "");
    }

    #[test]
    fn test_vectorizer_blank_line_is_none() {
        assert_eq!(vec_tpl(""), None);
        assert_eq!(vec_tpl("   "), None);
    }
}
