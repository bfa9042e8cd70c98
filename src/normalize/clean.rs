use once_cell::sync::Lazy;
use regex::Regex;

/// Greedy `[...]` or `(...)` span: reference markers and qualifiers.
static ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[.*\]|\(.*\)").expect("annotation regex should compile"));

/// Remove annotation spans, then trailing whitespace.
pub fn clean_cell(raw: &str) -> String {
    ANNOTATION.replace_all(raw, "").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_reference_marker() {
        assert_eq!(clean_cell("Canelo Alvarez [15]"), "Canelo Alvarez");
    }

    #[test]
    fn test_strips_qualifier() {
        assert_eq!(clean_cell("Vacant (Interim)"), "Vacant");
        assert_eq!(clean_cell("Jermell Charlo (Super) [3]"), "Jermell Charlo");
    }

    #[test]
    fn test_greedy_span() {
        // Everything between the first `[` and the last `]` goes.
        assert_eq!(clean_cell("A [1] B [2]"), "A");
        assert_eq!(clean_cell("A (x) B (y) C"), "A  C");
    }

    #[test]
    fn test_untouched_values() {
        assert_eq!(clean_cell("Naoya Inoue"), "Naoya Inoue");
        assert_eq!(clean_cell(""), "");
        assert_eq!(clean_cell("Half (open"), "Half (open");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Canelo Alvarez [15]",
            "Vacant (Interim)",
            "a(b[c)d]",
            "[(]x)",
            "( [a] )  ",
            "x ] [ y ) (",
            "  lead (z)",
            "",
        ];
        for s in samples {
            let once = clean_cell(s);
            assert_eq!(clean_cell(&once), once, "input {:?}", s);
            assert!(!ANNOTATION.is_match(&once), "residue in {:?}", once);
        }
    }
}
