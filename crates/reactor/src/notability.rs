//! The notability rule.
//!
//! A score is notable when the digit sequence "727" occurs in its rounded
//! accuracy percentage once punctuation is stripped.

/// Render accuracy (0.0–1.0) as a fixed-point percentage string with two
/// decimals: `0.727` becomes `"72.70"`.
pub fn accuracy_pct(accuracy: f64) -> String {
    format!("{:.2}", accuracy * 100.0)
}

/// Whether a percentage string qualifies as notable.
pub fn is_notable(pct: &str) -> bool {
    pct.replace('.', "").contains("727")
}

/// Human-facing form of a fixed-point percentage: trailing zeros (and a bare
/// trailing dot) are trimmed, so `"72.70"` renders as `"72.7"` and `"50.00"`
/// as `"50"`.
pub fn display_pct(pct: &str) -> &str {
    if !pct.contains('.') {
        return pct;
    }
    pct.trim_end_matches('0').trim_end_matches('.')
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.7270, "72.70", true)]
    #[case(0.0727, "7.27", true)]
    #[case(0.5000, "50.00", false)]
    #[case(0.9727, "97.27", true)]
    #[case(0.7277, "72.77", true)]
    #[case(1.0, "100.00", false)]
    fn notability_vectors(#[case] accuracy: f64, #[case] expected: &str, #[case] notable: bool) {
        let pct = accuracy_pct(accuracy);
        assert_eq!(pct, expected);
        assert_eq!(is_notable(&pct), notable);
    }

    #[rstest]
    #[case("72.70", "72.7")]
    #[case("7.27", "7.27")]
    #[case("50.00", "50")]
    #[case("100.00", "100")]
    fn display_trims_trailing_zeros(#[case] pct: &str, #[case] expected: &str) {
        assert_eq!(display_pct(pct), expected);
    }
}
