//! Central definitions of the marker phrases used to classify stored
//! records. Keeping them in one place is the point: the phrase matching is
//! heuristic, and scattering literals through call sites made it worse in
//! the past.

/// A record whose summary contains any of these (case-insensitively) was
/// written to guarantee coverage, not generated from the article, and is a
/// repair candidate.
pub const PLACEHOLDER_MARKERS: [&str; 4] = [
    "no summary available",
    "this is a placeholder",
    "basic security recommendations",
    "should be aware of potential security implications",
];

/// Fixed default text for a summary written when an article has no body to
/// summarize. Deliberately carries placeholder markers so a later pass with
/// a live model can find and replace it.
pub const FALLBACK_SUMMARY: &str =
    "No summary available. This is a placeholder entry pending regeneration.";

/// Summary text used when rebuilding a structurally broken tips document
/// without a live model.
pub const REBUILT_TIPS_SUMMARY: &str =
    "This security issue requires immediate attention from cybersecurity teams. \
Organizations should implement proper controls and monitoring.";

/// The boilerplate do/don't items that sample-data tooling used to write.
/// A tips document whose items all come from this set carries no
/// article-specific advice and is a regeneration trigger.
pub const GENERIC_DOS: [&str; 5] = [
    "Implement multi-factor authentication",
    "Keep all systems and software updated",
    "Train employees on security awareness",
    "Use strong, unique passwords for all accounts",
    "Regularly backup critical data",
];

pub const GENERIC_DONTS: [&str; 5] = [
    "Don't reuse passwords across different systems",
    "Don't leave default credentials unchanged",
    "Don't ignore security warnings and alerts",
    "Don't share sensitive information on public platforms",
    "Don't connect to untrusted networks without VPN",
];

pub fn is_placeholder(text: &str) -> bool {
    let lower = text.to_lowercase();
    PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

/// True when every "do" item is boilerplate. An empty list counts as
/// generic: it carries no article-specific advice either.
pub fn is_generic_dos<'a, I>(dos: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    dos.into_iter().all(|item| GENERIC_DOS.contains(&item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_matching_is_case_insensitive() {
        assert!(is_placeholder("NO SUMMARY AVAILABLE right now"));
        assert!(is_placeholder("note: This is a Placeholder."));
        assert!(!is_placeholder("Attackers exploit a router flaw."));
    }

    #[test]
    fn test_fallback_summary_is_self_marking() {
        assert!(is_placeholder(FALLBACK_SUMMARY));
    }

    #[test]
    fn test_generic_dos_detection() {
        assert!(is_generic_dos(GENERIC_DOS.iter().copied()));
        assert!(is_generic_dos(std::iter::empty::<&str>()));
        assert!(!is_generic_dos(["Patch the affected router firmware"]));
        assert!(!is_generic_dos([
            "Implement multi-factor authentication",
            "Patch the affected router firmware",
        ]));
    }
}
