//! Recovery of a structured tips record from unreliable model output.
//!
//! The model is asked for `{"summary": ..., "dos": [...], "donts": [...]}`
//! but small local models routinely drop quotes, truncate arrays or answer
//! in prose. Recovery runs an ordered list of strategies and stops at the
//! first one that produces anything usable; parsing never fails, it only
//! degrades.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use ct_core::Tips;

lazy_static! {
    static ref BARE_BEFORE_COMMA: Regex =
        Regex::new(r#":\s*([^"{}\[\],\s][^{}\[\],\s]*),"#).unwrap();
    static ref BARE_AT_EOL: Regex =
        Regex::new(r#"(?m):\s*([^"{}\[\],\s][^{}\[\],\s]*)$"#).unwrap();
    static ref BARE_BEFORE_BRACE: Regex =
        Regex::new(r#":\s*([^"{}\[\],\s][^{}\[\],\s]*)\s*\}"#).unwrap();
    static ref LIST_SPAN: Regex = Regex::new(r"(?s)\[(.*?)\]").unwrap();
    static ref SUMMARY_FIELD: Regex = Regex::new(r#"(?i)summary["\s:]+([^"\n]+)"#).unwrap();
    static ref QUOTED_ITEM: Regex = Regex::new(r#""([^"]+)""#).unwrap();
    static ref DO_LINE: Regex =
        Regex::new(r"(?m)(?:DO'?s?|Do)(?:\s*\d+\.?\s*|\s*[-•*]\s*|\s*:?\s+)(.+)$").unwrap();
    static ref DONT_LINE: Regex =
        Regex::new(r"(?m)(?:Don'?t|DON'?T|DONTs?)(?:\s*\d+\.?\s*|\s*[-•*]\s*|\s*:?\s+)(.+)$")
            .unwrap();
}

/// Which strategy produced the record. Logged for observability; `Defaults`
/// means nothing in the text was usable at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTier {
    DirectJson,
    QuoteRepair,
    ListRepair,
    FieldScan,
    LineHeuristic,
    Defaults,
}

impl RecoveryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectJson => "direct_json",
            Self::QuoteRepair => "quote_repair",
            Self::ListRepair => "list_repair",
            Self::FieldScan => "field_scan",
            Self::LineHeuristic => "line_heuristic",
            Self::Defaults => "defaults",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecoveredTips {
    pub tips: Tips,
    pub tier: RecoveryTier,
}

type Strategy = fn(&str) -> Option<Tips>;

const STRATEGIES: &[(RecoveryTier, Strategy)] = &[
    (RecoveryTier::DirectJson, direct_json),
    (RecoveryTier::QuoteRepair, quote_repair),
    (RecoveryTier::ListRepair, list_repair),
    (RecoveryTier::FieldScan, field_scan),
    (RecoveryTier::LineHeuristic, line_heuristic),
];

/// Recover a tips record from raw model output. Total: every path ends in a
/// record with a non-empty summary and non-empty do/don't lists.
pub fn recover_tips(raw: &str) -> RecoveredTips {
    for (tier, strategy) in STRATEGIES {
        if let Some(tips) = strategy(raw) {
            debug!(tier = tier.as_str(), "recovered structured tips");
            return RecoveredTips {
                tips: tips.normalized(),
                tier: *tier,
            };
        }
    }
    debug!("no usable structure in model output, falling back to defaults");
    RecoveredTips {
        tips: Tips {
            summary: String::new(),
            dos: Vec::new(),
            donts: Vec::new(),
        }
        .normalized(),
        tier: RecoveryTier::Defaults,
    }
}

/// Locate the smallest brace-balanced span that carries all three expected
/// keys, anchored at the `"summary"` key. Falls back to the last closing
/// brace when the model truncated its output mid-object.
fn json_candidate(text: &str) -> Option<&str> {
    let anchor = text.find("\"summary\"")?;
    let start = text[..anchor].rfind('{')?;

    let mut depth = 0usize;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start..=start + offset];
                    return has_required_keys(candidate).then_some(candidate);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}').filter(|end| *end > start)?;
    let candidate = &text[start..=end];
    has_required_keys(candidate).then_some(candidate)
}

fn has_required_keys(candidate: &str) -> bool {
    candidate.contains("\"summary\"")
        && candidate.contains("\"dos\"")
        && candidate.contains("\"donts\"")
}

fn direct_json(text: &str) -> Option<Tips> {
    parse_tips_json(json_candidate(text)?)
}

fn quote_repair(text: &str) -> Option<Tips> {
    let candidate = json_candidate(text)?;
    parse_tips_json(&fix_bare_scalars(candidate))
}

fn list_repair(text: &str) -> Option<Tips> {
    let candidate = json_candidate(text)?;
    parse_tips_json(&fix_list_items(&fix_bare_scalars(candidate)))
}

fn field_scan(text: &str) -> Option<Tips> {
    let candidate = json_candidate(text)?;
    let summary = summary_capture(candidate).unwrap_or_default();
    let dos = array_items(candidate, "dos");
    let donts = array_items(candidate, "donts");
    if summary.is_empty() && dos.is_empty() && donts.is_empty() {
        return None;
    }
    Some(Tips { summary, dos, donts })
}

fn line_heuristic(text: &str) -> Option<Tips> {
    let summary = summary_capture(text).unwrap_or_default();
    let dos = line_items(&DO_LINE, text);
    let donts = line_items(&DONT_LINE, text);
    if summary.is_empty() && dos.is_empty() && donts.is_empty() {
        return None;
    }
    Some(Tips { summary, dos, donts })
}

fn parse_tips_json(candidate: &str) -> Option<Tips> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    let object = value.as_object()?;
    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    let dos = string_items(object.get("dos"));
    let donts = string_items(object.get("donts"));
    if summary.is_empty() && dos.is_empty() && donts.is_empty() {
        return None;
    }
    Some(Tips { summary, dos, donts })
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Quote bare scalar values: `"summary": ok,` becomes `"summary": "ok",`.
/// Only single-token values are handled here; values with spaces belong to
/// the list-repair pass.
fn fix_bare_scalars(text: &str) -> String {
    let fixed = BARE_BEFORE_COMMA.replace_all(text, r#": "${1}","#);
    let fixed = BARE_AT_EOL.replace_all(&fixed, r#": "${1}""#);
    BARE_BEFORE_BRACE
        .replace_all(&fixed, r#": "${1}"}"#)
        .to_string()
}

/// Rewrite every `[...]` span, quoting any comma-separated item that isn't
/// already quoted.
fn fix_list_items(text: &str) -> String {
    LIST_SPAN
        .replace_all(text, |caps: &regex::Captures| {
            let items: Vec<String> = caps[1]
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| {
                    if item.len() >= 2 && item.starts_with('"') && item.ends_with('"') {
                        item.to_string()
                    } else {
                        format!("\"{}\"", item.trim_matches('"'))
                    }
                })
                .collect();
            format!("[{}]", items.join(", "))
        })
        .to_string()
}

fn summary_capture(text: &str) -> Option<String> {
    let captured = SUMMARY_FIELD.captures(text)?[1]
        .trim()
        .trim_end_matches(',')
        .trim_matches('"')
        .trim()
        .to_string();
    (!captured.is_empty()).then_some(captured)
}

/// Quoted strings inside the `[...]` span that follows the given key.
fn array_items(text: &str, key: &str) -> Vec<String> {
    let Some(span) = array_span(text, key) else {
        return Vec::new();
    };
    QUOTED_ITEM
        .captures_iter(span)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

fn array_span<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let key_pos = text.find(&format!("\"{}\"", key))?;
    let open = key_pos + text[key_pos..].find('[')?;
    let close = open + text[open..].find(']')?;
    Some(&text[open + 1..close])
}

fn line_items(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::types::{DEFAULT_DO, DEFAULT_DONT, DEFAULT_SUMMARY};

    #[test]
    fn test_well_formed_json() {
        let raw = r#"Here is my advice:
{"summary": "Routers are being exploited.", "dos": ["Patch now"], "donts": ["Don't expose admin panels"]}
Stay safe!"#;
        let recovered = recover_tips(raw);
        assert_eq!(recovered.tier, RecoveryTier::DirectJson);
        assert_eq!(recovered.tips.summary, "Routers are being exploited.");
        assert_eq!(recovered.tips.dos, vec!["Patch now"]);
        assert_eq!(recovered.tips.donts, vec!["Don't expose admin panels"]);
    }

    #[test]
    fn test_bare_scalar_value() {
        let raw = r#"{"summary": ok, "dos": ["a"], "donts": ["b"]}"#;
        let recovered = recover_tips(raw);
        assert_eq!(recovered.tier, RecoveryTier::QuoteRepair);
        assert_eq!(recovered.tips.summary, "ok");
    }

    #[test]
    fn test_unquoted_list_items() {
        let raw = r#"{"summary": "ok", "dos": [Patch now, Backup data], "donts": [Dont reuse passwords]}"#;
        let recovered = recover_tips(raw);
        assert_eq!(recovered.tier, RecoveryTier::ListRepair);
        assert_eq!(recovered.tips.dos, vec!["Patch now", "Backup data"]);
        assert_eq!(recovered.tips.donts, vec!["Dont reuse passwords"]);
    }

    #[test]
    fn test_field_scan_on_broken_structure() {
        // missing comma between items defeats the structural passes
        let raw = r#"{"summary": "ok", "dos": ["Patch" "Backup"], "donts": ["Nope"]}"#;
        let recovered = recover_tips(raw);
        assert_eq!(recovered.tier, RecoveryTier::FieldScan);
        assert_eq!(recovered.tips.summary, "ok");
        assert_eq!(recovered.tips.dos, vec!["Patch", "Backup"]);
        assert_eq!(recovered.tips.donts, vec!["Nope"]);
    }

    #[test]
    fn test_line_heuristic_on_prose() {
        let raw = "Here are my recommendations.\n\
Do 1. Patch your systems\n\
Do 2. Enable MFA\n\
Don't: reuse passwords\n";
        let recovered = recover_tips(raw);
        assert_eq!(recovered.tier, RecoveryTier::LineHeuristic);
        assert_eq!(
            recovered.tips.dos,
            vec!["Patch your systems", "Enable MFA"]
        );
        assert_eq!(recovered.tips.donts, vec!["reuse passwords"]);
        assert_eq!(recovered.tips.summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_nothing_usable_yields_defaults() {
        let recovered = recover_tips("nothing structured here at all");
        assert_eq!(recovered.tier, RecoveryTier::Defaults);
        assert_eq!(recovered.tips.summary, DEFAULT_SUMMARY);
        assert_eq!(recovered.tips.dos, vec![DEFAULT_DO]);
        assert_eq!(recovered.tips.donts, vec![DEFAULT_DONT]);
    }

    #[test]
    fn test_truncated_object_still_recovers() {
        let raw = r#"{"summary": "Backup before patching.", "dos": ["Backup"], "donts": ["Don't skip"#;
        let recovered = recover_tips(raw);
        // no balanced object and no closing brace: the line scan still
        // finds the summary field
        assert_eq!(recovered.tier, RecoveryTier::LineHeuristic);
        assert_eq!(recovered.tips.summary, "Backup before patching.");
        assert!(!recovered.tips.dos.is_empty());
        assert!(!recovered.tips.donts.is_empty());
    }

    #[test]
    fn test_empty_lists_filled_with_defaults() {
        let raw = r#"{"summary": "ok", "dos": [], "donts": []}"#;
        let recovered = recover_tips(raw);
        assert_eq!(recovered.tier, RecoveryTier::DirectJson);
        assert_eq!(recovered.tips.dos, vec![DEFAULT_DO]);
        assert_eq!(recovered.tips.donts, vec![DEFAULT_DONT]);
    }
}
