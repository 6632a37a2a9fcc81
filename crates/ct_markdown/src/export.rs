use std::fmt::Write;

use ct_core::{Article, SummaryRecord, TipsRecord};

/// Render articles as a feed document, grouped by source type, suitable for
/// feeding the generation agents and for re-import via `records`.
pub fn articles_to_markdown(articles: &[Article], generated_at: &str) -> String {
    let mut out = String::from("# Cybersecurity News Articles\n\n");
    let _ = writeln!(out, "Generated on: {}\n", generated_at);

    // group by source type, preserving first-seen order
    let mut groups: Vec<(&str, Vec<&Article>)> = Vec::new();
    for article in articles {
        match groups.iter_mut().find(|(st, _)| *st == article.source_type) {
            Some((_, members)) => members.push(article),
            None => groups.push((&article.source_type, vec![article])),
        }
    }

    let mut index = 0;
    for (source_type, members) in groups {
        let _ = writeln!(out, "## Source: {}\n", source_type);
        for article in members {
            index += 1;
            let _ = writeln!(out, "## {}. {}\n", index, article.title);
            let _ = writeln!(out, "**Source:** {}  ", article.source);
            let _ = writeln!(out, "**Date:** {}  ", article.date);
            let _ = writeln!(out, "**URL:** {}  ", article.url);
            let _ = writeln!(out, "**ID:** {}  ", article.id);
            let _ = writeln!(out, "**Tags:** {}\n", article.tags);
            let _ = writeln!(out, "### Content:\n");
            let _ = writeln!(out, "{}\n", article.content);
            out.push_str("---\n\n");
        }
    }
    out
}

/// Render summary records as a review document.
pub fn summaries_to_markdown(records: &[SummaryRecord], generated_at: &str) -> String {
    let mut out = String::from("# Article Summaries\n\n");
    let _ = writeln!(out, "Generated on: {}\n", generated_at);
    let _ = writeln!(out, "Number of summarized articles: {}\n", records.len());

    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "## {}. {}\n", i + 1, record.title);
        let _ = writeln!(out, "**Source:** {}  ", record.source);
        let _ = writeln!(out, "**Date:** {}  ", record.date);
        let _ = writeln!(out, "**ID:** {}\n", record.article_id);
        let _ = writeln!(out, "### Summary\n");
        let _ = writeln!(out, "{}\n", record.summary);
        out.push_str("---\n\n");
    }
    out
}

/// Render tips records as a review document with `✅`/`❌` item markers.
pub fn tips_to_markdown(records: &[TipsRecord], generated_at: &str) -> String {
    let mut out = String::from("# CISO Security Tips for Non-Technical Users\n\n");
    let _ = writeln!(out, "Generated on: {}\n", generated_at);
    let _ = writeln!(out, "Number of articles: {}\n", records.len());

    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "## {}. {}\n", i + 1, record.title);
        let _ = writeln!(out, "**Source:** {}  ", record.source);
        let _ = writeln!(out, "**Date:** {}  ", record.date);
        let _ = writeln!(out, "**ID:** {}\n", record.article_id);
        let _ = writeln!(out, "### Key Security Issue\n");
        let _ = writeln!(out, "{}\n", record.tips.summary);
        out.push_str("### DO's\n\n");
        for item in &record.tips.dos {
            let _ = writeln!(out, "✅ {}\n", item);
        }
        out.push_str("### DON'Ts\n\n");
        for item in &record.tips.donts {
            let _ = writeln!(out, "❌ {}\n", item);
        }
        out.push_str("---\n\n");
    }
    out
}
