//! Prompt template. Uses the canonical spelling of each marker only.

use crate::config::policy::MarkerVocabulary;

pub fn build_prompt(subject: &str, markers: &MarkerVocabulary, max_keywords: usize) -> String {
    let subject = subject.trim();
    let summary = markers.canonical_summary();
    let table = markers.canonical_table();
    let end = markers.canonical_table_end();
    format!(
        "You are a market research analyst. Research current search and market trends \
for the profession or topic \"{subject}\".\n\
\n\
Respond in exactly this format and nothing else:\n\
{summary} a 2-4 sentence overview of the market for {subject}.\n\
{table}\n\
Keyword | Monthly Search Volume | Trend (Up/Down/Stable) | YoY Change %\n\
one row per keyword, up to {max_keywords} rows, most important first\n\
{end}\n\
\n\
Use plain integers for volume (commas allowed) and a signed percentage for change."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_subject_and_canonical_markers() {
        let p = build_prompt("  Pastry chef ", &MarkerVocabulary::default(), 50);
        assert!(p.contains("\"Pastry chef\""));
        assert!(p.contains("SUMMARY:"));
        assert!(p.contains("DATA_TABLE:"));
        assert!(p.contains("KEYWORDS_END"));
        assert!(!p.contains("KEYWORDS_START"));
        assert!(p.contains("up to 50 rows"));
    }
}
