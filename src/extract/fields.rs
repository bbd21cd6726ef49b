//! Field extractors: summary text and the raw keyword-table section.
//! Pure text transforms; running them twice on the same input gives the same output.

use crate::config::policy::MarkerVocabulary;

/// Earliest case-insensitive occurrence of any marker at or after `from`.
/// Returns (start, end) byte offsets of the matched marker.
fn find_marker(haystack_lower: &str, markers: &[String], from: usize) -> Option<(usize, usize)> {
    let tail = haystack_lower.get(from..)?;
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .filter_map(|m| {
            let needle = m.to_ascii_lowercase();
            tail.find(&needle)
                .map(|i| (from + i, from + i + needle.len()))
        })
        .min_by_key(|&(start, _)| start)
}

/// Summary between the summary marker and the next section marker.
/// Falls back to `placeholder` when the marker is absent or the section is blank.
pub fn extract_summary(text: &str, markers: &MarkerVocabulary, placeholder: &str) -> String {
    // ASCII lowering keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();
    let Some((_, body_start)) = find_marker(&lower, &markers.summary, 0) else {
        return placeholder.to_string();
    };

    let stop = markers
        .table
        .iter()
        .chain(markers.table_end.iter())
        .cloned()
        .collect::<Vec<_>>();
    let body_end = find_marker(&lower, &stop, body_start)
        .map(|(start, _)| start)
        .unwrap_or(text.len());

    let summary = text[body_start..body_end].trim();
    if summary.is_empty() {
        placeholder.to_string()
    } else {
        summary.to_string()
    }
}

/// Everything after the data-section marker, up to a closing marker if one follows.
/// `None` when no data-section marker is present.
pub fn extract_table_part<'a>(text: &'a str, markers: &MarkerVocabulary) -> Option<&'a str> {
    let lower = text.to_ascii_lowercase();
    let (_, body_start) = find_marker(&lower, &markers.table, 0)?;
    let body_end = find_marker(&lower, &markers.table_end, body_start)
        .map(|(start, _)| start)
        .unwrap_or(text.len());
    Some(&text[body_start..body_end])
}
