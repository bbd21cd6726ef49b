//! Table parser: the row parser applied to every qualifying line of the data section.

use crate::config::ParsePolicy;
use crate::extract::row::{parse_row, TABLE_DELIMITER};
use crate::extract::volume::VolumeSource;
use crate::report::KeywordRecord;

/// Lines with fewer delimiters than this are prose, not rows.
const MIN_DELIMITERS: usize = 2;

pub fn parse_table(
    table_part: Option<&str>,
    policy: &ParsePolicy,
    volumes: &mut dyn VolumeSource,
) -> Vec<KeywordRecord> {
    let Some(part) = table_part else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for line in part.lines() {
        if line.matches(TABLE_DELIMITER).count() < MIN_DELIMITERS {
            continue;
        }
        if let Some(rec) = parse_row(line, rows.len(), policy, volumes) {
            rows.push(rec);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::volume::FixedVolume;
    use crate::report::Trend;

    #[test]
    fn absent_section_is_empty() {
        let rows = parse_table(None, &ParsePolicy::default(), &mut FixedVolume(1));
        assert!(rows.is_empty());
    }

    #[test]
    fn keeps_valid_rows_in_order() {
        let part = "\n\
            Keyword | Volume | Trend | Change\n\
            |---|---|---|---|\n\
            1. Sourdough | 45,000 | Up | 25%\n\
            Some prose with a | single pipe\n\
            2. Rye | 3,000 | Down | -4%\n\
            3. Focaccia | ? | Stable\n";
        let rows = parse_table(Some(part), &ParsePolicy::default(), &mut FixedVolume(2_000));
        let terms: Vec<&str> = rows.iter().map(|r| r.term()).collect();
        assert_eq!(terms, vec!["Sourdough", "Rye", "Focaccia"]);
        assert_eq!(rows[1].trend(), Trend::Down);
        assert_eq!(rows[2].volume(), 2_000);
        // relevance follows accepted order, not line numbers
        let rel: Vec<i32> = rows.iter().map(|r| r.relevance()).collect();
        assert_eq!(rel, vec![100, 99, 98]);
    }

    #[test]
    fn single_pipe_prose_is_skipped() {
        let part = "Trend A | rising\nTrend B | falling";
        let rows = parse_table(Some(part), &ParsePolicy::default(), &mut FixedVolume(1));
        assert!(rows.is_empty());
    }
}
