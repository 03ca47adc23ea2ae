//! CSV audit report of matched pull requests.
//!
//! Only the title column is quoted. Commas in the other columns pass through
//! unescaped, so consumers must not rely on those columns containing none.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::MatchedPr;

pub const DEFAULT_REPORT_PATH: &str = "snyk-prs.csv";

const HEADER: &str = "Repository,Owner,PR Number,PR Title,Author,Created Date,Updated Date,PR URL";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn csv_row(matched: &MatchedPr) -> String {
    let pr = &matched.pr;
    [
        matched.repo.name().to_string(),
        matched.repo.owner().to_string(),
        pr.number.to_string(),
        quote(&pr.title),
        pr.author_login.clone(),
        timestamp(&pr.created_at),
        timestamp(&pr.updated_at),
        pr.url.clone(),
    ]
    .join(",")
}

/// Renders the report: a header row followed by one row per match.
pub fn render_csv(matches: &[MatchedPr]) -> String {
    std::iter::once(HEADER.to_string())
        .chain(matches.iter().map(csv_row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes the report to `path`, replacing any existing file.
pub fn write_csv(path: &Path, matches: &[MatchedPr]) -> Result<()> {
    std::fs::write(path, render_csv(matches))
        .with_context(|| format!("Failed to write report to '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::{PullRequest, Repo};

    fn matched(number: u64, title: &str) -> MatchedPr {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        MatchedPr {
            repo: Repo::new("acme", "widgets").unwrap(),
            pr: PullRequest {
                number,
                title: title.to_string(),
                author_login: "snyk-bot".to_string(),
                created_at: created,
                updated_at: created + chrono::Duration::days(2),
                url: format!("https://github.com/acme/widgets/pull/{number}"),
            },
        }
    }

    /// Splits one CSV line honouring double-quoted fields.
    fn parse_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, in_quotes) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                ('"', _) => in_quotes = !in_quotes,
                (',', false) => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        fields.push(current);
        fields
    }

    #[test]
    fn test_header_only_for_no_matches() {
        assert_eq!(render_csv(&[]), HEADER);
    }

    #[test]
    fn test_row_layout() {
        let csv = render_csv(&[matched(42, "[Snyk] Upgrade lodash")]);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "widgets,acme,42,\"[Snyk] Upgrade lodash\",snyk-bot,\
             2024-03-01T09:30:00Z,2024-03-03T09:30:00Z,\
             https://github.com/acme/widgets/pull/42"
        );
    }

    #[test]
    fn test_title_quotes_are_doubled_and_round_trip() {
        let title = r#"He said "fix" now"#;
        let csv = render_csv(&[matched(7, title)]);
        let row = csv.lines().nth(1).unwrap();

        assert!(row.contains(r#""He said ""fix"" now""#));
        assert_eq!(parse_line(row)[3], title);
    }

    #[test]
    fn test_rows_follow_input_order() {
        let csv = render_csv(&[matched(3, "c"), matched(1, "a"), matched(2, "b")]);
        let numbers: Vec<String> = csv
            .lines()
            .skip(1)
            .map(|line| parse_line(line)[2].clone())
            .collect();

        assert_eq!(numbers, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_write_csv_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "stale contents that are much longer than the header").unwrap();

        write_csv(&path, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), HEADER);
    }

    #[test]
    fn test_write_csv_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.csv");

        let err = write_csv(&path, &[matched(1, "x")]).unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
    }
}
