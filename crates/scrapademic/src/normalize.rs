//! Field normalization for profile rows.
//!
//! A row arrives as a [`RowFragments`] snapshot: the raw text or markup of the
//! four cells we care about, each possibly missing. [`normalize_row`] turns it
//! into a [`PublicationRecord`] and never fails; anything it cannot read falls
//! back to the field's placeholder.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::types::{
    PublicationRecord, AND_OTHERS, UNKNOWN_AUTHOR, UNKNOWN_JOURNAL, UNKNOWN_YEAR, UNTITLED,
};

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".gsc_a_at"));
static GRAY: LazyLock<Selector> = LazyLock::new(|| selector(".gs_gray"));
static CITED_BY: LazyLock<Selector> = LazyLock::new(|| selector(".gsc_a_c a"));
static YEAR_MARKER: LazyLock<Selector> = LazyLock::new(|| selector("span.gs_oph"));

/// Tag that opens the year marker inside the venue cell.
const YEAR_BOUNDARY: &str = "<span";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector should always parse")
}

/// Raw fragments of one publication row, as read from the rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFragments {
    /// Text of the title link.
    pub title: Option<String>,
    /// Text of the first gray block (comma-separated authors).
    pub authors: Option<String>,
    /// Inner markup of the second gray block (venue plus the year marker).
    pub venue_html: Option<String>,
    /// Text of the link in the cited-by cell.
    pub cited_by: Option<String>,
}

impl RowFragments {
    /// Split one row's outer HTML (`<tr class="gsc_a_tr">…</tr>`) into fragments.
    pub fn from_row_html(row_html: &str) -> Self {
        // A bare <tr> outside a table gets its row/cell tags dropped by the parser.
        let doc = Html::parse_fragment(&format!("<table><tbody>{row_html}</tbody></table>"));

        let mut grays = doc.select(&GRAY);
        let authors = grays.next().map(element_text);
        let venue_html = grays.next().map(|el| el.inner_html());

        Self {
            title: doc.select(&TITLE).next().map(element_text),
            authors,
            venue_html,
            cited_by: doc.select(&CITED_BY).next().map(element_text),
        }
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Normalize one row into a fully populated record.
pub fn normalize_row(row: &RowFragments) -> PublicationRecord {
    let (journal, year) = parse_venue(row.venue_html.as_deref());

    PublicationRecord {
        title: parse_title(row.title.as_deref()),
        authors: parse_authors(row.authors.as_deref()),
        journal,
        year,
        cited_by: parse_cited_by(row.cited_by.as_deref()),
    }
}

fn parse_title(raw: Option<&str>) -> String {
    or_sentinel(raw.map(str::trim).unwrap_or_default(), UNTITLED)
}

fn parse_authors(raw: Option<&str>) -> Vec<String> {
    let mut authors: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();

    if authors.last().is_some_and(|a| is_ellipsis(a)) {
        authors.pop();
        authors.push(AND_OTHERS.to_string());
    }

    if authors.is_empty() {
        authors.push(UNKNOWN_AUTHOR.to_string());
    }
    authors
}

fn is_ellipsis(piece: &str) -> bool {
    piece == "..." || piece == "\u{2026}"
}

/// Journal is the markup before the year marker with tags stripped; year is
/// the marker's text without its separating comma.
fn parse_venue(raw: Option<&str>) -> (String, String) {
    let Some(html) = raw else {
        return (UNKNOWN_JOURNAL.to_string(), UNKNOWN_YEAR.to_string());
    };

    let prefix = html.find(YEAR_BOUNDARY).map_or(html, |at| &html[..at]);
    let journal = strip_tags(prefix);

    let doc = Html::parse_fragment(html);
    let year = doc
        .select(&YEAR_MARKER)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let year = year.trim().trim_matches(',').trim();

    (
        or_sentinel(journal.trim(), UNKNOWN_JOURNAL),
        or_sentinel(year, UNKNOWN_YEAR),
    )
}

fn strip_tags(markup: &str) -> String {
    Html::parse_fragment(markup)
        .root_element()
        .text()
        .collect()
}

/// Leading base-10 digits, the way the page's own `parseInt` reads them.
fn parse_cited_by(raw: Option<&str>) -> u32 {
    let digits: String = raw
        .unwrap_or_default()
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

fn or_sentinel(value: &str, sentinel: &str) -> String {
    if value.is_empty() {
        sentinel.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(
        title: Option<&str>,
        authors: Option<&str>,
        venue_html: Option<&str>,
        cited_by: Option<&str>,
    ) -> RowFragments {
        RowFragments {
            title: title.map(String::from),
            authors: authors.map(String::from),
            venue_html: venue_html.map(String::from),
            cited_by: cited_by.map(String::from),
        }
    }

    #[test]
    fn test_worked_example() {
        let a = fragments(
            Some("Deep Learning"),
            Some("J. Smith, A. Lee, ..."),
            Some(r#"Nature<span class="gs_oph">, 2021</span>"#),
            Some("120"),
        );
        let b = RowFragments::default();

        let records: Vec<_> = [a, b].iter().map(normalize_row).collect();

        assert_eq!(
            records[0],
            PublicationRecord {
                title: "Deep Learning".into(),
                authors: vec!["J. Smith".into(), "A. Lee".into(), "and others".into()],
                journal: "Nature".into(),
                year: "2021".into(),
                cited_by: 120,
            }
        );
        assert_eq!(records[1], PublicationRecord::default());
    }

    #[test]
    fn test_missing_title_only_touches_title() {
        let row = fragments(
            None,
            Some("A. Author"),
            Some(r#"Science<span class="gs_oph">, 2019</span>"#),
            Some("7"),
        );
        let record = normalize_row(&row);
        assert_eq!(record.title, "Untitled");
        assert_eq!(record.authors, vec!["A. Author"]);
        assert_eq!(record.journal, "Science");
        assert_eq!(record.year, "2019");
        assert_eq!(record.cited_by, 7);
    }

    #[test]
    fn test_whitespace_title_is_untitled() {
        let record = normalize_row(&fragments(Some("   \n "), None, None, None));
        assert_eq!(record.title, "Untitled");
    }

    #[test]
    fn test_missing_authors_only_touches_authors() {
        let row = fragments(Some("Paper"), None, None, Some("3"));
        let record = normalize_row(&row);
        assert_eq!(record.authors, vec!["Unknown"]);
        assert_eq!(record.title, "Paper");
        assert_eq!(record.cited_by, 3);
    }

    #[test]
    fn test_empty_author_text_is_unknown() {
        assert_eq!(parse_authors(Some("")), vec!["Unknown"]);
        assert_eq!(parse_authors(Some(" , ,")), vec!["Unknown"]);
    }

    #[test]
    fn test_ellipsis_collapses_to_and_others() {
        let authors = parse_authors(Some("A Smith, B Jones, ..."));
        assert_eq!(authors, vec!["A Smith", "B Jones", "and others"]);
        assert!(!authors.iter().any(|a| a == "..."));

        let authors = parse_authors(Some("A Smith, \u{2026}"));
        assert_eq!(authors, vec!["A Smith", "and others"]);
    }

    #[test]
    fn test_ellipsis_only_mid_list_is_kept() {
        let authors = parse_authors(Some("A Smith, ..., B Jones"));
        assert_eq!(authors, vec!["A Smith", "...", "B Jones"]);
    }

    #[test]
    fn test_missing_venue_gives_both_sentinels() {
        assert_eq!(
            parse_venue(None),
            ("Unknown Journal".to_string(), "Unknown Year".to_string())
        );
    }

    #[test]
    fn test_venue_without_year_marker() {
        let (journal, year) = parse_venue(Some("Proceedings of the ACM 12 (3)"));
        assert_eq!(journal, "Proceedings of the ACM 12 (3)");
        assert_eq!(year, "Unknown Year");
    }

    #[test]
    fn test_year_without_journal() {
        let (journal, year) = parse_venue(Some(r#"<span class="gs_oph">, 2010</span>"#));
        assert_eq!(journal, "Unknown Journal");
        assert_eq!(year, "2010");
    }

    #[test]
    fn test_venue_strips_nested_markup() {
        let (journal, year) = parse_venue(Some(
            r#"<b>Nature</b> 521 (7553), 436-444<span class="gs_oph">, 2015</span>"#,
        ));
        assert_eq!(journal, "Nature 521 (7553), 436-444");
        assert_eq!(year, "2015");
    }

    #[test]
    fn test_venue_decodes_entities() {
        let (journal, _) = parse_venue(Some("Science &amp; Society"));
        assert_eq!(journal, "Science & Society");
    }

    #[test]
    fn test_cited_by_parsing() {
        assert_eq!(parse_cited_by(Some("120")), 120);
        assert_eq!(parse_cited_by(Some("  42 ")), 42);
        assert_eq!(parse_cited_by(Some("17*")), 17);
        assert_eq!(parse_cited_by(Some("")), 0);
        assert_eq!(parse_cited_by(Some("n/a")), 0);
        assert_eq!(parse_cited_by(Some("-5")), 0);
        assert_eq!(parse_cited_by(Some("99999999999999999999")), 0);
        assert_eq!(parse_cited_by(None), 0);
    }

    #[test]
    fn test_from_row_html_full_row() {
        let html = r#"<tr class="gsc_a_tr">
            <td class="gsc_a_t">
                <a href="/citations?view_op=view_citation" class="gsc_a_at">Attention Is All You Need</a>
                <div class="gs_gray">A Vaswani, N Shazeer, N Parmar, ...</div>
                <div class="gs_gray">Advances in neural information processing systems 30<span class="gs_oph">, 2017</span></div>
            </td>
            <td class="gsc_a_c"><a href="https://scholar.google.com/scholar?cites=1" class="gsc_a_ac gs_ibl">95000</a></td>
            <td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl">2017</span></td>
        </tr>"#;

        let row = RowFragments::from_row_html(html);
        assert_eq!(row.title.as_deref(), Some("Attention Is All You Need"));
        assert_eq!(
            row.authors.as_deref(),
            Some("A Vaswani, N Shazeer, N Parmar, ...")
        );
        assert!(row.venue_html.as_deref().unwrap().contains("gs_oph"));
        assert_eq!(row.cited_by.as_deref(), Some("95000"));

        let record = normalize_row(&row);
        assert_eq!(record.title, "Attention Is All You Need");
        assert_eq!(
            record.authors,
            vec!["A Vaswani", "N Shazeer", "N Parmar", "and others"]
        );
        assert_eq!(
            record.journal,
            "Advances in neural information processing systems 30"
        );
        assert_eq!(record.year, "2017");
        assert_eq!(record.cited_by, 95000);
    }

    #[test]
    fn test_from_row_html_uncited_row() {
        let html = r#"<tr class="gsc_a_tr">
            <td class="gsc_a_t"><a class="gsc_a_at">Lonely Preprint</a>
                <div class="gs_gray">B Writer</div></td>
            <td class="gsc_a_c"><a class="gsc_a_ac gs_ibl gsc_a_acm"></a></td>
        </tr>"#;

        let record = normalize_row(&RowFragments::from_row_html(html));
        assert_eq!(record.title, "Lonely Preprint");
        assert_eq!(record.authors, vec!["B Writer"]);
        assert_eq!(record.journal, "Unknown Journal");
        assert_eq!(record.year, "Unknown Year");
        assert_eq!(record.cited_by, 0);
    }

    #[test]
    fn test_from_row_html_garbage() {
        let record = normalize_row(&RowFragments::from_row_html("<p>not a row"));
        assert_eq!(record, PublicationRecord::default());
    }
}
