//! Scraping of the federation's HTML match sheet (feuille de match).
//!
//! The sheet is a free-form HTML table dump. It is flattened to text, then a
//! handful of labelled fields are picked out with regular expressions. Any
//! field that cannot be found is left empty.
use crate::MatchSheet;
use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_OR_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>").expect("valid regex"));
static LINE_BREAK_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|tr|li|h[1-6]|table|thead|tbody)\s*>").expect("valid regex")
});
static CELL_END_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(td|th)\s*>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Date\s*:\s*(\d{1,2}/\d{1,2}/\d{4})").expect("valid regex"));
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Horaire\s*:\s*(\d{1,2}:\d{2})").expect("valid regex"));
static GROUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Terrain\s*:[ \t]*([^\n]+)").expect("valid regex"));
static HOME_CLUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CLUB VISITE\b[^N]*NOM\s*:[ \t]*([^\n]+)").expect("valid regex"));
static AWAY_CLUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CLUB VISITEUR[^N]*NOM\s*:[ \t]*([^\n]+)").expect("valid regex"));
static GOALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Buts en chiffres\s*:\s*(\d+)").expect("valid regex"));

/// Extract the headline fields of a match sheet.
pub fn parse_match_sheet(html: &str) -> MatchSheet {
    let text = html_to_text(html);
    let capture = |re: &Regex| {
        re.captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_owned())
            .filter(|s| !s.is_empty())
    };

    let mut goals = GOALS
        .captures_iter(&text)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()));
    let (home_score, away_score) = match (goals.next(), goals.next()) {
        (Some(h), Some(a)) => (Some(h), Some(a)),
        _ => (None, None),
    };

    MatchSheet {
        date: capture(&DATE),
        time: capture(&TIME),
        ground: capture(&GROUND),
        home_team: capture(&HOME_CLUB),
        away_team: capture(&AWAY_CLUB),
        home_score,
        away_score,
    }
}

/// Rough `innerText`: block tags become newlines, cells become tabs.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_OR_STYLE.replace_all(html, "");
    let text = LINE_BREAK_TAGS.replace_all(&text, "\n");
    let text = CELL_END_TAGS.replace_all(&text, "\t");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_owned()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .replace("&eacute;", "é")
        .replace("&egrave;", "è")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"
        <html><head><style>td { color: red; }</style></head><body>
        <table>
          <tr><td>Date : 28/10/2025</td><td>Horaire : 14:30</td></tr>
          <tr><td>Terrain : Stade&nbsp;Charléty</td></tr>
        </table>
        <div>CLUB VISITE</div>
        <p>NOM : BRETAGNE</p>
        <p>Buts en chiffres : 3</p>
        <div>CLUB VISITEUR</div>
        <p>NOM : PAYS DE LA LOIRE</p>
        <p>Buts en chiffres : 0</p>
        </body></html>
    "#;

    #[test]
    fn sheet_fields_are_scraped() {
        let sheet = parse_match_sheet(SHEET);
        assert_eq!(sheet.date.as_deref(), Some("28/10/2025"));
        assert_eq!(sheet.time.as_deref(), Some("14:30"));
        assert_eq!(sheet.ground.as_deref(), Some("Stade Charléty"));
        assert_eq!(sheet.home_team.as_deref(), Some("BRETAGNE"));
        assert_eq!(sheet.away_team.as_deref(), Some("PAYS DE LA LOIRE"));
        assert_eq!(sheet.home_score, Some(3));
        assert_eq!(sheet.away_score, Some(0));
    }

    #[test]
    fn a_single_goal_line_yields_no_score() {
        let sheet = parse_match_sheet("<p>Buts en chiffres : 2</p>");
        assert_eq!(sheet.home_score, None);
        assert_eq!(sheet.away_score, None);
    }

    #[test]
    fn empty_sheet_is_all_empty() {
        assert_eq!(parse_match_sheet(""), MatchSheet::default());
    }

    #[test]
    fn text_rendering_drops_tags_and_styles() {
        let text = html_to_text(SHEET);
        assert!(!text.contains('<'));
        assert!(!text.contains("color: red"));
        assert!(text.contains("NOM : BRETAGNE"));
    }
}
