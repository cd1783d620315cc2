//! Standings (classement): three points for a win, one for a draw, ranked by
//! points then goal difference.
use crate::normalize::{ShapeError, coerce_score, lookup, text, unwrap_envelope};
use crate::{Match, TeamStanding};
use serde_json::Value;
use std::collections::HashMap;

pub const STANDINGS_ENVELOPE_KEYS: &[&str] = &["data", "classement"];

const TEAM_KEYS: &[&str] = &["nom", "equipe", "team"];
const PLAYED_KEYS: &[&str] = &["joues", "matches_joues", "played"];
const WON_KEYS: &[&str] = &["gagnees", "wins", "won"];
const DRAWN_KEYS: &[&str] = &["nulles", "draws", "drawn"];
const LOST_KEYS: &[&str] = &["perdues", "losses", "lost"];
const FOR_KEYS: &[&str] = &["points_pour", "points_for", "buts_pour"];
const AGAINST_KEYS: &[&str] = &["points_contre", "points_against", "buts_contre"];

/// Rank every team appearing in a played match.
///
/// Only finished matches carrying both scores count. Team names are used
/// verbatim as keys, so "Bretagne" and "bretagne " are two teams. Rows tied
/// on points and goal difference stay in first-appearance order.
pub fn compute_standings(matches: &[Match]) -> Vec<TeamStanding> {
    let mut table: Vec<TeamStanding> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for m in matches {
        let Some((home_goals, away_goals)) = m.score().filter(|_| m.is_played()) else {
            continue;
        };

        let home = slot(&mut table, &mut index, &m.home_team);
        record(&mut table[home], home_goals, away_goals);
        let away = slot(&mut table, &mut index, &m.away_team);
        record(&mut table[away], away_goals, home_goals);
    }

    // Stable: ties keep accumulation order.
    table.sort_by(|a, b| {
        b.ranking_points()
            .cmp(&a.ranking_points())
            .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
    });
    table
}

fn slot<'m>(table: &mut Vec<TeamStanding>, index: &mut HashMap<&'m str, usize>, team: &'m str) -> usize {
    *index.entry(team).or_insert_with(|| {
        table.push(TeamStanding::new(team));
        table.len() - 1
    })
}

fn record(row: &mut TeamStanding, scored: u32, conceded: u32) {
    row.played = row.played.saturating_add(1);
    row.points_for = row.points_for.saturating_add(scored);
    row.points_against = row.points_against.saturating_add(conceded);
    let tally = match scored.cmp(&conceded) {
        std::cmp::Ordering::Greater => &mut row.won,
        std::cmp::Ordering::Less => &mut row.lost,
        std::cmp::Ordering::Equal => &mut row.drawn,
    };
    *tally = tally.saturating_add(1);
}

/// Read an officially published classement, keeping the publisher's order.
/// Remote point totals are ignored: points are always derived from the record.
pub fn normalize_standings(payload: &Value) -> Result<Vec<TeamStanding>, ShapeError> {
    let records = unwrap_envelope(payload, STANDINGS_ENVELOPE_KEYS)?;
    Ok(records
        .iter()
        .filter_map(Value::as_object)
        .map(|row| {
            let count = |keys: &[&str]| lookup(row, keys).and_then(coerce_score).unwrap_or(0);
            TeamStanding {
                team_name: lookup(row, TEAM_KEYS)
                    .and_then(text)
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "Team".to_owned()),
                played: count(PLAYED_KEYS),
                won: count(WON_KEYS),
                drawn: count(DRAWN_KEYS),
                lost: count(LOST_KEYS),
                points_for: count(FOR_KEYS),
                points_against: count(AGAINST_KEYS),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchStatus;
    use serde_json::json;

    fn finished(home: &str, away: &str, hs: u32, aw: u32) -> Match {
        Match {
            home_team: home.into(),
            away_team: away.into(),
            home_score: Some(hs),
            away_score: Some(aw),
            status: MatchStatus::Finished,
            ..Default::default()
        }
    }

    fn row<'a>(table: &'a [TeamStanding], team: &str) -> &'a TeamStanding {
        table.iter().find(|r| r.team_name == team).unwrap()
    }

    fn assert_invariants(table: &[TeamStanding]) {
        for r in table {
            assert_eq!(r.won + r.drawn + r.lost, r.played, "{}", r.team_name);
            assert_eq!(r.ranking_points(), r.won * 3 + r.drawn);
            assert_eq!(r.goal_difference(), i64::from(r.points_for) - i64::from(r.points_against));
        }
        for pair in table.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.ranking_points() > b.ranking_points()
                    || (a.ranking_points() == b.ranking_points() && a.goal_difference() >= b.goal_difference()),
                "{} ranked above {}",
                a.team_name,
                b.team_name
            );
        }
    }

    #[test]
    fn win_then_draw_puts_a_first() {
        let matches = vec![finished("A", "B", 2, 1), finished("B", "A", 1, 1)];
        let table = compute_standings(&matches);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].team_name, "A");

        let a = row(&table, "A");
        assert_eq!((a.played, a.won, a.drawn, a.lost), (2, 1, 1, 0));
        assert_eq!(a.ranking_points(), 4);
        assert_eq!(a.goal_difference(), 1);

        let b = row(&table, "B");
        assert_eq!((b.played, b.won, b.drawn, b.lost), (2, 0, 1, 1));
        assert_eq!(b.ranking_points(), 1);
        assert_eq!(b.goal_difference(), -1);
        assert_invariants(&table);
    }

    #[test]
    fn scheduled_match_without_scores_changes_nothing() {
        let scheduled = Match { home_team: "A".into(), away_team: "C".into(), ..Default::default() };
        let table = compute_standings(&[finished("A", "B", 1, 0), scheduled]);
        assert_eq!(row(&table, "A").played, 1);
        assert!(table.iter().all(|r| r.team_name != "C"));
    }

    #[test]
    fn finished_requires_both_status_and_scores() {
        let no_score = Match { away_score: None, ..finished("A", "B", 3, 0) };
        let scored_but_live = Match { status: MatchStatus::Live, ..finished("A", "B", 3, 0) };
        let scored_but_scheduled = Match { status: MatchStatus::Scheduled, ..finished("A", "B", 3, 0) };
        assert!(compute_standings(&[no_score, scored_but_live, scored_but_scheduled]).is_empty());
    }

    #[test]
    fn goal_difference_breaks_points_ties() {
        let matches = vec![
            finished("A", "X", 1, 0),
            finished("B", "Y", 5, 0),
            finished("X", "Y", 0, 0),
        ];
        let table = compute_standings(&matches);
        let order: Vec<&str> = table.iter().map(|r| r.team_name.as_str()).collect();
        assert_eq!(&order[..2], &["B", "A"]);
        assert_invariants(&table);
    }

    #[test]
    fn full_ties_keep_first_appearance_order() {
        let matches = vec![finished("C", "D", 1, 1), finished("A", "B", 2, 2)];
        let order: Vec<String> = compute_standings(&matches).into_iter().map(|r| r.team_name).collect();
        assert_eq!(order, vec!["C", "D", "A", "B"]);
    }

    #[test]
    fn names_are_not_canonicalized() {
        let matches = vec![finished("Bretagne", "X", 1, 0), finished("bretagne ", "X", 1, 0)];
        let table = compute_standings(&matches);
        assert_eq!(table.len(), 3);
        assert_eq!(row(&table, "Bretagne").played, 1);
        assert_eq!(row(&table, "bretagne ").played, 1);
    }

    #[test]
    fn zero_zero_is_a_draw_and_empty_input_is_empty() {
        let table = compute_standings(&[finished("A", "B", 0, 0)]);
        assert!(table.iter().all(|r| r.drawn == 1 && r.played == 1));
        assert!(compute_standings(&[]).is_empty());
    }

    #[test]
    fn recomputation_is_idempotent() {
        let matches = vec![
            finished("A", "B", 3, 2),
            finished("C", "A", 0, 4),
            finished("B", "C", 2, 2),
            finished("D", "A", 1, 1),
        ];
        let first = compute_standings(&matches);
        assert_eq!(first, compute_standings(&matches));
        assert_invariants(&first);
    }

    #[test]
    fn official_classement_uses_synonyms_and_keeps_order() {
        let payload = json!({ "classement": [
            { "equipe": "Z", "matches_joues": 3, "wins": 1, "draws": 1, "losses": 1, "buts_pour": "4", "buts_contre": 4, "points": 99 },
            { "nom": "A", "joues": 3, "gagnees": 3, "points_pour": 9, "points_contre": 1 },
        ]});
        let table = normalize_standings(&payload).unwrap();
        assert_eq!(table[0].team_name, "Z");
        assert_eq!(table[0].ranking_points(), 4);
        assert_eq!(table[0].points_for, 4);
        assert_eq!(table[1].ranking_points(), 9);
        assert_eq!(table[1].goal_difference(), 8);
    }

    #[test]
    fn huge_upstream_scores_saturate_instead_of_overflowing() {
        let payload = json!([
            { "equipe1": "A", "equipe2": "B", "but1": "4294967295", "but2": "0", "statut": "FINISHED" },
            { "equipe1": "A", "equipe2": "C", "but1": "1", "but2": "0", "statut": "FINISHED" },
        ]);
        let matches = crate::normalize_all(&payload, crate::Category::Girls).unwrap();
        let table = compute_standings(&matches);
        assert_eq!(table[0].team_name, "A");
        assert_eq!(table[0].played, 2);
        assert_eq!(table[0].points_for, u32::MAX);
        assert_eq!(table[0].ranking_points(), 6);

        let official = normalize_standings(&json!([{ "nom": "X", "gagnees": u32::MAX, "nulles": 5 }])).unwrap();
        assert_eq!(official[0].ranking_points(), u32::MAX);
    }
}
