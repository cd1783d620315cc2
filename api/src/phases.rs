//! Phase → pool → rencontres trees and their flattening into one match list.
use crate::filter::{DateWindow, filter_by_window, sort_by_kickoff};
use crate::normalize::{Normalizer, ShapeError, lookup, text, unwrap_envelope};
use crate::{Category, CategoryFeed, Match, Phase, PhaseFeed, Pool};
use serde_json::Value;

pub const PHASE_ENVELOPE_KEYS: &[&str] = &["data", "phases"];
pub const POOL_ENVELOPE_KEYS: &[&str] = &["data", "poules"];

const PHASE_ID_KEYS: &[&str] = &["phase_id", "id"];
const PHASE_LABEL_KEYS: &[&str] = &["libelle", "nom", "name"];
const PHASE_ORDER_KEYS: &[&str] = &["ordre", "order"];
const POOL_ID_KEYS: &[&str] = &["poule_id", "id"];
const POOL_LABEL_KEYS: &[&str] = &["libelle", "nom", "name"];
const POOL_MATCH_KEYS: &[&str] = &["rencontres", "rencontre", "matchs"];

/// Label of the girls' round-robin phase, already served by the flat matches endpoint.
pub const CHAMPIONSHIP_LABEL: &str = "CHAMPIONNAT";

/// Flatten phases into one match list, each match stamped with its pool label
/// and phase id. Order is phase, then pool, then the pool's own order.
pub fn flatten(phases: &[Phase], category: Category) -> Vec<Match> {
    flatten_with(&Normalizer::default(), phases, category)
}

pub fn flatten_with(normalizer: &Normalizer, phases: &[Phase], category: Category) -> Vec<Match> {
    phases
        .iter()
        .flat_map(move |phase| {
            phase.pools.iter().flat_map(move |pool| {
                pool.matches
                    .iter()
                    .filter(|raw| raw.is_object())
                    .map(move |raw| Match {
                        pool: Some(pool.label.clone()),
                        phase_id: Some(phase.id.clone()),
                        ..normalizer.normalize(raw, category)
                    })
            })
        })
        .collect()
}

/// Phase list from a phases payload. Pools are left empty; they come from a
/// separate endpoint.
pub fn parse_phases(payload: &Value) -> Result<Vec<Phase>, ShapeError> {
    let records = unwrap_envelope(payload, PHASE_ENVELOPE_KEYS)?;
    Ok(records
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| raw.as_object().map(|record| (index, record)))
        .map(|(index, record)| Phase {
            id: lookup(record, PHASE_ID_KEYS)
                .and_then(text)
                .unwrap_or_else(|| index.to_string()),
            label: lookup(record, PHASE_LABEL_KEYS)
                .and_then(text)
                .unwrap_or_else(|| format!("Phase {}", index + 1)),
            order: lookup(record, PHASE_ORDER_KEYS)
                .and_then(Value::as_i64)
                .unwrap_or(0),
            pools: Vec::new(),
        })
        .collect())
}

/// Pool list from a pools payload, each pool keeping its raw rencontres.
pub fn parse_pools(payload: &Value) -> Result<Vec<Pool>, ShapeError> {
    let records = unwrap_envelope(payload, POOL_ENVELOPE_KEYS)?;
    Ok(records
        .iter()
        .filter_map(Value::as_object)
        .map(|record| {
            let id = lookup(record, POOL_ID_KEYS).and_then(text).unwrap_or_default();
            let label = lookup(record, POOL_LABEL_KEYS)
                .and_then(text)
                .unwrap_or_else(|| format!("Poule {id}"));
            let matches = lookup(record, POOL_MATCH_KEYS)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            Pool { id, label, matches }
        })
        .collect())
}

pub fn is_championship_phase(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(CHAMPIONSHIP_LABEL)
}

/// Id and label of the phase served by the flat matches endpoint(s).
pub fn base_phase(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Girls => ("championnat", "Championnat"),
        Category::Boys => ("poules", "Poules"),
    }
}

/// Window-filter then kickoff-sort one phase.
pub fn phase_feed(id: &str, label: &str, matches: &[Match], window: &DateWindow) -> PhaseFeed {
    let mut matches = filter_by_window(matches, window);
    sort_by_kickoff(&mut matches);
    PhaseFeed { id: id.to_owned(), label: label.to_owned(), matches }
}

/// Everything shown for a category: the base phase first, then the extra
/// phases by their `ordre`. The girls' championship phase is skipped among
/// the extras since `base` already holds it. Pool records go through
/// `normalizer`, the same one that produced `base`.
pub fn build_feed(
    normalizer: &Normalizer,
    category: Category,
    base: &[Match],
    phases: &[Phase],
    window: &DateWindow,
) -> CategoryFeed {
    let (base_id, base_label) = base_phase(category);
    let mut extras: Vec<&Phase> = phases
        .iter()
        .filter(|p| !(category == Category::Girls && is_championship_phase(&p.label)))
        .collect();
    extras.sort_by_key(|p| p.order);

    let mut feeds = vec![phase_feed(base_id, base_label, base, window)];
    feeds.extend(extras.into_iter().map(|phase| {
        let matches = flatten_with(normalizer, std::slice::from_ref(phase), category);
        phase_feed(&phase.id, &phase.label, &matches, window)
    }));
    CategoryFeed { category, phases: feeds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool(id: &str, label: &str, matches: Vec<Value>) -> Pool {
        Pool { id: id.into(), label: label.into(), matches }
    }

    fn phase(id: &str, pools: Vec<Pool>) -> Phase {
        Phase { id: id.into(), label: id.to_uppercase(), order: 0, pools }
    }

    #[test]
    fn two_phases_flatten_in_phase_pool_match_order() {
        let phases = vec![
            phase("semis", vec![pool("p1", "Demi-finales", vec![json!({ "rencId": "m1", "equipe_domicile": "A" })])]),
            phase("finals", vec![pool("p2", "Finale", vec![json!({ "rencId": "m2", "equipe_domicile": "B" })])]),
        ];
        let flat = flatten(&phases, Category::Boys);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].id, "m1");
        assert_eq!(flat[0].pool.as_deref(), Some("Demi-finales"));
        assert_eq!(flat[0].phase_id.as_deref(), Some("semis"));
        assert_eq!(flat[1].id, "m2");
        assert_eq!(flat[1].pool.as_deref(), Some("Finale"));
        assert_eq!(flat[1].phase_id.as_deref(), Some("finals"));
    }

    #[test]
    fn original_match_order_is_kept_without_sorting() {
        let phases = vec![phase(
            "groups",
            vec![
                pool("a", "Poule A", vec![
                    json!({ "rencId": "late", "date": "2025-10-29T15:00:00Z" }),
                    json!({ "rencId": "early", "date": "2025-10-27T09:00:00Z" }),
                ]),
                pool("b", "Poule B", vec![json!({ "rencId": "b1" })]),
            ],
        )];
        let ids: Vec<String> = flatten(&phases, Category::Girls).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["late", "early", "b1"]);
    }

    #[test]
    fn empty_phases_and_pools_contribute_nothing() {
        let phases = vec![
            phase("empty", vec![]),
            phase("hollow", vec![pool("p", "Poule", vec![])]),
        ];
        assert!(flatten(&phases, Category::Girls).is_empty());
        assert!(flatten(&[], Category::Girls).is_empty());
    }

    #[test]
    fn pool_stamp_overrides_record_pool() {
        let phases = vec![phase("g", vec![pool("a", "Poule A", vec![json!({ "poule": "stale" })])])];
        assert_eq!(flatten(&phases, Category::Girls)[0].pool.as_deref(), Some("Poule A"));
    }

    #[test]
    fn phases_parse_with_fallback_ids_and_labels() {
        let payload = json!({ "phases": [
            { "phase_id": "p-1", "libelle": "PHASE DE POULES", "ordre": 1 },
            { "id": 7, "nom": "Finales" },
            {}
        ]});
        let phases = parse_phases(&payload).unwrap();
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[0].id, "p-1");
        assert_eq!(phases[0].order, 1);
        assert_eq!(phases[1].id, "7");
        assert_eq!(phases[1].label, "Finales");
        assert_eq!(phases[2].id, "2");
        assert_eq!(phases[2].label, "Phase 3");
    }

    #[test]
    fn pools_parse_rencontres_and_default_labels() {
        let payload = json!({ "data": [
            { "poule_id": "11", "libelle": "Poule A", "rencontres": [{ "rencId": "1" }, { "rencId": "2" }] },
            { "poule_id": "12", "rencontre": [{ "rencId": "3" }] },
            { "poule_id": "13" }
        ]});
        let pools = parse_pools(&payload).unwrap();
        assert_eq!(pools.len(), 3);
        assert_eq!(pools[0].matches.len(), 2);
        assert_eq!(pools[1].label, "Poule 12");
        assert_eq!(pools[1].matches.len(), 1);
        assert!(pools[2].matches.is_empty());
    }

    #[test]
    fn girls_feed_skips_championship_and_orders_extras() {
        let w = DateWindow::default();
        let base = vec![
            Match { id: "late".into(), date: Some(w.end), ..Default::default() },
            Match { id: "early".into(), date: Some(w.start), ..Default::default() },
            Match { id: "tbd".into(), ..Default::default() },
        ];
        let phases = vec![
            Phase { order: 3, ..phase("finals", vec![pool("f", "Finale", vec![json!({ "rencId": "f1", "date": "2025-10-30T14:00:00Z" })])]) },
            Phase { label: "Championnat".into(), ..phase("champ", vec![]) },
            Phase { order: 2, ..phase("semis", vec![pool("s", "Demi", vec![json!({ "rencId": "s1", "date": "2024-01-01T00:00:00Z" })])]) },
        ];
        let feed = build_feed(&Normalizer::default(), Category::Girls, &base, &phases, &w);
        let ids: Vec<&str> = feed.phases.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["championnat", "semis", "finals"]);

        let base_ids: Vec<&str> = feed.phases[0].matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(base_ids, vec!["early", "late"]);
        assert!(feed.phases[1].matches.is_empty());
        assert_eq!(feed.phases[2].matches[0].pool.as_deref(), Some("Finale"));
        assert_eq!(feed.match_count(), 3);
    }

    #[test]
    fn boys_feed_keeps_a_phase_named_championnat() {
        let phases = vec![Phase { label: "CHAMPIONNAT".into(), ..phase("c", vec![]) }];
        let feed = build_feed(&Normalizer::default(), Category::Boys, &[], &phases, &DateWindow::default());
        assert_eq!(feed.phases.len(), 2);
        assert_eq!(feed.phases[0].id, "poules");
    }

    #[test]
    fn extra_phases_use_the_given_normalizer() {
        let table = crate::SynonymTable { home_team: &["club_a"], ..crate::SynonymTable::DEFAULT };
        let normalizer = Normalizer::new(table);
        let phases = vec![phase("f", vec![pool("p", "Finale", vec![json!({ "rencId": "f1", "club_a": "Bretagne", "equipe1": "Ignored", "date": "2025-10-30T14:00:00Z" })])])];
        let feed = build_feed(&normalizer, Category::Girls, &[], &phases, &DateWindow::default());
        assert_eq!(feed.phases[1].matches[0].home_team, "Bretagne");

        let feed = build_feed(&Normalizer::default(), Category::Girls, &[], &phases, &DateWindow::default());
        assert_eq!(feed.phases[1].matches[0].home_team, "Ignored");
    }

    #[test]
    fn championship_phase_detection_ignores_case() {
        assert!(is_championship_phase("CHAMPIONNAT"));
        assert!(is_championship_phase("Championnat"));
        assert!(!is_championship_phase("Finale"));
    }
}
