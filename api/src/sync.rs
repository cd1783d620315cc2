//! Mirror of the REST API into a [`DocumentStore`], and loading it back.
use crate::client::{ApiResult, BOYS_POOLS, FfhApi, competition};
use crate::normalize::{Normalizer, lookup, text};
use crate::phases::{build_feed, parse_phases, parse_pools};
use crate::store::{Document, DocumentStore};
use crate::{Category, CategoryFeed, DateWindow, Phase, Pool};
use chrono::{SecondsFormat, Utc};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

const LAST_UPDATED: &str = "lastUpdated";

pub fn matches_collection(category: Category) -> String {
    format!("matchs_{}", category.slug())
}

pub fn phases_collection(category: Category) -> String {
    format!("phases_{}", category.slug())
}

pub fn pools_collection(category: Category, phase_id: &str) -> String {
    format!("phases_{}/{phase_id}/poules", category.slug())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub boys_matches: usize,
    pub girls_matches: usize,
    pub phases: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} girls matches, {} boys matches, {} phases",
            self.girls_matches, self.boys_matches, self.phases
        )
    }
}

pub struct Synchronizer {
    api: FfhApi,
    store: Arc<dyn DocumentStore>,
}

impl Synchronizer {
    pub fn new(api: FfhApi, store: Arc<dyn DocumentStore>) -> Self {
        Self { api, store }
    }

    /// Mirror phases and pools of both categories, then the matches.
    pub async fn sync_all(&self) -> ApiResult<SyncReport> {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut report = SyncReport::default();

        for category in Category::ALL {
            report.phases += self.sync_phases(category, &stamp).await?;
        }
        report.boys_matches = self.sync_matches(Category::Boys, &stamp).await?;
        report.girls_matches = self.sync_matches(Category::Girls, &stamp).await?;

        info!("sync done: {report}");
        Ok(report)
    }

    async fn sync_phases(&self, category: Category, stamp: &str) -> ApiResult<usize> {
        let phases = self.api.fetch_phase_tree(category).await?;
        let docs = phases
            .iter()
            .map(|phase| (phase.id.clone(), phase_document(phase, stamp)))
            .collect();
        self.store.replace_collection(&phases_collection(category), docs)?;

        for phase in &phases {
            let docs = phase
                .pools
                .iter()
                .enumerate()
                .map(|(order, pool)| (pool.id.clone(), pool_document(pool, order, stamp)))
                .collect();
            self.store.replace_collection(&pools_collection(category, &phase.id), docs)?;
        }
        debug!("mirrored {} {} phases", phases.len(), category.label());
        Ok(phases.len())
    }

    async fn sync_matches(&self, category: Category, stamp: &str) -> ApiResult<usize> {
        let mut records = Vec::new();
        match category {
            Category::Girls => records.extend(self.api.fetch_match_records(competition(category)).await?),
            Category::Boys => {
                for (slug, label) in BOYS_POOLS {
                    let pool = self.api.fetch_match_records(slug).await?;
                    records.extend(pool.into_iter().map(|r| with_field(r, "poule", label)));
                }
            }
        }

        let docs = match_documents(category, records, self.api.normalizer().table().id, stamp);
        let count = docs.len();
        self.store.replace_collection(&matches_collection(category), docs)?;
        Ok(count)
    }
}

/// Store documents for raw match records, keyed by their id. Records without
/// an id get a positional one. When two records share an id the later one
/// wins, so the result holds one document per id.
fn match_documents(
    category: Category,
    records: Vec<Value>,
    id_keys: &[&str],
    stamp: &str,
) -> Vec<(String, Document)> {
    let mut docs: BTreeMap<String, Document> = BTreeMap::new();
    let objects = records.into_iter().filter_map(|record| match record {
        Value::Object(doc) => Some(doc),
        _ => None,
    });
    for (index, mut doc) in objects.enumerate() {
        let id = lookup(&doc, id_keys)
            .and_then(text)
            .unwrap_or_else(|| format!("{}-{index}", category.slug()));
        doc.insert("category".into(), Value::from(category.slug()));
        doc.insert(LAST_UPDATED.into(), Value::from(stamp));
        if docs.insert(id.clone(), doc).is_some() {
            warn!("duplicate {} match id {id}, keeping the last record", category.label());
        }
    }
    docs.into_iter().collect()
}

fn with_field(record: Value, key: &str, value: &str) -> Value {
    match record {
        Value::Object(mut doc) => {
            doc.insert(key.to_owned(), Value::from(value));
            Value::Object(doc)
        }
        other => other,
    }
}

fn phase_document(phase: &Phase, stamp: &str) -> Document {
    let mut doc = Document::new();
    doc.insert("phase_id".into(), Value::from(phase.id.as_str()));
    doc.insert("libelle".into(), Value::from(phase.label.as_str()));
    doc.insert("ordre".into(), Value::from(phase.order));
    doc.insert(LAST_UPDATED.into(), Value::from(stamp));
    doc
}

fn pool_document(pool: &Pool, order: usize, stamp: &str) -> Document {
    let mut doc = Document::new();
    doc.insert("poule_id".into(), Value::from(pool.id.as_str()));
    doc.insert("libelle".into(), Value::from(pool.label.as_str()));
    doc.insert("ordre".into(), Value::from(order));
    doc.insert("rencontres".into(), Value::Array(pool.matches.clone()));
    doc.insert(LAST_UPDATED.into(), Value::from(stamp));
    doc
}

fn order_of(doc: &Document) -> i64 {
    doc.get("ordre").and_then(Value::as_i64).unwrap_or(0)
}

/// Rebuild a category feed from a mirrored store.
pub fn load_category_from_store(
    store: &dyn DocumentStore,
    normalizer: &Normalizer,
    category: Category,
    window: &DateWindow,
) -> ApiResult<CategoryFeed> {
    let records = Value::Array(store.list(&matches_collection(category))?.into_iter().map(Value::Object).collect());
    let base = normalizer
        .normalize_all(&records, category)
        .map_err(|e| crate::ApiError::Shape(e, matches_collection(category)))?;

    let mut phase_docs = store.list(&phases_collection(category))?;
    phase_docs.sort_by_key(order_of);
    let phase_payload = Value::Array(phase_docs.into_iter().map(Value::Object).collect());
    let mut phases = parse_phases(&phase_payload)
        .map_err(|e| crate::ApiError::Shape(e, phases_collection(category)))?;

    for phase in &mut phases {
        let collection = pools_collection(category, &phase.id);
        let mut pool_docs = store.list(&collection)?;
        pool_docs.sort_by_key(order_of);
        let payload = Value::Array(pool_docs.into_iter().map(Value::Object).collect());
        phase.pools = parse_pools(&payload).map_err(|e| crate::ApiError::Shape(e, collection))?;
    }

    Ok(build_feed(normalizer, category, &base, &phases, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn shared_match_ids_are_stored_and_counted_once() {
        let records = vec![
            json!({ "rencId": "7", "equipe1": "A", "equipe2": "B", "poule": "Poule A" }),
            json!({ "rencId": "7", "equipe1": "C", "equipe2": "D", "poule": "Poule B" }),
            json!({ "equipe1": "E", "equipe2": "F" }),
            json!("not a record"),
        ];
        let docs = match_documents(Category::Boys, records, crate::SynonymTable::DEFAULT.id, "2025-10-27T00:00:00Z");
        let ids: Vec<&str> = docs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["7", "garcons-2"]);
        assert_eq!(docs[0].1["poule"], json!("Poule B"));
        assert_eq!(docs[0].1["category"], json!("garcons"));

        let store = MemoryStore::new();
        let count = docs.len();
        store.replace_collection("matchs_garcons", docs).unwrap();
        assert_eq!(store.list("matchs_garcons").unwrap().len(), count);
    }

    #[test]
    fn collection_paths() {
        assert_eq!(matches_collection(Category::Girls), "matchs_filles");
        assert_eq!(phases_collection(Category::Boys), "phases_garcons");
        assert_eq!(pools_collection(Category::Boys, "12"), "phases_garcons/12/poules");
    }

    #[test]
    fn store_feed_rebuilds_phases_and_pools() {
        let store = MemoryStore::new();
        store
            .replace_collection(
                "matchs_garcons",
                vec![
                    ("2".into(), doc(json!({ "rencId": "2", "date": "2025-10-28T10:00:00Z", "equipe1": "C", "equipe2": "D", "poule": "Poule B", "category": "garcons" }))),
                    ("1".into(), doc(json!({ "rencId": "1", "date": "2025-10-27T10:00:00Z", "equipe1": "A", "equipe2": "B", "poule": "Poule A", "category": "garcons" }))),
                ],
            )
            .unwrap();
        store
            .set("phases_garcons", "f", doc(json!({ "phase_id": "f", "libelle": "Finales", "ordre": 2 })))
            .unwrap();
        store
            .set("phases_garcons", "d", doc(json!({ "phase_id": "d", "libelle": "Demies", "ordre": 1 })))
            .unwrap();
        store
            .set(
                "phases_garcons/f/poules",
                "x",
                doc(json!({ "poule_id": "x", "libelle": "Finale", "ordre": 0, "rencontres": [{ "rencId": "9", "date": "2025-10-30T15:00:00Z" }] })),
            )
            .unwrap();

        let feed = load_category_from_store(&store, &Normalizer::default(), Category::Boys, &DateWindow::default()).unwrap();
        let ids: Vec<&str> = feed.phases.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["poules", "d", "f"]);

        let group: Vec<&str> = feed.phases[0].matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(group, vec!["1", "2"]);
        assert_eq!(feed.phases[0].matches[0].pool.as_deref(), Some("Poule A"));
        assert_eq!(feed.phases[2].matches[0].pool.as_deref(), Some("Finale"));
        assert_eq!(feed.phases[2].matches[0].phase_id.as_deref(), Some("f"));
    }

    #[test]
    fn empty_store_gives_an_empty_base_phase() {
        let feed = load_category_from_store(&MemoryStore::new(), &Normalizer::default(), Category::Girls, &DateWindow::default()).unwrap();
        assert_eq!(feed.phases.len(), 1);
        assert_eq!(feed.phases[0].id, "championnat");
        assert!(feed.phases[0].matches.is_empty());
    }

    #[test]
    fn documents_carry_mirror_fields() {
        let pool = Pool { id: "7".into(), label: "Poule A".into(), matches: vec![json!({ "rencId": "1" })] };
        let doc = pool_document(&pool, 3, "2025-10-27T08:00:00Z");
        assert_eq!(doc["ordre"], json!(3));
        assert_eq!(doc["rencontres"].as_array().map(Vec::len), Some(1));
        assert_eq!(doc[LAST_UPDATED], json!("2025-10-27T08:00:00Z"));
        assert_eq!(with_field(json!({}), "poule", "Poule B")["poule"], json!("Poule B"));
    }
}
