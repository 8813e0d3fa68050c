// Integration tests for token primary keys, token instance ids and native bodies
// Covers: hook-generated revision tokens stay unique under concurrent saves

use revisor_core::codec::BodyStorage;
use revisor_core::config::{RevisionerConfig, TrackOptions};
use revisor_core::model::{Entity, InstanceId, InstanceIdType, PrimaryKeyStrategy, RevisionId};
use revisor_core::query::{ListOptions, Projection, RevisionQuery};
use revisor_engine::{EntityModel, Revisioner};
use revisor_store::db;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Doc {
    id: String,
    title: String,
    tags: Vec<String>,
    meta: Value,
}

impl Entity for Doc {
    fn instance_id(&self) -> InstanceId {
        InstanceId::Token(self.id.clone())
    }
}

fn token_config() -> RevisionerConfig {
    RevisionerConfig::default()
        .with_primary_key(PrimaryKeyStrategy::Token)
        .with_instance_id_type(InstanceIdType::Token)
        .with_body_storage(BodyStorage::Native)
}

fn doc(id: &str, title: &str) -> Doc {
    Doc {
        id: id.to_string(),
        title: title.to_string(),
        tags: vec![],
        meta: json!({"lang": "de", "score": 1.5, "nested": {"empty": {}}}),
    }
}

fn assert_uuid_v4(id: &RevisionId) {
    match id {
        RevisionId::Token(token) => {
            let parsed = uuid::Uuid::parse_str(token).unwrap();
            assert_eq!(parsed.get_version_num(), 4);
        }
        RevisionId::Integer(_) => panic!("expected a token id, got {}", id),
    }
}

#[test]
fn test_native_bodies_round_trip_with_token_ids() {
    // Given: A token-keyed table with native JSON bodies
    let mut conn = db::open_in_memory().unwrap();
    let revisioner = Revisioner::new(token_config()).unwrap();
    revisioner.migrate(&mut conn).unwrap();
    EntityModel::<Doc>::ensure_schema(&conn).unwrap();
    let mut docs: EntityModel<Doc> = EntityModel::new("Doc").unwrap();
    revisioner
        .enable(docs.hooks_mut(), "Doc", TrackOptions::default())
        .unwrap();

    // When: A document with unicode and empty containers is saved
    let saved = doc("doc-α", "Grüße, 世界 🎉");
    docs.save(&mut conn, &saved).unwrap();

    // Then: The revision body equals the plain values exactly
    let latest = revisioner
        .history()
        .latest_revision(&conn, "Doc", &"doc-α".into())
        .unwrap()
        .unwrap();
    assert_uuid_v4(&latest.id);
    assert_eq!(latest.body, saved.plain_values().unwrap());
    assert_eq!(latest.instance_id, InstanceId::Token("doc-α".to_string()));

    // And: The revision is fetchable by its token
    let fetched = revisioner
        .history()
        .get_revision(&conn, "Doc", &"doc-α".into(), &latest.id)
        .unwrap();
    assert_eq!(fetched, Some(latest));
}

#[test]
fn test_concurrent_saves_produce_unique_tokens() {
    // Given: A file database shared by several writers
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("revisions.db");
    let revisioner = Revisioner::new(token_config()).unwrap();
    {
        let mut conn = db::open(&path).unwrap();
        revisioner.migrate(&mut conn).unwrap();
        EntityModel::<Doc>::ensure_schema(&conn).unwrap();
    }

    let mut docs: EntityModel<Doc> = EntityModel::new("Doc").unwrap();
    revisioner
        .enable(docs.hooks_mut(), "Doc", TrackOptions::default())
        .unwrap();
    let docs = Arc::new(docs);

    // When: Eight threads each save five revisions on their own connection
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let docs = docs.clone();
            let path = path.clone();
            thread::spawn(move || {
                let mut conn = db::open(&path).unwrap();
                for n in 0..5 {
                    docs.save(&mut conn, &doc(&format!("doc-{}", t), &format!("v{}", n)))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Then: Forty revisions exist and every id is a distinct UUID v4
    let conn = db::open(&path).unwrap();
    let all = revisioner
        .store()
        .query(
            &conn,
            &RevisionQuery {
                projection: Projection::full(),
                ..RevisionQuery::default()
            },
        )
        .unwrap();
    assert_eq!(all.len(), 40);
    let ids: HashSet<_> = all.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids.len(), 40);
    all.iter().for_each(|r| assert_uuid_v4(&r.id));

    // And: Each instance's history holds exactly its own five revisions, in order
    let history = revisioner.history();
    for t in 0..8 {
        let rows = history
            .list_revisions(
                &conn,
                "Doc",
                &InstanceId::Token(format!("doc-{}", t)),
                &ListOptions::full(),
            )
            .unwrap();
        let titles: Vec<_> = rows
            .iter()
            .map(|r| r.body.as_ref().unwrap()["title"].clone())
            .collect();
        assert_eq!(
            titles,
            vec![json!("v0"), json!("v1"), json!("v2"), json!("v3"), json!("v4")]
        );
    }
}
