mod integration;

use dictate::config::DictationConfig;
use dictate::store::{JsonFileStore, KeyValueStore, SavedTextRegistry, SAVED_TEXTS_KEY};
use integration::fixtures::COMPLEX_TEXT;
use integration::{new_session, TestFixture};

/// Saved texts survive reopening the store file
#[test]
fn test_registry_persists_across_reopen() {
    let fixture = TestFixture::new();

    let mut registry = SavedTextRegistry::new(JsonFileStore::new(fixture.store_path()));
    let first = registry.save("First text.", Some("First"), None).expect("save first");
    let second = registry.save("Second text.", Some("Second"), None).expect("save second");

    let reopened = SavedTextRegistry::new(JsonFileStore::new(fixture.store_path()));
    let listed = reopened.list().expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id, "most recently modified first");
    assert_eq!(listed[1].id, first.id);
    assert_eq!(
        reopened.load(&first.id).expect("load").map(|t| t.text),
        Some("First text.".to_string())
    );
}

#[test]
fn test_update_moves_text_to_front() {
    let fixture = TestFixture::new();
    let mut registry = SavedTextRegistry::new(JsonFileStore::new(fixture.store_path()));
    let first = registry.save("First.", Some("First"), None).expect("save first");
    registry.save("Second.", Some("Second"), None).expect("save second");

    registry
        .save("First, revised.", Some("First"), Some(first.id.as_str()))
        .expect("update first");
    let listed = registry.list().expect("list");
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[0].created_at, first.created_at);
}

#[test]
fn test_store_file_holds_single_collection_key() {
    let fixture = TestFixture::new();
    let mut registry = SavedTextRegistry::new(JsonFileStore::new(fixture.store_path()));
    registry.save("Some text.", None, None).expect("save");

    let store = registry.into_inner();
    assert_eq!(store.list().expect("keys"), vec![SAVED_TEXTS_KEY.to_string()]);
    let raw = store.get(SAVED_TEXTS_KEY).expect("get").expect("present");
    assert!(raw.contains("\"createdAt\""));
    assert!(raw.contains("\"lastModified\""));
}

#[test]
fn test_saved_text_loads_into_session() {
    let fixture = TestFixture::new();
    let mut registry = SavedTextRegistry::new(JsonFileStore::new(fixture.store_path()));
    let saved = registry.save(COMPLEX_TEXT, Some("Complex"), None).expect("save");

    let text = registry.load(&saved.id).expect("load").expect("present").text;
    let (mut session, _events) = new_session(DictationConfig::default(), None);
    assert_eq!(session.load_text(&text), 9);
    assert_eq!(session.expected_text().as_deref(), Some("Hello world."));
    assert_eq!(session.session_id(), 1);
}
