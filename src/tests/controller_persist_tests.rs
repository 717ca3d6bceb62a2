use std::collections::HashSet;

use rand::Rng;
use serde_json::Value;

use crate::{
    bounded_set::BoundedSetError,
    controller::{
        controller_persist::{ControllerPersist, EvictionStats},
        persist::PersistError,
    },
    core::limits::DEFAULT_MAX_TRACKED_FILES,
};

fn names(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn populated() -> Result<ControllerPersist, anyhow::Error> {
    let mut persist = ControllerPersist::new(DEFAULT_MAX_TRACKED_FILES)?;
    for name in ["one", "two", "th ree", "fo.ur"] {
        persist.downloaded_file_names.add(name.to_string());
    }
    for name in ["fi\"ve", "si@x", "se\\ven", "ei-ght"] {
        persist.extracted_file_names.add(name.to_string());
    }
    Ok(persist)
}

#[test]
fn test_deserialize() -> Result<(), anyhow::Error> {
    let content = r#"
        {
            "downloaded": ["one", "two", "th ree", "fo.ur"],
            "extracted": ["fi\"ve", "si@x", "se\\ven", "ei-ght"]
        }
    "#;
    let persist = ControllerPersist::deserialize(content, DEFAULT_MAX_TRACKED_FILES)?;

    assert_eq!(persist.downloaded_file_names, names(&["one", "two", "th ree", "fo.ur"]));
    assert_eq!(persist.extracted_file_names, names(&["fi\"ve", "si@x", "se\\ven", "ei-ght"]));
    Ok(())
}

#[test]
fn test_serialize() -> Result<(), anyhow::Error> {
    let persist = populated()?;
    let value: Value = serde_json::from_str(&persist.serialize()?)?;

    let downloaded: Vec<&str> = value["downloaded"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("downloaded is not an array"))?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let extracted: Vec<&str> = value["extracted"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("extracted is not an array"))?
        .iter()
        .filter_map(Value::as_str)
        .collect();

    assert_eq!(downloaded, vec!["one", "two", "th ree", "fo.ur"]);
    assert_eq!(extracted, vec!["fi\"ve", "si@x", "se\\ven", "ei-ght"]);
    Ok(())
}

#[test]
fn test_round_trip() -> Result<(), anyhow::Error> {
    let mut persist = populated()?;
    persist.downloaded_file_names.add("ünïcödé 文件.mkv".to_string());
    persist.extracted_file_names.add("tab\there\nnewline".to_string());

    let restored = ControllerPersist::deserialize(&persist.serialize()?, persist.max_tracked_files())?;

    assert_eq!(persist.downloaded_file_names, restored.downloaded_file_names);
    assert_eq!(persist.extracted_file_names, restored.extracted_file_names);
    assert_eq!(
        persist.downloaded_file_names.as_list(),
        restored.downloaded_file_names.as_list()
    );
    Ok(())
}

#[test]
fn test_round_trip_empty() -> Result<(), anyhow::Error> {
    let persist = ControllerPersist::new(5)?;
    let content = persist.serialize()?;
    assert_eq!(content, r#"{"downloaded":[],"extracted":[]}"#);

    let restored = ControllerPersist::deserialize(&content, 5)?;
    assert!(restored.downloaded_file_names.is_empty());
    assert!(restored.extracted_file_names.is_empty());
    Ok(())
}

#[test]
fn test_deserialize_errors() {
    let cases: Vec<(&str, PersistError)> = vec![
        ("", PersistError::Empty),
        ("   \n ", PersistError::Empty),
        ("[]", PersistError::NotAnObject),
        (r#"{"downloaded": []}"#, PersistError::MissingField("extracted")),
        (r#"{"extracted": []}"#, PersistError::MissingField("downloaded")),
        (
            r#"{"downloaded": "one", "extracted": []}"#,
            PersistError::NotAnArray("downloaded"),
        ),
        (
            r#"{"downloaded": ["one", 2], "extracted": []}"#,
            PersistError::NotAString { field: "downloaded", index: 1 },
        ),
        (
            r#"{"downloaded": [], "extracted": [null]}"#,
            PersistError::NotAString { field: "extracted", index: 0 },
        ),
    ];

    for (content, expected) in cases {
        match ControllerPersist::deserialize(content, DEFAULT_MAX_TRACKED_FILES) {
            Err(e) => assert_eq!(e, expected, "Unexpected error for {content:?}"),
            Ok(_) => panic!("Content {content:?} should not deserialize"),
        }
    }
}

#[test]
fn test_deserialize_malformed() {
    let malformed = [
        "{",
        r#"{"downloaded": [bad string], "extracted": []}"#,
        r#"{"downloaded": [], "extracted": [bad string]}"#,
    ];

    for content in malformed {
        assert!(
            matches!(
                ControllerPersist::deserialize(content, DEFAULT_MAX_TRACKED_FILES),
                Err(PersistError::Malformed(_))
            ),
            "Content {content:?} should be reported as malformed"
        );
    }
}

#[test]
fn test_deserialize_ignores_unknown_fields() -> Result<(), anyhow::Error> {
    let content = r#"{"version": 2, "downloaded": ["a"], "extracted": ["b"]}"#;
    let persist = ControllerPersist::deserialize(content, 10)?;
    assert!(persist.downloaded_file_names.contains("a"));
    assert!(persist.extracted_file_names.contains("b"));
    Ok(())
}

#[test]
fn test_max_tracked_files() -> Result<(), anyhow::Error> {
    assert_eq!(ControllerPersist::default().max_tracked_files(), DEFAULT_MAX_TRACKED_FILES);
    assert_eq!(
        ControllerPersist::default().downloaded_file_names.capacity(),
        DEFAULT_MAX_TRACKED_FILES
    );

    let persist = ControllerPersist::new(100)?;
    assert_eq!(persist.max_tracked_files(), 100);
    assert_eq!(persist.extracted_file_names.capacity(), 100);

    assert_eq!(ControllerPersist::new(0).err(), Some(BoundedSetError::InvalidCapacity(0)));
    assert_eq!(
        ControllerPersist::deserialize(r#"{"downloaded": [], "extracted": []}"#, 0).err(),
        Some(PersistError::InvalidLimit(BoundedSetError::InvalidCapacity(0)))
    );
    Ok(())
}

#[test]
fn test_invalid_limit_reported_before_content() {
    let invalid_limit = Some(PersistError::InvalidLimit(BoundedSetError::InvalidCapacity(0)));
    for content in ["", "{", "[]", r#"{"downloaded": []}"#] {
        assert_eq!(
            ControllerPersist::deserialize(content, 0).err(),
            invalid_limit,
            "A zero limit should win over problems in {content:?}"
        );
    }
}

#[test]
fn test_eviction_on_add() -> Result<(), anyhow::Error> {
    let mut persist = ControllerPersist::new(3)?;
    for name in ["file1", "file2", "file3", "file4"] {
        persist.downloaded_file_names.add(name.to_string());
    }

    assert!(!persist.downloaded_file_names.contains("file1"));
    assert!(persist.downloaded_file_names.contains("file2"));
    assert!(persist.downloaded_file_names.contains("file3"));
    assert!(persist.downloaded_file_names.contains("file4"));
    assert!(persist.extracted_file_names.is_empty(), "Sets should be independent");
    Ok(())
}

#[test]
fn test_eviction_stats() -> Result<(), anyhow::Error> {
    let mut persist = ControllerPersist::new(2)?;
    for name in ["file1", "file2", "file3"] {
        persist.downloaded_file_names.add(name.to_string());
    }
    for name in ["ext1", "ext2", "ext3"] {
        persist.extracted_file_names.add(name.to_string());
    }

    assert_eq!(
        persist.get_eviction_stats(),
        EvictionStats {
            downloaded_evictions: 1,
            extracted_evictions: 1,
            max_tracked_files: 2,
        }
    );

    let value = serde_json::to_value(persist.get_eviction_stats())?;
    assert_eq!(value["downloaded_evictions"], 1);
    assert_eq!(value["max_tracked_files"], 2);
    Ok(())
}

#[test]
fn test_deserialize_keeps_newest_entries() -> Result<(), anyhow::Error> {
    let content = r#"{"downloaded":["f1","f2","f3","f4","f5"],"extracted":[]}"#;
    let persist = ControllerPersist::deserialize(content, 3)?;

    assert_eq!(persist.downloaded_file_names.as_list(), vec!["f3", "f4", "f5"]);
    let stats = persist.get_eviction_stats();
    assert_eq!(stats.downloaded_evictions, 2);
    assert_eq!(stats.extracted_evictions, 0);
    assert_eq!(stats.max_tracked_files, 3);
    Ok(())
}

#[test]
fn test_serialization_preserves_order() -> Result<(), anyhow::Error> {
    let mut persist = ControllerPersist::new(10)?;
    persist.downloaded_file_names.add("third".to_string());
    persist.downloaded_file_names.add("first".to_string());
    persist.downloaded_file_names.add("second".to_string());

    let value: Value = serde_json::from_str(&persist.serialize()?)?;
    assert_eq!(value["downloaded"], serde_json::json!(["third", "first", "second"]));
    Ok(())
}

#[test]
fn test_difference_update() -> Result<(), anyhow::Error> {
    let mut persist = ControllerPersist::new(10)?;
    for name in ["file1", "file2", "file3"] {
        persist.downloaded_file_names.add(name.to_string());
    }

    persist
        .downloaded_file_names
        .difference_update(&names(&["file2", "nonexistent"]));

    assert!(persist.downloaded_file_names.contains("file1"));
    assert!(!persist.downloaded_file_names.contains("file2"));
    assert!(persist.downloaded_file_names.contains("file3"));
    Ok(())
}

const NAME_CHARS: &[char] = &[
    'a', 'Z', '0', ' ', '.', '-', '/', '"', '\\', '\'', '\n', '\t', '\r', '\u{0}', '\u{1f}',
    '\u{7f}', 'é', '文', '😀',
];

fn random_name(rng: &mut impl Rng) -> String {
    let len = rng.random_range(0..12);
    (0..len)
        .map(|_| NAME_CHARS[rng.random_range(0..NAME_CHARS.len())])
        .collect()
}

#[test]
fn test_random_states_round_trip() -> Result<(), anyhow::Error> {
    let mut rng = rand::rng();

    for _ in 0..200 {
        let max_tracked_files = rng.random_range(1..16);
        let mut persist = ControllerPersist::new(max_tracked_files)?;

        for _ in 0..rng.random_range(0..40) {
            let name = random_name(&mut rng);
            match rng.random_range(0..4) {
                0 => {
                    persist.downloaded_file_names.add(name);
                }
                1 => {
                    persist.extracted_file_names.add(name);
                }
                2 => {
                    persist.downloaded_file_names.discard(name.as_str());
                }
                _ => {
                    persist.downloaded_file_names.add(name.clone());
                    persist.extracted_file_names.add(name);
                }
            }
        }

        let content = persist.serialize()?;
        let restored = ControllerPersist::deserialize(&content, persist.max_tracked_files())?;

        assert_eq!(persist.downloaded_file_names, restored.downloaded_file_names);
        assert_eq!(persist.extracted_file_names, restored.extracted_file_names);
        assert_eq!(
            persist.downloaded_file_names.as_list(),
            restored.downloaded_file_names.as_list(),
            "Order should survive for {content:?}"
        );
        assert_eq!(
            persist.extracted_file_names.as_list(),
            restored.extracted_file_names.as_list(),
            "Order should survive for {content:?}"
        );
        assert_eq!(restored.get_eviction_stats().downloaded_evictions, 0);
    }
    Ok(())
}
