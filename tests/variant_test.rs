//! Software variant detection tests

use fedi_exporter::collectors::QueueSchema;
use fedi_exporter::fedi::types::MetaInfo;
use fedi_exporter::fedi::{detect, SoftwareVariant};
use serde_json::json;

fn meta(name: Option<&str>, repo: Option<&str>) -> MetaInfo {
    MetaInfo {
        name: name.map(str::to_string),
        repository_url: repo.map(str::to_string),
        ..Default::default()
    }
}

#[test]
fn test_detects_each_fork_from_repository_url() {
    // Given: Repository URLs of every known fork
    let cases = [
        (
            "https://activitypub.software/TransFem-org/Sharkey",
            SoftwareVariant::Sharkey,
        ),
        ("https://codeberg.org/calckey/calckey", SoftwareVariant::Calckey),
        (
            "https://git.joinfirefish.org/firefish/firefish",
            SoftwareVariant::Firefish,
        ),
        ("https://akkoma.dev/FoundKeyGang/FoundKey", SoftwareVariant::Foundkey),
    ];

    for (repo, expected) in cases {
        // When: Detecting with only the repository URL set
        // Then: The matching fork is returned
        assert_eq!(detect(&meta(None, Some(repo))), expected, "repo {}", repo);
    }
}

#[test]
fn test_detects_each_fork_from_name_case_insensitively() {
    let cases = [
        ("SHARKEY social", SoftwareVariant::Sharkey),
        ("My CalcKey", SoftwareVariant::Calckey),
        ("FireFish Town", SoftwareVariant::Firefish),
        ("foundkey", SoftwareVariant::Foundkey),
    ];

    for (name, expected) in cases {
        assert_eq!(detect(&meta(Some(name), None)), expected, "name {}", name);
    }
}

#[test]
fn test_more_specific_fork_wins() {
    // Given: A Sharkey repository on an instance named after Calckey
    let m = meta(Some("old calckey box"), Some("https://example.dev/sharkey"));

    // Then: Sharkey is checked first
    assert_eq!(detect(&m), SoftwareVariant::Sharkey);
}

#[test]
fn test_unmatched_meta_falls_back_to_misskey() {
    assert_eq!(detect(&meta(None, None)), SoftwareVariant::Misskey);
    assert_eq!(
        detect(&meta(
            Some("misskey.io"),
            Some("https://github.com/misskey-dev/misskey")
        )),
        SoftwareVariant::Misskey
    );
    assert_eq!(detect(&meta(Some(""), Some(""))), SoftwareVariant::Misskey);
}

#[test]
fn test_detect_from_decoded_meta_with_null_repository() {
    // Given: A meta document with a null repository URL and a non-string name
    let meta: MetaInfo = serde_json::from_value(json!({
        "name": 42,
        "repositoryUrl": null,
        "version": "2024.5.0"
    }))
    .unwrap();

    // Then: Both count as empty and detection falls back
    assert_eq!(meta.name, None);
    assert_eq!(detect(&meta), SoftwareVariant::Misskey);
}

#[test]
fn test_variant_label_values() {
    let labels: Vec<_> = SoftwareVariant::ALL.iter().map(|v| v.as_str()).collect();
    assert_eq!(
        labels,
        ["misskey", "calckey", "firefish", "sharkey", "foundkey", "unknown"]
    );
    assert_eq!(SoftwareVariant::Firefish.to_string(), "firefish");
}

#[test]
fn test_only_firefish_uses_fixed_queue_schema() {
    for variant in SoftwareVariant::ALL {
        let expected = if variant == SoftwareVariant::Firefish {
            QueueSchema::FixedQueues
        } else {
            QueueSchema::OpenMap
        };
        assert_eq!(QueueSchema::for_variant(variant), expected, "{}", variant);
    }
}
