//! Determinism, order-independence, dedup, and diff properties.

mod common;

use common::{fixed, native_project, write};
use natprint_config::Options;
use natprint_diagnostics::DiagnosticSink;
use natprint_fingerprint::{
    diff, normalize, Collaborator, DiffEntry, DiffOp, Fingerprint, FingerprintBuilder, HashSource,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;

fn raw_sources() -> Vec<HashSource> {
    vec![
        HashSource::dir("android", "bareNativeDir"),
        HashSource::dir("ios", "bareNativeDir"),
        HashSource::file(".gitignore", "bareGitIgnore"),
        HashSource::file("ios/Podfile", "podfile"),
        HashSource::dir("android", "rncoreAutolinking"),
        HashSource::contents("packageJson:scripts", "{}", "packageJson:scripts"),
        HashSource::contents("expoConfig", "{\"name\":\"app\"}", "expoConfig"),
        HashSource::dir("android/app", "gradle"),
    ]
}

fn build(root: &Path, collaborators: Vec<Arc<dyn Collaborator>>) -> Fingerprint {
    FingerprintBuilder::new(Options::default())
        .with_collaborators(collaborators)
        .build(root, &DiagnosticSink::new())
        .unwrap()
}

fn one_per_collaborator(sources: &[HashSource]) -> Vec<Arc<dyn Collaborator>> {
    const NAMES: [&str; 8] = ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7"];
    sources
        .iter()
        .zip(NAMES)
        .map(|(s, name)| fixed(name, vec![s.clone()]))
        .collect()
}

#[test]
fn repeated_builds_are_identical() {
    let project = native_project();
    let first = build(project.path(), one_per_collaborator(&raw_sources()));
    for _ in 0..3 {
        let again = build(project.path(), one_per_collaborator(&raw_sources()));
        assert_eq!(again.hash(), first.hash());
        assert_eq!(again, first);
    }
}

#[test]
fn collaborator_registration_order_is_irrelevant() {
    let project = native_project();
    let expected = build(project.path(), one_per_collaborator(&raw_sources())).hash();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..16 {
        let mut collaborators = one_per_collaborator(&raw_sources());
        collaborators.shuffle(&mut rng);
        assert_eq!(build(project.path(), collaborators).hash(), expected);
    }
}

#[test]
fn normalizer_is_permutation_invariant() {
    let root = Path::new("/project");
    let expected = normalize(root, raw_sources()).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..32 {
        let mut shuffled = raw_sources();
        shuffled.shuffle(&mut rng);
        assert_eq!(normalize(root, shuffled).unwrap(), expected);
    }
}

#[test]
fn separator_and_line_ending_variants_hash_equal() {
    let unix = tempfile::tempdir().unwrap();
    write(unix.path(), "android/app/build.gradle", b"a\nb\n");
    write(unix.path(), "ios/Podfile", b"pod 'A'\n");
    let windows = tempfile::tempdir().unwrap();
    write(windows.path(), "android/app/build.gradle", b"a\r\nb\r\n");
    write(windows.path(), "ios/Podfile", b"pod 'A'\r\n");

    let unix_fp = build(
        unix.path(),
        vec![fixed(
            "native",
            vec![HashSource::dir("android", "r"), HashSource::file("ios/Podfile", "r")],
        )],
    );
    let windows_fp = build(
        windows.path(),
        vec![fixed(
            "native",
            vec![
                HashSource::dir(".\\android\\", "r"),
                HashSource::file(
                    windows.path().join("ios").join("Podfile").to_string_lossy(),
                    "r",
                ),
            ],
        )],
    );
    assert_eq!(unix_fp.hash(), windows_fp.hash());
}

#[test]
fn duplicates_merge_into_union_of_reasons() {
    let project = native_project();
    let fp = build(
        project.path(),
        vec![
            fixed("a", vec![HashSource::dir("android", "bareNativeDir")]),
            fixed("b", vec![HashSource::dir("android", "rncoreAutolinking")]),
        ],
    );
    assert_eq!(fp.len(), 1);
    let reasons: Vec<&str> = fp.sources()[0].reasons.iter().map(String::as_str).collect();
    assert_eq!(reasons, vec!["bareNativeDir", "rncoreAutolinking"]);

    let single = build(
        project.path(),
        vec![fixed("a", vec![HashSource::dir("android", "bareNativeDir")])],
    );
    assert_eq!(single.hash(), fp.hash());
}

fn random_fingerprint(rng: &mut StdRng) -> Fingerprint {
    use rand::Rng;
    let mut sources = Vec::new();
    for i in 0..12 {
        if rng.gen_bool(0.6) {
            let content = format!("v{}", rng.gen_range(0..3));
            let mut source = match i % 3 {
                0 => HashSource::file(format!("f{i}"), "r"),
                1 => HashSource::dir(format!("d{i}"), "r"),
                _ => HashSource::contents(format!("c{i}"), content.clone(), "r"),
            };
            source.hash = Some(natprint_common::ContentHash::from_bytes(content.as_bytes()));
            sources.push(source);
        }
    }
    sources.sort_by(|a, b| a.canonical_cmp(b));
    Fingerprint::from_sources(sources).unwrap()
}

fn swapped(entry: &DiffEntry) -> DiffEntry {
    match entry.clone() {
        DiffEntry::Added { added_source } => DiffEntry::Removed {
            removed_source: added_source,
        },
        DiffEntry::Removed { removed_source } => DiffEntry::Added {
            added_source: removed_source,
        },
        DiffEntry::Changed {
            before_source,
            after_source,
        } => DiffEntry::Changed {
            before_source: after_source,
            after_source: before_source,
        },
    }
}

#[test]
fn diff_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..64 {
        let a = random_fingerprint(&mut rng);
        let b = random_fingerprint(&mut rng);
        let forward = diff(&a, &b);
        let backward: Vec<DiffEntry> = diff(&b, &a).iter().map(swapped).collect();
        assert_eq!(forward, backward);
    }
}

#[test]
fn diff_is_complete() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..64 {
        let a = random_fingerprint(&mut rng);
        let b = random_fingerprint(&mut rng);
        let entries = diff(&a, &b);
        for entry in &entries {
            let key = entry.key();
            match entry.op() {
                DiffOp::Added => assert!(a.source(&key).is_none() && b.source(&key).is_some()),
                DiffOp::Removed => assert!(a.source(&key).is_some() && b.source(&key).is_none()),
                DiffOp::Changed => {
                    assert_ne!(a.source(&key).unwrap().hash, b.source(&key).unwrap().hash)
                }
            }
        }
        let reported = entries.len();
        let expected = a
            .sources()
            .iter()
            .filter(|s| b.source(&s.key()).map_or(true, |o| o.hash != s.hash))
            .count()
            + b
                .sources()
                .iter()
                .filter(|s| a.source(&s.key()).is_none())
                .count();
        assert_eq!(reported, expected);
    }
}

#[test]
fn diff_against_self_is_empty() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..16 {
        let a = random_fingerprint(&mut rng);
        assert!(diff(&a, &a).is_empty());
    }
}

#[test]
fn one_byte_change_yields_one_changed_entry() {
    let project = native_project();
    let collaborators = || {
        vec![fixed(
            "native",
            vec![
                HashSource::dir("android", "r"),
                HashSource::dir("ios", "r"),
                HashSource::file(".gitignore", "r"),
            ],
        )]
    };
    let before = build(project.path(), collaborators());

    write(project.path(), "ios/Podfile", b"platform :ios, '13.5'\n");
    let after = build(project.path(), collaborators());
    assert_ne!(before.hash(), after.hash());
    let entries = diff(&before, &after);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].op(), DiffOp::Changed);
    assert_eq!(entries[0].key().to_string(), "dir:ios");

    write(project.path(), ".gitignore", b"node_modulez\n");
    let entries = diff(&after, &build(project.path(), collaborators()));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key().to_string(), "file:.gitignore");
}

#[test]
fn persisted_fingerprint_diffs_like_in_memory() {
    let project = native_project();
    let fp = build(project.path(), one_per_collaborator(&raw_sources()));
    let restored = Fingerprint::from_json(&fp.to_json().unwrap()).unwrap();
    assert_eq!(restored.hash(), fp.hash());
    assert!(diff(&restored, &fp).is_empty());
}
