use std::collections::{BTreeSet, HashSet};

/// Translation table sanity test.
///
/// Every non-default language may translate only part of the site; missing
/// keys fall back to English at runtime. What it must not do is define keys
/// English lacks, or define a key twice (JSON parsers keep the last one
/// silently).
///
/// If you add a language:
/// 1. Create `ui/i18n/<code>/site.json`
/// 2. Register it in the list below
/// 3. Run `cargo test -p cdc-site-ui` to confirm.
#[test]
fn translations_only_use_default_keys() {
    const EN: &str = include_str!("../i18n/en/site.json");
    const FR: &str = include_str!("../i18n/fr/site.json");
    const ZH: &str = include_str!("../i18n/zh/site.json");

    let fallback_keys = extract_keys(EN);
    assert!(!fallback_keys.is_empty(), "Default (en) contains no keys.");
    assert_no_dup_keys(EN, "en");

    let languages: &[(&str, &str)] = &[
        ("fr", FR),
        ("zh", ZH),
        // Add new languages here.
    ];

    let mut failures = Vec::new();
    for (language, src) in languages {
        assert_no_dup_keys(src, language);

        let keys = extract_keys(src);
        let unknown: BTreeSet<_> = keys.difference(&fallback_keys).cloned().collect();
        if !unknown.is_empty() {
            failures.push(format!(
                "Language {language} defines {} key(s) missing in en:\n  {}",
                unknown.len(),
                unknown.into_iter().collect::<Vec<_>>().join("\n  ")
            ));
        }

        let untranslated = fallback_keys.difference(&keys).count();
        if untranslated > 0 {
            eprintln!("[i18n] {language}: {untranslated} key(s) fall back to en");
        }
    }

    if !failures.is_empty() {
        panic!(
            "Translation table check failed:\n\n{}\n\nHint: add the English string first.",
            failures.join("\n\n")
        );
    }
}

#[test]
fn tables_are_flat_string_maps() {
    for (language, src) in [
        ("en", include_str!("../i18n/en/site.json")),
        ("fr", include_str!("../i18n/fr/site.json")),
        ("zh", include_str!("../i18n/zh/site.json")),
    ] {
        let parsed: Result<std::collections::BTreeMap<String, String>, _> =
            serde_json::from_str(src);
        assert!(parsed.is_ok(), "{language}/site.json: {parsed:?}");
    }
}

/// Keys of a one-entry-per-line JSON object (`  "key": "value",`).
fn extract_keys(src: &str) -> HashSet<String> {
    src.lines().filter_map(line_key).map(str::to_string).collect()
}

fn line_key(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix('"')?;
    let end = rest.find("\":")?;
    let key = &rest[..end];
    (!key.is_empty() && !key.contains(' ')).then_some(key)
}

/// Assert no duplicate key definitions in a single table.
fn assert_no_dup_keys(src: &str, language: &str) {
    let mut seen = HashSet::new();
    let mut dups = BTreeSet::new();

    for raw in src.lines() {
        if let Some(key) = line_key(raw) {
            if !seen.insert(key) {
                dups.insert(format!("{key}  (line: \"{}\")", raw.trim()));
            }
        }
    }

    if !dups.is_empty() {
        panic!(
            "Duplicate key definitions in {language}:\n  {}",
            dups.into_iter().collect::<Vec<_>>().join("\n  ")
        );
    }
}
