//! End-to-end scenarios exercising `Pool` the way an embedding application
//! would: point it at a directory, load, query.

use std::time::{Duration, Instant};

use appstream::component::UrlRole;
use appstream::context::FormatStyle;
use appstream::pool::{Pool, PoolConfig};

fn collection_xml(components: &str) -> String {
    format!(r#"<?xml version="1.0"?><components version="0.14">{components}</components>"#)
}

fn pool_over(dir: &std::path::Path) -> Pool {
    let config = PoolConfig::new()
        .with_load_std_locations(false)
        .with_extra_location(dir, FormatStyle::Collection)
        .with_cache_location(tempfile::tempdir().unwrap().keep());
    Pool::new(config)
}

#[test]
fn simple_query_by_id() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("inkscape.xml"),
        collection_xml(
            r#"<component>
                <id>org.inkscape.Inkscape</id>
                <name>Inkscape</name>
                <summary>Vector graphics editor</summary>
                <url type="homepage">https://inkscape.org/</url>
            </component>"#,
        ),
    )
    .unwrap();

    let pool = pool_over(dir.path());
    pool.load().unwrap();

    let found = pool.by_id("org.inkscape.Inkscape");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name.get("C"), Some("Inkscape"));
    assert_eq!(
        found[0].urls.get(UrlRole::Homepage).map(url::Url::as_str),
        Some("https://inkscape.org/")
    );
}

#[test]
fn free_text_search_with_stemming() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("calc.xml"),
        collection_xml(
            r#"<component>
                <id>org.example.Calculator</id>
                <name>Calculator</name>
                <summary>Does arithmetic</summary>
            </component>"#,
        ),
    )
    .unwrap();

    let pool = pool_over(dir.path());
    pool.load().unwrap();

    let mut options = appstream::search::SearchOptions::default();
    options.stemming = true;
    let results = pool.search("calculating", &options);
    assert!(results.iter().any(|r| r.id.as_str() == "org.example.Calculator"));

    let browse = pool.search("s", &options);
    assert_eq!(browse.len(), pool.len());
}

#[test]
fn merge_replace_overwrites_the_target() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a-base.xml"),
        collection_xml(r#"<component><id>kiki.desktop</id><name>Kiki</name></component>"#),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b-merge.xml"),
        collection_xml(r#"<component merge="replace"><id>kiki.desktop</id><name>Kiki (merged)</name></component>"#),
    )
    .unwrap();

    let pool = pool_over(dir.path());
    pool.load().unwrap();

    let found = pool.by_id("kiki.desktop");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name.get("C"), Some("Kiki (merged)"));
}

#[test]
fn merge_remove_component_deletes_the_target() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a-base.xml"),
        collection_xml(r#"<component><id>org.example.DeleteMe</id><name>Gone Soon</name></component>"#),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b-merge.xml"),
        collection_xml(r#"<component merge="remove-component"><id>org.example.DeleteMe</id></component>"#),
    )
    .unwrap();

    let pool = pool_over(dir.path());
    pool.load().unwrap();

    assert!(pool.by_id("org.example.DeleteMe").is_empty());
}

#[test]
fn file_monitor_observes_add_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let mut flags = appstream::pool::PoolFlags::default();
    flags.monitor = true;
    let config = PoolConfig::new()
        .with_load_std_locations(false)
        .with_extra_location(dir.path(), FormatStyle::Collection)
        .with_cache_location(tempfile::tempdir().unwrap().keep())
        .with_pool_flags(flags);

    let pool = std::sync::Arc::new(Pool::new(config));
    pool.load().unwrap();
    assert!(pool.by_id("org.fwupd.lvfs").is_empty());

    pool.start_monitoring().unwrap();

    let target = dir.path().join("lvfs.xml");
    std::fs::write(
        &target,
        collection_xml(r#"<component><id>org.fwupd.lvfs</id><name>LVFS</name></component>"#),
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(14);
    while Instant::now() < deadline && pool.by_id("org.fwupd.lvfs").is_empty() {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert_eq!(pool.by_id("org.fwupd.lvfs").len(), 1);

    std::fs::remove_file(&target).unwrap();

    let deadline = Instant::now() + Duration::from_secs(14);
    while Instant::now() < deadline && !pool.by_id("org.fwupd.lvfs").is_empty() {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(pool.by_id("org.fwupd.lvfs").is_empty());

    pool.stop_monitoring();
}

#[test]
fn cache_round_trip_of_twenty_components() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap().keep();

    let mut body = String::new();
    for i in 0..20 {
        body.push_str(&format!(
            r#"<component>
                <id>org.example.App{i}</id>
                <name>App {i}</name>
                <categories><category>Utility</category></categories>
                <provides><binary>app-{i}</binary></provides>
            </component>"#
        ));
    }
    std::fs::write(dir.path().join("twenty.xml"), collection_xml(&body)).unwrap();

    let config = || {
        PoolConfig::new()
            .with_load_std_locations(false)
            .with_extra_location(dir.path(), FormatStyle::Collection)
            .with_cache_location(cache_dir.clone())
    };

    let first_pool = Pool::new(config());
    first_pool.load().unwrap();
    let first_generation = first_pool.all();
    assert_eq!(first_generation.len(), 20);
    drop(first_pool);

    let second_pool = Pool::new(config());
    second_pool.load().unwrap();
    let second_generation = second_pool.all();

    assert_eq!(first_generation.len(), second_generation.len());
    for original in &first_generation {
        let restored = second_generation
            .iter()
            .find(|c| c.id == original.id)
            .expect("component survives the cache round-trip");
        assert_eq!(restored.categories, original.categories);
        assert_eq!(restored.provides, original.provides);
    }
}
