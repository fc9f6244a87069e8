use super::*;

fn settings_from(raw: RawSettings) -> Settings {
    Settings::from_raw(raw).expect("settings")
}

#[test]
fn defaults_are_sane() {
    let settings = settings_from(RawSettings::default());

    assert_eq!(settings.server.addr.port(), 3000);
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.database.url.is_none());
    assert_eq!(
        settings.upstream.base_url.as_str(),
        "https://api.spoonacular.com/"
    );
    assert!(settings.upstream.api_key.is_none());
    assert_eq!(settings.upstream.timeout, Duration::from_secs(10));
    assert_eq!(settings.upstream.search_page_size.get(), 5);
    assert_eq!(settings.cache.ttl.whole_milliseconds(), 604_800_000);
    assert!(settings.cache.sweep_interval.is_none());
}

#[test]
fn serve_overrides_take_precedence() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        server_port: Some(8080),
        database_url: Some("postgres://db/larder".to_string()),
        cache_ttl_ms: Some(1_000),
        cache_sweep_interval_seconds: Some(3_600),
        upstream_search_page_size: Some(10),
        ..ServeOverrides::default()
    };
    raw.apply_serve_overrides(&overrides);

    let settings = settings_from(raw);
    assert_eq!(settings.server.addr.port(), 8080);
    assert_eq!(settings.database.url.as_deref(), Some("postgres://db/larder"));
    assert_eq!(settings.cache.ttl.whole_milliseconds(), 1_000);
    assert_eq!(
        settings.cache.sweep_interval,
        Some(Duration::from_secs(3_600))
    );
    assert_eq!(settings.upstream.search_page_size.get(), 10);
}

#[test]
fn sweep_interval_zero_disables_the_sweep() {
    let mut raw = RawSettings::default();
    raw.cache.sweep_interval_seconds = Some(0);

    let settings = settings_from(raw);
    assert!(settings.cache.sweep_interval.is_none());
}

#[test]
fn base_url_gains_a_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.upstream.base_url = Some("https://proxy.example.com/spoonacular".to_string());

    let settings = settings_from(raw);
    assert_eq!(
        settings.upstream.base_url.as_str(),
        "https://proxy.example.com/spoonacular/"
    );
}

#[test]
fn blank_api_key_is_treated_as_absent() {
    let mut raw = RawSettings::default();
    raw.upstream.api_key = Some("   ".to_string());

    let settings = settings_from(raw);
    assert!(settings.upstream.api_key.is_none());
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid { key: "server.port", .. })
    ));
}

#[test]
fn zero_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_ms = Some(0);

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid { key: "cache.ttl_ms", .. })
    ));
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("shouting".to_string());

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid { key: "logging.level", .. })
    ));
}

#[test]
fn sweep_overrides_apply_database_and_ttl() {
    let mut raw = RawSettings::default();
    let args = SweepArgs {
        database: DatabaseOverride {
            database_url: Some("postgres://db/sweep".to_string()),
        },
        cache_ttl_ms: Some(60_000),
    };
    raw.apply_sweep_overrides(&args);

    let settings = settings_from(raw);
    assert_eq!(settings.database.url.as_deref(), Some("postgres://db/sweep"));
    assert_eq!(settings.cache.ttl.whole_milliseconds(), 60_000);
}
