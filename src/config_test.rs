#![allow(clippy::float_cmp)]

use std::sync::Mutex;

use super::*;

// Env vars are process-wide; serialize the tests that touch them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "ANNOSTUDIO_BASE_URL",
    "ANNOSTUDIO_AUTOSAVE_MS",
    "ANNOSTUDIO_REQUEST_TIMEOUT_SECS",
    "ANNOSTUDIO_CONNECT_TIMEOUT_SECS",
    "ANNOSTUDIO_VIEWPORT_WIDTH",
    "ANNOSTUDIO_VIEWPORT_HEIGHT",
];

/// # Safety
/// Callers hold `ENV_LOCK`.
unsafe fn clear_env() {
    for var in VARS {
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe { clear_env() };

    let cfg = StudioConfig::from_env().unwrap();
    assert_eq!(cfg, StudioConfig::default());
    assert_eq!(cfg.base_url, "http://localhost:8000");
    assert_eq!(cfg.autosave_window(), Duration::from_millis(1000));
    assert_eq!((cfg.viewport_width, cfg.viewport_height), (800.0, 600.0));
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_env();
        std::env::set_var("ANNOSTUDIO_BASE_URL", "https://labels.example.test/api/");
        std::env::set_var("ANNOSTUDIO_AUTOSAVE_MS", "250");
        std::env::set_var("ANNOSTUDIO_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("ANNOSTUDIO_CONNECT_TIMEOUT_SECS", "2");
        std::env::set_var("ANNOSTUDIO_VIEWPORT_WIDTH", "1920");
        std::env::set_var("ANNOSTUDIO_VIEWPORT_HEIGHT", "1080");
    }

    let cfg = StudioConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://labels.example.test/api");
    assert_eq!(cfg.autosave_ms, 250);
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!((cfg.viewport_width, cfg.viewport_height), (1920.0, 1080.0));

    unsafe { clear_env() };
}

#[test]
fn from_env_bad_numbers_fall_back() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_env();
        std::env::set_var("ANNOSTUDIO_AUTOSAVE_MS", "soon");
        std::env::set_var("ANNOSTUDIO_VIEWPORT_WIDTH", "wide");
    }

    let cfg = StudioConfig::from_env().unwrap();
    assert_eq!(cfg.autosave_ms, DEFAULT_AUTOSAVE_MS);
    assert_eq!(cfg.viewport_width, 800.0);

    unsafe { clear_env() };
}

#[test]
fn from_env_blank_base_url_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_env();
        std::env::set_var("ANNOSTUDIO_BASE_URL", " / ");
    }

    assert_eq!(StudioConfig::from_env().unwrap_err(), ConfigError::EmptyBaseUrl);

    unsafe { clear_env() };
}

#[test]
fn overrides_replace_env_values() {
    let cfg = StudioConfig::default()
        .with_overrides(Some("http://10.0.0.2:9000/"), Some(50))
        .unwrap();
    assert_eq!(cfg.base_url, "http://10.0.0.2:9000");
    assert_eq!(cfg.autosave_ms, 50);

    let untouched = StudioConfig::default().with_overrides(None, None).unwrap();
    assert_eq!(untouched, StudioConfig::default());

    assert!(StudioConfig::default().with_overrides(Some(""), None).is_err());
}
