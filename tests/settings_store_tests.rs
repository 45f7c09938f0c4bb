//! Integration tests for SettingsStore
//!
//! These tests verify:
//! - Load/save round-trips and fallback to defaults
//! - Setter validation, clamping and no-op detection
//! - Reset to defaults
//! - Language switching through the settings store

use camino::Utf8PathBuf;
use fps_settings::engine::{EngineCall, MASTER_VOLUME_PARAM, SFX_VOLUME_PARAM};
use fps_settings::models::TranslationEntry;
use fps_settings::{
    ConfigManager, DisplayBackend, HeadlessDisplay, HeadlessMixer, LanguageFile, Metrics,
    Settings, SettingsChange, SettingsError, SettingsStore, TranslationStore, WindowMode,
};
use proptest::prelude::*;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

struct TestEnv {
    _temp_dir: TempDir,
    manager: ConfigManager,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&path).unwrap();
        Self {
            _temp_dir: temp_dir,
            manager,
        }
    }

    fn write_language(&self, code: &str, pairs: &[(&str, &str)]) {
        let file = LanguageFile {
            entries: pairs
                .iter()
                .map(|(key, value)| TranslationEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        };
        self.manager.save_language_file(code, &file).unwrap();
    }

    fn store(&self) -> (SettingsStore, Arc<HeadlessDisplay>, Arc<HeadlessMixer>) {
        let translations =
            TranslationStore::initialize(self.manager.clone(), Arc::new(Metrics::new()));
        let display = Arc::new(HeadlessDisplay::new());
        let mixer = Arc::new(HeadlessMixer::new());
        let store = SettingsStore::initialize(
            self.manager.clone(),
            translations,
            display.clone(),
            mixer.clone(),
        );
        (store, display, mixer)
    }
}

#[test]
fn test_first_start_uses_defaults() {
    let env = TestEnv::new();
    let (store, _display, _mixer) = env.store();

    let settings = store.snapshot();
    assert_eq!(settings.master_volume, 0.8);
    assert_eq!(settings.music_volume, 0.7);
    assert_eq!(settings.sfx_volume, 0.75);
    assert_eq!(settings.selected_language_code, "en");
    assert_eq!(settings.resolution_width, 1920);
    assert_eq!(settings.quality_preset_index, 2);
}

#[test]
fn test_corrupted_file_matches_missing_file_defaults() {
    let clean = TestEnv::new();
    let (clean_store, _, _) = clean.store();

    let corrupted = TestEnv::new();
    fs::write(corrupted.manager.settings_path(), "{ this is not json").unwrap();
    let (corrupted_store, _, _) = corrupted.store();

    assert_eq!(clean_store.snapshot(), corrupted_store.snapshot());
}

#[test]
fn test_setter_persists_whole_record() {
    let env = TestEnv::new();
    let (store, _display, _mixer) = env.store();

    store.set_music_volume(0.3).unwrap();
    store.set_window_mode(WindowMode::Windowed).unwrap();

    let on_disk = env.manager.load_settings().unwrap().unwrap();
    assert_eq!(on_disk, store.snapshot());
    assert_eq!(on_disk.music_volume, 0.3);
    assert_eq!(on_disk.window_mode, WindowMode::Windowed);
}

#[test]
fn test_persisted_settings_survive_restart() {
    let env = TestEnv::new();
    {
        let (store, _display, _mixer) = env.store();
        store.set_resolution(2560, 1440, 144).unwrap();
        store.set_sfx_volume(0.1).unwrap();
    }

    let (store, display, mixer) = env.store();

    assert_eq!(store.resolution(), (2560, 1440, 144));
    assert_eq!(store.sfx_volume(), 0.1);
    assert_eq!(display.current_display_mode().width, 2560);
    let expected_db = 20.0 * 0.1f32.log10();
    assert!((mixer.get_float(SFX_VOLUME_PARAM).unwrap() - expected_db).abs() < 1e-4);
}

#[test]
fn test_noop_setter_leaves_file_untouched() {
    let env = TestEnv::new();
    let (store, display, mixer) = env.store();
    store.set_master_volume(0.5).unwrap();
    let before = fs::read_to_string(env.manager.settings_path()).unwrap();
    let saves = store.metrics().saves();
    let display_calls = display.call_count();
    let mixer_calls = mixer.call_count();

    let changes = store.set_master_volume(0.5).unwrap();
    store.set_window_mode(store.window_mode()).unwrap();
    store.set_quality_preset(store.quality_preset_index()).unwrap();

    assert!(changes.is_empty());
    assert_eq!(fs::read_to_string(env.manager.settings_path()).unwrap(), before);
    assert_eq!(store.metrics().saves(), saves);
    assert_eq!(display.call_count(), display_calls);
    assert_eq!(mixer.call_count(), mixer_calls);
}

#[test]
fn test_anti_aliasing_rejects_three() {
    let env = TestEnv::new();
    let (store, display, _mixer) = env.store();
    store.set_anti_aliasing(2).unwrap();
    display.clear_calls();

    let result = store.set_anti_aliasing(3);

    assert_eq!(result, Err(SettingsError::InvalidAntiAliasing(3)));
    assert_eq!(store.anti_aliasing_level(), 2);
    assert_eq!(display.anti_aliasing(), 2);
    assert!(display.calls().is_empty());
}

#[test]
fn test_setter_applies_only_its_field() {
    let env = TestEnv::new();
    let (store, display, mixer) = env.store();
    display.clear_calls();
    mixer.clear_calls();

    store.set_vsync(false).unwrap();

    assert_eq!(display.calls(), vec![EngineCall::VSyncCount(0)]);
    assert!(mixer.calls().is_empty());
}

#[test]
fn test_reset_restores_audio_constants() {
    let env = TestEnv::new();
    let (store, _display, _mixer) = env.store();
    store.set_master_volume(0.1).unwrap();
    store.set_music_volume(1.0).unwrap();
    store.set_sfx_volume(0.0).unwrap();
    store.set_quality_preset(5).unwrap();

    let changes = store.reset_to_defaults();

    assert_eq!(changes.last(), Some(&SettingsChange::SettingsReset));
    assert_eq!(store.master_volume(), 0.8);
    assert_eq!(store.music_volume(), 0.7);
    assert_eq!(store.sfx_volume(), 0.75);

    let on_disk = env.manager.load_settings().unwrap().unwrap();
    assert_eq!(on_disk, store.snapshot());
}

#[test]
fn test_save_failure_keeps_memory_authoritative() {
    let env = TestEnv::new();
    let (store, _display, _mixer) = env.store();

    // A directory where the file should be makes every write fail
    fs::remove_file(env.manager.settings_path()).ok();
    fs::create_dir(env.manager.settings_path()).unwrap();

    store.set_master_volume(0.33).unwrap();

    assert_eq!(store.master_volume(), 0.33);
    assert!(!store.save());
    assert!(
        store
            .metrics()
            .save_failures
            .load(std::sync::atomic::Ordering::Relaxed)
            >= 1
    );
}

#[test]
fn test_set_language_switches_translations() {
    let env = TestEnv::new();
    env.write_language("en", &[("hello", "Hello")]);
    env.write_language("tr", &[("hello", "Merhaba")]);
    let (store, _display, _mixer) = env.store();

    let changes = store.set_language("tr").unwrap();

    assert_eq!(changes, vec![SettingsChange::LanguageChanged("tr".to_string())]);
    assert_eq!(store.language_code(), "tr");
    assert_eq!(store.translations().get("hello"), "Merhaba");
    assert_eq!(
        env.manager.load_settings().unwrap().unwrap().selected_language_code,
        "tr"
    );
}

#[test]
fn test_failed_language_switch_rolls_back() {
    let env = TestEnv::new();
    env.write_language("en", &[("hello", "Hello")]);
    let (store, _display, _mixer) = env.store();
    store.save();
    let saves = store.metrics().saves();

    let result = store.set_language("xx");

    assert_eq!(
        result,
        Err(SettingsError::LanguageSwitchFailed {
            requested: "xx".to_string(),
            active: "en".to_string(),
        })
    );
    assert_eq!(store.language_code(), "en");
    assert_eq!(store.translations().get("hello"), "Hello");
    assert_eq!(store.metrics().saves(), saves);
}

#[test]
fn test_unknown_stored_language_follows_translations() {
    let env = TestEnv::new();
    let mut settings = Settings::default();
    settings.selected_language_code = "zz".to_string();
    env.manager.save_settings(&settings).unwrap();

    let (store, _display, _mixer) = env.store();

    assert_eq!(store.language_code(), "en");
}

#[test]
fn test_out_of_range_preset_in_file_is_skipped() {
    let env = TestEnv::new();
    let mut settings = Settings::default();
    settings.quality_preset_index = 40;
    settings.master_volume = 0.2;
    env.manager.save_settings(&settings).unwrap();

    let (store, display, _mixer) = env.store();

    assert!(
        !display
            .calls()
            .iter()
            .any(|call| matches!(call, EngineCall::QualityPreset(_)))
    );
    assert!(store.metrics().apply_failures.load(std::sync::atomic::Ordering::Relaxed) >= 1);
    assert_eq!(store.master_volume(), 0.2);
}

#[test]
fn test_out_of_range_file_values_are_clamped() {
    let env = TestEnv::new();
    let settings = Settings {
        master_volume: 7.5,
        anti_aliasing_level: 3,
        texture_quality: 9,
        ..Settings::default()
    };
    env.manager.save_settings(&settings).unwrap();

    let (store, display, mixer) = env.store();

    assert_eq!(store.master_volume(), 1.0);
    assert_eq!(store.texture_quality(), 3);
    assert_eq!(display.texture_mipmap_limit(), 3);
    assert_eq!(mixer.get_float(MASTER_VOLUME_PARAM), Some(0.0));
    assert!(!display.calls().contains(&EngineCall::AntiAliasing(3)));
}

#[test]
fn test_load_fills_empty_language_from_translations() {
    let env = TestEnv::new();
    fs::write(
        env.manager.language_config_path(),
        "SELECTED_LANGUAGE=tr\nAVAILABLE_LANGUAGES=en,tr\n",
    )
    .unwrap();
    env.write_language("tr", &[("hello", "Merhaba")]);
    let settings = Settings {
        selected_language_code: String::new(),
        ..Settings::default()
    };
    env.manager.save_settings(&settings).unwrap();

    let (store, _display, _mixer) = env.store();

    assert_eq!(store.load().selected_language_code, "tr");
    assert_eq!(store.language_code(), "tr");
}

#[test]
fn test_save_then_load_matches_snapshot() {
    let env = TestEnv::new();
    let (store, _display, _mixer) = env.store();
    store.set_resolution(1600, 900, 120).unwrap();
    store.set_window_mode(WindowMode::MaximizedWindow).unwrap();
    store.set_quality_preset(4).unwrap();
    store.set_music_volume(0.15).unwrap();

    assert!(store.save());

    assert_eq!(store.load(), store.snapshot());
}

#[test]
fn test_concurrent_setters_keep_disk_in_sync() {
    let env = TestEnv::new();
    let (store, _display, _mixer) = env.store();

    for round in 0..100 {
        let (master, music) = if round % 2 == 0 { (0.11, 0.22) } else { (0.33, 0.44) };
        let (a, b) = (store.clone(), store.clone());

        thread::scope(|scope| {
            scope.spawn(|| {
                a.set_master_volume(master).unwrap();
            });
            scope.spawn(|| {
                b.set_music_volume(music).unwrap();
            });
        });

        let on_disk = env.manager.load_settings().unwrap().unwrap();
        assert_eq!(on_disk, store.snapshot(), "disk record stale in round {}", round);
    }
}

fn arb_settings() -> impl Strategy<Value = Settings> {
    (
        any::<bool>(),
        prop::sample::select(vec![0u8, 2, 4, 8]),
        0u8..=3,
        (1u32..8000, 1u32..8000, 1u32..500),
        prop::sample::select(WindowMode::ALL.to_vec()),
        0usize..6,
        (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0),
        "[a-z]{2}",
    )
        .prop_map(
            |(vsync, aa, texture, (w, h, r), mode, preset, (master, music, sfx), code)| Settings {
                vsync_enabled: vsync,
                anti_aliasing_level: aa,
                texture_quality: texture,
                resolution_width: w,
                resolution_height: h,
                refresh_rate: r,
                window_mode: mode,
                quality_preset_index: preset,
                master_volume: master,
                music_volume: music,
                sfx_volume: sfx,
                selected_language_code: code,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_save_then_load_round_trips(settings in arb_settings()) {
        let env = TestEnv::new();
        env.manager.save_settings(&settings).unwrap();

        let loaded = env.manager.load_settings().unwrap().unwrap();
        prop_assert_eq!(loaded, settings);
    }

    #[test]
    fn prop_master_volume_is_clamped(volume in -10.0f32..10.0) {
        let env = TestEnv::new();
        let (store, _display, _mixer) = env.store();

        store.set_master_volume(volume).unwrap();
        prop_assert_eq!(store.master_volume(), volume.clamp(0.0, 1.0));
    }
}
