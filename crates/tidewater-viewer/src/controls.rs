//! Keyboard surface for the wave parameters.
//!
//! `1`–`8` select a parameter, `Up`/`Down` adjust it by its step and `R`
//! restores its default. Every change is persisted immediately.

use tidewater_engine::input::Key;
use tidewater_engine::settings::{SettingKey, Settings, SettingsStore};

const MAX_OCTAVES: f32 = 32.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlAction {
    Selected(SettingKey),
    Changed(SettingKey, f32),
}

#[derive(Debug)]
pub struct ParamControls {
    selected: SettingKey,
}

impl ParamControls {
    pub fn new() -> Self {
        Self {
            selected: SettingKey::Amplitude,
        }
    }

    pub fn selected(&self) -> SettingKey {
        self.selected
    }

    /// Increment applied by one `Up`/`Down` press.
    pub fn step(key: SettingKey) -> f32 {
        match key {
            SettingKey::Amplitude => 0.05,
            SettingKey::Frequency => 0.1,
            SettingKey::AmplitudeMultiplier | SettingKey::FrequencyMultiplier => 0.05,
            SettingKey::BasePhase => 0.1,
            SettingKey::BaseSpeed => 0.1,
            SettingKey::MaxWaves => 1.0,
            SettingKey::SunPosition => 0.05,
        }
    }

    pub fn handle_key(
        &mut self,
        key: Key,
        settings: &mut Settings,
        store: &mut dyn SettingsStore,
    ) -> Option<ControlAction> {
        if let Some(d) = key.digit() {
            let selected = SettingKey::ALL.get(usize::from(d).checked_sub(1)?).copied()?;
            self.selected = selected;
            return Some(ControlAction::Selected(selected));
        }

        let key_id = self.selected;
        let current = settings.get(key_id);
        let value = match key {
            Key::ArrowUp => current + Self::step(key_id),
            Key::ArrowDown => current - Self::step(key_id),
            Key::R => key_id.default_value(),
            _ => return None,
        };

        let value = match key_id {
            SettingKey::MaxWaves => value.round().clamp(0.0, MAX_OCTAVES),
            _ => value,
        };

        settings.set(key_id, value, store);
        Some(ControlAction::Changed(key_id, settings.get(key_id)))
    }
}

impl Default for ParamControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_engine::settings::MemoryStore;

    #[test]
    fn digits_select_parameters_in_order() {
        let mut controls = ParamControls::new();
        let mut settings = Settings::default();
        let mut store = MemoryStore::default();

        assert_eq!(
            controls.handle_key(Key::Digit7, &mut settings, &mut store),
            Some(ControlAction::Selected(SettingKey::MaxWaves))
        );
        assert_eq!(controls.selected(), SettingKey::MaxWaves);

        assert_eq!(controls.handle_key(Key::Digit9, &mut settings, &mut store), None);
        assert_eq!(controls.handle_key(Key::Digit0, &mut settings, &mut store), None);
        assert_eq!(controls.selected(), SettingKey::MaxWaves);
    }

    #[test]
    fn arrows_adjust_and_persist() {
        let mut controls = ParamControls::new();
        let mut settings = Settings::default();
        let mut store = MemoryStore::default();

        controls.handle_key(Key::Digit2, &mut settings, &mut store);
        controls.handle_key(Key::ArrowUp, &mut settings, &mut store);
        controls.handle_key(Key::ArrowUp, &mut settings, &mut store);
        controls.handle_key(Key::ArrowDown, &mut settings, &mut store);

        assert!((settings.wave.frequency - 1.1).abs() < 1e-5);
        let reloaded = Settings::load(&store);
        assert_eq!(reloaded.wave.frequency, settings.wave.frequency);
    }

    #[test]
    fn max_waves_stays_a_whole_non_negative_count() {
        let mut controls = ParamControls::new();
        let mut settings = Settings::default();
        let mut store = MemoryStore::default();

        controls.handle_key(Key::Digit7, &mut settings, &mut store);
        for _ in 0..3 {
            controls.handle_key(Key::ArrowDown, &mut settings, &mut store);
        }
        assert_eq!(settings.wave.max_waves, 0.0);
    }

    #[test]
    fn reset_restores_default() {
        let mut controls = ParamControls::new();
        let mut settings = Settings::default();
        let mut store = MemoryStore::default();

        controls.handle_key(Key::Digit5, &mut settings, &mut store);
        controls.handle_key(Key::ArrowUp, &mut settings, &mut store);
        assert!(settings.wave.base_phase > 0.0);

        assert_eq!(
            controls.handle_key(Key::R, &mut settings, &mut store),
            Some(ControlAction::Changed(SettingKey::BasePhase, 0.0))
        );
        assert_eq!(store.get("basePhase").as_deref(), Some("0"));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut controls = ParamControls::new();
        let mut settings = Settings::default();
        let mut store = MemoryStore::default();
        assert_eq!(controls.handle_key(Key::Space, &mut settings, &mut store), None);
        assert_eq!(settings, Settings::default());
    }
}
