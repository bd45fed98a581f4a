use super::SettingsStore;

/// Keys of the persisted parameters, in uniform order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SettingKey {
    Amplitude,
    Frequency,
    AmplitudeMultiplier,
    FrequencyMultiplier,
    BasePhase,
    BaseSpeed,
    MaxWaves,
    SunPosition,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        SettingKey::Amplitude,
        SettingKey::Frequency,
        SettingKey::AmplitudeMultiplier,
        SettingKey::FrequencyMultiplier,
        SettingKey::BasePhase,
        SettingKey::BaseSpeed,
        SettingKey::MaxWaves,
        SettingKey::SunPosition,
    ];

    /// Storage key.
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Amplitude => "amplitude",
            SettingKey::Frequency => "frequency",
            SettingKey::AmplitudeMultiplier => "amplitudeMultiplier",
            SettingKey::FrequencyMultiplier => "frequencyMultiplier",
            SettingKey::BasePhase => "basePhase",
            SettingKey::BaseSpeed => "baseSpeed",
            SettingKey::MaxWaves => "maxWaves",
            SettingKey::SunPosition => "sunPosition",
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            SettingKey::BasePhase => 0.0,
            _ => 1.0,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Parses a stored value, falling back to the default.
    pub fn parse(self, raw: Option<&str>) -> f32 {
        raw.and_then(parse_finite).unwrap_or_else(|| self.default_value())
    }
}

fn parse_finite(raw: &str) -> Option<f32> {
    raw.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Parameters of the summed-sine displacement.
///
/// Octave `k` uses `amplitude * amplitude_multiplier^k` and
/// `frequency * frequency_multiplier^k`; `max_waves` octaves are summed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WaveParams {
    pub amplitude: f32,
    pub frequency: f32,
    pub amplitude_multiplier: f32,
    pub frequency_multiplier: f32,
    pub base_phase: f32,
    pub base_speed: f32,
    pub max_waves: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneParams {
    pub sun_position: f32,
}

/// Current parameter values.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Settings {
    pub wave: WaveParams,
    pub scene: SceneParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wave: WaveParams {
                amplitude: 1.0,
                frequency: 1.0,
                amplitude_multiplier: 1.0,
                frequency_multiplier: 1.0,
                base_phase: 0.0,
                base_speed: 1.0,
                max_waves: 1.0,
            },
            scene: SceneParams { sun_position: 1.0 },
        }
    }
}

impl Settings {
    /// Reads every key from `store`.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let mut s = Self::default();
        for key in SettingKey::ALL {
            let raw = store.get(key.name());
            if let Some(r) = raw.as_deref() {
                if parse_finite(r).is_none() {
                    log::warn!("setting {} has non-numeric value {r:?}; using default", key.name());
                }
            }
            *s.slot_mut(key) = key.parse(raw.as_deref());
        }
        s
    }

    pub fn get(&self, key: SettingKey) -> f32 {
        match key {
            SettingKey::Amplitude => self.wave.amplitude,
            SettingKey::Frequency => self.wave.frequency,
            SettingKey::AmplitudeMultiplier => self.wave.amplitude_multiplier,
            SettingKey::FrequencyMultiplier => self.wave.frequency_multiplier,
            SettingKey::BasePhase => self.wave.base_phase,
            SettingKey::BaseSpeed => self.wave.base_speed,
            SettingKey::MaxWaves => self.wave.max_waves,
            SettingKey::SunPosition => self.scene.sun_position,
        }
    }

    /// Updates one value and persists it.
    ///
    /// Non-finite values are replaced by the key's default.
    pub fn set(&mut self, key: SettingKey, value: f32, store: &mut dyn SettingsStore) {
        let value = if value.is_finite() { value } else { key.default_value() };
        *self.slot_mut(key) = value;
        store.set(key.name(), value.to_string());
        log::debug!("setting {} = {value}", key.name());
    }

    /// Applies a raw string from an input surface.
    pub fn set_raw(&mut self, key: SettingKey, raw: &str, store: &mut dyn SettingsStore) {
        self.set(key, key.parse(Some(raw)), store);
    }

    fn slot_mut(&mut self, key: SettingKey) -> &mut f32 {
        match key {
            SettingKey::Amplitude => &mut self.wave.amplitude,
            SettingKey::Frequency => &mut self.wave.frequency,
            SettingKey::AmplitudeMultiplier => &mut self.wave.amplitude_multiplier,
            SettingKey::FrequencyMultiplier => &mut self.wave.frequency_multiplier,
            SettingKey::BasePhase => &mut self.wave.base_phase,
            SettingKey::BaseSpeed => &mut self.wave.base_speed,
            SettingKey::MaxWaves => &mut self.wave.max_waves,
            SettingKey::SunPosition => &mut self.scene.sun_position,
        }
    }
}
