use anyhow::{Context, Result};

use tidewater_engine::assets::{CubeFaces, ImageData};
use tidewater_engine::camera::CameraController;
use tidewater_engine::core::{App, AppControl, FrameCtx, SetupCtx, WindowCtx};
use tidewater_engine::input::{InputEvent, Key, KeyState};
use tidewater_engine::render::{FrameExecutor, FrameInputs, SceneConfig, SceneRenderer};
use tidewater_engine::settings::{
    JsonFileStore, MemoryStore, SettingKey, Settings, SettingsStore,
};

use crate::controls::{ControlAction, ParamControls};
use crate::options::ViewerOptions;

pub const NOISE_FILE: &str = "noise.png";

/// The water scene: camera and parameters owned here, GPU objects in
/// `SceneRenderer` once setup has run.
pub struct WaterApp {
    options: ViewerOptions,
    scene: SceneConfig,
    camera: CameraController,
    settings: Settings,
    store: Box<dyn SettingsStore>,
    controls: ParamControls,
    /// Set when the selected parameter or its value changed since the last title update.
    title_dirty: bool,
    renderer: Option<SceneRenderer>,
}

impl WaterApp {
    pub fn new(options: ViewerOptions) -> Self {
        let store: Box<dyn SettingsStore> = match &options.settings_path {
            Some(path) => Box::new(JsonFileStore::open(path)),
            None => Box::new(MemoryStore::default()),
        };
        let settings = Settings::load(store.as_ref());
        log::info!("wave settings: {:?}", settings.wave);

        let scene = options.scene.clone().sanitized();

        Self {
            camera: scene.camera(),
            scene,
            settings,
            store,
            controls: ParamControls::new(),
            title_dirty: false,
            renderer: None,
            options,
        }
    }

    /// Applies a parameter key. Persisting happens here, on the input path,
    /// so the frame step never touches the settings file.
    fn handle_param_key(&mut self, key: Key) {
        match self
            .controls
            .handle_key(key, &mut self.settings, self.store.as_mut())
        {
            Some(ControlAction::Changed(k, v)) => {
                log::info!("{} = {v}", k.name());
                self.title_dirty = true;
            }
            Some(ControlAction::Selected(_)) => self.title_dirty = true,
            None => {}
        }
    }

    fn update_title(&mut self, window: &WindowCtx<'_>) {
        self.title_dirty = false;
        let key = self.controls.selected();
        window.set_title(&format!(
            "tidewater | [{}] {} = {:.2}",
            key_index(key),
            key.name(),
            self.settings.get(key)
        ));
    }
}

/// 1-based position, matching the digit that selects it.
fn key_index(key: SettingKey) -> usize {
    SettingKey::ALL
        .iter()
        .position(|k| *k == key)
        .map_or(0, |i| i + 1)
}

impl App for WaterApp {
    fn on_setup(&mut self, ctx: &mut SetupCtx<'_, '_>) -> Result<()> {
        let dir = &self.options.asset_dir;
        let faces = CubeFaces::load_dir(dir)
            .with_context(|| format!("failed to load skybox faces from {}", dir.display()))?;
        let noise_path = dir.join(NOISE_FILE);
        let noise = ImageData::load(&noise_path)
            .with_context(|| format!("failed to load {}", noise_path.display()))?;

        let renderer = SceneRenderer::new(&ctx.render_ctx(), self.scene.clone(), &faces, &noise)
            .context("failed to create scene renderer")?;
        self.renderer = Some(renderer);

        self.update_title(&ctx.window);
        Ok(())
    }

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        match event {
            InputEvent::Key {
                key: Key::Escape,
                state: KeyState::Pressed,
                ..
            } => return AppControl::Exit,
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                ..
            } => self.handle_param_key(*key),
            _ => {}
        }

        self.camera.handle_event(event);
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        if self.title_dirty {
            self.update_title(&ctx.window);
        }

        let renderer = self
            .renderer
            .as_ref()
            .context("frame requested before setup")?;

        let plan = renderer.plan(&FrameInputs {
            forward: self.camera.forward(),
            elapsed: ctx.time.elapsed,
            aspect: ctx.aspect_ratio(),
            settings: &self.settings,
        });

        ctx.render(|rctx, target| renderer.executor(rctx, target).execute(&plan))?;
        Ok(AppControl::Continue)
    }

    fn on_teardown(&mut self) {
        self.renderer = None;
        log::info!("scene released");
    }
}
