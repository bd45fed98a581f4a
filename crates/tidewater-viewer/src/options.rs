use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use tidewater_engine::render::{MeshKind, SceneConfig, SkyboxMode};

/// Command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    /// Holds `noise.png` and `skybox1.jpg` … `skybox6.jpg`.
    pub asset_dir: PathBuf,
    /// JSON settings file; `None` keeps settings in memory only.
    pub settings_path: Option<PathBuf>,
    pub scene: SceneConfig,
    /// `RUST_LOG`-style filter overriding the environment.
    pub log_filter: Option<String>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            settings_path: Some(PathBuf::from("tidewater-settings.json")),
            scene: SceneConfig::default(),
            log_filter: None,
        }
    }
}

pub const USAGE: &str = "\
usage: tidewater-viewer [options]

  --assets DIR          directory with noise.png and skybox1..6.jpg (default: assets)
  --settings PATH       settings file (default: tidewater-settings.json)
  --no-persist          keep settings in memory only
  --detail N            plane tessellation (default: 128)
  --size S              plane half-extent (default: 2.0)
  --triangle            draw a single triangle instead of the plane
  --skybox MODE         'fullscreen' or 'cube' (default: fullscreen)
  --skybox-depth-write  on|off (default: on)
  --log FILTER          log filter, e.g. debug or tidewater_engine=trace
";

impl ViewerOptions {
    pub fn from_env() -> Result<Option<Self>> {
        Self::parse(std::env::args().skip(1))
    }

    /// Returns `Ok(None)` when help was requested.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>> {
        let mut opts = Self::default();
        let mut plane_size = MeshKind::DEFAULT_PLANE_SIZE;
        let mut plane_detail = MeshKind::DEFAULT_PLANE_DETAIL;
        let mut triangle = false;

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--assets" => opts.asset_dir = PathBuf::from(next_value(&mut iter, "--assets")?),
                "--settings" => {
                    opts.settings_path = Some(PathBuf::from(next_value(&mut iter, "--settings")?))
                }
                "--no-persist" => opts.settings_path = None,
                "--detail" => {
                    let raw = next_value(&mut iter, "--detail")?;
                    plane_detail = raw
                        .parse()
                        .with_context(|| format!("--detail expects an integer, got {raw:?}"))?;
                }
                "--size" => {
                    let raw = next_value(&mut iter, "--size")?;
                    plane_size = raw
                        .parse()
                        .with_context(|| format!("--size expects a number, got {raw:?}"))?;
                }
                "--triangle" => triangle = true,
                "--skybox" => {
                    opts.scene.skybox_mode = match next_value(&mut iter, "--skybox")?.as_str() {
                        "fullscreen" => SkyboxMode::InverseViewProjection,
                        "cube" => SkyboxMode::DirectView,
                        other => bail!("unknown skybox mode {other:?}"),
                    }
                }
                "--skybox-depth-write" => {
                    opts.scene.skybox_depth_write =
                        match next_value(&mut iter, "--skybox-depth-write")?.as_str() {
                            "on" | "true" => true,
                            "off" | "false" => false,
                            other => bail!("--skybox-depth-write expects on|off, got {other:?}"),
                        }
                }
                "--log" => opts.log_filter = Some(next_value(&mut iter, "--log")?),
                flag => bail!("unknown argument {flag}"),
            }
        }

        opts.scene.mesh = if triangle {
            MeshKind::Triangle
        } else {
            MeshKind::Plane {
                size: plane_size,
                detail: plane_detail,
            }
        };

        Ok(Some(opts))
    }
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    iter.next().ok_or_else(|| anyhow!("{flag} expects a value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<ViewerOptions>> {
        ViewerOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_gives_defaults() {
        assert_eq!(parse(&[]).unwrap(), Some(ViewerOptions::default()));
    }

    #[test]
    fn flags_are_applied() {
        let opts = parse(&[
            "--assets", "/tmp/sky", "--detail", "32", "--skybox", "cube",
            "--skybox-depth-write", "off", "--no-persist",
        ])
        .unwrap()
        .unwrap();

        assert_eq!(opts.asset_dir, PathBuf::from("/tmp/sky"));
        assert_eq!(opts.settings_path, None);
        assert_eq!(opts.scene.skybox_mode, SkyboxMode::DirectView);
        assert!(!opts.scene.skybox_depth_write);
        assert_eq!(
            opts.scene.mesh,
            MeshKind::Plane {
                size: 2.0,
                detail: 32
            }
        );
    }

    #[test]
    fn zero_detail_is_passed_through_for_sanitizing() {
        let opts = parse(&["--detail", "0"]).unwrap().unwrap();
        assert_eq!(opts.scene.clone().sanitized().mesh, MeshKind::default());
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(parse(&["--detail"]).is_err());
        assert!(parse(&["--detail", "many"]).is_err());
        assert!(parse(&["--skybox", "sphere"]).is_err());
        assert!(parse(&["--frobnicate"]).is_err());
        assert_eq!(parse(&["--help"]).unwrap(), None);
    }
}
