#[macro_use]
extern crate tracing;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use miette::{Context as _, IntoDiagnostic as _};

pub mod animations;
pub mod appearance;
pub mod debug;
pub mod desktop;
pub mod input;
pub mod output;

pub use crate::animations::Animations;
pub use crate::appearance::Color;
pub use crate::debug::Debug;
pub use crate::desktop::{munge_app_id, Application, Decoration, Desktop};
pub use crate::input::Input;
pub use crate::output::{Output, OutputSize, Position};

#[derive(knuffel::Decode, Debug, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub desktop: Desktop,
    #[knuffel(child, default)]
    pub decoration: Decoration,
    #[knuffel(child, default)]
    pub input: Input,
    #[knuffel(child, default)]
    pub animations: Animations,
    #[knuffel(children(name = "output"))]
    pub outputs: Vec<Output>,
    #[knuffel(children(name = "application"))]
    pub applications: Vec<Application>,
    #[knuffel(child, default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        knuffel::parse(filename, text)
    }

    /// Returns the settings block for an app id, if there is one.
    ///
    /// Both sides are munged before comparing.
    pub fn application(&self, app_id: &str) -> Option<&Application> {
        let key = munge_app_id(app_id);
        self.applications
            .iter()
            .find(|app| munge_app_id(&app.app_id) == key)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse(
            "default-config.kdl",
            include_str!("../../resources/default-config.kdl"),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;

    #[track_caller]
    fn do_parse(text: &str) -> Config {
        Config::parse("test.kdl", text)
            .map_err(miette::Report::new)
            .unwrap()
    }

    #[test]
    fn parse() {
        let parsed = do_parse(
            r##"
            desktop {
                auto-maximize
                edge-snap-threshold 32
            }

            decoration {
                titlebar-height 20
                border-width 2
                color "#ff0000"
            }

            input {
                shell-reveal-touch-threshold 10
            }

            animations {
                off
            }

            output "DSI-1" {
                size 720 1440
                position x=0 y=0
                scale 2.0
            }

            output "HDMI-A-1" {
                size 1920 1080
                position x=360 y=-1080
            }

            application "org.gnome.Maps" {
                scale-to-fit
            }

            debug {
                touch-points
            }
            "##,
        );

        assert_eq!(
            parsed,
            Config {
                desktop: Desktop {
                    auto_maximize: true,
                    scale_to_fit: false,
                    edge_snap_threshold: 32,
                    ..Default::default()
                },
                decoration: Decoration {
                    titlebar_height: 20,
                    border_width: 2,
                    color: Color::new_unpremul(1., 0., 0., 1.),
                },
                input: Input {
                    shell_reveal_pointer_threshold: 2,
                    shell_reveal_touch_threshold: 10,
                },
                animations: Animations {
                    off: true,
                    ..Default::default()
                },
                outputs: vec![
                    Output {
                        name: String::from("DSI-1"),
                        size: Some(OutputSize {
                            width: 720,
                            height: 1440,
                        }),
                        position: Some(Position { x: 0, y: 0 }),
                        scale: Some(2.),
                    },
                    Output {
                        name: String::from("HDMI-A-1"),
                        size: Some(OutputSize {
                            width: 1920,
                            height: 1080,
                        }),
                        position: Some(Position { x: 360, y: -1080 }),
                        scale: None,
                    },
                ],
                applications: vec![Application {
                    app_id: String::from("org.gnome.Maps"),
                    scale_to_fit: true,
                }],
                debug: Debug { touch_points: true },
            }
        );
    }

    #[test]
    fn default_config_matches_empty() {
        assert_eq!(Config::default(), do_parse(""));
    }

    #[test]
    fn application_lookup_is_munged() {
        let parsed = do_parse(
            r#"
            application "org.gnome.Maps" { scale-to-fit; }
            application "foot" {}
            "#,
        );

        assert!(parsed.application("ORG.GNOME.MAPS").unwrap().scale_to_fit);
        assert!(parsed.application("org_gnome_maps").unwrap().scale_to_fit);
        assert!(!parsed.application("foot").unwrap().scale_to_fit);
        assert!(parsed.application("bar").is_none());
    }

    #[test]
    fn output_position() {
        let parsed = do_parse(
            r#"
            output "DSI-1" {
                position x=10 y=20
            }
            "#,
        );

        assert_debug_snapshot!(parsed.outputs[0].position, @r"
        Some(
            Position {
                x: 10,
                y: 20,
            },
        )
        ");
    }

    #[test]
    fn rejects_unknown_node() {
        assert!(Config::parse("test.kdl", "desktop { wobbly-windows; }").is_err());
    }
}
