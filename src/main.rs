#[macro_use]
extern crate tracing;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use clap::Parser;
use directories::ProjectDirs;
use smithay::utils::Point;
use tessera::backend::Headless;
use tessera::cli::{Cli, Sub};
use tessera::input::{InputEvent, BTN_LEFT};
use tessera::ipc::Snapshot;
use tessera::protocols::ButtonState;
use tessera_config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| "tessera=debug,info".to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();
    let path = config_path(cli.subcommand.config_path().cloned());

    match cli.subcommand {
        Sub::Validate { .. } => {
            let path = path.context("error retrieving home directory")?;
            Config::load(&path).map_err(|err| anyhow!("{err:?}"))?;
            info!("config is valid");
        }
        Sub::Simulate { .. } => {
            let config = match path {
                Some(path) if path.exists() => {
                    Config::load(&path).map_err(|err| anyhow!("{err:?}"))?
                }
                _ => {
                    debug!("no config file, using the defaults");
                    Config::default()
                }
            };

            let snapshot = simulate(&config);
            let json = serde_json::to_string_pretty(&snapshot).context("error serializing")?;
            println!("{json}");
        }
    }

    Ok(())
}

fn config_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path);
    }
    if let Some(path) = env::var_os("TESSERA_CONFIG") {
        return Some(PathBuf::from(path));
    }

    let mut path = ProjectDirs::from("", "", "tessera")?.config_dir().to_owned();
    path.push("config.kdl");
    Some(path)
}

/// Opens a window, meta-drags it to the top edge of its output and lets go.
fn simulate(config: &Config) -> Snapshot {
    let mut headless = Headless::new(config);
    if headless.compositor.outputs.is_empty() {
        headless.add_output(1, (1280, 720));
    }

    let window = headless.add_window("org.example.Editor", (640, 480));
    let Some(start) = headless
        .compositor
        .views
        .get(window.view)
        .map(|v| v.get_box())
    else {
        return headless.compositor.snapshot();
    };
    let start = Point::<f64, _>::from((
        f64::from(start.loc.x + start.size.w / 2),
        f64::from(start.loc.y + start.size.h / 2),
    ));
    let top = headless
        .compositor
        .outputs
        .iter()
        .map(|(_, o)| o.geometry().loc.y)
        .min()
        .unwrap_or(0);

    let mut time = 0;
    send(&mut headless, InputEvent::Modifiers { meta: true });
    send(
        &mut headless,
        InputEvent::PointerMotionAbsolute {
            time,
            position: start,
        },
    );
    send(
        &mut headless,
        InputEvent::PointerButton {
            time,
            button: BTN_LEFT,
            state: ButtonState::Pressed,
        },
    );

    let steps = 10;
    for i in 1..=steps {
        time += 16;
        let progress = f64::from(i) / f64::from(steps);
        let y = start.y + (f64::from(top) - start.y) * progress;
        send(
            &mut headless,
            InputEvent::PointerMotionAbsolute {
                time,
                position: Point::from((start.x, y)),
            },
        );
        headless.advance_time(Duration::from_millis(16));
    }

    time += 16;
    send(
        &mut headless,
        InputEvent::PointerButton {
            time,
            button: BTN_LEFT,
            state: ButtonState::Released,
        },
    );
    send(&mut headless, InputEvent::Modifiers { meta: false });

    headless.advance_time(Duration::from_millis(500));
    headless.compositor.snapshot()
}

fn send(headless: &mut Headless, event: InputEvent) {
    headless.compositor.process_input_event(event);
    headless.dispatch();
}
