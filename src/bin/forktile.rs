use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use forktile::common::config::{Config, config_file};
use forktile::common::log;
use forktile::layout_engine::AutoTiler;
use forktile::sys::geometry::Rectangle;
use forktile::sys::headless::{HeadlessWindow, HeadlessWindowManager};
use forktile::sys::window::{WindowId, WindowManager};
use serde::Serialize;
use tracing::{info, warn};

const PID: i32 = 1;

/// Tile a set of simulated windows and print the resulting layout.
#[derive(Parser)]
struct Cli {
    /// Configuration file to use instead of ~/.forktile.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check the configuration and exit.
    #[arg(long)]
    validate: bool,

    /// Screen width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: i32,

    /// Screen height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: i32,

    /// Workspace the tree is tiled on.
    #[arg(long, default_value_t = 0)]
    workspace: u32,

    /// Number of windows, each attached next to the previous one.
    #[arg(long, default_value_t = 3)]
    windows: u32,

    /// Minimum width of the last window.
    #[arg(long, default_value_t = 0)]
    min_width: i32,

    /// Minimum height of the last window.
    #[arg(long, default_value_t = 0)]
    min_height: i32,

    /// Move the root split to this offset after the initial layout.
    #[arg(long)]
    ratio: Option<i32>,

    /// Toggle the orientation of the fork holding the last window.
    #[arg(long)]
    toggle: bool,

    /// Print the placements as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    tree: String,
    windows: Vec<WindowReport<'a>>,
}

#[derive(Serialize)]
struct WindowReport<'a> {
    window: WindowId,
    #[serde(flatten)]
    state: &'a HeadlessWindow,
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let path = path.or_else(|| Some(config_file()).filter(|p| p.exists()));
    let mut config = match path {
        Some(path) => Config::read(&path)
            .with_context(|| format!("could not read config file {}", path.display()))?,
        None => Config::default(),
    };

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            warn!("config: {issue}");
        }
        let fixes = config.auto_fix_values();
        info!("applied {fixes} config fixes");
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let opt: Cli = Parser::parse();
    log::init_logging();

    let config = load_config(opt.config)?;
    if opt.validate {
        println!("configuration ok");
        return Ok(());
    }

    let mut wm = HeadlessWindowManager::new(config.settings.gaps());
    let gaps = wm.gaps();
    let mut tiler = AutoTiler::new();

    let key = format!("0:{}", opt.workspace);
    let screen = Rectangle::new(0, 0, opt.width, opt.height);
    let windows: Vec<WindowId> = (1..=opt.windows).map(|idx| WindowId::new(PID, idx)).collect();
    let (Some(&first), Some(&last)) = (windows.first(), windows.last()) else {
        bail!("--windows must be at least 1");
    };
    wm.set_min_size(last, opt.min_width, opt.min_height);

    let root = tiler.create_toplevel(&gaps, first, screen, key.as_str(), (0, opt.workspace))?;
    tiler.arrange(&mut wm, &key)?;
    for pair in windows.windows(2) {
        tiler.attach_window(&gaps, pair[0], pair[1])?;
        tiler.arrange(&mut wm, &key)?;
    }

    if let Some(ratio) = opt.ratio
        && !tiler.resize_fork(&mut wm, root, ratio)?
    {
        warn!(ratio, "a window refused the new split; kept the previous one");
    }
    if opt.toggle {
        tiler.toggle_orientation(&mut wm, last)?;
    }

    let tree = tiler.draw_tree(root);
    let placed: Vec<WindowReport> = tiler
        .windows_under(root)
        .into_iter()
        .filter_map(|window| wm.window(window).map(|state| WindowReport { window, state }))
        .collect();

    if opt.json {
        let report = Report { tree, windows: placed };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{tree}");
        for WindowReport { window, .. } in placed {
            match wm.frame(window) {
                Some(frame) => println!("{window}: {frame}"),
                None => println!("{window}: not placed"),
            }
        }
    }

    Ok(())
}
