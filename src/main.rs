//! `parallax [PRESET_OR_TOML] [MODEL_PATH]`: open the viewer window.

use std::path::{Path, PathBuf};

use parallax::{options::Options, Viewer};

const PRESET_DIR: &str = "assets/presets";

/// Resolve a TOML path or a preset name from `assets/presets/`.
fn resolve_options(input: &str) -> Result<Options, String> {
    let path = Path::new(input);
    if path.is_file() {
        return Options::load(path).map_err(|e| format!("{input}: {e}"));
    }

    let preset = Path::new(PRESET_DIR).join(format!("{input}.toml"));
    if preset.is_file() {
        log::info!("Using preset '{input}'");
        return Options::load(&preset).map_err(|e| format!("{input}: {e}"));
    }

    let available = Options::list_presets(Path::new(PRESET_DIR));
    Err(format!(
        "No options file or preset named '{input}' (presets: {})",
        available.join(", ")
    ))
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let options = match args.next() {
        Some(arg) if arg == "-h" || arg == "--help" => {
            log::error!("Usage: parallax [PRESET_OR_TOML] [MODEL_PATH]");
            std::process::exit(1);
        }
        Some(arg) => match resolve_options(&arg) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    let mut builder = Viewer::builder().with_options(options);
    if let Some(model) = args.next().map(PathBuf::from) {
        if !model.is_file() {
            log::error!("Model not found: {}", model.display());
            std::process::exit(1);
        }
        builder = builder.with_model(model);
    }

    if let Err(e) = builder.build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
