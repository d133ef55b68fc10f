use std::time::Instant;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::discover::Vine;

mod config;
mod discover;
mod render;
mod util;

pub const CONTENT_DIR: &str = "content";
pub const ASSETS_DIR: &str = "assets";
pub const CONFIG_FILE: &str = "config.toml";

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Renders a content site into static HTML.
        cmd vine {
            /// Site directory holding `config.toml`, `content/` and `assets/`.
            required input: PathBuf
            /// Directory the rendered site is written to.
            required output: PathBuf
            /// Log debug output. `RUST_LOG` takes precedence.
            optional -v, --verbose
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn main() {
    let flags = flags::Vine::from_env_or_exit();
    init_logging(flags.verbose);

    let start = Instant::now();
    let result = Vine::new(&flags.input, &flags.output)
        .and_then(|vine| Ok((vine.discover()?, vine)))
        .and_then(|(site, vine)| {
            info!(elapsed_ms = start.elapsed().as_millis() as u64, "discovery finished");
            let render = Instant::now();
            let now = chrono::Local::now().naive_local();
            let result = vine.render_site(&site, now);
            info!(elapsed_ms = render.elapsed().as_millis() as u64, "rendering finished");
            info!(elapsed_ms = start.elapsed().as_millis() as u64, "total");
            site.visualize();
            result
        });

    if let Err(error) = result {
        tracing::error!("{error}");
        std::process::exit(1);
    }
}
