#![warn(clippy::pedantic)]

mod batcher;
mod replay;
mod settings;

use anyhow::{Context, Result as AnyResult};

/// Parsed command line. `sketchpad [--settings <path>] [script.toml ...]`
struct Args {
    settings: Option<std::path::PathBuf>,
    scripts: Vec<std::path::PathBuf>,
}
impl Args {
    fn parse() -> AnyResult<Self> {
        let mut settings = None;
        let mut scripts = Vec::new();
        // Paths are OSStrings, let the system handle character encoding restrictions.
        let mut args = std::env::args_os().skip(1);
        while let Some(arg) = args.next() {
            if arg == "--settings" {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--settings expects a path"))?;
                settings = Some(path.into());
            } else {
                scripts.push(arg.into());
            }
        }
        Ok(Self { settings, scripts })
    }
}

fn run_script(settings: &settings::Settings, script: &replay::Script) -> AnyResult<()> {
    let mut replay = replay::Replay::new(settings, script.window);
    let summary = replay.run(script)?;
    let batcher = replay.batcher();
    log::debug!(
        "final frame: {} draws, {} vertices, {} indices",
        batcher.draws().len(),
        batcher.vertices().len(),
        batcher.indices().len()
    );
    println!("{summary}");
    Ok(())
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let args = Args::parse()?;
    let settings = match &args.settings {
        Some(path) => settings::Settings::load_or_default(path),
        None => {
            let settings = settings::Settings::from_preferences();
            // Write back, so a documented file exists for the user to edit.
            if let Err(e) = settings.save() {
                log::warn!("Failed to save settings:\n{e:?}");
            }
            settings
        }
    };

    if args.scripts.is_empty() {
        log::info!("no scripts given, replaying the demo");
        return run_script(&settings, &replay::Script::demo()?);
    }
    for path in &args.scripts {
        let script: AnyResult<replay::Script> = try_block::try_block! {
            let text = std::fs::read_to_string(path)?;
            let script = replay::Script::from_toml(&text)?;
            Ok(script)
        };
        let script = script.with_context(|| format!("failed to open script {path:?}"))?;
        run_script(&settings, &script).with_context(|| format!("while replaying {path:?}"))?;
    }
    Ok(())
}
