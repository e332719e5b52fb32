use anyhow::Context;
use melora::config;
use melora::core::MeloraCore;
use melora::format;
use melora::history::{self, HistoryStore, JsonHistoryStore};
use melora::palette::ColorStrategyKind;
use melora::stats;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    device: Option<String>,
    colors: Option<ColorStrategyKind>,
    stats: bool,
    history: bool,
    clear: bool,
    import: Option<PathBuf>,
}

impl CliArgs {
    fn wants_tui(&self) -> bool {
        !self.stats && !self.history && !self.clear && self.import.is_none()
    }
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    init_logging(args.wants_tui());

    let mut settings = config::load_settings().unwrap_or_else(|err| {
        log::warn!("using default settings: {err:#}");
        Default::default()
    });
    if let Some(kind) = args.colors {
        settings.color_strategy = kind;
    }

    let device = config::resolve_device_id(&settings, args.device.as_deref());
    let mut store = JsonHistoryStore::open_default()?;
    let offset = format::local_offset();
    log::info!("device {device}, history at {}", store.path().display());

    if args.wants_tui() {
        let core = MeloraCore::new(device, &settings, offset);
        return melora::app::run(core, &mut store, &settings);
    }

    if let Some(path) = &args.import {
        let report = history::import_file(&mut store, &device, path)?;
        println!(
            "Imported {} of {} searches for {device}",
            report.imported, report.rows
        );
    }

    if args.clear {
        let removed = store.clear_history(&device)?;
        println!("Cleared {removed} searches for {device}");
    }

    if args.history {
        let mut records = history::fetch_or_empty(&store, &device);
        history::sort_newest_first(&mut records);
        if records.is_empty() {
            println!("You have no history");
        }
        for record in &records {
            println!(
                "{}  {} - {}",
                format::history_timestamp(record.created_at, offset),
                record.title,
                record.artist
            );
        }
    }

    if args.stats {
        let records = history::fetch_or_empty(&store, &device);
        let mut colors = settings.color_strategy.build();
        let summary = stats::summarize(&records, colors.as_mut(), offset);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn init_logging(tui: bool) {
    let default_filter = if tui { "info" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if tui {
        // Anything on stderr would tear the alternate screen.
        match open_log_file() {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn open_log_file() -> anyhow::Result<fs::File> {
    config::ensure_config_dir()?;
    let path = config::log_path()?;
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--device" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--device requires an id");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--device cannot be empty");
                }
                out.device = Some(value.trim().to_string());
            }
            "--colors" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--colors requires hashed, palette or random");
                };
                let Some(kind) = ColorStrategyKind::parse(value) else {
                    anyhow::bail!("unknown color strategy {value}");
                };
                out.colors = Some(kind);
            }
            "--import" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--import requires a JSON file");
                };
                out.import = Some(PathBuf::from(value));
            }
            "--stats" => out.stats = true,
            "--history" => out.history = true,
            "--clear" => out.clear = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("Melora");
    println!("  --device <id>       Use this device id instead of the configured one");
    println!("  --colors <kind>     Chart colors: hashed, palette or random");
    println!("  --stats             Print the stats summary as JSON");
    println!("  --history           Print search history, newest first");
    println!("  --clear             Delete this device's search history");
    println!("  --import <file>     Append searches from a JSON array");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn no_flags_runs_tui() {
        let parsed = parse_args(Vec::new()).expect("parse");
        assert!(parsed.wants_tui());
    }

    #[test]
    fn stats_with_device_and_colors() {
        let parsed =
            parse_args(args(&["--stats", "--device", " phone-1 ", "--colors", "palette"]))
                .expect("parse");
        assert!(parsed.stats);
        assert!(!parsed.wants_tui());
        assert_eq!(parsed.device.as_deref(), Some("phone-1"));
        assert_eq!(parsed.colors, Some(ColorStrategyKind::Palette));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse_args(args(&["--device"])).is_err());
        assert!(parse_args(args(&["--colors", "neon"])).is_err());
        assert!(parse_args(args(&["--what"])).is_err());
    }
}
