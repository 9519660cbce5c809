use crate::cli::{Cli, Commands, SettingsArgs, StreamKind};
use anyhow::{Context, Result};
use expset::config::GlobalSettings;
use expset::engine::{self, Caps, ElementFactory, ExportSettings, Fraction, Registry, Serializable};
use expset::engine::registry::StaticRegistry;
use std::fs;
use std::path::Path;
use std::process;

pub fn run(cli: Cli) {
    let registry = match open_registry(&cli) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Muxers => handle_muxers(registry.as_ref()),
        Commands::Encoders { kind } => handle_encoders(registry.as_ref(), kind),
        Commands::Compatible { muxer } => handle_compatible(registry.as_ref(), &muxer),
        Commands::SinkCaps { element, caps } => {
            handle_sink_caps(registry.as_ref(), &element, &caps)
        }
        Commands::Settings(args) => handle_settings(registry.as_ref(), args),
        Commands::Paths { create } => handle_paths(create),
        Commands::InitConfig => handle_init_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn open_registry(cli: &Cli) -> Result<Box<dyn Registry>> {
    if use_gstreamer(cli) {
        return open_gstreamer();
    }

    match &cli.registry {
        Some(path) => Ok(Box::new(StaticRegistry::load(path).with_context(|| {
            format!("Failed to load registry snapshot: {}", path.display())
        })?)),
        None => Ok(Box::new(
            StaticRegistry::builtin().context("Bundled registry snapshot is invalid")?,
        )),
    }
}

#[cfg(feature = "gstreamer")]
fn use_gstreamer(cli: &Cli) -> bool {
    cli.gstreamer
}

#[cfg(not(feature = "gstreamer"))]
fn use_gstreamer(_cli: &Cli) -> bool {
    false
}

#[cfg(feature = "gstreamer")]
fn open_gstreamer() -> Result<Box<dyn Registry>> {
    let registry =
        engine::registry::GstRegistry::new().context("Failed to initialise GStreamer")?;
    Ok(Box::new(registry))
}

#[cfg(not(feature = "gstreamer"))]
fn open_gstreamer() -> Result<Box<dyn Registry>> {
    anyhow::bail!("built without GStreamer support")
}

fn print_factories<'a>(factories: impl IntoIterator<Item = &'a ElementFactory>) {
    for factory in factories {
        println!("{:<16} {:<24} {}", factory.name, factory.klass, factory.description);
    }
}

fn handle_muxers(registry: &dyn Registry) -> Result<()> {
    print_factories(&engine::available_muxers(registry));
    Ok(())
}

fn handle_encoders(registry: &dyn Registry, kind: StreamKind) -> Result<()> {
    let encoders = match kind {
        StreamKind::Video => engine::available_video_encoders(registry),
        StreamKind::Audio => engine::available_audio_encoders(registry),
    };
    print_factories(&encoders);
    Ok(())
}

fn handle_compatible(registry: &dyn Registry, name: &str) -> Result<()> {
    let muxer = registry
        .lookup_feature(name)
        .with_context(|| format!("{} is not a valid factory name", name))?;

    let video = engine::available_video_encoders(registry);
    let audio = engine::available_audio_encoders(registry);

    println!("Video encoders:");
    print_factories(engine::encoders_muxer_compatible(&video, &muxer));
    println!();
    println!("Audio encoders:");
    print_factories(engine::encoders_muxer_compatible(&audio, &muxer));
    println!();

    let yes_no = |b: bool| if b { "yes" } else { "no" };
    println!("Raw video: {}", yes_no(engine::muxer_can_sink_raw_video(&muxer)));
    println!("Raw audio: {}", yes_no(engine::muxer_can_sink_raw_audio(&muxer)));
    Ok(())
}

fn handle_sink_caps(registry: &dyn Registry, element: &str, caps: &str) -> Result<()> {
    let caps: Caps = caps
        .parse()
        .with_context(|| format!("Invalid caps: {}", caps))?;

    match engine::get_compatible_sink_caps(registry, element, &caps) {
        Some(result) => println!("{}", result),
        None => {
            println!("No compatible sink caps");
            process::exit(2);
        }
    }
    Ok(())
}

fn parse_fraction(arg: Option<&str>, what: &str) -> Result<Option<Fraction>> {
    arg.map(|text| {
        text.parse::<Fraction>()
            .with_context(|| format!("Invalid {}: {}", what, text))
    })
    .transpose()
}

fn load_settings(settings: &mut ExportSettings, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    let data = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
    settings
        .from_data_format(&data)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(())
}

fn handle_settings(registry: &dyn Registry, args: SettingsArgs) -> Result<()> {
    let mut settings = ExportSettings::new(registry);

    if let Some(path) = &args.load {
        load_settings(&mut settings, path)?;
    }

    let framerate = parse_fraction(args.framerate.as_deref(), "framerate")?;
    let par = parse_fraction(args.par.as_deref(), "pixel aspect ratio")?;
    settings.set_video_properties(args.width, args.height, framerate, par);
    settings.set_audio_properties(args.channels, args.rate, args.depth);
    settings.set_encoders(
        args.muxer.as_deref(),
        args.video_encoder.as_deref(),
        args.audio_encoder.as_deref(),
    );

    println!("{}", settings);
    println!();
    println!("{}", settings.video_description());
    println!("{}", settings.audio_description());
    match settings.video_caps(registry) {
        Some(caps) => println!("Video caps: {}", caps),
        None => println!("Video caps: none ({} cannot take them)", settings.video_encoder()),
    }
    match settings.audio_caps(registry) {
        Some(caps) => println!("Audio caps: {}", caps),
        None => println!("Audio caps: none ({} cannot take them)", settings.audio_encoder()),
    }

    if let Some(path) = &args.save {
        let contents = serde_json::to_string_pretty(&settings.to_data_format())
            .context("Failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        println!("Settings saved to {}", path.display());
    }
    Ok(())
}

fn handle_paths(create: bool) -> Result<()> {
    let global = GlobalSettings::load()?;
    println!("Plugins:          {}", global.local_plugin_path(create)?.display());
    println!("Plugin settings:  {}", global.plugin_settings_path(create)?.display());
    Ok(())
}

fn handle_init_config() -> Result<()> {
    let global = GlobalSettings::load()?;
    println!("Advanced mode: {}", global.advanced_mode_enabled);
    println!("File support:  {} (from environment)", global.file_support_enabled);

    let path = global.save_user_config()?;
    println!("Settings saved to {}", path.display());
    Ok(())
}
