use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use photomark::{
    Config, Engine,
    export::{ExportEvent, ExportObserver, ExportScope, OutputFormat},
    startup_checks,
    templates::{DEFAULT_TEMPLATE, Settings, SettingsRecord, TemplateStore},
    watermark::{DescriptorField, FontResolver, WatermarkKind},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "photomark.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark images and write them to the output directory
    Export {
        /// Template to use instead of the last session
        #[arg(short, long)]
        template: Option<String>,

        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// JPEG quality, 0-100
        #[arg(short, long)]
        quality: Option<u8>,

        /// Watermark text; `{date}` becomes each photo's capture date
        #[arg(long)]
        text: Option<String>,

        /// Font size as a fraction of the shorter image side (0 turns it off)
        #[arg(long)]
        auto_size: Option<f64>,

        /// Image files or folders (folders are scanned one level deep)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Render the preview frame for one image as PNG
    Preview {
        image: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,

        #[arg(short, long)]
        template: Option<String>,
    },

    /// Manage templates
    #[command(subcommand)]
    Template(TemplateCommands),
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// List all templates
    List,
    /// Print a template as JSON
    Show { name: String },
    /// Delete a template
    Delete { name: String },
    /// Make a template the default
    SetDefault { name: String },
    /// Save the last session settings under a new name
    Save { name: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}

/// Prints per-file outcomes as they happen
struct ConsoleObserver;

impl ExportObserver for ConsoleObserver {
    fn on_event(&mut self, event: &ExportEvent) {
        match event {
            ExportEvent::Succeeded { source, output } => {
                println!("  ok      {} -> {}", source.display(), output.display())
            }
            ExportEvent::Skipped { source, reason } => {
                println!("  skipped {}: {}", source.display(), reason)
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.config)?;
    info!("Starting {}", config.app.name);
    info!("Template directory: {:?}", config.templates.directory);

    let fonts = config.fonts.resolver();
    info!("Indexed {} font file(s)", fonts.font_count());

    // Perform startup checks
    if let Err(errors) = startup_checks::perform_startup_checks(&config, &fonts) {
        for error in &errors {
            tracing::error!("Startup check failed: {}", error);
        }
        if errors.iter().any(|e| e.is_critical()) {
            tracing::error!("Critical startup check failed, exiting");
            return Err("Critical startup check failed".into());
        }
        tracing::warn!("Non-critical startup checks failed, continuing");
    }

    let store = TemplateStore::new(&config.templates.directory);

    match cli.command {
        Commands::Export {
            template,
            output_dir,
            format,
            quality,
            text,
            auto_size,
            paths,
        } => {
            let overrides = ExportOverrides {
                output_dir,
                format,
                quality,
                text,
                auto_size,
            };
            run_export(&store, fonts, template, overrides, &paths)
        }
        Commands::Preview {
            image,
            out,
            width,
            height,
            template,
        } => {
            let width = width.unwrap_or(config.preview.width);
            let height = height.unwrap_or(config.preview.height);
            run_preview(&store, fonts, template, &image, &out, width, height)
        }
        Commands::Template(cmd) => handle_template_command(&store, cmd),
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        let config = toml_edit::de::from_str::<Config>(&config_content)?;
        info!("Configuration loaded from: {:?}", config_path);
        config
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Config::default()
    };
    Ok(config)
}

fn starting_settings(
    store: &TemplateStore,
    template: Option<String>,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let (session, source) = store.load_startup()?;
    info!("Session settings from {:?}", source);
    match template {
        Some(name) => Ok(store.load(&name)?),
        None => Ok(session),
    }
}

/// Command-line values that take precedence over the loaded template
struct ExportOverrides {
    output_dir: Option<PathBuf>,
    format: Option<FormatArg>,
    quality: Option<u8>,
    text: Option<String>,
    auto_size: Option<f64>,
}

fn run_export(
    store: &TemplateStore,
    fonts: FontResolver,
    template: Option<String>,
    overrides: ExportOverrides,
    paths: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = starting_settings(store, template)?;
    if let Some(dir) = overrides.output_dir {
        settings.export.output_dir = dir;
    }
    if let Some(format) = overrides.format {
        settings.export.format = format.into();
    }
    if let Some(quality) = overrides.quality {
        settings.export.jpeg_quality = quality.min(100);
    }

    let mut engine = Engine::new(settings, fonts);
    if let Some(text) = overrides.text {
        engine.apply_field(DescriptorField::Kind(WatermarkKind::Text));
        engine.apply_field(DescriptorField::Text(text));
    }
    if let Some(ratio) = overrides.auto_size {
        engine.apply_field(DescriptorField::AutoSizeRatio(ratio));
    }
    let summary = engine.import_paths(paths);
    for (path, reason) in &summary.skipped {
        println!("Not imported {}: {}", path.display(), reason);
    }
    if engine.images().is_empty() {
        return Err("No images to export".into());
    }

    println!(
        "Exporting {} image(s) to {}",
        engine.images().len(),
        engine.export_config().output_dir.display()
    );
    let report = engine.export(ExportScope::All, &mut ConsoleObserver)?;
    println!(
        "Done: {}/{} exported, {} skipped",
        report.succeeded,
        report.total,
        report.skipped.len()
    );

    store.save_session(engine.settings())?;

    if report.succeeded == 0 && report.total > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_preview(
    store: &TemplateStore,
    fonts: FontResolver,
    template: Option<String>,
    image: &Path,
    out: &Path,
    width: u32,
    height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = starting_settings(store, template)?;
    let mut engine = Engine::new(settings, fonts);

    let summary = engine.import_paths(&[image]);
    if let Some((path, reason)) = summary.skipped.first() {
        return Err(format!("Cannot open {}: {}", path.display(), reason).into());
    }

    engine.set_viewport(width, height);
    let frame = engine
        .render_preview()
        .ok_or("Nothing to preview")?;
    frame.save(out)?;

    if let Some((x, y)) = engine
        .base_image()
        .and_then(|base| engine.current_placement_pixels(base.width(), base.height()))
    {
        println!("Watermark top-left in image pixels: ({}, {})", x, y);
    } else {
        println!("No watermark drawn");
    }
    println!("Preview written to {}", out.display());
    Ok(())
}

fn handle_template_command(
    store: &TemplateStore,
    cmd: TemplateCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        TemplateCommands::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No templates in {}", store.directory().display());
            } else {
                println!("Templates:");
                for name in names {
                    println!("  {}", name);
                }
            }
        }
        TemplateCommands::Show { name } => {
            let settings = store.load(&name)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&SettingsRecord::from(&settings))?
            );
        }
        TemplateCommands::Delete { name } => {
            store.delete(&name)?;
            println!("Deleted template '{}'", name);
        }
        TemplateCommands::SetDefault { name } => {
            let settings = store.load(&name)?;
            store.set_default(&settings)?;
            println!("Template '{}' is now the {}", name, DEFAULT_TEMPLATE);
        }
        TemplateCommands::Save { name } => {
            let (settings, _) = store.load_startup()?;
            store.save(&name, &settings)?;
            println!("Saved last session settings as '{}'", name);
        }
    }
    Ok(())
}
