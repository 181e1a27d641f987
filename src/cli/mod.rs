//! # CLI Module
//!
//! Command-line interface for the photo toolkit.
//!
//! ## Usage
//! ```bash
//! # Focal-length histogram of a folder
//! phototool focal ~/Photos
//!
//! # One exiftool call for every file, CSV on stdout
//! phototool focal ~/Photos --mode single --output csv
//!
//! # Time both extraction modes against each other
//! phototool focal ~/Photos --compare
//!
//! # Shutter count
//! phototool shutter ~/Photos/DSC_0001.NEF
//!
//! # Borders from a saved preset
//! phototool border ~/Photos/*.jpg --output-dir ~/Bordered --preset gallery
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_toolkit::core::analysis::{ExtractionMode, FocalAnalysis, FocalAnalyzer};
use photo_toolkit::core::border::{BatchBorderer, BorderBatchResult, BorderColor, BorderSettings, PresetStore};
use photo_toolkit::core::exiftool::ExifTool;
use photo_toolkit::core::reporter::{export_csv, export_json, summary_line, HistogramRenderer};
use photo_toolkit::core::scanner::ScanConfig;
use photo_toolkit::core::shutter::{ShutterCount, ShutterCountReader};
use photo_toolkit::error::{ExifToolError, Result, ToolkitError};
use photo_toolkit::events::{BorderEvent, Event, EventChannel, EventReceiver, ExtractEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Toolkit - focal lengths, shutter counts and borders
#[derive(Parser, Debug)]
#[command(name = "phototool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the exiftool executable
    #[arg(long, global = true, value_name = "PATH")]
    exiftool: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count how often each focal length appears in a folder
    Focal {
        /// Folder to analyze
        folder: PathBuf,

        /// How files are handed to exiftool
        #[arg(short, long, default_value = "batched")]
        mode: Mode,

        /// Files per exiftool call in batched mode
        #[arg(short, long, default_value = "100")]
        batch_size: usize,

        /// Worker threads
        #[arg(short, long, default_value = "4")]
        workers: usize,

        /// Include subfolders
        #[arg(short, long)]
        recursive: bool,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Run both modes and compare their timing and results
        #[arg(long)]
        compare: bool,
    },

    /// Read the shutter count of one or more images
    Shutter {
        /// Images to inspect
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output format (csv is treated as json)
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Add borders to images
    Border {
        /// Images to border
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Folder for the bordered copies
        #[arg(short = 'd', long)]
        output_dir: PathBuf,

        /// Border settings file
        #[arg(short, long, conflicts_with = "preset")]
        settings: Option<PathBuf>,

        /// Saved preset name
        #[arg(short, long)]
        preset: Option<String>,

        #[command(flatten)]
        border: BorderArgs,

        /// Worker threads
        #[arg(short, long, default_value = "4")]
        workers: usize,
    },

    /// Save or show a border settings file
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Manage saved border presets
    Preset {
        #[command(subcommand)]
        command: PresetCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Write border settings to a file
    Save {
        file: PathBuf,

        /// Name stored in the file
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        border: BorderArgs,
    },
    /// Print a settings file
    Show { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum PresetCommand {
    /// List saved presets
    List,
    /// Save a preset
    Save {
        name: String,

        #[command(flatten)]
        border: BorderArgs,
    },
    /// Print a preset
    Show { name: String },
    /// Delete a preset
    Remove { name: String },
}

/// Border widths and color given on the command line
#[derive(Args, Debug, Clone, Default)]
struct BorderArgs {
    /// Same width on every side, in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Top border in pixels
    #[arg(long)]
    top: Option<u32>,

    /// Bottom border in pixels
    #[arg(long)]
    bottom: Option<u32>,

    /// Left border in pixels
    #[arg(long)]
    left: Option<u32>,

    /// Right border in pixels
    #[arg(long)]
    right: Option<u32>,

    /// Border color: white, black, #rrggbb or r,g,b
    #[arg(long)]
    color: Option<String>,
}

impl BorderArgs {
    /// Layer the given values over `base`. `--width` applies first, then the
    /// per-side options.
    fn apply_to(&self, mut base: BorderSettings) -> Result<BorderSettings> {
        if let Some(width) = self.width {
            base.top = width;
            base.bottom = width;
            base.left = width;
            base.right = width;
        }
        base.top = self.top.unwrap_or(base.top);
        base.bottom = self.bottom.unwrap_or(base.bottom);
        base.left = self.left.unwrap_or(base.left);
        base.right = self.right.unwrap_or(base.right);
        if let Some(color) = &self.color {
            base.color = color.parse::<BorderColor>()?;
        }
        base.validate()?;
        Ok(base)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// One exiftool call per batch (default)
    Batched,
    /// One exiftool call for every file
    Single,
}

impl From<Mode> for ExtractionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Batched => ExtractionMode::Batched,
            Mode::Single => ExtractionMode::Single,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    photo_toolkit::init_tracing(cli.verbose);

    let tool = match &cli.exiftool {
        Some(program) => ExifTool::new().with_program(program),
        None => ExifTool::new(),
    };

    match cli.command {
        Commands::Focal {
            folder,
            mode,
            batch_size,
            workers,
            recursive,
            include_hidden,
            output,
            compare,
        } => {
            let options = FocalOptions {
                batch_size,
                workers,
                recursive,
                include_hidden,
                verbose: cli.verbose,
            };
            if compare {
                run_compare(&folder, &tool, &options, output)
            } else {
                run_focal(&folder, &tool, &options, mode.into(), output)
            }
        }
        Commands::Shutter { images, output } => run_shutter(images, tool, output),
        Commands::Border {
            images,
            output_dir,
            settings,
            preset,
            border,
            workers,
        } => run_border(images, output_dir, settings, preset, &border, workers),
        Commands::Settings { command } => run_settings(command),
        Commands::Preset { command } => run_preset(command),
    }
}

/// Print an error for the user, with a hint where one helps
pub fn report_error(error: &ToolkitError) {
    let term = Term::stderr();
    term.write_line(&format!("{} {}", style("✗").red().bold(), error))
        .ok();

    if let ToolkitError::ExifTool(ExifToolError::Timeout { .. }) = error {
        term.write_line(&format!(
            "  {}",
            style("The file may be very large or on a slow disk. Try again or check the file.").dim()
        ))
        .ok();
    }
}

struct FocalOptions {
    batch_size: usize,
    workers: usize,
    recursive: bool,
    include_hidden: bool,
    verbose: bool,
}

fn build_analyzer(tool: &ExifTool, options: &FocalOptions, mode: ExtractionMode) -> Result<FocalAnalyzer> {
    let scan_config = ScanConfig {
        recursive: options.recursive,
        include_hidden: options.include_hidden,
        ..Default::default()
    };

    FocalAnalyzer::builder()
        .mode(mode)
        .batch_size(options.batch_size)
        .workers(options.workers)
        .scan_config(scan_config)
        .source(Box::new(tool.clone()))
        .build()
}

fn progress_bar(pretty: bool) -> Option<ProgressBar> {
    if !pretty {
        return None;
    }
    let pb = ProgressBar::new(0);
    if let Ok(bar_style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(bar_style.progress_chars("█▓░"));
    }
    Some(pb)
}

/// Drive a progress bar from analysis events until every sender is gone
fn spawn_extract_progress(receiver: EventReceiver, progress: Option<ProgressBar>, verbose: bool) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress.as_ref() else {
                continue;
            };
            match event {
                Event::Scan(ScanEvent::Started { .. }) => pb.set_message("scanning"),
                Event::Scan(ScanEvent::Completed { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Extract(ExtractEvent::Started { total_files, batches }) => {
                    pb.set_length(total_files as u64);
                    pb.set_message(format!("reading metadata ({} batches)", batches));
                }
                Event::Extract(ExtractEvent::BatchCompleted(p)) => {
                    pb.set_position(p.files_done as u64);
                    if verbose {
                        pb.set_message(format!("batch {}/{}", p.completed_batches, p.total_batches));
                    }
                }
                Event::Extract(ExtractEvent::BatchFailed { index, message, .. }) => {
                    pb.println(format!(
                        "{} batch {} skipped: {}",
                        style("!").yellow(),
                        index + 1,
                        message
                    ));
                }
                Event::Extract(ExtractEvent::Completed { .. }) => pb.finish_and_clear(),
                _ => {}
            }
        }
    })
}

fn analyze(
    folder: &Path,
    tool: &ExifTool,
    options: &FocalOptions,
    mode: ExtractionMode,
    show_progress: bool,
) -> Result<FocalAnalysis> {
    let analyzer = build_analyzer(tool, options, mode)?;
    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_extract_progress(receiver, progress_bar(show_progress), options.verbose);

    let result = analyzer.analyze_with_events(folder, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    result
}

fn run_focal(
    folder: &Path,
    tool: &ExifTool,
    options: &FocalOptions,
    mode: ExtractionMode,
    output: OutputFormat,
) -> Result<()> {
    let pretty = output == OutputFormat::Pretty;
    let analysis = analyze(folder, tool, options, mode, pretty)?;

    // Progress goes to stderr; the report itself is one stream on stdout.
    match output {
        OutputFormat::Pretty => Term::stdout()
            .write_str(&render_pretty_analysis(&analysis, mode))
            .map_err(|e| ToolkitError::Config(format!("failed to write output: {}", e)))?,
        OutputFormat::Json => export_json(&analysis, std::io::stdout().lock())
            .map_err(|e| ToolkitError::Config(format!("failed to write output: {}", e)))?,
        OutputFormat::Csv => export_csv(&analysis.table, std::io::stdout().lock())
            .map_err(|e| ToolkitError::Config(format!("failed to write output: {}", e)))?,
    }

    Ok(())
}

fn render_pretty_analysis(analysis: &FocalAnalysis, mode: ExtractionMode) -> String {
    let mut lines = vec![
        format!(
            "{} {}",
            style("Focal Length Analysis").bold().cyan(),
            style(format!("({} mode)", mode)).dim()
        ),
        String::new(),
        format!("{} Analysis Complete", style("✓").green().bold()),
        String::new(),
        format!(
            "  {} in {:.1}s",
            style(summary_line(analysis)).cyan(),
            analysis.duration_ms as f64 / 1000.0
        ),
        String::new(),
    ];

    if analysis.table.is_empty() {
        lines.push("  No focal length data found.".to_string());
    } else {
        lines.extend(
            HistogramRenderer::default()
                .render(&analysis.table)
                .lines()
                .map(String::from),
        );

        let top: Vec<String> = analysis
            .table
            .most_common(3)
            .iter()
            .map(|(fl, count)| format!("{} ({})", fl, count))
            .collect();
        lines.push(String::new());
        lines.push(format!("  {} {}", style("Most used:").bold(), top.join(", ")));
    }

    let cameras: Vec<String> = analysis
        .cameras()
        .iter()
        .take(3)
        .map(|(camera, count)| format!("{} ({})", camera, count))
        .collect();
    if !cameras.is_empty() {
        lines.push(format!("  {} {}", style("Cameras:").bold(), cameras.join(", ")));
    }

    if !analysis.errors.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "  {} {} problem(s):",
            style("!").yellow().bold(),
            analysis.errors.len()
        ));
        for error in &analysis.errors {
            lines.push(format!("    {}", style(error).dim()));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn run_compare(folder: &Path, tool: &ExifTool, options: &FocalOptions, output: OutputFormat) -> Result<()> {
    let term = Term::stdout();
    let pretty = output == OutputFormat::Pretty;

    let batched = analyze(folder, tool, options, ExtractionMode::Batched, pretty)?;
    let single = analyze(folder, tool, options, ExtractionMode::Single, pretty)?;
    let tables_match = batched.table == single.table;

    if !pretty {
        let report = serde_json::json!({
            "total_images": batched.total_images,
            "batched_ms": batched.duration_ms,
            "single_ms": single.duration_ms,
            "batched_unique": batched.unique_focal_lengths(),
            "single_unique": single.unique_focal_lengths(),
            "tables_match": tables_match,
        });
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| ToolkitError::Config(format!("failed to write output: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    term.write_line(&format!("{}", style("Mode Comparison").bold().underlined()))
        .ok();
    term.write_line(&format!("  images:   {}", batched.total_images)).ok();
    for (name, analysis) in [("batched", &batched), ("single", &single)] {
        term.write_line(&format!(
            "  {:<8}  {:>8.2}s  {} unique focal lengths",
            name,
            analysis.duration_ms as f64 / 1000.0,
            analysis.unique_focal_lengths()
        ))
        .ok();
    }
    if single.duration_ms > 0 {
        term.write_line(&format!(
            "  speedup:  {:.2}x",
            batched.duration_ms as f64 / single.duration_ms as f64
        ))
        .ok();
    }
    let verdict = if tables_match {
        style("results match").green().to_string()
    } else {
        style("results differ").red().to_string()
    };
    term.write_line(&format!("  {}", verdict)).ok();
    Ok(())
}

fn run_shutter(images: Vec<PathBuf>, tool: ExifTool, output: OutputFormat) -> Result<()> {
    let reader = ShutterCountReader::with_exiftool(tool);
    let results = reader.read_many(&images);

    // A missing exiftool fails every lookup the same way; report it once.
    if let Some((_, Err(ToolkitError::ExifTool(ExifToolError::NotFound { program })))) =
        results.iter().find(|(_, r)| {
            matches!(r, Err(ToolkitError::ExifTool(ExifToolError::NotFound { .. })))
        })
    {
        return Err(ExifToolError::NotFound {
            program: program.clone(),
        }
        .into());
    }

    if output != OutputFormat::Pretty {
        let rows: Vec<_> = results
            .iter()
            .map(|(path, result)| match result {
                Ok(ShutterCount::Count(n)) => serde_json::json!({ "path": path, "shutter_count": n }),
                Ok(ShutterCount::Raw(text)) => serde_json::json!({ "path": path, "shutter_count": text }),
                Ok(ShutterCount::NotAvailable) => serde_json::json!({ "path": path, "shutter_count": null }),
                Err(e) => serde_json::json!({ "path": path, "error": e.to_string() }),
            })
            .collect();
        let text = serde_json::to_string_pretty(&rows)
            .map_err(|e| ToolkitError::Config(format!("failed to write output: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    let term = Term::stdout();
    for (path, result) in &results {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        let line = match result {
            Ok(count) if count.is_available() => {
                format!("{} {}: {}", style("✓").green(), name, style(count).cyan().bold())
            }
            Ok(_) => format!(
                "{} {}: {}",
                style("○").dim(),
                name,
                style("shutter count not available for this camera").dim()
            ),
            Err(e) => format!("{} {}: {}", style("✗").red(), name, e),
        };
        term.write_line(&line).ok();
    }
    Ok(())
}

fn run_border(
    images: Vec<PathBuf>,
    output_dir: PathBuf,
    settings_file: Option<PathBuf>,
    preset: Option<String>,
    overrides: &BorderArgs,
    workers: usize,
) -> Result<()> {
    let term = Term::stderr();

    let base = match (settings_file, preset) {
        (Some(file), _) => BorderSettings::load(&file)?,
        (None, Some(name)) => PresetStore::open_default()?.load(&name)?,
        (None, None) => BorderSettings::default(),
    };
    let settings = overrides.apply_to(base)?;
    if settings.is_empty() {
        term.write_line(&format!(
            "{} all border widths are zero; images will be copied unchanged",
            style("!").yellow()
        ))
        .ok();
    }

    let borderer = BatchBorderer::new(settings, &output_dir)?.with_workers(workers);

    let (sender, receiver) = EventChannel::new();
    let progress = progress_bar(true);
    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Border(BorderEvent::Started { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Border(BorderEvent::Progress {
                    completed,
                    current_path,
                    ..
                }) => {
                    pb.set_position(completed as u64);
                    pb.set_message(current_path.file_name().unwrap_or_default().to_string_lossy().into_owned());
                }
                Event::Border(BorderEvent::Completed { .. }) => pb.finish_and_clear(),
                _ => {}
            }
        }
    });

    let result = borderer.run_with_events(&images, &sender);
    drop(sender);
    event_thread.join().ok();

    print_border_result(&Term::stdout(), &result?, &output_dir);
    Ok(())
}

fn print_border_result(term: &Term, result: &BorderBatchResult, output_dir: &Path) {
    term.write_line(&format!(
        "{} {} image(s) bordered into {} in {:.1}s",
        style("✓").green().bold(),
        style(result.succeeded).cyan(),
        output_dir.display(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if result.failed > 0 {
        term.write_line(&format!("{} {} failed:", style("✗").red().bold(), result.failed))
            .ok();
        for error in &result.errors {
            term.write_line(&format!("    {}", style(error).dim())).ok();
        }
    }
}

fn run_settings(command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Save { file, name, border } => {
            let mut settings = border.apply_to(BorderSettings::default())?;
            if let Some(name) = name {
                settings.name = name;
            }
            settings.save(&file)?;
            println!("Saved {} to {}", describe(&settings), file.display());
        }
        SettingsCommand::Show { file } => {
            let settings = BorderSettings::load(&file)?;
            println!("{}", describe(&settings));
        }
    }
    Ok(())
}

fn run_preset(command: PresetCommand) -> Result<()> {
    let store = PresetStore::open_default()?;
    match command {
        PresetCommand::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No presets saved in {}", store.dir().display());
            }
            for name in names {
                println!("{}", name);
            }
        }
        PresetCommand::Save { name, border } => {
            let settings = border.apply_to(BorderSettings::default())?.with_name(name);
            let path = store.save(&settings)?;
            println!("Saved {} to {}", describe(&settings), path.display());
        }
        PresetCommand::Show { name } => {
            println!("{}", describe(&store.load(&name)?));
        }
        PresetCommand::Remove { name } => {
            store.remove(&name)?;
            println!("Removed preset '{}'", name);
        }
    }
    Ok(())
}

fn describe(settings: &BorderSettings) -> String {
    format!(
        "'{}': top {}px, bottom {}px, left {}px, right {}px, color {}",
        settings.name, settings.top, settings.bottom, settings.left, settings.right, settings.color
    )
}
