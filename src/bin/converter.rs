//! CLI binary for docshift.
//!
//! A thin shim over the library crate: maps CLI flags to `ConversionConfig`,
//! runs one conversion, prints the result, and turns errors into exit codes.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use docshift::{
    convert, ConversionConfig, ConversionProgressCallback, ConversionRequest, ConvertError,
    PageSize, ProgressCallback, SUPPORTED_PAIRS,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar, sized once the page count is known.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening input…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.set_message("");
    }

    fn on_page_complete(&self, _page_num: usize, _total_pages: usize) {
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_pages: usize) {
        self.clear();
    }
}

impl CliProgressCallback {
    /// Remove the bar from the terminal; safe to call more than once.
    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Image to a single A4 page
  converter photo.jpg jpg pdf

  # Every page of a PDF as PNG at 150 DPI (report-0.png, report-1.png, ...)
  converter --dpi 150 report.pdf pdf png

  # PDF text into a spreadsheet, one line per row
  converter statement.pdf pdf xlsx

  # Presentation through LibreOffice, JSON report on stdout
  converter --json deck.pptx pptx pdf

SUPPORTED CONVERSIONS:
  jpg, jpeg, png, txt, docx, pptx, xlsx  ->  pdf
  pdf  ->  jpg, jpeg, png, txt, pptx, xlsx

  The output file is the input path with its extension replaced.

EXIT CODES:
  0  success
  1  usage or configuration error
  2  unsupported conversion
  3  file I/O error
  4  conversion engine error (pdfium, LibreOffice, encoders)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  PDFIUM_CACHE_DIR        Extra directory searched for libpdfium
  DOCSHIFT_FONT           TrueType font for text pages (same as --font)
  RUST_LOG                Log filter, overrides -v / -q
"#;

/// Convert a file between PDF and image, text and office formats.
#[derive(Parser, Debug)]
#[command(
    name = "converter",
    version,
    about = "Convert a file between PDF and image, text and office formats",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// File to convert.
    #[arg(required_unless_present = "list")]
    input: Option<PathBuf>,

    /// Source format extension (e.g. jpg, txt, pdf).
    #[arg(required_unless_present = "list")]
    source_ext: Option<String>,

    /// Target format extension (e.g. pdf, png, xlsx).
    #[arg(required_unless_present = "list")]
    target_ext: Option<String>,

    /// Rendering DPI for PDF→image and PDF→pptx (72–600).
    #[arg(long, env = "DOCSHIFT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Page size for generated PDFs: a4 or letter.
    #[arg(long, env = "DOCSHIFT_PAGE_SIZE", default_value = "a4", value_parser = parse_page_size)]
    page_size: PageSize,

    /// TrueType font for txt/docx→pdf, needed for non-Latin text.
    #[arg(long, env = "DOCSHIFT_FONT")]
    font: Option<PathBuf>,

    /// Explicit LibreOffice `soffice` binary.
    #[arg(long, env = "DOCSHIFT_SOFFICE")]
    soffice: Option<PathBuf>,

    /// LibreOffice timeout in seconds.
    #[arg(long, env = "DOCSHIFT_OFFICE_TIMEOUT", default_value_t = 120,
          value_parser = clap::value_parser!(u64).range(1..))]
    office_timeout: u64,

    /// Print the conversion report as JSON instead of the confirmation line.
    #[arg(long)]
    json: bool,

    /// List supported conversions and exit.
    #[arg(long)]
    list: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSHIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCSHIFT_QUIET")]
    quiet: bool,
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    PageSize::from_name(s).ok_or_else(|| format!("unknown page size '{s}' (expected a4 or letter)"))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless verbose output is requested.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress = (show_progress && !cli.list).then(CliProgressCallback::new);

    match run(&cli, progress.clone()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(ref bar) = progress {
                bar.clear();
            }
            eprintln!("{} {err:#}", red("Error:"));
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Exit status for `err`; errors raised outside the library are usage errors.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ConvertError>()
        .map(ConvertError::exit_code)
        .unwrap_or(1)
}

fn run(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<()> {
    if cli.list {
        for (src, tgt) in SUPPORTED_PAIRS {
            println!("{src}->{tgt}");
        }
        return Ok(());
    }

    let (Some(input), Some(source_ext), Some(target_ext)) =
        (&cli.input, &cli.source_ext, &cli.target_ext)
    else {
        anyhow::bail!("expected <INPUT> <SOURCE_EXT> <TARGET_EXT>");
    };

    let progress_cb: Option<ProgressCallback> =
        progress.map(|cb| cb as Arc<dyn ConversionProgressCallback>);
    let config = build_config(cli, progress_cb)?;

    let request = ConversionRequest::new(input, source_ext, target_ext);
    let report = convert(&request, &config)
        .with_context(|| format!("Conversion of {} failed", bold(&input.display().to_string())))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        for output in &report.outputs {
            println!(
                "Conversion completed: {} -> {}",
                input.display(),
                output.display()
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .page_size(cli.page_size)
        .office_timeout_secs(cli.office_timeout);

    if let Some(ref font) = cli.font {
        builder = builder.font_path(font);
    }
    if let Some(ref soffice) = cli.soffice {
        builder = builder.soffice_path(soffice);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    Ok(builder.build()?)
}
