use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use log::info;
use overstrike::glyphs::GlyphLibrary;
use overstrike::prepare::PrepareParams;
use overstrike::render::{Layout, OverstrikeConfig};
use overstrike::{render_image_file, OverstrikeError};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Single,
    Pair,
}

impl From<LayoutArg> for Layout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Single => Layout::Single,
            LayoutArg::Pair => Layout::Pair,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "overstrike",
    version,
    about = "Render an image as overstruck teletype text"
)]
struct Cli {
    /// Picture to render
    #[arg(value_hint = ValueHint::FilePath)]
    image: PathBuf,

    /// Glyph table (JSON object of key -> rows x cols x bins histograms)
    #[arg(long, value_hint = ValueHint::FilePath)]
    table: PathBuf,

    /// Render configuration (JSON); flags below override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Picture width in characters
    #[arg(long, default_value_t = 66)]
    width: usize,

    /// Overstrike passes per character
    #[arg(long)]
    layers: Option<usize>,

    /// Share of a glyph's ink that must fit the remaining ink, in [0, 1]
    #[arg(long)]
    layer_factor: Option<f32>,

    /// Single characters or pre-scanned character pairs; defaults to what the table holds
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Characters allowed on the first layer
    #[arg(long)]
    first_layer: Option<String>,

    /// Characters allowed on later layers
    #[arg(long)]
    later_layers: Option<String>,

    /// Characters allowed as the first character of a key
    #[arg(long)]
    left: Option<String>,

    /// Characters allowed as the second character of a pair
    #[arg(long)]
    right: Option<String>,

    #[arg(long, default_value_t = 1.0)]
    gamma: f32,

    /// Invert intensities before rendering
    #[arg(long)]
    invert: bool,

    /// Spaces in front of every line
    #[arg(long)]
    indent: Option<usize>,

    /// Caption printed under the picture
    #[arg(long)]
    title: Option<String>,

    /// Output file, `-` for stdout [default: <IMAGE>.txt]
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    #[cfg(feature = "tracing")]
    {
        overstrike::core::init_tracing(verbose, overstrike::core::LogFormat::Plain);
        // Already installed when tracing-subscriber carries its own bridge.
        let _ = tracing_log::LogTracer::init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = overstrike::core::level_from_verbosity(verbose);
        let _ = overstrike::core::init_with_level(level);
    }
}

fn run(cli: &Cli) -> Result<(), OverstrikeError> {
    let mut config = match &cli.config {
        Some(path) => OverstrikeConfig::load_json(path)?,
        None => OverstrikeConfig::teletype(),
    };
    apply_overrides(cli, &mut config);

    let library = GlyphLibrary::load_json(&cli.table, config.geometry)?;
    match cli.layout {
        Some(layout) => config.render.layout = layout.into(),
        None if cli.config.is_none() && library.keys().all(|k| k.is_pair()) => {
            info!("glyph table only holds pairs, using the pair layout");
            config.render.layout = Layout::Pair;
        }
        None => {}
    }

    let prepare = PrepareParams {
        width: cli.width,
        gamma: cli.gamma,
        invert: cli.invert,
        ..PrepareParams::default()
    };
    let job = render_image_file(&cli.image, &library, &config, &prepare)?;

    match cli.output.as_deref() {
        Some(path) if path == Path::new("-") => {
            let stdout = io::stdout();
            job.write_to(stdout.lock())?;
        }
        other => {
            let path = other
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_output(&cli.image));
            fs::File::create(&path)?.write_all(&job.to_bytes())?;
            info!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn apply_overrides(cli: &Cli, config: &mut OverstrikeConfig) {
    if let Some(layers) = cli.layers {
        config.render.layers = layers;
    }
    if let Some(factor) = cli.layer_factor {
        config.render.layer_factor = factor;
    }
    if let Some(chars) = &cli.first_layer {
        config.candidates.first_layer = Some(chars.clone());
    }
    if let Some(chars) = &cli.later_layers {
        config.candidates.later_layers = Some(chars.clone());
    }
    if let Some(chars) = &cli.left {
        config.candidates.filter.left = Some(chars.clone());
    }
    if let Some(chars) = &cli.right {
        config.candidates.filter.right = Some(chars.clone());
    }
    if let Some(indent) = cli.indent {
        config.compose.indent = indent;
    }
    if cli.title.is_some() {
        config.job.title = cli.title.clone();
    }
    config.job.width = cli.width;
}

/// `<IMAGE>.txt`, next to the picture.
fn default_output(image: &Path) -> PathBuf {
    let mut name = OsString::from(image.as_os_str());
    name.push(".txt");
    PathBuf::from(name)
}
