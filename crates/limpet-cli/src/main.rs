use limpet_canvas::{Canvas, DragTarget, Viewport};
use limpet_core::{NodeKind, NodeMetadata, RenderConfig, SceneDocument};
use limpet_geom::{IntRect, IntVector, int_vector};
use limpet_render::{EdgeShape, SvgRenderOptions};
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use std::time::Instant;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Scene(limpet_core::Error),
    Canvas(limpet_canvas::Error),
    Json(serde_json::Error),
    Raster(&'static str),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Scene(err) => write!(f, "{err}"),
            CliError::Canvas(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Raster(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<limpet_core::Error> for CliError {
    fn from(value: limpet_core::Error) -> Self {
        Self::Scene(value)
    }
}

impl From<limpet_canvas::Error> for CliError {
    fn from(value: limpet_canvas::Error) -> Self {
        Self::Canvas(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Render,
    Drag,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    verbose: bool,
    render_format: RenderFormat,
    render_scale: f32,
    viewport_width: i32,
    viewport_height: i32,
    node: Option<String>,
    dx: i32,
    dy: i32,
    out: Option<String>,
    config: Option<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeOut<'a> {
    name: &'a str,
    kind: NodeKind,
    bounds: IntRect,
    minimized: bool,
    open: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOut<'a> {
    offset: IntVector,
    extent: IntRect,
    viewport: Viewport,
    nodes: Vec<NodeOut<'a>>,
    edges: Vec<&'a EdgeShape>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataOut<'a> {
    name: &'a str,
    metadata: &'a NodeMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DragOut<'a> {
    node: &'a str,
    shift: IntVector,
    offset: IntVector,
    written: Vec<MetadataOut<'a>>,
}

fn usage() -> &'static str {
    "limpet-cli\n\
\n\
USAGE:\n\
  limpet-cli [layout] [--pretty] [--viewport-width <w>] [--viewport-height <h>] [OPTIONS] [<path>|-]\n\
  limpet-cli render [--format svg|png] [--scale <n>] [--out <path>] [OPTIONS] [<path>|-]\n\
  limpet-cli drag --node <name> [--dx <n>] [--dy <n>] [--pretty] [OPTIONS] [<path>|-]\n\
\n\
OPTIONS:\n\
  --config <json>   JSON object merged over the scene's config (e.g. '{\"em\": 16}')\n\
  -v, --verbose     log debug events to stderr\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the scene is read from stdin.\n\
  - Scenes are JSON when they start with '{', YAML otherwise.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to writing next to the input file (or ./out.png for stdin).\n\
  - drag moves the node's center by (dx, dy) pixels and prints the metadata written back.\n\
  - -v logs debug events to stderr; RUST_LOG overrides the filter otherwise.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Layout,
        render_format: RenderFormat::Svg,
        render_scale: 1.0,
        viewport_width: 800,
        viewport_height: 600,
        ..Default::default()
    };

    fn number<T: FromStr>(value: Option<&String>) -> Result<T, CliError> {
        value
            .and_then(|v| v.parse::<T>().ok())
            .ok_or(CliError::Usage(usage()))
    }

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "drag" => args.command = Command::Drag,
            "--pretty" => args.pretty = true,
            "-v" | "--verbose" => args.verbose = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.render_scale = number(it.next())?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--viewport-width" => args.viewport_width = number(it.next())?,
            "--viewport-height" => args.viewport_height = number(it.next())?,
            "--node" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.node = Some(name.clone());
            }
            "--dx" => args.dx = number(it.next())?,
            "--dy" => args.dy = number(it.next())?,
            "--config" => {
                let Some(text) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let overrides: serde_json::Value = serde_json::from_str(text)?;
                if !overrides.is_object() {
                    return Err(CliError::Usage(usage()));
                }
                args.config = Some(overrides);
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }
    if args.viewport_width <= 0 || args.viewport_height <= 0 {
        return Err(CliError::Usage(usage()));
    }
    if matches!(args.command, Command::Drag) && args.node.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn render_svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, CliError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "DejaVu Sans".to_string();
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|_| CliError::Raster("failed to parse SVG for PNG rendering"))?;

    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px)
        .ok_or(CliError::Raster("failed to allocate pixmap for PNG rendering"))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|_| CliError::Raster("failed to encode PNG"))
}

fn load_canvas(args: &Args) -> Result<Canvas, CliError> {
    let text = read_input(args.input.as_deref())?;
    let mut loaded = SceneDocument::from_str_auto(&text)?.build()?;
    if let Some(overrides) = &args.config {
        loaded.config.merge_overrides(overrides);
    }
    let config = RenderConfig::from_config(&loaded.config);
    tracing::debug!(
        nodes = loaded.scene.node_count(),
        edges = loaded.scene.edge_count(),
        "scene loaded"
    );
    Ok(Canvas::new(
        loaded.scene,
        config,
        euclid::size2(args.viewport_width, args.viewport_height),
    ))
}

fn run(args: Args) -> Result<(), CliError> {
    let mut canvas = load_canvas(&args)?;
    match args.command {
        Command::Layout => {
            let out = LayoutOut {
                offset: canvas.offset(),
                extent: canvas.extent(),
                viewport: canvas.viewport(),
                nodes: canvas
                    .scene()
                    .nodes()
                    .map(|n| NodeOut {
                        name: &n.name,
                        kind: n.kind,
                        bounds: n.bounds(),
                        minimized: n.is_minimized(),
                        open: n.is_open(),
                    })
                    .collect(),
                edges: canvas.shapes(),
            };
            write_json(&out, args.pretty)
        }
        Command::Render => {
            let shapes = canvas.shapes();
            let svg = limpet_render::render_svg(
                canvas.scene(),
                shapes.iter().copied(),
                canvas.config(),
                canvas.measurer(),
                &SvgRenderOptions::default(),
            );
            match args.render_format {
                RenderFormat::Svg => write_text(&svg, args.out.as_deref()),
                RenderFormat::Png => {
                    let bytes = render_svg_to_png(&svg, args.render_scale)?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "png")
                            .to_string_lossy()
                            .to_string()
                    });
                    if out == "-" {
                        use std::io::Write;
                        std::io::stdout().lock().write_all(&bytes)?;
                    } else {
                        std::fs::write(out, bytes)?;
                    }
                    Ok(())
                }
            }
        }
        Command::Drag => {
            let name = args.node.clone().unwrap_or_default();
            let id = canvas.scene().try_node_id(&name)?;
            let grab = canvas.scene().try_node(id)?.bounds().center();

            let mut gesture = canvas.begin_drag(DragTarget::Node(id), grab)?;
            let update = gesture.drag_to(grab + int_vector(args.dx, args.dy), Instant::now())?;
            let written = gesture.finish()?;

            let out = DragOut {
                node: &name,
                shift: update.shift,
                offset: canvas.offset(),
                written: written
                    .iter()
                    .filter_map(|(id, metadata)| {
                        let node = canvas.scene().node(*id)?;
                        Some(MetadataOut {
                            name: &node.name,
                            metadata,
                        })
                    })
                    .collect(),
            };
            write_json(&out, args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
