use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jigsnap_core::{Assembly, LayoutConfig, TabPolarity, Vec2};
use rand::Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jigsnap", version, about = "Generate and assemble jigsaw puzzle layouts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the puzzle view as JSON.
    Layout {
        #[command(flatten)]
        layout: LayoutArgs,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Print every piece outline as an SVG document.
    Svg {
        #[command(flatten)]
        layout: LayoutArgs,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Scatter the pieces, then drag them back together one group at a time.
    Demo {
        #[command(flatten)]
        layout: LayoutArgs,
        #[arg(long)]
        scatter_seed: Option<String>,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// TOML file with layout settings; flags override its values.
    #[arg(long, env = "JIGSNAP_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    cols: Option<u32>,
    #[arg(long)]
    rows: Option<u32>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    connector_ratio: Option<f32>,
    #[arg(long, value_parser = parse_polarity)]
    polarity: Option<TabPolarity>,
    #[arg(long)]
    seed: Option<String>,
}

#[derive(Args)]
struct TableArgs {
    /// Scatter the pieces before printing. Takes an optional seed.
    #[arg(long, num_args = 0..=1, default_missing_value = "random")]
    scatter: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { layout, table } => {
            let mut assembly = layout.load()?.build()?;
            table.apply(&mut assembly)?;
            println!("{}", serde_json::to_string_pretty(&assembly.view())?);
        }
        Commands::Svg { layout, table } => {
            let mut assembly = layout.load()?.build()?;
            table.apply(&mut assembly)?;
            print!("{}", render_svg(&assembly)?);
        }
        Commands::Demo {
            layout,
            scatter_seed,
        } => {
            let config = layout.load()?;
            let mut assembly = config.build()?;
            let seed = resolve_seed(scatter_seed.as_deref())?;
            let (width, height) = table_size(&config);
            assembly.scatter(seed, width, height);
            tracing::info!(seed, groups = assembly.group_count(), "scattered puzzle");
            solve(&mut assembly)?;
        }
    }

    Ok(())
}

impl LayoutArgs {
    fn load(&self) -> Result<LayoutConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str::<LayoutConfig>(&raw)?
            }
            None => LayoutConfig::default(),
        };
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(width) = self.width {
            config.image_width = width;
        }
        if let Some(height) = self.height {
            config.image_height = height;
        }
        if let Some(ratio) = self.connector_ratio {
            config.connector_ratio = ratio;
        }
        if let Some(polarity) = self.polarity {
            config.polarity = polarity;
        }
        if let Some(raw) = self.seed.as_deref() {
            config.seed = parse_seed_arg(raw)?;
        }
        tracing::debug!(?config, "resolved layout config");
        Ok(config)
    }
}

impl TableArgs {
    fn apply(&self, assembly: &mut Assembly) -> Result<(), Box<dyn std::error::Error>> {
        let Some(raw) = self.scatter.as_deref() else {
            return Ok(());
        };
        let seed = if raw == "random" {
            resolve_seed(None)?
        } else {
            parse_seed_arg(raw)?
        };
        let grid = assembly.grid();
        let width = (grid.tile_width * grid.cols + grid.dx) as f32 * 2.0;
        let height = (grid.tile_height * grid.rows + grid.dy) as f32 * 2.0;
        assembly.scatter(seed, width, height);
        tracing::info!(seed, "scattered puzzle");
        Ok(())
    }
}

fn table_size(config: &LayoutConfig) -> (f32, f32) {
    (config.image_width as f32 * 2.0, config.image_height as f32 * 2.0)
}

fn resolve_seed(raw: Option<&str>) -> Result<u32, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => parse_seed_arg(raw),
        None => Ok(rand::rng().random()),
    }
}

/// Drops the group of the first piece that is not yet attached to piece 0
/// onto the anchor group's frame until a single group remains.
fn solve(assembly: &mut Assembly) -> Result<(), Box<dyn std::error::Error>> {
    let max_drops = assembly.pieces().len() * 2;
    for _ in 0..max_drops {
        if assembly.is_solved() {
            break;
        }
        let anchor = assembly.owner_of(0).ok_or("puzzle has no pieces")?;
        let anchor_offset = assembly
            .group(anchor)
            .map(|group| group.offset())
            .ok_or("anchor group vanished")?;
        let Some(loose) = (0..assembly.pieces().len()).find(|id| assembly.owner_of(*id) != Some(anchor)) else {
            break;
        };
        let group = assembly.owner_of(loose).ok_or("piece has no group")?;
        let grab = assembly
            .piece_mid(loose)
            .zip(assembly.group(group))
            .map(|(mid, group)| group.to_local(mid))
            .ok_or("piece has no group")?;

        assembly.drag_start(group, grab)?;
        assembly.drag_move(group, anchor_offset + grab)?;
        for event in assembly.drag_end(group)? {
            println!("{}", serde_json::to_string(&event)?);
        }
        let progress = assembly.progress();
        tracing::info!(
            groups = assembly.group_count(),
            connected = progress.connected,
            total = progress.total,
            "dropped group {group}"
        );
    }
    if !assembly.is_solved() {
        return Err("puzzle did not come together".into());
    }
    Ok(())
}

fn render_svg(assembly: &Assembly) -> Result<String, std::fmt::Error> {
    let mut min = Vec2::new(0.0, 0.0);
    let mut max = Vec2::new(0.0, 0.0);
    for piece in assembly.pieces() {
        if let Some(position) = assembly.piece_position(piece.id()) {
            let texture = piece.texture_rect();
            min = min.min(position);
            max = max.max(position + Vec2::new(texture.width, texture.height));
        }
    }
    let size = max - min;
    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        min.x, min.y, size.x, size.y
    )?;
    for &group in assembly.z_order() {
        let Some(group) = assembly.group(group) else {
            continue;
        };
        for &id in group.members() {
            let Some(position) = assembly.piece_position(id) else {
                continue;
            };
            let Some(piece) = assembly.piece(id) else {
                continue;
            };
            let mut path = String::new();
            for (i, point) in piece.outline().iter().enumerate() {
                let point = *point + position;
                let op = if i == 0 { 'M' } else { 'L' };
                write!(path, "{op}{:.2} {:.2} ", point.x, point.y)?;
            }
            path.push('Z');
            writeln!(
                svg,
                r#"  <path data-piece="{id}" data-group="{}" d="{path}" fill="none" stroke="black"/>"#,
                group.id()
            )?;
        }
    }
    svg.push_str("</svg>\n");
    Ok(svg)
}

fn parse_polarity(raw: &str) -> Result<TabPolarity, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "outward" => Ok(TabPolarity::Outward),
        "seeded" => Ok(TabPolarity::Seeded),
        other => Err(format!("unknown polarity {other:?}, expected outward or seeded")),
    }
}

fn parse_seed_arg(raw: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u32>()?
    };
    Ok(value)
}
