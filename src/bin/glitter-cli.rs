use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use glitter::art::{self, Scene};
use glitter::catalog::Catalog;
use glitter::color::{ColorDb, Rgb};
use glitter::config::Config;
use glitter::mix::MixState;
use glitter::nail::NailSilhouette;
use glitter::rand::Rng;

#[derive(Parser)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a mix previously exported as JSON.
    Render {
        mix: PathBuf,
        #[clap(flatten)]
        output: Output,
        #[clap(flatten)]
        common: Common,
    },
    /// Make up a random mix and render it.
    Random {
        /// Seed for choosing the glitters. Defaults to the current time.
        #[clap(long)]
        seed: Option<u32>,
        /// Number of glitters. Defaults to 2 to 4.
        #[clap(long)]
        count: Option<usize>,
        /// Also write the mix as JSON.
        #[clap(long)]
        export: Option<PathBuf>,
        #[clap(flatten)]
        output: Output,
        #[clap(flatten)]
        common: Common,
    },
}

#[derive(Args)]
struct Output {
    /// PNG output path.
    #[clap(long)]
    png: Option<PathBuf>,
    /// SVG output path.
    #[clap(long)]
    svg: Option<PathBuf>,
    #[clap(short, default_value = "800")]
    width: i32,
}

#[derive(Args)]
struct Common {
    /// SVG drawing to take the finger and nail outlines from.
    #[clap(long)]
    nail_svg: Option<PathBuf>,
    /// JSON list of valid glitter combinations, used with `--valid-only`.
    #[clap(long)]
    catalog: Option<PathBuf>,
    /// Skin tone, by palette name or as a hex color.
    #[clap(long)]
    skin_tone: Option<String>,
    #[clap(flatten)]
    config: Config,
}

struct Env {
    palette: ColorDb,
    catalog: Catalog,
    silhouette: NailSilhouette,
    state: MixState,
}

impl Common {
    fn env(&self) -> anyhow::Result<Env> {
        let palette = ColorDb::from_bundle();
        let catalog = match &self.catalog {
            Some(path) => Catalog::load_or_default(path),
            None => Catalog::default(),
        };
        let silhouette = match &self.nail_svg {
            Some(path) => NailSilhouette::load_or_default(path),
            None => NailSilhouette::default(),
        };
        let mut state = MixState::with_palette(&palette, self.config.density_max);
        if let Some(tone) = &self.skin_tone {
            let color = match palette.skin_tone(tone) {
                Some(t) => t.color,
                None => Rgb::parse(tone)
                    .with_context(|| format!("unknown skin tone {:?}", tone))?,
            };
            state.set_skin_tone(color);
        }
        Ok(Env {
            palette,
            catalog,
            silhouette,
            state,
        })
    }

    fn filter<'a>(&self, catalog: &'a Catalog) -> Option<&'a Catalog> {
        self.config.valid_only.then_some(catalog)
    }
}

fn write_outputs(scene: &Scene, output: &Output, default_stem: &Path) -> anyhow::Result<()> {
    let png = match (&output.png, &output.svg) {
        (None, None) => Some(default_stem.with_extension("png")),
        (png, _) => png.clone(),
    };
    if let Some(path) = png {
        let canvas = art::draw(scene, output.width);
        canvas
            .write_png(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("wrote png: {}", path.display());
    }
    if let Some(path) = &output.svg {
        let width = u32::try_from(output.width.max(1)).unwrap_or(1);
        std::fs::write(path, art::svg::render(scene, width))
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("wrote svg: {}", path.display());
    }
    Ok(())
}

fn render(mix: &Path, output: &Output, common: &Common) -> anyhow::Result<()> {
    let Env {
        palette,
        catalog,
        silhouette,
        mut state,
    } = common.env()?;
    let json = std::fs::read_to_string(mix)
        .with_context(|| format!("failed to read {}", mix.display()))?;
    state
        .import_json(&json)
        .with_context(|| format!("failed to import {}", mix.display()))?;
    if let Some(valid) = common.filter(&catalog) {
        state.apply_filter(valid, &palette);
    }
    for g in state.entries() {
        tracing::info!(title = %g.title(&palette), density = g.density, "glitter");
    }
    let scene = Scene::new(&state, silhouette, common.config.distribution());
    write_outputs(&scene, output, mix)
}

fn time_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u32)
}

fn random(
    seed: Option<u32>,
    count: Option<usize>,
    export: Option<&Path>,
    output: &Output,
    common: &Common,
) -> anyhow::Result<()> {
    let Env {
        palette,
        catalog,
        silhouette,
        mut state,
    } = common.env()?;
    let seed = seed.unwrap_or_else(time_seed);
    let mut rng = Rng::from_seed(seed);
    let filter = common.filter(&catalog);
    match count {
        Some(n) => {
            for _ in 0..n {
                state.add_random(&mut rng, &palette, filter);
            }
        }
        None => state.randomize(&mut rng, &palette, filter),
    }
    for g in state.entries() {
        eprintln!("{} (density {})", g.title(&palette), g.density);
    }
    if let Some(path) = export {
        std::fs::write(path, state.export_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("wrote mix: {}", path.display());
    }
    let scene = Scene::new(&state, silhouette, common.config.distribution());
    write_outputs(&scene, output, Path::new(&format!("glitter-{}", seed)))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    match &opts.command {
        Command::Render {
            mix,
            output,
            common,
        } => render(mix, output, common),
        Command::Random {
            seed,
            count,
            export,
            output,
            common,
        } => random(*seed, *count, export.as_deref(), output, common),
    }
}
