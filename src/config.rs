use crate::mix::DEFAULT_DENSITY_MAX;
use crate::sampling::Distribution;

#[derive(Debug, clap::Args)]
pub struct Config {
    /// Scatter glitter with Poisson-disc sampling, which keeps pieces from bunching up, instead
    /// of independent uniform points.
    #[clap(long)]
    pub poisson: bool,

    /// Only allow glitter combinations listed in the catalog. Entries that are not are moved to
    /// the closest valid size and shape.
    #[clap(long)]
    pub valid_only: bool,

    /// Top of the density scale. Densities are clamped to `1..=density_max`.
    #[clap(long, default_value_t = DEFAULT_DENSITY_MAX)]
    pub density_max: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            poisson: false,
            valid_only: false,
            density_max: DEFAULT_DENSITY_MAX,
        }
    }
}

impl Config {
    pub fn distribution(&self) -> Distribution {
        if self.poisson {
            Distribution::PoissonDisc
        } else {
            Distribution::Uniform
        }
    }
}
