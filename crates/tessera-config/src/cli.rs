//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Tessera command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessera", about = "Biome slice sampler")]
pub struct CliArgs {
    /// World biome seed.
    #[arg(long, allow_hyphen_values = true)]
    pub seed: Option<i64>,

    /// Use column (2D) biomes instead of 3D biomes.
    #[arg(long)]
    pub flat: bool,

    /// Worker threads for background rebuilds (0 = auto).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Center section to probe, as `x,y,z`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub center: Option<Vec<i32>>,

    /// Block Y of the printed layer, relative to the center section.
    #[arg(long, allow_hyphen_values = true)]
    pub layer: Option<i32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.sampler.biome_seed = seed;
        }
        if args.flat {
            self.sampler.three_d = false;
        }
        if let Some(threads) = args.threads {
            self.workers.threads = threads;
        }
        if let Some([x, y, z]) = args.center.as_deref().and_then(|c| <[i32; 3]>::try_from(c).ok()) {
            self.probe.center = [x, y, z];
        }
        if let Some(layer) = args.layer {
            self.probe.layer_y = layer;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(-12),
            flat: true,
            center: Some(vec![1, -2, 3]),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.sampler.biome_seed, -12);
        assert!(!config.sampler.three_d);
        assert_eq!(config.probe.center, [1, -2, 3]);
        // Non-overridden fields retain defaults
        assert_eq!(config.workers.threads, 0);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_negative_values() {
        let args = CliArgs::try_parse_from([
            "tessera",
            "--seed",
            "-4962768465676381896",
            "--center",
            "-1,4,-9",
            "--layer",
            "-3",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(-4_962_768_465_676_381_896));
        assert_eq!(args.center, Some(vec![-1, 4, -9]));
        assert_eq!(args.layer, Some(-3));
    }
}
