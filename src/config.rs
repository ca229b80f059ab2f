use crate::error::ConfigError;

use std::path::PathBuf;

/// Largest motif order accepted for a run. Canonical labeling cost grows
/// factorially beyond this.
pub const MAX_MOTIF_ORDER: usize = 10;

/// How seeds are split between the threads of one PE. PEs themselves are
/// always statically strided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    StaticStride,
    #[default]
    SharedCounter,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub motif_order: usize,
    pub threads: usize,
    pub show_results: bool,
    pub seed_policy: SeedPolicy,
    pub shuffle_seed: Option<u64>,
    pub expected_pes: Option<usize>,
    pub dump_bin: bool,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, motif_order: usize) -> RunConfig {
        RunConfig {
            input: input.into(),
            motif_order,
            threads: 1,
            show_results: false,
            seed_policy: SeedPolicy::default(),
            shuffle_seed: None,
            expected_pes: None,
            dump_bin: false,
        }
    }

    pub fn validate(&self, num_pes: usize) -> Result<(), ConfigError> {
        if !(2..=MAX_MOTIF_ORDER).contains(&self.motif_order) {
            return Err(ConfigError::MotifOrder {
                found: self.motif_order,
                max: MAX_MOTIF_ORDER,
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::NoThreads);
        }
        match self.expected_pes {
            Some(expected) if expected != num_pes => Err(ConfigError::PeCount {
                expected,
                found: num_pes,
            }),
            _ => Ok(()),
        }
    }

    /// Where `--dump-bin` writes the parsed graph.
    pub fn bin_path(&self) -> PathBuf {
        let mut path = self.input.clone().into_os_string();
        path.push(".bin");
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        let mut config = RunConfig::new("graph.txt", 3);
        assert_eq!(config.validate(4), Ok(()));

        config.motif_order = 1;
        assert!(matches!(
            config.validate(4),
            Err(ConfigError::MotifOrder { found: 1, .. })
        ));
        config.motif_order = MAX_MOTIF_ORDER + 1;
        assert!(config.validate(4).is_err());
        config.motif_order = 4;

        config.threads = 0;
        assert_eq!(config.validate(4), Err(ConfigError::NoThreads));
        config.threads = 2;

        config.expected_pes = Some(2);
        assert_eq!(
            config.validate(4),
            Err(ConfigError::PeCount {
                expected: 2,
                found: 4,
            })
        );
        assert_eq!(config.validate(2), Ok(()));
    }

    #[test]
    fn bin_path_appends_extension() {
        let config = RunConfig::new("data/yeast.txt", 3);
        assert_eq!(config.bin_path(), PathBuf::from("data/yeast.txt.bin"));
    }
}
