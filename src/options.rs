use lamellar_motifs::{RunConfig, SeedPolicy};

use clap::{Parser, ValueEnum};

use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Policy {
    /// fixed stride over every thread of every PE
    Static,
    /// threads of a PE share one claim counter
    Dynamic,
}

/// count the motifs of order k in an undirected graph
#[derive(Parser)]
#[command(author, version, long_about = None)]
pub struct MotifCli {
    /// edge list, one whitespace separated pair per line, or a `.bin` image
    pub graph_file: PathBuf,

    /// motif order k
    pub motif_size: usize,

    #[arg(short, long, env = "LAMELLAR_THREADS", default_value_t = 1)]
    pub launch_threads: usize,

    #[arg(long)]
    pub show_results: bool,

    #[arg(value_enum, short, long, default_value_t = Policy::Dynamic)]
    pub policy: Policy,

    /// shuffle edge records with a fixed seed
    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    /// fail unless the world has exactly this many PEs
    #[arg(long)]
    pub expected_pes: Option<usize>,

    /// write the parsed graph next to the input as `<graph_file>.bin`
    #[arg(long)]
    pub dump_bin: bool,
}

impl MotifCli {
    pub fn describe(&self, num_pes: usize) {
        println!("graph file: {}", self.graph_file.display());
        println!("motif size: {}", self.motif_size);
        println!("pes: {num_pes}");
        println!("launch threads: {}", self.launch_threads);
        println!("policy: {:?}", self.policy);
        if let Some(seed) = self.shuffle_seed {
            println!("shuffle seed: {seed}");
        }
    }

    pub fn into_config(self) -> RunConfig {
        RunConfig {
            input: self.graph_file,
            motif_order: self.motif_size,
            threads: self.launch_threads,
            show_results: self.show_results,
            seed_policy: match self.policy {
                Policy::Static => SeedPolicy::StaticStride,
                Policy::Dynamic => SeedPolicy::SharedCounter,
            },
            shuffle_seed: self.shuffle_seed,
            expected_pes: self.expected_pes,
            dump_bin: self.dump_bin,
        }
    }
}
