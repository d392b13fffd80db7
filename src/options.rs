use clap::Parser;

use crate::channel::PivotChannel;
use crate::distribution::RowDistribution;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct LuCli {
    /// Matrix dimension N
    pub matrix_size: usize,

    #[arg(short, long, default_value_t = 1)]
    pub iterations: usize,

    /// Row distribution schemes to run; defaults to all
    #[arg(value_enum, short, long, num_args(0..))]
    pub distributions: Option<Vec<RowDistribution>>,

    /// Pivot exchange patterns to run; defaults to all
    #[arg(value_enum, short, long, num_args(0..))]
    pub channels: Option<Vec<PivotChannel>>,

    #[arg(short, long, default_value_t = 42)]
    pub seed: u64,

    #[arg(short, long, default_value = ".")]
    pub output_dir: String,
}

impl LuCli {
    pub fn describe(&self, num_pes: usize) {
        println!("matrix size: {}", self.matrix_size);
        println!("processes: {}", num_pes);
        println!("iterations: {}", self.iterations);
        println!("distributions: {:?}", self.distributions);
        println!("channels: {:?}", self.channels);
        println!("seed: {}", self.seed);
        println!("output dir: {}", self.output_dir);
    }
}
