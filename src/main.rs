use clap::Parser;
use lamellar::active_messaging::prelude::*;
use rand::prelude::*;

use lu_factor::channel::PivotChannel;
use lu_factor::distribution::{RowDistribution, RowMap};
use lu_factor::engine;
use lu_factor::matrix::DenseMatrix;
use lu_factor::options::LuCli;
use lu_factor::printer;
use lu_factor::timing;
use lu_factor::{RankCtx, ROOT_PE};

fn main() {
    let world = lamellar::LamellarWorldBuilder::new().build();
    let ctx = RankCtx::new(&world);
    let cli = LuCli::parse();

    if ctx.my_pe == ROOT_PE {
        cli.describe(ctx.num_pes);
    }

    let distributions = match &cli.distributions {
        Some(d) => d.clone(),
        None => vec![RowDistribution::Block, RowDistribution::Cyclic],
    };
    let channels = match &cli.channels {
        Some(c) => c.clone(),
        None => vec![PivotChannel::Broadcast, PivotChannel::PointToPoint],
    };

    for distribution in &distributions {
        for channel in &channels {
            for _ in 0..cli.iterations {
                run_config(&ctx, &cli, *distribution, *channel);
            }
        }
    }
}

fn run_config(ctx: &RankCtx, cli: &LuCli, distribution: RowDistribution, channel: PivotChannel) {
    let n = cli.matrix_size;
    let map = RowMap::new(distribution, n, ctx.num_pes);
    let path = printer::report_path(&cli.output_dir, distribution, channel);

    // the global matrix lives on the root only, padded rows zeroed
    let global = if ctx.my_pe == ROOT_PE {
        let mut m = DenseMatrix::zeros(map.n_ext, n);
        m.fill_random(n, &mut SeedableRng::seed_from_u64(cli.seed));
        printer::start_report(&path).expect("report file should be writable");
        printer::append_section(&path, "Initial Array", &m, n)
            .expect("report file should be writable");
        Some(m)
    } else {
        None
    };

    let (gathered, times) = engine::run_factorization(ctx, &map, channel, global.as_ref());
    let summary = timing::reduce_to_root(ctx, times);

    if ctx.my_pe == ROOT_PE {
        let label = format!("LU-{}-{}", distribution.label(), channel.label());
        printer::print_summary(
            &label,
            n,
            ctx.num_pes,
            &summary.expect("root receives the reduction"),
        );
        let mut result = gathered.expect("root receives the gathered matrix");
        result.truncate_rows(n);
        printer::append_section(&path, "Final Array", &result, n)
            .expect("report file should be writable");
    }
    ctx.world.barrier();
}
