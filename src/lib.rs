//! Distributed-memory dense LU factorization (Gaussian elimination without
//! pivoting) across lamellar PEs.
//!
//! Each PE owns a disjoint subset of matrix rows, assigned either in
//! contiguous blocks or round-robin. At every elimination step the owner of
//! the pivot row hands it to all other PEs, either through a one-to-all
//! broadcast or through explicit per-destination sends, and every PE then
//! updates its own still-active rows in place. The distribution scheme and
//! the exchange pattern are independent strategies composed into a single
//! engine, so all four combinations share one elimination loop.

use lamellar::LamellarWorld;

pub mod assemble;
pub mod channel;
pub mod distribution;
pub mod engine;
pub mod matrix;
pub mod options;
pub mod printer;
pub mod serial;
pub mod timing;

/// The PE that materializes the global matrix and reports results.
pub const ROOT_PE: usize = 0;

/// Per-rank execution context threaded through the assembler, the pivot
/// exchange, and the elimination engine.
#[derive(Clone)]
pub struct RankCtx {
    pub world: LamellarWorld,
    pub my_pe: usize,
    pub num_pes: usize,
}

impl RankCtx {
    pub fn new(world: &LamellarWorld) -> Self {
        RankCtx {
            world: world.clone(),
            my_pe: world.my_pe(),
            num_pes: world.num_pes(),
        }
    }
}
