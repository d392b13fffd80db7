use lamellar::active_messaging::prelude::*;
use lamellar::darc::prelude::*;

use crate::distribution::{RowDistribution, RowMap};
use crate::matrix::{DenseMatrix, LocalStore};
use crate::{RankCtx, ROOT_PE};

#[lamellar::AmData(Clone, Debug)]
struct LoadRowsAm {
    start_slot: usize,
    width: usize,
    rows: Vec<f64>,
    store: Darc<LocalStore>,
}

#[lamellar::am]
impl LamellarAM for LoadRowsAm {
    async fn exec(self) {
        let count = self.rows.len() / self.width;
        let mut block = self.store.rows.lock();
        block
            .rows_flat_mut(self.start_slot, count)
            .copy_from_slice(&self.rows);
    }
}

#[lamellar::AmData(Clone, Debug)]
struct FetchRowsAm {
    start_slot: usize,
    count: usize,
    store: Darc<LocalStore>,
}

#[lamellar::am]
impl LamellarAM for FetchRowsAm {
    async fn exec(self) -> Vec<f64> {
        let block = self.store.rows.lock();
        block.rows_flat(self.start_slot, self.count).to_vec()
    }
}

/// Distribute the root's global matrix into every PE's local store.
///
/// Block shares are contiguous, so each PE gets its whole slab in one
/// transfer. Cyclic shares are not, so the root walks slot by slot, sending
/// global row `slot * P + pe` into each PE's `slot`. Collective: every rank
/// must call this; only the root passes the matrix.
pub fn scatter(ctx: &RankCtx, map: &RowMap, global: Option<&DenseMatrix>, store: &Darc<LocalStore>) {
    if ctx.my_pe == ROOT_PE {
        let global = global.expect("the root rank holds the assembled matrix");
        let mut reqs = vec![];
        match map.scheme {
            RowDistribution::Block => {
                for pe in 0..ctx.num_pes {
                    reqs.push(ctx.world.exec_am_pe(
                        pe,
                        LoadRowsAm {
                            start_slot: 0,
                            width: map.n,
                            rows: global.rows_flat(pe * map.rows_per_pe, map.rows_per_pe).to_vec(),
                            store: store.clone(),
                        },
                    ));
                }
            }
            RowDistribution::Cyclic => {
                for slot in 0..map.rows_per_pe {
                    for pe in 0..ctx.num_pes {
                        reqs.push(ctx.world.exec_am_pe(
                            pe,
                            LoadRowsAm {
                                start_slot: slot,
                                width: map.n,
                                rows: global.row(map.global_index(pe, slot)).to_vec(),
                                store: store.clone(),
                            },
                        ));
                    }
                }
            }
        }
        ctx.world.block_on(futures::future::join_all(reqs));
    }
    ctx.world.barrier();
}

/// Pull every PE's local store back into a global matrix on the root,
/// mirroring `scatter` transfer for transfer. Collective; returns the
/// reassembled (still padded) matrix on the root, `None` elsewhere.
pub fn gather(ctx: &RankCtx, map: &RowMap, store: &Darc<LocalStore>) -> Option<DenseMatrix> {
    let gathered = if ctx.my_pe == ROOT_PE {
        let mut global = DenseMatrix::zeros(map.n_ext, map.n);
        match map.scheme {
            RowDistribution::Block => {
                for pe in 0..ctx.num_pes {
                    let rows = ctx.world.block_on(ctx.world.exec_am_pe(
                        pe,
                        FetchRowsAm {
                            start_slot: 0,
                            count: map.rows_per_pe,
                            store: store.clone(),
                        },
                    ));
                    global
                        .rows_flat_mut(pe * map.rows_per_pe, map.rows_per_pe)
                        .copy_from_slice(&rows);
                }
            }
            RowDistribution::Cyclic => {
                for slot in 0..map.rows_per_pe {
                    for pe in 0..ctx.num_pes {
                        let row = ctx.world.block_on(ctx.world.exec_am_pe(
                            pe,
                            FetchRowsAm {
                                start_slot: slot,
                                count: 1,
                                store: store.clone(),
                            },
                        ));
                        global
                            .row_mut(map.global_index(pe, slot))
                            .copy_from_slice(&row);
                    }
                }
            }
        }
        Some(global)
    } else {
        None
    };
    ctx.world.barrier();
    gathered
}
