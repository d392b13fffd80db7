use clap::ValueEnum;
use std::ops::Range;

/// How global rows are assigned to PEs.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDistribution {
    /// Contiguous row ranges, one block per PE.
    Block,
    /// Rows dealt round-robin across PEs.
    Cyclic,
}

impl RowDistribution {
    pub fn label(&self) -> &'static str {
        match self {
            RowDistribution::Block => "Block",
            RowDistribution::Cyclic => "Cyclic",
        }
    }

    pub fn file_tag(&self) -> &'static str {
        match self {
            RowDistribution::Block => "block",
            RowDistribution::Cyclic => "cyclic",
        }
    }
}

/// A distribution scheme bound to a matrix dimension and PE count.
///
/// The row dimension is padded up to `n_ext = num_pes * ceil(n / num_pes)`
/// so every PE holds an equal-sized block; padded rows carry no data and are
/// excluded from every step's working range. All mappings are pure functions
/// of `(scheme, n, num_pes, k)` and are valid for `k` in `[0, n_ext)`.
///
/// `num_pes == 0` is a caller error and panics on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMap {
    pub scheme: RowDistribution,
    pub n: usize,
    pub num_pes: usize,
    pub n_ext: usize,
    pub rows_per_pe: usize,
}

impl RowMap {
    pub fn new(scheme: RowDistribution, n: usize, num_pes: usize) -> RowMap {
        let n_ext = if n % num_pes != 0 {
            n + num_pes - n % num_pes
        } else {
            n
        };
        RowMap {
            scheme,
            n,
            num_pes,
            n_ext,
            rows_per_pe: n_ext / num_pes,
        }
    }

    /// The PE owning global row `k`.
    pub fn owner(&self, k: usize) -> usize {
        match self.scheme {
            RowDistribution::Block => k / self.rows_per_pe,
            RowDistribution::Cyclic => k % self.num_pes,
        }
    }

    /// The local slot of global row `k` on its owning PE.
    pub fn local_slot(&self, k: usize) -> usize {
        match self.scheme {
            RowDistribution::Block => k % self.rows_per_pe,
            RowDistribution::Cyclic => k / self.num_pes,
        }
    }

    /// The global row held in `slot` on `pe`; inverse of
    /// `owner`/`local_slot`. May name a padded row.
    pub fn global_index(&self, pe: usize, slot: usize) -> usize {
        match self.scheme {
            RowDistribution::Block => pe * self.rows_per_pe + slot,
            RowDistribution::Cyclic => slot * self.num_pes + pe,
        }
    }

    /// Count of unpadded rows owned by `pe`.
    pub fn rows_owned(&self, pe: usize) -> usize {
        (0..self.rows_per_pe)
            .filter(|&slot| self.global_index(pe, slot) < self.n)
            .count()
    }

    /// The ordered local slots on `pe` whose rows are still unfinalized at
    /// step `k`: global index strictly greater than `k` and strictly less
    /// than `n` (padded rows never participate).
    ///
    /// Across all PEs the returned slots cover the global rows `k+1..n`
    /// exactly once. On the owner of row `k` the range starts strictly
    /// after the pivot's own slot.
    pub fn active_rows(&self, pe: usize, k: usize) -> Range<usize> {
        match self.scheme {
            RowDistribution::Block => {
                let block_start = pe * self.rows_per_pe;
                let lo = if k < block_start {
                    0
                } else {
                    k - block_start + 1
                };
                let hi = self
                    .n
                    .saturating_sub(block_start)
                    .min(self.rows_per_pe);
                lo.min(hi)..hi
            }
            RowDistribution::Cyclic => {
                let p = self.num_pes;
                let lo = if k < pe {
                    0
                } else {
                    k / p + if pe <= k % p { 1 } else { 0 }
                };
                let hi = (self.n.saturating_sub(pe) + p - 1) / p;
                let hi = hi.min(self.rows_per_pe);
                lo.min(hi)..hi
            }
        }
    }
}
