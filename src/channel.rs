use lamellar::active_messaging::prelude::*;
use lamellar::darc::prelude::*;

use clap::ValueEnum;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::RankCtx;

/// How the pivot row travels from its owner to everyone else.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotChannel {
    /// One one-to-all transfer per step, synchronized by a barrier.
    Broadcast,
    /// One explicit blocking send per destination, matched by one blocking
    /// receive per non-owner.
    PointToPoint,
}

impl PivotChannel {
    pub fn label(&self) -> &'static str {
        match self {
            PivotChannel::Broadcast => "bcast",
            PivotChannel::PointToPoint => "p2p",
        }
    }

    pub fn file_tag(&self) -> &'static str {
        self.label()
    }
}

/// Per-PE landing area for pivot rows in flight.
///
/// Deliveries are keyed by step index. The point-to-point pattern has no
/// per-step barrier, so a fast owner may have step `k+1`'s row in flight
/// while a lagging PE still owes a take for step `k`; keying by step keeps
/// the two from overwriting each other, the same matching a tagged receive
/// provides.
#[derive(Debug)]
pub struct PivotMailbox {
    pending: Mutex<HashMap<usize, Vec<f64>>>,
}

impl PivotMailbox {
    pub fn new() -> PivotMailbox {
        PivotMailbox {
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn deliver(&self, step: usize, row: Vec<f64>) {
        self.pending.lock().insert(step, row);
    }

    /// Block until the row for `step` arrives. The lock is released between
    /// polls so deliveries can land while we wait.
    pub fn take(&self, step: usize) -> Vec<f64> {
        loop {
            if let Some(row) = self.pending.lock().remove(&step) {
                return row;
            }
            std::thread::yield_now();
        }
    }
}

impl Default for PivotMailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[lamellar::AmData(Clone, Debug)]
struct BroadcastPivotAm {
    step: usize,
    from: usize,
    row: Vec<f64>,
    mailbox: Darc<PivotMailbox>,
}

#[lamellar::am]
impl LamellarAM for BroadcastPivotAm {
    async fn exec(self) {
        // the owner keeps reading its authoritative local row
        if lamellar::current_pe != self.from {
            self.mailbox.deliver(self.step, self.row.clone());
        }
    }
}

#[lamellar::AmData(Clone, Debug)]
struct SendPivotAm {
    step: usize,
    row: Vec<f64>,
    mailbox: Darc<PivotMailbox>,
}

#[lamellar::am]
impl LamellarAM for SendPivotAm {
    async fn exec(self) {
        self.mailbox.deliver(self.step, self.row.clone());
    }
}

impl PivotChannel {
    /// Run step `step`'s pivot hand-off on this rank.
    ///
    /// The owner passes its copy of the pivot row in `own_row` and gets
    /// `None` back; every other rank gets the received row. On return this
    /// rank's view of the pivot row is authoritative for columns `step..n`.
    /// Also returns the time this rank spent blocked in the transfer.
    ///
    /// Every rank must call this with the same `step` sequence; a rank that
    /// skips a step deadlocks the exchange, and nothing here detects it.
    pub fn exchange(
        &self,
        ctx: &RankCtx,
        mailbox: &Darc<PivotMailbox>,
        step: usize,
        owner: usize,
        own_row: Option<Vec<f64>>,
    ) -> (Option<Vec<f64>>, Duration) {
        match self {
            PivotChannel::Broadcast => {
                let timer = Instant::now();
                if ctx.my_pe == owner {
                    let row = own_row.expect("owner must supply the pivot row");
                    ctx.world.block_on(ctx.world.exec_am_all(BroadcastPivotAm {
                        step,
                        from: owner,
                        row,
                        mailbox: mailbox.clone(),
                    }));
                    ctx.world.barrier();
                    (None, timer.elapsed())
                } else {
                    ctx.world.barrier();
                    let row = mailbox.take(step);
                    (Some(row), timer.elapsed())
                }
            }
            PivotChannel::PointToPoint => {
                if ctx.my_pe == owner {
                    let row = own_row.expect("owner must supply the pivot row");
                    let mut spent = Duration::ZERO;
                    for dest in 0..ctx.num_pes {
                        if dest == owner {
                            continue;
                        }
                        let timer = Instant::now();
                        ctx.world.block_on(ctx.world.exec_am_pe(
                            dest,
                            SendPivotAm {
                                step,
                                row: row.clone(),
                                mailbox: mailbox.clone(),
                            },
                        ));
                        spent += timer.elapsed();
                    }
                    (None, spent)
                } else {
                    let timer = Instant::now();
                    let row = mailbox.take(step);
                    (Some(row), timer.elapsed())
                }
            }
        }
    }
}
