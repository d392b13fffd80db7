use lamellar::active_messaging::prelude::*;
use lamellar::darc::prelude::*;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{RankCtx, ROOT_PE};

/// One rank's wall-clock totals for a run, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankTimes {
    pub total: f64,
    pub computation: f64,
    pub communication: f64,
}

impl RankTimes {
    /// Split a measured run into its components; computation is whatever
    /// the rank was not blocked in a transfer for.
    pub fn from_run(total: Duration, communication: Duration) -> RankTimes {
        let total = total.as_secs_f64();
        let communication = communication.as_secs_f64().min(total);
        RankTimes {
            total,
            communication,
            computation: total - communication,
        }
    }
}

/// Element-wise max and average of every rank's times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimesSummary {
    pub max: RankTimes,
    pub avg: RankTimes,
}

pub fn summarize(all: &[RankTimes]) -> TimesSummary {
    let count = all.len() as f64;
    let mut max = RankTimes::default();
    let mut sum = RankTimes::default();
    for t in all {
        max.total = max.total.max(t.total);
        max.computation = max.computation.max(t.computation);
        max.communication = max.communication.max(t.communication);
        sum.total += t.total;
        sum.computation += t.computation;
        sum.communication += t.communication;
    }
    TimesSummary {
        max,
        avg: RankTimes {
            total: sum.total / count,
            computation: sum.computation / count,
            communication: sum.communication / count,
        },
    }
}

#[lamellar::AmData(Clone, Debug)]
struct ReportTimesAm {
    times: RankTimes,
    sink: Darc<Mutex<Vec<RankTimes>>>,
}

#[lamellar::am]
impl LamellarAM for ReportTimesAm {
    async fn exec(self) {
        self.sink.lock().push(self.times);
    }
}

/// Combine every rank's times on the root. Collective; timing stays
/// rank-local until this single reduction after the elimination loop.
pub fn reduce_to_root(ctx: &RankCtx, times: RankTimes) -> Option<TimesSummary> {
    let sink: Darc<Mutex<Vec<RankTimes>>> =
        Darc::new(&ctx.world, Mutex::new(Vec::new())).expect("darc should be created");
    if ctx.my_pe == ROOT_PE {
        sink.lock().push(times);
    } else {
        ctx.world.block_on(ctx.world.exec_am_pe(
            ROOT_PE,
            ReportTimesAm {
                times,
                sink: sink.clone(),
            },
        ));
    }
    ctx.world.barrier();
    if ctx.my_pe == ROOT_PE {
        Some(summarize(&sink.lock()))
    } else {
        None
    }
}
