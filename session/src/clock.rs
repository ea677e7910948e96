//! Fixed-step accumulator for the session loop.

use std::time::Duration;

/// Outcome of feeding one frame's elapsed time into the accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StepPlan {
    pub(crate) ticks_to_run: u32,
    pub(crate) remaining_accumulator: Duration,
    pub(crate) dropped_backlog: Duration,
}

/// Splits `accumulator` into whole steps, dropping backlog beyond the clamp.
pub(crate) fn plan_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_steps_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0_u32;
    if fixed_dt.is_zero() {
        return StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        };
    }

    while accumulator >= fixed_dt && ticks_to_run < max_steps_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(10);

    #[test]
    fn partial_steps_stay_in_the_accumulator() {
        let plan = plan_steps(Duration::from_millis(25), DT, 5);
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(5));
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn backlog_beyond_the_clamp_is_dropped() {
        let plan = plan_steps(Duration::from_millis(87), DT, 5);
        assert_eq!(plan.ticks_to_run, 5);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(37));
    }
}
