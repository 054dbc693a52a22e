use crate::{
    reminder::dispatch_due_reminders::DispatchDueRemindersUseCase, shared::usecase::execute,
};
use binge_calendar_infra::BingeContext;
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::info;

/// Whole seconds until the next minute starts. A full minute when `now_ts`
/// is right on a minute.
pub fn get_start_delay(now_ts: usize) -> usize {
    60 - (now_ts / 1000) % 60
}

/// Runs the reminder dispatch loop. The first tick happens at the start
/// of the next minute. Ticks never overlap within one process, a slow tick
/// delays the next one.
pub fn start_dispatch_reminders_job(ctx: BingeContext) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize);
        sleep(Duration::from_secs(secs_to_next_run as u64)).await;

        info!(
            "Starting reminder dispatch loop with an interval of {} seconds",
            ctx.config.dispatch_interval_secs
        );
        let mut dispatch_interval = interval(Duration::from_secs(ctx.config.dispatch_interval_secs));
        dispatch_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            dispatch_interval.tick().await;
            // Errors are logged by the usecase, the next tick tries again
            let _ = execute(DispatchDueRemindersUseCase {}, &ctx).await;
        }
    });
}
