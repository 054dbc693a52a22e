use super::{
    sync_event_reminders::SyncEventRemindersUseCase,
    upsert_event::{UpsertEventResponse, UpsertEventUseCase},
};
use crate::shared::usecase::{execute, Subscriber};
use binge_calendar_infra::BingeContext;

pub struct SyncRemindersOnEventUpserted;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpsertEventUseCase> for SyncRemindersOnEventUpserted {
    async fn notify(&self, res: &UpsertEventResponse, ctx: &BingeContext) {
        if !res.applied {
            return;
        }
        let sync_event_reminders = SyncEventRemindersUseCase { event: &res.event };

        // Sideeffect, ignore result
        let _ = execute(sync_event_reminders, ctx).await;
    }
}
