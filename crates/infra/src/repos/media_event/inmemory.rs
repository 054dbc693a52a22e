use super::IMediaEventRepo;
use crate::repos::shared::inmemory_repo::*;
use binge_calendar_domain::{MediaEvent, ID};

pub struct InMemoryMediaEventRepo {
    events: std::sync::Mutex<Vec<MediaEvent>>,
}

impl InMemoryMediaEventRepo {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IMediaEventRepo for InMemoryMediaEventRepo {
    async fn insert(&self, e: &MediaEvent) -> anyhow::Result<()> {
        insert(e, &self.events);
        Ok(())
    }

    async fn upsert_if_newer(&self, e: &MediaEvent) -> anyhow::Result<bool> {
        let mut events = self.events.lock().unwrap();
        match events.iter_mut().find(|stored| stored.id == e.id) {
            Some(stored) if stored.version >= e.version => Ok(false),
            Some(stored) => {
                *stored = e.clone();
                Ok(true)
            }
            None => {
                events.push(e.clone());
                Ok(true)
            }
        }
    }

    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<MediaEvent>> {
        Ok(find(event_id, &self.events))
    }

    async fn find_many(&self, event_ids: &[ID]) -> anyhow::Result<Vec<MediaEvent>> {
        Ok(find_by(&self.events, |event| event_ids.contains(&event.id)))
    }

    async fn delete(&self, event_id: &ID) -> Option<MediaEvent> {
        delete(event_id, &self.events)
    }
}
