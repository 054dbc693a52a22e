use crate::dtos::MediaEventDTO;
use binge_calendar_domain::{MediaEvent, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEventResponse {
    pub event: MediaEventDTO,
}

impl MediaEventResponse {
    pub fn new(event: MediaEvent) -> Self {
        Self {
            event: MediaEventDTO::new(event),
        }
    }
}

pub mod get_event {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    pub type APIResponse = MediaEventResponse;
}
