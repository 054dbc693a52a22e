use serde::{Deserialize, Serialize};

/// Body of every error response
#[derive(Debug, Deserialize, Serialize)]
pub struct APIErrorResponse {
    pub status: u16,
    pub message: String,
}

pub mod get_service_health {
    use super::*;

    #[derive(Deserialize, Serialize)]
    pub struct APIResponse {
        pub message: String,
        /// Version of the running service
        pub version: String,
    }
}
