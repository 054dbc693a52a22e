mod integration;
mod media_event;
mod notification;
mod status;
mod subscription;

pub mod dtos {
    pub use crate::media_event::dtos::*;
    pub use crate::notification::dtos::*;
    pub use crate::subscription::dtos::*;
}

pub use crate::integration::api::*;
pub use crate::media_event::api::*;
pub use crate::notification::api::*;
pub use crate::status::api::*;
pub use crate::subscription::api::*;
