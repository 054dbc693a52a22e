#[macro_use]
pub mod text_enum;
pub mod entity;
