//! GPIO bank drivers over `embedded-hal` pin traits.

pub mod input_bank;
pub mod relay_bank;
