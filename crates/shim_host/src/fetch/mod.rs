//! Request/response models and live network fetch contracts.

pub mod network;
pub mod request;
