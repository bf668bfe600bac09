//! Wire and view types shared between the mail core and the HTTP layer.
pub mod api;
pub mod models;
