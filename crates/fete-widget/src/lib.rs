//! Forecast widget: fetches the weather endpoint and renders one card per day.

pub mod client;
pub mod error;
pub mod render;

pub use client::{CardDay, WidgetClient};
pub use error::{WidgetError, FAILURE_MESSAGE};
pub use render::{icon_for, render_cards, render_error};
