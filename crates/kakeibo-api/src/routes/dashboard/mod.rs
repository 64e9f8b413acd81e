//! Dashboard routes - Series selector, chart, ledger data
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_chart, api_ledger, api_reload, api_series, htmx_chart};
pub use page::page_dashboard;
