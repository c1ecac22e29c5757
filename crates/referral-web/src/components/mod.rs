mod kpi;
mod panel;

pub use kpi::{Kpi, KpiGrid};
pub use panel::Panel;
