//! Charts module - Chart preparation and PNG rendering

mod plotter;
mod renderer;

pub use plotter::{
    ChartData, ChartKind, ChartPlotter, Series, PALETTE, PRIMARY_COLOR, SECTION_COUNT,
};
pub use renderer::StaticChartRenderer;
