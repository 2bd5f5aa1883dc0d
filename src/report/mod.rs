//! Report Module
//!
//! チャート描画とレポート組み立て

mod assembler;
mod render;

pub use assembler::{assemble, Report};
pub use render::{ChartDocument, ChartRenderer, ChartTrace, JsonChartRenderer, TraceStyle};
