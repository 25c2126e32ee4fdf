//! Report output port trait.

use crate::domain::comparison::ComparisonReport;
use crate::domain::error::FolioduelError;

/// Port for writing comparison reports. The core never depends on how, or
/// whether, results get rendered.
pub trait ReportPort {
    fn write(&self, report: &ComparisonReport, output_path: &str) -> Result<(), FolioduelError>;
}
