//! Quote source port trait.

use crate::domain::comparison::Window;
use crate::domain::error::FolioduelError;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;

pub trait QuotePort {
    /// Daily closes for each requested symbol over the window. Symbols the
    /// source cannot serve are absent from the result, not errors; the run
    /// decides downstream whether an absence excludes a portfolio or aborts.
    fn fetch_closes(
        &self,
        symbols: &[String],
        window: Window,
    ) -> Result<Vec<PriceSeries>, FolioduelError>;

    /// Available (first date, last date, row count) for one symbol, `None`
    /// when the source has nothing for it.
    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FolioduelError>;
}
