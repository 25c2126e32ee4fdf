//! Daily price series and the shared-index alignment step.
//!
//! Raw series from a quote source may have gaps and differing coverage.
//! [`align`] builds one gap-free date index shared by every series; everything
//! downstream (drag adjustment, currency conversion, valuation) assumes
//! pre-aligned input and never reindexes.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::error::FolioduelError;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// An ordered (date, price) sequence for one symbol. Dates strictly increase.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_point(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last_point(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Align a set of raw series onto one shared, gap-free date index.
///
/// The index is the union of all observed dates. Each series is forward-filled
/// over that index; rows on which at least one series has no observation yet
/// are leading rows and are dropped, so the output starts at the first date
/// every series can quote. Output series all have identical dates.
pub fn align(raw: &[PriceSeries]) -> Result<Vec<PriceSeries>, FolioduelError> {
    if raw.is_empty() {
        return Err(FolioduelError::DataUnavailable {
            what: "no quote series to align".into(),
        });
    }

    let index: BTreeSet<NaiveDate> = raw
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.date))
        .collect();
    let dates: Vec<NaiveDate> = index.into_iter().collect();

    let maps: Vec<BTreeMap<NaiveDate, f64>> = raw
        .iter()
        .map(|s| s.points.iter().map(|p| (p.date, p.price)).collect())
        .collect();

    // Forward-fill each series over the union index. A slot stays None only
    // before the series' first observation.
    let mut filled: Vec<Vec<Option<f64>>> = Vec::with_capacity(maps.len());
    for map in &maps {
        let mut last = None;
        let column = dates
            .iter()
            .map(|d| {
                if let Some(&v) = map.get(d) {
                    last = Some(v);
                }
                last
            })
            .collect();
        filled.push(column);
    }

    let start = (0..dates.len()).find(|&i| filled.iter().all(|col| col[i].is_some()));
    let Some(start) = start else {
        return Err(FolioduelError::DataUnavailable {
            what: "no overlapping quote history across symbols".into(),
        });
    };

    let aligned = raw
        .iter()
        .zip(filled)
        .map(|(series, column)| PriceSeries {
            symbol: series.symbol.clone(),
            points: dates[start..]
                .iter()
                .zip(&column[start..])
                .filter_map(|(&date, value)| value.map(|price| PricePoint { date, price }))
                .collect(),
        })
        .collect();

    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(symbol: &str, points: &[(u32, f64)]) -> PriceSeries {
        PriceSeries::new(
            symbol,
            points
                .iter()
                .map(|&(day, price)| PricePoint { date: d(day), price })
                .collect(),
        )
    }

    #[test]
    fn align_forward_fills_interior_gaps() {
        let a = series("AAA", &[(1, 10.0), (2, 11.0), (4, 12.0)]);
        let b = series("BBB", &[(1, 5.0), (3, 6.0), (4, 7.0)]);

        let aligned = align(&[a, b]).unwrap();

        assert_eq!(aligned[0].points.len(), 4);
        assert_eq!(aligned[1].points.len(), 4);
        // AAA has no observation on day 3: carried forward from day 2.
        assert!((aligned[0].points[2].price - 11.0).abs() < f64::EPSILON);
        // BBB has no observation on day 2: carried forward from day 1.
        assert!((aligned[1].points[1].price - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn align_drops_leading_rows_until_all_series_quote() {
        let old = series("OLD", &[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
        let young = series("YOUNG", &[(3, 30.0), (4, 40.0)]);

        let aligned = align(&[old, young]).unwrap();

        // The shared index starts where the youngest series starts.
        assert_eq!(aligned[0].points[0].date, d(3));
        assert_eq!(aligned[0].points.len(), 2);
        assert_eq!(aligned[1].points.len(), 2);
        assert!((aligned[0].points[0].price - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn align_builds_union_index() {
        let a = series("AAA", &[(1, 1.0), (3, 3.0)]);
        let b = series("BBB", &[(1, 10.0), (2, 20.0)]);

        let aligned = align(&[a, b]).unwrap();

        let dates: Vec<NaiveDate> = aligned[0].points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
        // BBB day 3 is forward-filled from day 2.
        assert!((aligned[1].points[2].price - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn align_empty_input_is_data_unavailable() {
        let result = align(&[]);
        assert!(matches!(
            result,
            Err(FolioduelError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn align_series_without_observations_is_data_unavailable() {
        let a = series("AAA", &[(1, 1.0), (2, 2.0)]);
        let empty = PriceSeries::new("EMPTY", Vec::new());

        let result = align(&[a, empty]);
        assert!(matches!(
            result,
            Err(FolioduelError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn align_single_series_passes_through() {
        let a = series("AAA", &[(1, 1.0), (2, 2.0)]);
        let aligned = align(&[a.clone()]).unwrap();
        assert_eq!(aligned[0], a);
    }
}
