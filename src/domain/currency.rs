//! Home-currency conversion.

use super::series::{PricePoint, PriceSeries};

/// Multiply an instrument series by the exchange-rate series, elementwise.
/// Both series must already share one date index; alignment happens upstream.
pub fn to_home_currency(prices: &PriceSeries, fx: &PriceSeries) -> PriceSeries {
    debug_assert_eq!(prices.points.len(), fx.points.len());

    let points = prices
        .points
        .iter()
        .zip(&fx.points)
        .map(|(price, rate)| {
            debug_assert_eq!(price.date, rate.date);
            PricePoint {
                date: price.date,
                price: price.price * rate.price,
            }
        })
        .collect();

    PriceSeries {
        symbol: prices.symbol.clone(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            symbol,
            closes
                .iter()
                .enumerate()
                .map(|(i, &price)| PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    price,
                })
                .collect(),
        )
    }

    #[test]
    fn converts_elementwise() {
        let prices = series("AAA", &[100.0, 110.0, 120.0]);
        let fx = series("USDTWD=X", &[30.0, 31.0, 32.0]);

        let home = to_home_currency(&prices, &fx);

        assert_eq!(home.symbol, "AAA");
        assert!((home.points[0].price - 3000.0).abs() < 1e-9);
        assert!((home.points[1].price - 3410.0).abs() < 1e-9);
        assert!((home.points[2].price - 3840.0).abs() < 1e-9);
    }

    #[test]
    fn unit_rate_is_identity_on_values() {
        let prices = series("AAA", &[100.0, 110.0]);
        let fx = series("FX", &[1.0, 1.0]);

        let home = to_home_currency(&prices, &fx);
        for (a, b) in prices.points.iter().zip(&home.points) {
            assert!((a.price - b.price).abs() < f64::EPSILON);
        }
    }

    proptest! {
        #[test]
        fn product_holds_at_every_index(
            closes in proptest::collection::vec(1.0_f64..1000.0, 1..30),
            rates in proptest::collection::vec(0.01_f64..100.0, 30),
        ) {
            let n = closes.len();
            let prices = series("AAA", &closes);
            let fx = series("FX", &rates[..n]);

            let home = to_home_currency(&prices, &fx);
            for i in 0..n {
                prop_assert!((home.points[i].price - closes[i] * rates[i]).abs() < 1e-9);
            }
        }
    }
}
