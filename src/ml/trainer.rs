// Daily revenue trend training
// Fits revenue against days elapsed since the first observed sale

use chrono::NaiveDate;
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, ArrayView1};
use tracing::{info, warn};

use super::features::feature_matrix;
use super::{LinearTrend, MlError, Predictor};
use crate::data::DailyRevenue;

/// Outcome of one training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub model: LinearTrend,
    /// Origin for `days_since_start`; must travel with the model
    pub reference_date: NaiveDate,
    pub samples: usize,
    /// In-sample mean squared error
    pub mse: f64,
    /// In-sample coefficient of determination
    pub r_squared: f64,
}

/// Fit an ordinary least squares trend over daily revenue.
///
/// When every sample sits on the same day offset (a single day of history)
/// the fit is degenerate: slope zero, intercept the mean revenue.
pub fn train(samples: &[DailyRevenue]) -> Result<TrainingReport, MlError> {
    let reference_date = samples
        .iter()
        .map(|s| s.sale_date)
        .min()
        .ok_or(MlError::NoSamples)?;

    let dates: Vec<NaiveDate> = samples.iter().map(|s| s.sale_date).collect();
    let x = feature_matrix(&dates, reference_date);
    let y: Array1<f64> = samples.iter().map(|s| s.daily_revenue).collect();

    let spans_multiple_days = dates.iter().any(|d| *d != reference_date);

    let model = if spans_multiple_days {
        let dataset = Dataset::new(x.clone(), y.clone());
        let fitted = LinearRegression::default()
            .fit(&dataset)
            .map_err(|e| MlError::Fit(e.to_string()))?;
        LinearTrend::new(fitted.params()[0], fitted.intercept())
    } else {
        warn!(
            samples = samples.len(),
            "All samples fall on one day, fitting a flat trend"
        );
        LinearTrend::new(0.0, y.mean().unwrap_or(0.0))
    };

    let fitted_values = model.predict(x.view())?;
    let (mse, r_squared) = fit_quality(y.view(), fitted_values.view());

    info!(
        samples = samples.len(),
        reference_date = %reference_date,
        slope = model.slope,
        intercept = model.intercept,
        mse,
        r_squared,
        "Trained daily revenue trend"
    );

    Ok(TrainingReport {
        model,
        reference_date,
        samples: samples.len(),
        mse,
        r_squared,
    })
}

/// Mean squared error and R² of `predicted` against `actual`
fn fit_quality(actual: ArrayView1<'_, f64>, predicted: ArrayView1<'_, f64>) -> (f64, f64) {
    let n = actual.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }

    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let mean = actual.sum() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    (ss_res / n, r_squared)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(day: u32, revenue: f64) -> DailyRevenue {
        DailyRevenue {
            sale_date: NaiveDate::from_ymd_opt(2024, 1, day).expect("valid date"),
            daily_revenue: revenue,
        }
    }

    #[test]
    fn test_train_recovers_exact_line() {
        // revenue = 2 * days + 10, with a gap on Jan 4
        let samples = vec![
            sample(1, 10.0),
            sample(2, 12.0),
            sample(3, 14.0),
            sample(5, 18.0),
            sample(6, 20.0),
        ];

        let report = train(&samples).unwrap();

        assert_eq!(report.reference_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(report.samples, 5);
        assert!((report.model.slope - 2.0).abs() < 1e-6, "slope {}", report.model.slope);
        assert!((report.model.intercept - 10.0).abs() < 1e-6, "intercept {}", report.model.intercept);
        assert!(report.mse < 1e-9);
        assert!((report.r_squared - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_train_reference_is_earliest_even_if_unsorted() {
        let samples = vec![sample(9, 30.0), sample(3, 10.0), sample(6, 20.0)];

        let report = train(&samples).unwrap();

        assert_eq!(report.reference_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(report.model.slope > 0.0);
    }

    #[test]
    fn test_train_without_samples_fails() {
        assert!(matches!(train(&[]), Err(MlError::NoSamples)));
    }

    #[test]
    fn test_single_sample_gives_flat_trend() {
        let report = train(&[sample(15, 250.0)]).unwrap();

        assert_eq!(report.model.slope, 0.0);
        assert_eq!(report.model.intercept, 250.0);
        assert_eq!(report.mse, 0.0);
    }

    #[test]
    fn test_fit_quality_of_noisy_fit() {
        let actual = ndarray::array![1.0, 2.0, 3.0];
        let predicted = ndarray::array![1.0, 3.0, 3.0];

        let (mse, r2) = fit_quality(actual.view(), predicted.view());

        assert!((mse - 1.0 / 3.0).abs() < 1e-12);
        assert!((r2 - 0.5).abs() < 1e-12);
    }
}
