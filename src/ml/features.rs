use chrono::NaiveDate;
use ndarray::Array2;

/// Whole days from `reference` to `date`. Negative when `date` is earlier.
pub fn days_since_start(date: NaiveDate, reference: NaiveDate) -> i64 {
    date.signed_duration_since(reference).num_days()
}

/// One-column feature matrix of `days_since_start` values, one row per date
pub fn feature_matrix(dates: &[NaiveDate], reference: NaiveDate) -> Array2<f64> {
    Array2::from_shape_fn((dates.len(), 1), |(row, _)| {
        days_since_start(dates[row], reference) as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_days_since_start_counts_calendar_days() {
        let reference = ymd(2024, 1, 1);
        assert_eq!(days_since_start(reference, reference), 0);
        assert_eq!(days_since_start(ymd(2024, 1, 11), reference), 10);
        // leap day
        assert_eq!(days_since_start(ymd(2024, 3, 1), reference), 60);
        assert_eq!(days_since_start(ymd(2023, 12, 31), reference), -1);
    }

    #[test]
    fn test_feature_matrix_shape_and_values() {
        let reference = ymd(2024, 1, 1);
        let dates = [ymd(2024, 1, 11), ymd(2024, 1, 12), ymd(2024, 1, 13)];

        let x = feature_matrix(&dates, reference);

        assert_eq!(x.dim(), (3, 1));
        assert_eq!(x.column(0).to_vec(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_feature_matrix_empty() {
        let x = feature_matrix(&[], ymd(2024, 1, 1));
        assert_eq!(x.dim(), (0, 1));
    }
}
