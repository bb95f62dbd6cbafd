use uuid::Uuid;

/// Primary key of a row in the `users` table.
pub type UserId = Uuid;

/// Primary key of a row in the `inspection_sessions` table.
pub type SessionId = Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Normalized `[x_center, y_center, width, height]` box.
pub type BBox = [f64; 4];

/// True when every component of `bbox` lies in `[0, 1]` inclusive.
///
/// NaN components are never normalized.
pub fn is_normalized(bbox: &BBox) -> bool {
    bbox.iter().all(|v| (0.0..=1.0).contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert!(is_normalized(&[0.0, 1.0, 0.0, 1.0]));
        assert!(is_normalized(&[0.5, 0.5, 0.2, 0.1]));
    }

    #[test]
    fn out_of_range_and_nan_rejected() {
        assert!(!is_normalized(&[1.5, 0.5, 0.2, 0.1]));
        assert!(!is_normalized(&[0.5, -0.01, 0.2, 0.1]));
        assert!(!is_normalized(&[0.5, 0.5, f64::NAN, 0.1]));
    }
}
