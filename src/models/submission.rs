use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::job::{JobError, JobStatus, Visit};

/// Body of `POST /api/submit`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitJobRequest {
    /// Signed so a negative count reaches the mismatch check instead of failing to parse.
    #[garde(custom(|count: &i64, _: &()| {
        if usize::try_from(*count).is_ok_and(|count| count == self.visits.len()) {
            Ok(())
        } else {
            Err(garde::Error::new("count does not match visits"))
        }
    }))]
    #[serde(default)]
    pub count: i64,

    #[garde(skip)]
    #[serde(default)]
    pub visits: Vec<Visit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: u64,
}

/// Response for `GET /api/status`. Errors are only reported once the job has failed.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: u64,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Vec<JobError>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_must_match_visits() {
        let request: SubmitJobRequest = serde_json::from_value(serde_json::json!({
            "count": 2,
            "visits": [{ "store_id": "S1", "visit_time": "t", "image_url": [] }]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_missing_count_defaults_to_zero() {
        let request: SubmitJobRequest =
            serde_json::from_value(serde_json::json!({ "visits": [] })).unwrap();
        assert_eq!(request.count, 0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_count_is_a_mismatch() {
        let request: SubmitJobRequest =
            serde_json::from_value(serde_json::json!({ "count": -1, "visits": [] })).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_submission_is_valid() {
        let request: SubmitJobRequest =
            serde_json::from_value(serde_json::json!({ "count": 0, "visits": [] })).unwrap();
        assert!(request.validate().is_ok());
    }
}
