use uuid::Uuid;

use super::rpc::{UploadStatus, upload_status};

/// Result of a completed ingestion stream that was not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted { video_id: Uuid },
    Duplicate,
    QueueFull,
}

impl From<UploadOutcome> for UploadStatus {
    fn from(outcome: UploadOutcome) -> Self {
        let mut status = UploadStatus::default();
        match outcome {
            UploadOutcome::Accepted { video_id } => {
                status.set_result(upload_status::Result::Ok);
                status.message = "enqueued".into();
                status.video_id = video_id.to_string();
            }
            UploadOutcome::Duplicate => {
                status.set_result(upload_status::Result::Duplicate);
                status.message = "duplicate detected".into();
            }
            UploadOutcome::QueueFull => {
                status.set_result(upload_status::Result::QueueFull);
                status.message = "queue full, upload dropped".into();
            }
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_carries_video_id() {
        let id = Uuid::new_v4();
        let status = UploadStatus::from(UploadOutcome::Accepted { video_id: id });
        assert_eq!(status.result(), upload_status::Result::Ok);
        assert_eq!(status.video_id, id.to_string());
    }

    #[test]
    fn rejections_have_no_video_id() {
        for (outcome, expected) in [
            (UploadOutcome::Duplicate, upload_status::Result::Duplicate),
            (UploadOutcome::QueueFull, upload_status::Result::QueueFull),
        ] {
            let status = UploadStatus::from(outcome);
            assert_eq!(status.result(), expected);
            assert!(status.video_id.is_empty());
        }
    }
}
