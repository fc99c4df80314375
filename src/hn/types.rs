//! Data types returned by the Hacker News item endpoints.
//!
//! Only the fields the job board renders are modelled; unknown fields in the
//! JSON are ignored by `serde`.

use serde::{Deserialize, Serialize};

/// A job posting as returned by `item/<id>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Username of the poster.
    pub by: String,
    pub id: u64,
    #[serde(default)]
    pub score: i64,
    /// Unix time of posting, in seconds.
    pub time: i64,
    pub title: String,
    /// Item type, always `"job"` for job stories. Serialized as `"type"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Link to the posting. Self-posts have none.
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_deserialize_from_api_format() {
        let api_json = r#"{
            "by": "justin",
            "id": 192327,
            "score": 6,
            "text": "Justin.tv is the biggest live video site online.",
            "time": 1210981217,
            "title": "Justin.tv is looking for a Lead Flash Engineer!",
            "type": "job",
            "url": ""
        }"#;
        let job: Job = serde_json::from_str(api_json).unwrap();
        assert_eq!(job.by, "justin");
        assert_eq!(job.id, 192327);
        assert_eq!(job.time, 1210981217);
        assert_eq!(job.kind, "job");
        assert_eq!(job.url.as_deref(), Some(""));
    }

    #[test]
    fn job_without_url_or_score() {
        let json = r#"{"by":"pg","id":1,"time":0,"title":"Hiring","type":"job"}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.url, None);
        assert_eq!(job.score, 0);
    }

    #[test]
    fn job_with_null_url() {
        let json = r#"{"by":"pg","id":1,"time":0,"title":"Hiring","type":"job","url":null}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.url, None);
    }

    #[test]
    fn kind_field_renames_correctly() {
        let job = Job {
            by: "a".into(),
            id: 2,
            score: 1,
            time: 3,
            title: "t".into(),
            kind: "job".into(),
            url: None,
        };
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains(r#""type":"job""#));
        assert!(!json.contains("kind"));
    }
}
