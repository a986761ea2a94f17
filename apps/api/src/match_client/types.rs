use serde::{Deserialize, Serialize};

use crate::resume::model::{lenient_resume, StructuredResume};

/// Response of `POST /match`. Every field defaults so partial payloads still parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchResult {
    /// 0 to 100.
    pub score: f64,
    pub coverage: Coverage,
    pub gaps: Gaps,
    pub rationale: String,
    pub tailored_resume_text: String,
    #[serde(deserialize_with = "lenient_resume")]
    pub structured_resume: StructuredResume,
    pub recommendations: Vec<String>,
    pub flags: Vec<String>,
    pub meta: MatchMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coverage {
    pub must_have: f64,
    pub responsibilities: f64,
    pub seniority_fit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gaps {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub weak_evidence_for_responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchMeta {
    pub detected_language: String,
}

/// Response of `GET /health` on the match API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamHealth {
    pub status: String,
    pub timestamp: String,
}
