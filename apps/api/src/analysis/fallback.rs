//! Static demo result served when the match API cannot be reached.

use serde_json::json;

use crate::match_client::types::{Coverage, Gaps, MatchMeta, MatchResult};
use crate::resume::model::StructuredResume;

pub fn fallback_result() -> MatchResult {
    MatchResult {
        score: 68.0,
        coverage: Coverage {
            must_have: 70.0,
            responsibilities: 65.0,
            seniority_fit: 72.0,
        },
        gaps: Gaps {
            matched_skills: strings(&["Python", "SQL", "REST APIs", "Docker"]),
            missing_skills: strings(&["Kubernetes", "Terraform"]),
            weak_evidence_for_responsibilities: strings(&[
                "Owning on-call rotations for production services",
            ]),
        },
        rationale: "Solid backend experience with most required tools; infrastructure \
                    automation and container orchestration are not evidenced."
            .to_string(),
        tailored_resume_text: "Backend engineer with five years building Python and SQL \
                               services, containerised with Docker and exposed over REST."
            .to_string(),
        structured_resume: sample_resume(),
        recommendations: strings(&[
            "Quantify the impact of the API platform migration",
            "Mention any Kubernetes or Terraform exposure, even from side projects",
        ]),
        flags: strings(&["demo_data"]),
        meta: MatchMeta {
            detected_language: "en".to_string(),
        },
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sample_resume() -> StructuredResume {
    StructuredResume::from_value(json!({
        "contact_info": {
            "name": "Alex Morgan",
            "email": "alex.morgan@example.com",
            "phone": "+1 (555) 010-2030",
            "location": "Austin, TX"
        },
        "summary": "Backend engineer with five years of experience designing and operating \
                    Python services and relational data stores.",
        "experience": [
            {
                "company": "Northwind Analytics",
                "title": "Senior Backend Engineer",
                "start_date": "2022",
                "end_date": "Present",
                "achievements": [
                    "Migrated the reporting API to a containerised deployment, cutting release time by 40%",
                    "Designed the SQL schema behind the customer usage dashboard"
                ]
            },
            {
                "company": "Contoso Retail",
                "title": "Software Engineer",
                "dates": "2019 - 2022",
                "achievements": ["Built REST endpoints for the order management system"]
            }
        ],
        "education": [
            { "degree": "B.Sc. Computer Science", "institution": "University of Texas", "dates": "2015 - 2019" }
        ],
        "skills": {
            "programming_languages": ["Python", "SQL", "Go"],
            "tools": ["Docker", "Git"],
            "databases": ["PostgreSQL"]
        },
        "languages": [{ "name": "English", "proficiency": "Native" }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::template::{compose, DEFAULT_TEMPLATE_ID};

    #[test]
    fn test_fallback_resume_renders() {
        let result = fallback_result();
        let html = compose(DEFAULT_TEMPLATE_ID, &result.structured_resume);
        assert!(html.contains("Alex Morgan"));
        assert!(html.contains("Northwind Analytics"));
        assert!(!html.contains("Your Name"));
    }

    #[test]
    fn test_fallback_is_stable() {
        assert_eq!(fallback_result(), fallback_result());
        assert!(fallback_result().flags.contains(&"demo_data".to_string()));
    }
}
