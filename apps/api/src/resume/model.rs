use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::resume::lenient;

/// Contact fields as they may appear on the root record or under a contact grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub location: Option<String>,
    /// Base64 image payload or a complete `data:` URI.
    #[serde(default, deserialize_with = "lenient::text")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    /// Older payloads name the role `position`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dates: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub school: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dates: Option<String>,
}

/// Skill categories. The first seven are the current API shape; `languages`,
/// `technical` and `soft` are the legacy shape. Both may be mixed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub programming_languages: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub libraries: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub databases: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub cloud_platforms: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub methodologies: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub other: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub technical: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub soft: Vec<String>,
}

impl Skills {
    /// Labeled categories in render order: current shape first, then legacy.
    pub fn categories(&self) -> [(&'static str, &[String]); 10] {
        [
            ("Programming Languages", self.programming_languages.as_slice()),
            ("Tools", self.tools.as_slice()),
            ("Libraries", self.libraries.as_slice()),
            ("Databases", self.databases.as_slice()),
            ("Cloud Platforms", self.cloud_platforms.as_slice()),
            ("Methodologies", self.methodologies.as_slice()),
            ("Other", self.other.as_slice()),
            ("Languages", self.languages.as_slice()),
            ("Technical", self.technical.as_slice()),
            ("Soft Skills", self.soft.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.categories().iter().all(|(_, items)| items.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub issuer: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::one_or_many")]
    pub technologies_used: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub journal: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolunteerItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub proficiency: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub level: Option<String>,
}

/// An entry of a free-form section: plain text or a flat key/value record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalItem {
    Text(String),
    Record(Map<String, Value>),
}

/// The résumé record produced by the match API (or the static mock).
///
/// Deserialization never fails on shape mismatches: wrong-typed fields read as
/// absent, and list elements that do not fit their item shape are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResume {
    /// Contact fields placed directly on the root record.
    #[serde(flatten)]
    pub direct: ContactInfo,
    #[serde(default, deserialize_with = "lenient::record")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub contact: Option<ContactInfo>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub personal_info: Option<ContactInfo>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub profile: Option<ContactInfo>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub experience: Vec<ExperienceItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub education: Vec<EducationItem>,
    #[serde(default, deserialize_with = "skills_shape")]
    pub skills: Skills,
    #[serde(default, deserialize_with = "lenient::list")]
    pub certifications: Vec<CertificationItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub projects: Vec<ProjectItem>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub achievements: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub awards: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub publications: Vec<PublicationItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub volunteer_work: Vec<VolunteerItem>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub references: Vec<ReferenceItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub languages: Vec<LanguageItem>,
    #[serde(default, deserialize_with = "additional_shape")]
    pub additional_sections: BTreeMap<String, Vec<AdditionalItem>>,
}

impl StructuredResume {
    /// Reads a résumé from arbitrary JSON. Non-object input yields an empty résumé.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Field deserializer for embedding a StructuredResume in other payloads.
pub fn lenient_resume<'de, D>(deserializer: D) -> Result<StructuredResume, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(StructuredResume::from_value).unwrap_or_default())
}

/// Skills arrive as a category object, or occasionally as a bare list which is
/// kept under `other`.
fn skills_shape<'de, D>(deserializer: D) -> Result<Skills, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Skills {
            other: items.iter().filter_map(lenient::value_to_text).collect(),
            ..Skills::default()
        },
        Some(obj @ Value::Object(_)) => serde_json::from_value(obj).unwrap_or_default(),
        _ => Skills::default(),
    })
}

fn additional_shape<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<AdditionalItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(sections)) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(sections
        .into_iter()
        .map(|(name, items)| {
            let items = match items {
                Value::Array(items) => items.into_iter().filter_map(additional_item).collect(),
                single => additional_item(single).into_iter().collect(),
            };
            (name, items)
        })
        .collect())
}

fn additional_item(value: Value) -> Option<AdditionalItem> {
    match value {
        Value::Object(record) => Some(AdditionalItem::Record(record)),
        other => lenient::value_to_text(&other).map(AdditionalItem::Text),
    }
}
