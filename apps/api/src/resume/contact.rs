//! Contact Normalizer: resolves contact fields across the nestings used by
//! different match API versions.
//!
//! Candidate groups are searched in order: root record, `contact_info`, `contact`,
//! `personal_info`, `profile`. The first trimmed, non-blank value wins; a fixed
//! placeholder is used when every candidate is empty. Never fails.

use crate::resume::html::non_blank;
use crate::resume::model::{ContactInfo, StructuredResume};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Location,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Location,
    ];

    /// Human-readable fallback rendered when no candidate path holds a value.
    pub fn placeholder(self) -> &'static str {
        match self {
            ContactField::Name => "Your Name",
            ContactField::Email => "your.email@example.com",
            ContactField::Phone => "+1 (555) 000-0000",
            ContactField::Location => "City, Country",
        }
    }

    fn read(self, info: &ContactInfo) -> Option<&str> {
        let value = match self {
            ContactField::Name => &info.name,
            ContactField::Email => &info.email,
            ContactField::Phone => &info.phone,
            ContactField::Location => &info.location,
        };
        value.as_deref()
    }
}

type ContactSource = fn(&StructuredResume) -> Option<&ContactInfo>;

fn root(r: &StructuredResume) -> Option<&ContactInfo> {
    Some(&r.direct)
}

fn contact_info(r: &StructuredResume) -> Option<&ContactInfo> {
    r.contact_info.as_ref()
}

fn contact(r: &StructuredResume) -> Option<&ContactInfo> {
    r.contact.as_ref()
}

fn personal_info(r: &StructuredResume) -> Option<&ContactInfo> {
    r.personal_info.as_ref()
}

fn profile(r: &StructuredResume) -> Option<&ContactInfo> {
    r.profile.as_ref()
}

/// Lookup order for every contact field.
const CONTACT_SOURCES: [ContactSource; 5] = [root, contact_info, contact, personal_info, profile];

fn lookup<'a>(
    resume: &'a StructuredResume,
    read: impl Fn(&'a ContactInfo) -> Option<&'a str>,
) -> Option<&'a str> {
    CONTACT_SOURCES
        .iter()
        .filter_map(|source| source(resume))
        .find_map(|info| non_blank(read(info)))
}

/// Returns the resolved value for `field`, or its placeholder.
pub fn resolve_contact(resume: &StructuredResume, field: ContactField) -> String {
    lookup(resume, |info| field.read(info))
        .unwrap_or(field.placeholder())
        .to_string()
}

/// Returns the photo as a `data:` URI. A bare base64 payload is assumed to be JPEG.
pub fn resolve_photo(resume: &StructuredResume) -> Option<String> {
    let photo = lookup(resume, |info| info.photo.as_deref())?;
    if photo.starts_with("data:") {
        Some(photo.to_string())
    } else {
        Some(format!("data:image/jpeg;base64,{photo}"))
    }
}
