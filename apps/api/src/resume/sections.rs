//! Section Renderer: one pure mapping per résumé section.
//!
//! Each renderer returns `None` when the section has no usable content, which
//! tells the compositor to drop the section's heading, divider and body.

use serde_json::{Map, Value};

use crate::resume::html::{bullet_list, escape, first_of, non_blank, title_case};
use crate::resume::lenient::value_to_text;
use crate::resume::model::{
    AdditionalItem, CertificationItem, EducationItem, ExperienceItem, LanguageItem,
    ProjectItem, PublicationItem, ReferenceItem, Skills, StructuredResume, VolunteerItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Achievements,
    Awards,
    Publications,
    Volunteer,
    Languages,
    Interests,
    References,
    Additional,
}

impl Section {
    pub const ALL: [Section; 14] = [
        Section::Summary,
        Section::Experience,
        Section::Education,
        Section::Skills,
        Section::Projects,
        Section::Certifications,
        Section::Achievements,
        Section::Awards,
        Section::Publications,
        Section::Volunteer,
        Section::Languages,
        Section::Interests,
        Section::References,
        Section::Additional,
    ];

    /// Stable identifier used for the section's element id.
    pub fn id(self) -> &'static str {
        match self {
            Section::Summary => "summary",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
            Section::Achievements => "achievements",
            Section::Awards => "awards",
            Section::Publications => "publications",
            Section::Volunteer => "volunteer",
            Section::Languages => "languages",
            Section::Interests => "interests",
            Section::References => "references",
            Section::Additional => "additional",
        }
    }

    /// Placeholder token for the section body in a template.
    pub fn token(self) -> &'static str {
        match self {
            Section::Summary => "[SUMMARY]",
            Section::Experience => "[EXPERIENCE]",
            Section::Education => "[EDUCATION]",
            Section::Skills => "[SKILLS]",
            Section::Projects => "[PROJECTS]",
            Section::Certifications => "[CERTIFICATIONS]",
            Section::Achievements => "[ACHIEVEMENTS]",
            Section::Awards => "[AWARDS]",
            Section::Publications => "[PUBLICATIONS]",
            Section::Volunteer => "[VOLUNTEER]",
            Section::Languages => "[LANGUAGES]",
            Section::Interests => "[INTERESTS]",
            Section::References => "[REFERENCES]",
            Section::Additional => "[ADDITIONAL_SECTIONS]",
        }
    }

    pub fn render(self, resume: &StructuredResume) -> Option<String> {
        match self {
            Section::Summary => render_summary(resume.summary.as_deref()),
            Section::Experience => render_experience(&resume.experience),
            Section::Education => render_education(&resume.education),
            Section::Skills => render_skills(&resume.skills),
            Section::Projects => render_projects(&resume.projects),
            Section::Certifications => render_certifications(&resume.certifications),
            Section::Achievements => bullet_list(&resume.achievements, "bullets"),
            Section::Awards => bullet_list(&resume.awards, "bullets"),
            Section::Publications => render_publications(&resume.publications),
            Section::Volunteer => render_volunteer(&resume.volunteer_work),
            Section::Languages => render_languages(&resume.languages),
            Section::Interests => render_interests(&resume.interests),
            Section::References => render_references(&resume.references),
            Section::Additional => render_additional(&resume.additional_sections),
        }
    }
}

/// `dates` when given, otherwise the non-blank ends of `start - end`.
pub fn date_range(
    dates: &Option<String>,
    start: &Option<String>,
    end: &Option<String>,
) -> Option<String> {
    if let Some(dates) = non_blank(dates.as_deref()) {
        return Some(dates.to_string());
    }
    let parts: Vec<&str> = [start, end]
        .into_iter()
        .filter_map(|part| non_blank(part.as_deref()))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" - "))
    }
}

/// Collects fragments; `None` when every item rendered to nothing.
fn join_items<T>(items: &[T], render: impl Fn(&T) -> Option<String>) -> Option<String> {
    let rendered: Vec<String> = items.iter().filter_map(render).collect();
    if rendered.is_empty() {
        None
    } else {
        Some(rendered.concat())
    }
}

fn wrap_list(items: Option<String>, class: &str) -> Option<String> {
    items.map(|lis| format!("<ul class=\"{class}\">{lis}</ul>"))
}

fn entry(header: Option<&str>, subheader: &[Option<String>], body: &[Option<String>]) -> Option<String> {
    let mut html = String::new();

    if let Some(header) = header {
        html.push_str(&format!(
            "<div class=\"entry-header\"><span class=\"entry-title\">{}</span></div>",
            escape(header)
        ));
    }

    let sub: Vec<&String> = subheader.iter().flatten().collect();
    if !sub.is_empty() {
        html.push_str("<div class=\"entry-subheader\">");
        for part in sub {
            html.push_str(part);
        }
        html.push_str("</div>");
    }

    for part in body.iter().flatten() {
        html.push_str(part);
    }

    if html.is_empty() {
        None
    } else {
        Some(format!("<div class=\"entry\">{html}</div>"))
    }
}

fn span(class: &str, text: Option<&str>) -> Option<String> {
    text.map(|t| format!("<span class=\"{class}\">{}</span>", escape(t)))
}

fn paragraph(class: &str, text: Option<&str>) -> Option<String> {
    text.map(|t| format!("<p class=\"{class}\">{}</p>", escape(t)))
}

fn render_summary(summary: Option<&str>) -> Option<String> {
    non_blank(summary).map(escape)
}

fn render_experience(items: &[ExperienceItem]) -> Option<String> {
    join_items(items, |item| {
        let dates = date_range(&item.dates, &item.start_date, &item.end_date);
        entry(
            first_of(&item.title, &item.position),
            &[
                span("entry-org", non_blank(item.company.as_deref())),
                span("entry-dates", dates.as_deref()),
            ],
            &[bullet_list(&item.achievements, "bullets")],
        )
    })
}

fn render_education(items: &[EducationItem]) -> Option<String> {
    join_items(items, |item| {
        let dates = date_range(&item.dates, &item.start_date, &item.end_date);
        entry(
            non_blank(item.degree.as_deref()),
            &[
                span("entry-org", first_of(&item.institution, &item.school)),
                span("entry-dates", dates.as_deref()),
            ],
            &[],
        )
    })
}

fn render_skills(skills: &Skills) -> Option<String> {
    let lines: Vec<String> = skills
        .categories()
        .iter()
        .filter_map(|(label, items)| {
            let values: Vec<String> = items
                .iter()
                .filter_map(|item| non_blank(Some(item.as_str())))
                .map(escape)
                .collect();
            if values.is_empty() {
                return None;
            }
            Some(format!(
                "<p class=\"skill-line\"><strong>{label}:</strong> {}</p>",
                values.join(", ")
            ))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.concat())
    }
}

fn render_projects(items: &[ProjectItem]) -> Option<String> {
    join_items(items, |item| {
        let badges: Vec<String> = item
            .technologies_used
            .iter()
            .filter_map(|tech| non_blank(Some(tech.as_str())))
            .map(|tech| format!("<span class=\"badge\">{}</span>", escape(tech)))
            .collect();
        let badges = if badges.is_empty() {
            None
        } else {
            Some(format!("<div class=\"badges\">{}</div>", badges.concat()))
        };

        entry(
            non_blank(item.name.as_deref()),
            &[],
            &[
                paragraph("entry-description", non_blank(item.description.as_deref())),
                badges,
                bullet_list(&item.achievements, "bullets"),
            ],
        )
    })
}

fn render_certifications(items: &[CertificationItem]) -> Option<String> {
    let lis = join_items(items, |item| {
        let name = non_blank(item.name.as_deref())?;
        let mut li = format!("<li><strong>{}</strong>", escape(name));
        if let Some(issuer) = non_blank(item.issuer.as_deref()) {
            li.push_str(&format!(" - {}", escape(issuer)));
        }
        if let Some(date) = non_blank(item.date.as_deref()) {
            li.push_str(&format!(" ({})", escape(date)));
        }
        li.push_str("</li>");
        Some(li)
    });
    wrap_list(lis, "plain-list")
}

fn render_publications(items: &[PublicationItem]) -> Option<String> {
    let lis = join_items(items, |item| {
        let title = non_blank(item.title.as_deref())?;
        let venue = first_of(&item.journal, &item.venue)
            .map(|v| format!(", {}", escape(v)))
            .unwrap_or_default();
        Some(format!("<li><em>{}</em>{venue}</li>", escape(title)))
    });
    wrap_list(lis, "plain-list")
}

fn render_volunteer(items: &[VolunteerItem]) -> Option<String> {
    join_items(items, |item| {
        entry(
            first_of(&item.organization, &item.title),
            &[],
            &[paragraph(
                "entry-description",
                first_of(&item.description, &item.role),
            )],
        )
    })
}

fn render_languages(items: &[LanguageItem]) -> Option<String> {
    let lis = join_items(items, |item| {
        let name = non_blank(item.name.as_deref())?;
        let level = first_of(&item.proficiency, &item.level)
            .map(|l| format!(" <span class=\"muted\">({})</span>", escape(l)))
            .unwrap_or_default();
        Some(format!("<li>{}{level}</li>", escape(name)))
    });
    wrap_list(lis, "inline-list")
}

fn render_interests(items: &[String]) -> Option<String> {
    let lis = join_items(items, |item| {
        non_blank(Some(item.as_str())).map(|i| format!("<li>{}</li>", escape(i)))
    });
    wrap_list(lis, "inline-list")
}

fn render_references(items: &[ReferenceItem]) -> Option<String> {
    join_items(items, |item| {
        let role = [&item.position, &item.company]
            .into_iter()
            .filter_map(|part| non_blank(part.as_deref()))
            .collect::<Vec<_>>()
            .join(", ");
        let role = non_blank(Some(role.as_str())).map(str::to_string);
        entry(
            non_blank(item.name.as_deref()),
            &[span("entry-org", role.as_deref())],
            &[paragraph("entry-description", non_blank(item.contact.as_deref()))],
        )
    })
}

fn render_additional(sections: &std::collections::BTreeMap<String, Vec<AdditionalItem>>) -> Option<String> {
    let groups: Vec<String> = sections
        .iter()
        .filter_map(|(name, items)| {
            let lis = join_items(items, |item| {
                let text = match item {
                    AdditionalItem::Text(text) => non_blank(Some(text.as_str())).map(escape),
                    AdditionalItem::Record(record) => flatten_record(record),
                }?;
                Some(format!("<li>{text}</li>"))
            })?;
            Some(format!(
                "<div class=\"additional-group\"><h3>{}</h3><ul class=\"bullets\">{lis}</ul></div>",
                escape(&title_case(name))
            ))
        })
        .collect();

    if groups.is_empty() {
        None
    } else {
        Some(groups.concat())
    }
}

/// `{"project": "tokio", "role": "reviewer"}` → `Project: tokio | Role: reviewer`.
fn flatten_record(record: &Map<String, Value>) -> Option<String> {
    let pairs: Vec<String> = record
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Array(items) => {
                    let joined = items
                        .iter()
                        .filter_map(value_to_text)
                        .collect::<Vec<_>>()
                        .join(", ");
                    Some(joined)
                }
                Value::Object(_) => Some(value.to_string()),
                scalar => value_to_text(scalar),
            }?;
            let text = non_blank(Some(text.as_str()))?.to_string();
            Some(format!("{}: {}", escape(&title_case(key)), escape(&text)))
        })
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join(" | "))
    }
}
