//! Template Compositor: fills a fixed CV document template from a StructuredResume.
//!
//! A template is a document head carrying the contact tokens, an ordered list of
//! toggleable section blocks, and a tail. A block whose section renders to
//! nothing is left out entirely, heading and divider included. Résumé text made
//! only of token text counts as blank (see [`html::non_blank`]), so it cannot
//! keep a section alive. As a last pass every known token is scrubbed, so no
//! literal token text reaches the output.
//!
//! [`html::non_blank`]: crate::resume::html::non_blank
//!
//! Composition is pure: the same résumé and template id always produce the same
//! bytes (no timestamps, no random ids).

use tracing::debug;

use crate::resume::contact::{resolve_contact, resolve_photo, ContactField};
use crate::resume::html::escape;
use crate::resume::model::StructuredResume;
use crate::resume::sections::Section;

pub const DEFAULT_TEMPLATE_ID: &str = "professional";

const PHOTO_TOKEN: &str = "[PHOTO]";

impl ContactField {
    pub fn token(self) -> &'static str {
        match self {
            ContactField::Name => "[NAME]",
            ContactField::Email => "[EMAIL]",
            ContactField::Phone => "[PHONE]",
            ContactField::Location => "[LOCATION]",
        }
    }
}

/// One toggleable section of a template.
#[derive(Debug)]
pub struct TemplateBlock {
    pub section: Section,
    pub heading: &'static str,
    /// Body markup around the section token.
    pub body: &'static str,
}

#[derive(Debug)]
pub struct CvTemplate {
    pub id: &'static str,
    head: &'static str,
    blocks: &'static [TemplateBlock],
    tail: &'static str,
}

const TEMPLATES: &[CvTemplate] = &[PROFESSIONAL];

/// Ids of every template `compose` accepts.
pub fn template_ids() -> Vec<&'static str> {
    TEMPLATES.iter().map(|t| t.id).collect()
}

pub fn find_template(id: &str) -> Option<&'static CvTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Composes the document for `template_id`.
///
/// An unknown id yields an empty string, never a partial document. Callers
/// treat the empty string as "nothing to preview or print".
pub fn compose(template_id: &str, resume: &StructuredResume) -> String {
    match find_template(template_id) {
        Some(template) => template.render(resume),
        None => {
            debug!("Unknown CV template id {template_id:?}");
            String::new()
        }
    }
}

impl CvTemplate {
    pub fn render(&self, resume: &StructuredResume) -> String {
        let photo = resolve_photo(resume)
            .map(|src| format!("<img class=\"photo\" src=\"{}\" alt=\"\">", escape(&src)))
            .unwrap_or_default();
        let mut fills: Vec<(&str, String)> = ContactField::ALL
            .iter()
            .map(|field| (field.token(), escape(&resolve_contact(resume, *field))))
            .collect();
        fills.push((PHOTO_TOKEN, photo));

        let mut out = fill_tokens(self.head, &fills);
        let mut rendered = 0usize;
        for block in self.blocks {
            let Some(fragment) = block.section.render(resume) else {
                continue;
            };
            rendered += 1;
            out.push_str(&format!(
                "<section class=\"cv-section\" id=\"{}\"><h2 class=\"section-title\">{}</h2><hr class=\"divider\">{}</section>\n",
                block.section.id(),
                block.heading,
                block.body.replace(block.section.token(), &fragment),
            ));
        }
        out.push_str(self.tail);

        debug!(
            "Composed CV template {:?}: {} of {} sections present",
            self.id,
            rendered,
            self.blocks.len()
        );

        strip_tokens(&out)
    }
}

/// Substitutes every token in one left-to-right pass, so substituted values are
/// never scanned for tokens themselves.
fn fill_tokens(text: &str, fills: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        match fills.iter().find(|(token, _)| rest.starts_with(token)) {
            Some((token, value)) => {
                out.push_str(value);
                rest = &rest[token.len()..];
            }
            None => {
                out.push('[');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn known_tokens() -> impl Iterator<Item = &'static str> {
    ContactField::ALL
        .into_iter()
        .map(ContactField::token)
        .chain(Section::ALL.into_iter().map(Section::token))
        .chain(std::iter::once(PHOTO_TOKEN))
}

/// Removes every known token from `text`, including token text that arrived
/// inside résumé content. Repeats until stable, since removing one token can
/// join its neighbours into another (`[NA[EMAIL]ME]`).
pub fn strip_tokens(text: &str) -> String {
    let mut out = text.to_string();
    loop {
        let before = out.len();
        for token in known_tokens() {
            if out.contains(token) {
                out = out.replace(token, "");
            }
        }
        if out.len() == before {
            return out;
        }
    }
}

const PROFESSIONAL: CvTemplate = CvTemplate {
    id: DEFAULT_TEMPLATE_ID,
    head: PROFESSIONAL_HEAD,
    blocks: &[
        TemplateBlock {
            section: Section::Summary,
            heading: "Professional Summary",
            body: "<p class=\"summary\">[SUMMARY]</p>",
        },
        TemplateBlock {
            section: Section::Experience,
            heading: "Professional Experience",
            body: "<div class=\"entries\">[EXPERIENCE]</div>",
        },
        TemplateBlock {
            section: Section::Education,
            heading: "Education",
            body: "<div class=\"entries\">[EDUCATION]</div>",
        },
        TemplateBlock {
            section: Section::Skills,
            heading: "Skills",
            body: "<div class=\"skills\">[SKILLS]</div>",
        },
        TemplateBlock {
            section: Section::Projects,
            heading: "Projects",
            body: "<div class=\"entries\">[PROJECTS]</div>",
        },
        TemplateBlock {
            section: Section::Certifications,
            heading: "Certifications",
            body: "[CERTIFICATIONS]",
        },
        TemplateBlock {
            section: Section::Achievements,
            heading: "Achievements",
            body: "[ACHIEVEMENTS]",
        },
        TemplateBlock {
            section: Section::Awards,
            heading: "Awards",
            body: "[AWARDS]",
        },
        TemplateBlock {
            section: Section::Publications,
            heading: "Publications",
            body: "[PUBLICATIONS]",
        },
        TemplateBlock {
            section: Section::Volunteer,
            heading: "Volunteer Work",
            body: "<div class=\"entries\">[VOLUNTEER]</div>",
        },
        TemplateBlock {
            section: Section::Languages,
            heading: "Languages",
            body: "[LANGUAGES]",
        },
        TemplateBlock {
            section: Section::Interests,
            heading: "Interests",
            body: "[INTERESTS]",
        },
        TemplateBlock {
            section: Section::References,
            heading: "References",
            body: "<div class=\"entries\">[REFERENCES]</div>",
        },
        TemplateBlock {
            section: Section::Additional,
            heading: "Additional Information",
            body: "[ADDITIONAL_SECTIONS]",
        },
    ],
    tail: "</main>\n</body>\n</html>\n",
};

const PROFESSIONAL_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>[NAME] - CV</title>
<style>
  @page { size: A4; margin: 16mm; }
  * { box-sizing: border-box; }
  body { margin: 0; font-family: "Helvetica Neue", Arial, sans-serif; font-size: 10.5pt; color: #222; line-height: 1.45; }
  main { max-width: 780px; margin: 0 auto; padding: 24px; }
  header.cv-header { display: flex; align-items: center; gap: 18px; margin-bottom: 12px; }
  .photo { width: 88px; height: 88px; border-radius: 50%; object-fit: cover; }
  h1.name { margin: 0; font-size: 24pt; letter-spacing: 0.5px; }
  .contact-line { margin-top: 4px; color: #555; font-size: 9.5pt; }
  .contact-line span + span::before { content: " | "; color: #aaa; }
  .contact-line a { color: inherit; text-decoration: none; }
  .cv-section { margin-top: 14px; page-break-inside: avoid; }
  h2.section-title { margin: 0; font-size: 12pt; text-transform: uppercase; letter-spacing: 1px; color: #1f3a5f; }
  hr.divider { border: 0; border-top: 1.5px solid #1f3a5f; margin: 4px 0 8px; }
  .entry { margin-bottom: 10px; }
  .entry-title { font-weight: bold; }
  .entry-subheader { display: flex; justify-content: space-between; color: #555; font-style: italic; }
  .entry-description { margin: 4px 0; }
  ul.bullets { margin: 4px 0 0 18px; padding: 0; }
  ul.plain-list { list-style: none; margin: 0; padding: 0; }
  ul.inline-list { list-style: none; margin: 0; padding: 0; }
  ul.inline-list li { display: inline; }
  ul.inline-list li + li::before { content: " \00B7  "; }
  .skill-line { margin: 2px 0; }
  .badges { margin: 4px 0; }
  .badge { display: inline-block; padding: 1px 7px; margin: 0 4px 4px 0; border-radius: 9px; background: #e8eef6; color: #1f3a5f; font-size: 8.5pt; }
  .muted { color: #777; }
  .additional-group h3 { margin: 6px 0 2px; font-size: 10.5pt; }
  @media print { main { padding: 0; } a { color: inherit; } }
</style>
</head>
<body>
<main class="cv">
<header class="cv-header">
[PHOTO]
<div>
<h1 class="name">[NAME]</h1>
<div class="contact-line"><span><a href="mailto:[EMAIL]">[EMAIL]</a></span><span>[PHONE]</span><span>[LOCATION]</span></div>
</div>
</header>
"#;
