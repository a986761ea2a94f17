//! Résumé rendering pipeline: Contact Normalizer, Section Renderer and
//! Template Compositor, plus the HTTP surface over them.

pub mod contact;
pub mod handlers;
pub mod html;
pub mod lenient;
pub mod model;
pub mod sections;
pub mod template;
