//! Localized invoice templates.
//!
//! Invoice form data is turned into a [`view::ViewModel`] for one
//! [`i18n::Language`] and rendered by one of a fixed set of
//! [`template::Template`]s, which are loaded lazily and shared between
//! concurrent requests.

pub mod config;
pub mod error;
pub mod i18n;
pub mod model;
pub mod page;
pub mod template;
pub mod view;

pub use error::{FormatError, RenderError, TemplateError, TranslationError};
pub use i18n::{translate, Direction, Language, TranslationKey};
pub use model::Invoice;
pub use page::{FormState, RouteContext, SnapshotFormState};
pub use template::{
    DirectorySource, EmbeddedSource, Placeholder, Resolved, Template, TemplateLoader,
    TemplateResolver, TemplateSource,
};
