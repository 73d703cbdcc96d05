//! Page entry points: read the route and the form, hand both to the resolver.

use std::path::Path;

use crate::error::{RenderError, TemplateError};
use crate::i18n::{self, Language};
use crate::model::Invoice;
use crate::template::{Resolved, TemplateResolver, TemplateSource};

/// Read-only access to the invoice form.
pub trait FormState {
    fn current_values(&self) -> Invoice;
}

/// A form snapshot held in memory, typically loaded from a JSON export.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFormState {
    invoice: Invoice,
}

impl SnapshotFormState {
    pub fn new(invoice: Invoice) -> Self {
        Self { invoice }
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(Invoice::from_json(&content)?))
    }
}

impl FormState for SnapshotFormState {
    fn current_values(&self) -> Invoice {
        self.invoice.clone()
    }
}

/// Values taken from the navigation context, e.g. `/he/template/2`.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    pub template: Option<String>,
    pub locale: Option<String>,
}

impl RouteContext {
    pub fn new(template: impl Into<String>, locale: Option<&str>) -> Self {
        Self {
            template: Some(template.into()),
            locale: locale.map(str::to_string),
        }
    }

    pub fn language(&self) -> Language {
        i18n::resolve_language(self.locale.as_deref())
    }
}

/// Template page: the identifier comes from the route.
pub fn view_template<S, F>(
    resolver: &TemplateResolver<S>,
    route: &RouteContext,
    form: &F,
) -> Result<String, RenderError>
where
    S: TemplateSource,
    F: FormState + ?Sized,
{
    let id = route
        .template
        .as_deref()
        .ok_or_else(TemplateError::not_selected)?;
    let invoice = form.current_values();
    let resolved = resolver.resolve(id, &invoice, route.language())?;
    Ok(wrap_container(resolved))
}

/// Live preview: the identifier comes from the invoice's stored preference.
pub fn preview_invoice<S, F>(
    resolver: &TemplateResolver<S>,
    route: &RouteContext,
    form: &F,
) -> Result<Resolved, RenderError>
where
    S: TemplateSource,
    F: FormState + ?Sized,
{
    let invoice = form.current_values();
    let id = stored_template(&invoice)?;
    resolver.resolve(&id, &invoice, route.language())
}

/// Waits for the template instead of returning the placeholder. The route
/// identifier wins over the stored preference.
pub async fn render_document<S, F>(
    resolver: &TemplateResolver<S>,
    route: &RouteContext,
    form: &F,
) -> Result<String, RenderError>
where
    S: TemplateSource,
    F: FormState + ?Sized,
{
    let invoice = form.current_values();
    let id = match route.template.as_deref() {
        Some(id) => id.to_string(),
        None => stored_template(&invoice)?,
    };
    let language = route.language();
    tracing::debug!(template = %id, language = %language, "rendering invoice");
    let html = resolver.resolve_ready(&id, &invoice, language).await?;
    Ok(wrap_container(Resolved::Document(html)))
}

fn stored_template(invoice: &Invoice) -> Result<String, TemplateError> {
    invoice
        .details
        .pdf_template
        .as_ref()
        .map(ToString::to_string)
        .ok_or_else(TemplateError::not_selected)
}

fn wrap_container(resolved: Resolved) -> String {
    format!(r#"<div class="container">{}</div>"#, resolved.into_html())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TemplateRef;
    use crate::template::{EmbeddedSource, TemplateLoader};

    fn form(template: Option<TemplateRef>) -> SnapshotFormState {
        let mut invoice = Invoice::default();
        invoice.details.invoice_date = "2024-03-01".into();
        invoice.details.due_date = "2024-03-31".into();
        invoice.details.currency = "EUR".into();
        invoice.details.pdf_template = template;
        SnapshotFormState::new(invoice)
    }

    #[tokio::test]
    async fn page_shows_placeholder_then_document() {
        let resolver = TemplateResolver::new(TemplateLoader::new(EmbeddedSource));
        let route = RouteContext::new("2", Some("fr"));
        let form = form(None);

        let first = view_template(&resolver, &route, &form).unwrap();
        assert!(first.contains(r#"class="skeleton""#));

        let html = render_document(&resolver, &route, &form).await.unwrap();
        assert!(html.starts_with(r#"<div class="container">"#));
        assert!(html.contains("invoice-template-2"));
        assert!(html.contains("Facture"));
    }

    #[tokio::test]
    async fn preview_uses_stored_preference() {
        let resolver = TemplateResolver::new(TemplateLoader::new(EmbeddedSource));
        let route = RouteContext::default();
        let form = form(Some(TemplateRef::Text("1".into())));

        resolver.loader().load(crate::template::Template::Standard).await.unwrap();
        match preview_invoice(&resolver, &route, &form).unwrap() {
            Resolved::Document(html) => assert!(html.contains("invoice-template-1")),
            Resolved::Loading(_) => panic!("template should be loaded"),
        }
    }

    #[test]
    fn missing_identifier_is_not_found() {
        let resolver = TemplateResolver::new(TemplateLoader::new(EmbeddedSource));
        let err = preview_invoice(&resolver, &RouteContext::default(), &form(None)).unwrap_err();
        assert!(matches!(err, RenderError::Template(TemplateError::NotFound(ref id)) if id == "<none>"));

        let err = view_template(&resolver, &RouteContext::default(), &form(None)).unwrap_err();
        assert!(matches!(err, RenderError::Template(TemplateError::NotFound(ref id)) if id == "<none>"));
        assert_eq!(err.to_string(), "Template '<none>' not found");
    }
}
