//! Template resolution and lazy loading.
//!
//! A [`Template`] is resolved from an external identifier through a closed
//! mapping, its markup is fetched from a [`TemplateSource`] the first time it is
//! needed, and the compiled [`Renderer`] is memoised per template. Requests that
//! arrive while a load is in flight share it.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tera::{Context, Tera, Value};

use crate::error::{RenderError, TemplateError};
use crate::i18n::{self, Language, DEFAULT_LANGUAGE};
use crate::model::{Invoice, TemplateRef};
use crate::view::{self, ViewModel};

const STANDARD_TEMPLATE: &str = include_str!("../templates/invoice-template-1.html.tera");
const COMPACT_TEMPLATE: &str = include_str!("../templates/invoice-template-2.html.tera");

/// Minimum height of the loading skeleton.
pub const PLACEHOLDER_MIN_HEIGHT: &str = "60rem";

// ==========================================
// Template variants
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    Standard,
    Compact,
}

impl Template {
    pub const ALL: [Template; 2] = [Template::Standard, Template::Compact];

    pub fn id(self) -> u32 {
        match self {
            Template::Standard => 1,
            Template::Compact => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Template::Standard => "Standard",
            Template::Compact => "Compact",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Template::Standard => "Two-column header with a line item grid",
            Template::Compact => "Single column with a bordered item table",
        }
    }

    /// File the markup is stored under in a template directory.
    pub fn file_name(self) -> String {
        format!("invoice-template-{}.html.tera", self.id())
    }

    /// The `.html` suffix turns on tera's autoescaping.
    fn engine_name(self) -> String {
        format!("invoice-template-{}.html", self.id())
    }

    pub fn embedded_markup(self) -> &'static str {
        match self {
            Template::Standard => STANDARD_TEMPLATE,
            Template::Compact => COMPACT_TEMPLATE,
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.name())
    }
}

impl TryFrom<u32> for Template {
    type Error = TemplateError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Template::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u32 = s
            .trim()
            .parse()
            .map_err(|_| TemplateError::NotFound(s.to_string()))?;
        Template::try_from(id)
    }
}

impl TryFrom<&TemplateRef> for Template {
    type Error = TemplateError;

    fn try_from(value: &TemplateRef) -> Result<Self, Self::Error> {
        match value {
            TemplateRef::Number(n) => Template::try_from(*n),
            TemplateRef::Text(s) => s.parse(),
        }
    }
}

// ==========================================
// Sources
// ==========================================

/// Where template markup comes from.
#[async_trait]
pub trait TemplateSource: Send + Sync + 'static {
    async fn fetch(&self, template: Template) -> Result<String, TemplateError>;
}

/// Markup compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSource;

#[async_trait]
impl TemplateSource for EmbeddedSource {
    async fn fetch(&self, template: Template) -> Result<String, TemplateError> {
        Ok(template.embedded_markup().to_string())
    }
}

/// Markup read from `<dir>/invoice-template-<n>.html.tera`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, template: Template) -> PathBuf {
        self.dir.join(template.file_name())
    }
}

#[async_trait]
impl TemplateSource for DirectorySource {
    async fn fetch(&self, template: Template) -> Result<String, TemplateError> {
        let path = self.path_for(template);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| TemplateError::load(template.id(), format!("{}: {e}", path.display())))
    }
}

// ==========================================
// Renderer
// ==========================================

/// A compiled template, ready to turn a [`ViewModel`] into HTML.
pub struct Renderer {
    template: Template,
    tera: Tera,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer").field("template", &self.template).finish()
    }
}

impl Renderer {
    pub fn compile(template: Template, markup: &str, strict: bool) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_template(&template.engine_name(), markup)
            .map_err(|e| TemplateError::load(template.id(), e.to_string()))?;
        tera.register_function("t", translate_fn(strict));
        Ok(Self { template, tera })
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn render(&self, view: &ViewModel) -> Result<String, RenderError> {
        let context = Context::from_serialize(view)?;
        Ok(self.tera.render(&self.template.engine_name(), &context)?)
    }
}

/// `t(key="billTo", lang=lang)` inside templates.
fn translate_fn(
    strict: bool,
) -> impl Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let key = args
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("t: missing `key` argument"))?;
        let language = match args.get("lang").and_then(Value::as_str) {
            Some(code) => code
                .parse::<Language>()
                .map_err(|e| tera::Error::chain(format!("t: {e}"), e))?,
            None => DEFAULT_LANGUAGE,
        };

        match i18n::translate_key(language, key) {
            Ok(text) => Ok(Value::String(text.to_string())),
            Err(err) if strict => Err(tera::Error::chain(format!("t: {err}"), err)),
            Err(err) => {
                tracing::warn!(%err, "rendering placeholder for missing translation");
                Ok(Value::String(i18n::missing_placeholder(key)))
            }
        }
    }
}

// ==========================================
// Loader
// ==========================================

type LoadResult = Result<Arc<Renderer>, TemplateError>;
type LoadFuture = Shared<BoxFuture<'static, LoadResult>>;

/// Lazily loads and memoises one [`Renderer`] per template.
pub struct TemplateLoader<S> {
    source: Arc<S>,
    strict: bool,
    slots: Mutex<HashMap<Template, LoadFuture>>,
    fetches: Arc<AtomicUsize>,
}

impl<S: TemplateSource> TemplateLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            strict: cfg!(debug_assertions),
            slots: Mutex::new(HashMap::new()),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail on missing translation keys instead of rendering a placeholder.
    pub fn strict_translations(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Number of fetches issued against the source so far.
    pub fn load_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Template, LoadFuture>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the in-flight or finished load for `template`, creating it on
    /// first use. The flag is `true` when this call created it.
    fn slot(&self, template: Template) -> (LoadFuture, bool) {
        let mut slots = self.slots();
        if let Some(existing) = slots.get(&template) {
            return (existing.clone(), false);
        }

        let source = Arc::clone(&self.source);
        let fetches = Arc::clone(&self.fetches);
        let strict = self.strict;
        let fut = async move {
            fetches.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(template = template.id(), "loading template");
            let markup = source.fetch(template).await?;
            let renderer = Renderer::compile(template, &markup, strict)?;
            tracing::info!(template = template.id(), "template ready");
            Ok::<_, TemplateError>(Arc::new(renderer))
        }
        .boxed()
        .shared();

        slots.insert(template, fut.clone());
        (fut, true)
    }

    /// Drops a failed load so the next request starts a fresh one.
    fn evict_failed(&self, template: Template) {
        let mut slots = self.slots();
        if matches!(slots.get(&template).and_then(|f| f.peek()), Some(Err(_))) {
            slots.remove(&template);
        }
    }

    /// Waits for the renderer of `template`, loading it if needed.
    pub async fn load(&self, template: Template) -> Result<Arc<Renderer>, TemplateError> {
        let (fut, _) = self.slot(template);
        let result = fut.await;
        if let Err(err) = &result {
            tracing::warn!(template = template.id(), %err, "template load failed");
            self.evict_failed(template);
        }
        result
    }

    /// Starts loading `template` in the background if nothing has requested it
    /// yet. Without a tokio runtime the load starts on the next [`load`](Self::load).
    pub fn prefetch(&self, template: Template) {
        let (fut, created) = self.slot(template);
        if !created {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let _ = fut.await;
                });
            }
            Err(_) => tracing::debug!(template = template.id(), "no runtime, deferring load"),
        }
    }

    /// The finished load for `template`, if any. Failed loads are reported once
    /// and then forgotten.
    pub fn ready(&self, template: Template) -> Option<Result<Arc<Renderer>, TemplateError>> {
        let result = self.slots().get(&template).and_then(|f| f.peek().cloned());
        if let Some(Err(_)) = &result {
            self.evict_failed(template);
        }
        result
    }
}

// ==========================================
// Resolver
// ==========================================

/// Skeleton shown while a template loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub min_height: &'static str,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self {
            min_height: PLACEHOLDER_MIN_HEIGHT,
        }
    }
}

impl Placeholder {
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="skeleton" aria-busy="true" style="min-height: {}"></div>"#,
            self.min_height
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Document(String),
    Loading(Placeholder),
}

impl Resolved {
    pub fn into_html(self) -> String {
        match self {
            Resolved::Document(html) => html,
            Resolved::Loading(placeholder) => placeholder.to_html(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resolved::Loading(_))
    }
}

/// Maps template identifiers to renderers and renders invoices with them.
pub struct TemplateResolver<S> {
    loader: TemplateLoader<S>,
}

impl<S: TemplateSource> TemplateResolver<S> {
    pub fn new(loader: TemplateLoader<S>) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &TemplateLoader<S> {
        &self.loader
    }

    /// Renders with the template if it is loaded, otherwise kicks off the load
    /// and hands back a placeholder.
    pub fn resolve(
        &self,
        id: &str,
        invoice: &Invoice,
        language: Language,
    ) -> Result<Resolved, RenderError> {
        let template: Template = id.parse()?;
        match self.loader.ready(template) {
            Some(renderer) => {
                let renderer = renderer?;
                Ok(Resolved::Document(render(&renderer, invoice, language)?))
            }
            None => {
                self.loader.prefetch(template);
                Ok(Resolved::Loading(Placeholder::default()))
            }
        }
    }

    /// Like [`resolve`](Self::resolve) but waits for the load.
    pub async fn resolve_ready(
        &self,
        id: &str,
        invoice: &Invoice,
        language: Language,
    ) -> Result<String, RenderError> {
        let template: Template = id.parse()?;
        let renderer = self.loader.load(template).await?;
        render(&renderer, invoice, language)
    }
}

fn render(renderer: &Renderer, invoice: &Invoice, language: Language) -> Result<String, RenderError> {
    let view = view::build(invoice, language)?;
    renderer.render(&view)
}
