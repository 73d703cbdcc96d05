use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Attribute, Cell, Table};
use slug::slugify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use invoice_templates::config::Settings;
use invoice_templates::page::{self, FormState, RouteContext, SnapshotFormState};
use invoice_templates::template::{
    DirectorySource, EmbeddedSource, Template, TemplateLoader, TemplateResolver, TemplateSource,
};
use invoice_templates::Language;

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-templates")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, env = "INVOICE_TEMPLATES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an invoice snapshot (JSON) to HTML
    Render {
        /// Invoice form snapshot
        #[arg(long, short)]
        input: PathBuf,
        /// Template id (defaults to the invoice's stored template)
        #[arg(long, short)]
        template: Option<String>,
        /// Language code, e.g. en, he, ar
        #[arg(long, short, env = "INVOICE_TEMPLATES_LANG")]
        lang: Option<String>,
        /// Output file (defaults to <output_dir>/invoice-<number>.html)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Template directory overriding the embedded templates
        #[arg(long, env = "INVOICE_TEMPLATES_DIR")]
        template_dir: Option<PathBuf>,
    },
    /// List available templates
    Templates,
    /// List supported languages
    Languages,
    /// Write the embedded templates to the template directory
    InitTemplates {
        /// Target directory (defaults to the configured template_dir)
        dir: Option<PathBuf>,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Update settings
    Config {
        #[arg(long)]
        template_dir: Option<PathBuf>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        strict_translations: Option<bool>,
    },
}

// ==========================================
// Main Function
// ==========================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Render {
            input,
            template,
            lang,
            output,
            template_dir,
        } => {
            let form = SnapshotFormState::from_json_file(&input)
                .with_context(|| format!("reading invoice snapshot {}", input.display()))?;
            let route = RouteContext {
                template,
                locale: Some(lang.unwrap_or_else(|| settings.default_language.clone())),
            };
            let output = output.unwrap_or_else(|| default_output(&settings, &form));

            match template_dir.or_else(|| settings.template_dir.clone()) {
                Some(dir) => {
                    render_to_file(DirectorySource::new(dir), &settings, &route, &form, &output).await?
                }
                None => render_to_file(EmbeddedSource, &settings, &route, &form, &output).await?,
            }
        }
        Commands::Templates => list_templates(),
        Commands::Languages => list_languages(),
        Commands::InitTemplates { dir, force } => {
            let dir = dir
                .or_else(|| settings.template_dir.clone())
                .context("no template directory given and none configured")?;
            init_templates(&dir, force)?;
        }
        Commands::Config {
            template_dir,
            language,
            output_dir,
            strict_translations,
        } => {
            let mut settings = settings;
            if let Some(dir) = template_dir {
                settings.template_dir = Some(dir);
            }
            if let Some(code) = language {
                let lang: Language = code.parse()?;
                settings.default_language = lang.code().to_string();
            }
            if let Some(dir) = output_dir {
                settings.output_dir = dir;
            }
            if strict_translations.is_some() {
                settings.strict_translations = strict_translations;
            }
            let path = match &cli.config {
                Some(path) => {
                    settings.save_to(path)?;
                    path.clone()
                }
                None => settings.save()?,
            };
            println!("✅ Settings saved to {}", path.display());
        }
    }

    Ok(())
}

// ==========================================
// 1. Rendering
// ==========================================

async fn render_to_file<S: TemplateSource>(
    source: S,
    settings: &Settings,
    route: &RouteContext,
    form: &SnapshotFormState,
    output: &Path,
) -> Result<()> {
    let loader = TemplateLoader::new(source).strict_translations(settings.strict_translations());
    let resolver = TemplateResolver::new(loader);

    let html = page::render_document(&resolver, route, form).await?;
    let document = format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\" dir=\"{dir}\">\n<head><meta charset=\"utf-8\"></head>\n<body>\n{html}\n</body>\n</html>\n",
        lang = route.language().code(),
        dir = route.language().direction().as_str(),
    );

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, document).with_context(|| format!("writing {}", output.display()))?;
    println!("✅ Invoice rendered: {}", output.display());
    Ok(())
}

fn default_output(settings: &Settings, form: &SnapshotFormState) -> PathBuf {
    let number = form.current_values().details.invoice_number;
    let stem = if number.trim().is_empty() {
        "invoice".to_string()
    } else {
        format!("invoice-{}", slugify(&number))
    };
    settings.output_dir.join(format!("{stem}.html"))
}

// ==========================================
// 2. Listings
// ==========================================

fn list_templates() {
    let mut table = Table::new();
    table.set_header(vec![Cell::new("Id"), Cell::new("Name"), Cell::new("Layout"), Cell::new("File")]);
    for template in Template::ALL {
        table.add_row(vec![
            Cell::new(template.id()).add_attribute(Attribute::Bold),
            Cell::new(template.name()),
            Cell::new(template.description()),
            Cell::new(template.file_name()),
        ]);
    }
    println!("{table}");
}

fn list_languages() {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Code"),
        Cell::new("Language"),
        Cell::new("Direction"),
        Cell::new("Date locale"),
    ]);
    for lang in Language::ALL {
        table.add_row(vec![
            Cell::new(lang.code()).add_attribute(Attribute::Bold),
            Cell::new(lang.native_name()),
            Cell::new(lang.direction().as_str()),
            Cell::new(lang.date_locale()),
        ]);
    }
    println!("{table}");
}

// ==========================================
// 3. Template Directory
// ==========================================

fn init_templates(dir: &Path, force: bool) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for template in Template::ALL {
        let path = dir.join(template.file_name());
        if path.exists() && !force {
            println!("⚠️  {} already exists, skipping (use --force to overwrite).", path.display());
            continue;
        }
        fs::write(&path, template.embedded_markup())
            .with_context(|| format!("writing {}", path.display()))?;
        println!("✨ Wrote template {}: {}", template, path.display());
    }
    Ok(())
}
