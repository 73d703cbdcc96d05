//! Builds the render-ready view of an invoice for one language.

use std::sync::LazyLock;

use chrono::{DateTime, Locale, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;

use crate::error::FormatError;
use crate::i18n::{Direction, Language};
use crate::model::{AmountType, CustomInput, Invoice, NumericInput, Party, PaymentInformation};

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*data:([a-z]+/[a-z0-9\-+.]+(;[a-z\-]+=[a-z0-9\-]+)?)?(;base64)?,([a-z0-9!$&',()*+;=\-._~:@/?%\s]*?)\s*$",
    )
    .expect("data URL pattern is valid")
});

const SIGNATURE_FALLBACK_FONT: &str = "cursive";

#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub name: String,
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub total: String,
}

/// One of the optional discount/tax/shipping rows, e.g. `+ 10%`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentLine {
    pub sign: char,
    pub value: String,
    pub suffix: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SignatureView {
    Image { src: String },
    Text { text: String, font_family: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub lang: &'static str,
    pub dir: &'static str,
    pub is_rtl: bool,
    pub date_locale: &'static str,
    /// CSS text alignment for the leading and trailing edge.
    pub align_start: &'static str,
    pub align_end: &'static str,

    pub sender: Party,
    pub receiver: Party,
    pub logo: Option<String>,

    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub po_number: Option<String>,
    pub currency: String,
    pub items: Vec<ItemView>,

    pub subtotal: String,
    pub discount: Option<AdjustmentLine>,
    pub tax: Option<AdjustmentLine>,
    pub tax_id: Option<String>,
    pub shipping: Option<AdjustmentLine>,
    pub total: String,
    pub total_in_words: Option<String>,

    pub additional_notes: Option<String>,
    pub payment_terms: Option<String>,
    pub payment: Option<PaymentInformation>,
    pub signature: Option<SignatureView>,
}

/// Derives everything a template needs to render `invoice` in `language`.
pub fn build(invoice: &Invoice, language: Language) -> Result<ViewModel, FormatError> {
    let details = &invoice.details;
    let direction = language.direction();
    let (align_start, align_end) = match direction {
        Direction::Ltr => ("left", "right"),
        Direction::Rtl => ("right", "left"),
    };
    let currency = details.currency.as_str();

    let items = details
        .items
        .iter()
        .map(|item| -> Result<ItemView, FormatError> {
            Ok(ItemView {
                name: item.name.clone(),
                description: item.description.clone(),
                quantity: item.quantity.display()?,
                unit_price: format!("{} {}", item.unit_price.display()?, currency),
                total: format!("{} {}", item.total.display()?, currency),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let discount = details
        .discount_details
        .as_ref()
        .map(|d| adjustment_line('-', d.amount.as_ref(), d.amount_type, currency))
        .transpose()?
        .flatten();
    let tax = details
        .tax_details
        .as_ref()
        .map(|t| adjustment_line('+', t.amount.as_ref(), t.amount_type, currency))
        .transpose()?
        .flatten();
    let shipping = details
        .shipping_details
        .as_ref()
        .map(|s| adjustment_line('+', s.cost.as_ref(), s.cost_type, currency))
        .transpose()?
        .flatten();
    let tax_id = tax.as_ref().and(
        details
            .tax_details
            .as_ref()
            .and_then(|t| non_blank(t.tax_id.as_deref())),
    );

    let subtotal = format!(
        "{} {}",
        format_number_with_commas(details.sub_total.value()?)?,
        currency
    );
    let total = format!(
        "{} {}",
        format_number_with_commas(details.total_amount.value()?)?,
        currency
    );

    Ok(ViewModel {
        lang: language.code(),
        dir: direction.as_str(),
        is_rtl: language.is_rtl(),
        date_locale: language.date_locale(),
        align_start,
        align_end,
        sender: clean_party(&invoice.sender),
        receiver: clean_party(&invoice.receiver),
        logo: non_blank(details.invoice_logo.as_deref()),
        invoice_number: details.invoice_number.clone(),
        invoice_date: format_date(&details.invoice_date, language)?,
        due_date: format_date(&details.due_date, language)?,
        po_number: non_blank(details.purchase_order_number.as_deref()),
        currency: details.currency.clone(),
        items,
        subtotal,
        discount,
        tax,
        tax_id,
        shipping,
        total,
        total_in_words: non_blank(details.total_amount_in_words.as_deref()),
        additional_notes: non_blank(details.additional_notes.as_deref()),
        payment_terms: non_blank(details.payment_terms.as_deref()),
        payment: details.payment_information.clone(),
        signature: details
            .signature
            .as_ref()
            .and_then(|sig| signature_view(&sig.data, sig.font_family.as_deref())),
    })
}

/// Returns the amount only when it is set and strictly positive.
///
/// Missing or blank input hides the line; text that is not a finite number
/// is an error.
pub fn visible_amount(amount: Option<&NumericInput>) -> Result<Option<f64>, FormatError> {
    match amount {
        None => Ok(None),
        Some(input) if input.is_blank() => Ok(None),
        Some(input) => {
            let value = input.value()?;
            Ok((value > 0.0).then_some(value))
        }
    }
}

pub fn adjustment_line(
    sign: char,
    amount: Option<&NumericInput>,
    amount_type: AmountType,
    currency: &str,
) -> Result<Option<AdjustmentLine>, FormatError> {
    let Some(amount) = visible_amount(amount)? else {
        return Ok(None);
    };
    let value = plain_number(amount);
    let (suffix, text) = match amount_type {
        AmountType::Amount => (currency.to_string(), format!("{sign} {value} {currency}")),
        AmountType::Percentage => ("%".to_string(), format!("{sign} {value}%")),
    };
    Ok(Some(AdjustmentLine {
        sign,
        value,
        suffix,
        text,
    }))
}

pub fn is_data_url(s: &str) -> bool {
    DATA_URL_RE.is_match(s)
}

pub fn signature_view(data: &str, font_family: Option<&str>) -> Option<SignatureView> {
    if data.trim().is_empty() {
        return None;
    }
    if is_data_url(data) {
        return Some(SignatureView::Image {
            src: data.trim().to_string(),
        });
    }
    let font_family = match font_family.map(str::trim).filter(|f| !f.is_empty()) {
        Some(font) => format!("{font}, {SIGNATURE_FALLBACK_FONT}"),
        None => SIGNATURE_FALLBACK_FONT.to_string(),
    };
    Some(SignatureView::Text {
        text: data.to_string(),
        font_family,
    })
}

/// Two decimals with `,` grouping, e.g. `1234567.8` -> `1,234,567.80`.
///
/// The grouping style is the same for every language.
pub fn format_number_with_commas(value: f64) -> Result<String, FormatError> {
    if !value.is_finite() {
        return Err(FormatError::InvalidNumber(value.to_string()));
    }
    let fixed = format!("{:.2}", value);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    Ok(format!("{sign}{grouped}.{frac_part}"))
}

/// Shortest decimal form: `10.0` -> `10`, `2.5` -> `2.5`.
pub fn plain_number(value: f64) -> String {
    value.to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, FormatError> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    for fmt in ["%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(FormatError::InvalidDate(raw.to_string()))
}

fn date_pattern(language: Language) -> (&'static str, Locale) {
    match language {
        Language::En => ("%B %-d, %Y", Locale::en_US),
        Language::Es => ("%-d de %B de %Y", Locale::es_ES),
        Language::Fr => ("%-d %B %Y", Locale::fr_FR),
        Language::De => ("%-d. %B %Y", Locale::de_DE),
        Language::Ar => ("%-d %B %Y", Locale::ar_SA),
        Language::He => ("%-d ב%B %Y", Locale::he_IL),
    }
}

/// Long-form date in the language's locale, e.g. `January 15, 2024`.
pub fn format_date(raw: &str, language: Language) -> Result<String, FormatError> {
    let date = parse_date(raw)?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| FormatError::InvalidDate(raw.to_string()))?;
    let (pattern, locale) = date_pattern(language);
    Ok(Utc
        .from_utc_datetime(&midnight)
        .format_localized(pattern, locale)
        .to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn clean_party(party: &Party) -> Party {
    Party {
        custom_inputs: party
            .custom_inputs
            .iter()
            .filter(|input| !input.key.trim().is_empty())
            .cloned()
            .collect::<Vec<CustomInput>>(),
        ..party.clone()
    }
}
