//! Invoice translations.
//!
//! The dictionary is closed: every [`TranslationKey`] has an entry for every
//! [`Language`], which the exhaustive `match` in [`translate`] enforces. Templates
//! refer to keys by their camelCase name, so string lookups go through
//! [`translate_key`] and fail on anything the dictionary does not define.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::TranslationError;

pub const DEFAULT_LANGUAGE: Language = Language::En;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Fr,
    De,
    Ar,
    He,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Ar,
        Language::He,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Ar => "ar",
            Language::He => "he",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::De => "Deutsch",
            Language::Ar => "العربية",
            Language::He => "עברית",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Language::Ar | Language::He => Direction::Rtl,
            _ => Direction::Ltr,
        }
    }

    pub fn is_rtl(self) -> bool {
        self.direction() == Direction::Rtl
    }

    /// BCP 47 tag used for date formatting.
    pub fn date_locale(self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Es => "es-ES",
            Language::Fr => "fr-FR",
            Language::De => "de-DE",
            Language::Ar => "ar-SA",
            Language::He => "he-IL",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        // Accept region-qualified tags such as "he-IL".
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == primary)
            .ok_or_else(|| TranslationError::UnsupportedLanguage(s.to_string()))
    }
}

/// Picks the language for a render, falling back to [`DEFAULT_LANGUAGE`] when
/// the route carries no locale or one we do not support.
pub fn resolve_language(code: Option<&str>) -> Language {
    match code {
        Some(code) => code.parse().unwrap_or_else(|_| {
            tracing::debug!(code, "unsupported locale, using default language");
            DEFAULT_LANGUAGE
        }),
        None => DEFAULT_LANGUAGE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationKey {
    Invoice,
    BillTo,
    InvoiceDate,
    DueDate,
    PoNumber,
    Item,
    Quantity,
    Rate,
    Amount,
    Subtotal,
    Discount,
    Tax,
    TaxId,
    Shipping,
    Total,
    TotalInWords,
    AdditionalNotes,
    PaymentTerms,
    PaymentInstructions,
    Bank,
    AccountName,
    AccountNumber,
    ContactInfo,
    Signature,
}

impl TranslationKey {
    pub const ALL: [TranslationKey; 24] = [
        TranslationKey::Invoice,
        TranslationKey::BillTo,
        TranslationKey::InvoiceDate,
        TranslationKey::DueDate,
        TranslationKey::PoNumber,
        TranslationKey::Item,
        TranslationKey::Quantity,
        TranslationKey::Rate,
        TranslationKey::Amount,
        TranslationKey::Subtotal,
        TranslationKey::Discount,
        TranslationKey::Tax,
        TranslationKey::TaxId,
        TranslationKey::Shipping,
        TranslationKey::Total,
        TranslationKey::TotalInWords,
        TranslationKey::AdditionalNotes,
        TranslationKey::PaymentTerms,
        TranslationKey::PaymentInstructions,
        TranslationKey::Bank,
        TranslationKey::AccountName,
        TranslationKey::AccountNumber,
        TranslationKey::ContactInfo,
        TranslationKey::Signature,
    ];

    /// Name used by templates, e.g. `t(key="billTo")`.
    pub fn name(self) -> &'static str {
        match self {
            TranslationKey::Invoice => "invoice",
            TranslationKey::BillTo => "billTo",
            TranslationKey::InvoiceDate => "invoiceDate",
            TranslationKey::DueDate => "dueDate",
            TranslationKey::PoNumber => "poNumber",
            TranslationKey::Item => "item",
            TranslationKey::Quantity => "quantity",
            TranslationKey::Rate => "rate",
            TranslationKey::Amount => "amount",
            TranslationKey::Subtotal => "subtotal",
            TranslationKey::Discount => "discount",
            TranslationKey::Tax => "tax",
            TranslationKey::TaxId => "taxId",
            TranslationKey::Shipping => "shipping",
            TranslationKey::Total => "total",
            TranslationKey::TotalInWords => "totalInWords",
            TranslationKey::AdditionalNotes => "additionalNotes",
            TranslationKey::PaymentTerms => "paymentTerms",
            TranslationKey::PaymentInstructions => "paymentInstructions",
            TranslationKey::Bank => "bank",
            TranslationKey::AccountName => "accountName",
            TranslationKey::AccountNumber => "accountNumber",
            TranslationKey::ContactInfo => "contactInfo",
            TranslationKey::Signature => "signature",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        TranslationKey::ALL.into_iter().find(|key| key.name() == name)
    }
}

/// Looks up `key` in the dictionary of `language`.
pub fn translate(language: Language, key: TranslationKey) -> &'static str {
    use Language::*;
    use TranslationKey::*;

    match (language, key) {
        (En, Invoice) => "Invoice",
        (En, BillTo) => "Bill to:",
        (En, InvoiceDate) => "Invoice date:",
        (En, DueDate) => "Due date:",
        (En, PoNumber) => "PO number:",
        (En, Item) => "Item",
        (En, Quantity) => "Qty",
        (En, Rate) => "Rate",
        (En, Amount) => "Amount",
        (En, Subtotal) => "Subtotal:",
        (En, Discount) => "Discount:",
        (En, Tax) => "Tax:",
        (En, TaxId) => "Tax ID:",
        (En, Shipping) => "Shipping:",
        (En, Total) => "Total:",
        (En, TotalInWords) => "Total in words:",
        (En, AdditionalNotes) => "Additional notes:",
        (En, PaymentTerms) => "Payment terms:",
        (En, PaymentInstructions) => "Please send the payment to this address",
        (En, Bank) => "Bank:",
        (En, AccountName) => "Account name:",
        (En, AccountNumber) => "Account no:",
        (En, ContactInfo) => "If you have any questions concerning this invoice, use the following contact information:",
        (En, Signature) => "Signature:",

        (Es, Invoice) => "Factura",
        (Es, BillTo) => "Facturar a:",
        (Es, InvoiceDate) => "Fecha de factura:",
        (Es, DueDate) => "Fecha de vencimiento:",
        (Es, PoNumber) => "Número de pedido:",
        (Es, Item) => "Artículo",
        (Es, Quantity) => "Cant.",
        (Es, Rate) => "Precio",
        (Es, Amount) => "Importe",
        (Es, Subtotal) => "Subtotal:",
        (Es, Discount) => "Descuento:",
        (Es, Tax) => "Impuesto:",
        (Es, TaxId) => "NIF:",
        (Es, Shipping) => "Envío:",
        (Es, Total) => "Total:",
        (Es, TotalInWords) => "Total en letras:",
        (Es, AdditionalNotes) => "Notas adicionales:",
        (Es, PaymentTerms) => "Condiciones de pago:",
        (Es, PaymentInstructions) => "Envíe el pago a esta cuenta",
        (Es, Bank) => "Banco:",
        (Es, AccountName) => "Titular de la cuenta:",
        (Es, AccountNumber) => "Número de cuenta:",
        (Es, ContactInfo) => "Si tiene alguna pregunta sobre esta factura, utilice la siguiente información de contacto:",
        (Es, Signature) => "Firma:",

        (Fr, Invoice) => "Facture",
        (Fr, BillTo) => "Facturer à :",
        (Fr, InvoiceDate) => "Date de facture :",
        (Fr, DueDate) => "Date d'échéance :",
        (Fr, PoNumber) => "Numéro de commande :",
        (Fr, Item) => "Article",
        (Fr, Quantity) => "Qté",
        (Fr, Rate) => "Prix",
        (Fr, Amount) => "Montant",
        (Fr, Subtotal) => "Sous-total :",
        (Fr, Discount) => "Remise :",
        (Fr, Tax) => "Taxe :",
        (Fr, TaxId) => "Numéro de TVA :",
        (Fr, Shipping) => "Livraison :",
        (Fr, Total) => "Total :",
        (Fr, TotalInWords) => "Total en lettres :",
        (Fr, AdditionalNotes) => "Notes complémentaires :",
        (Fr, PaymentTerms) => "Conditions de paiement :",
        (Fr, PaymentInstructions) => "Veuillez effectuer le paiement sur ce compte",
        (Fr, Bank) => "Banque :",
        (Fr, AccountName) => "Titulaire du compte :",
        (Fr, AccountNumber) => "Numéro de compte :",
        (Fr, ContactInfo) => "Pour toute question concernant cette facture, utilisez les coordonnées suivantes :",
        (Fr, Signature) => "Signature :",

        (De, Invoice) => "Rechnung",
        (De, BillTo) => "Rechnung an:",
        (De, InvoiceDate) => "Rechnungsdatum:",
        (De, DueDate) => "Fälligkeitsdatum:",
        (De, PoNumber) => "Bestellnummer:",
        (De, Item) => "Position",
        (De, Quantity) => "Menge",
        (De, Rate) => "Preis",
        (De, Amount) => "Betrag",
        (De, Subtotal) => "Zwischensumme:",
        (De, Discount) => "Rabatt:",
        (De, Tax) => "Steuer:",
        (De, TaxId) => "USt-IdNr.:",
        (De, Shipping) => "Versand:",
        (De, Total) => "Gesamt:",
        (De, TotalInWords) => "Gesamt in Worten:",
        (De, AdditionalNotes) => "Zusätzliche Hinweise:",
        (De, PaymentTerms) => "Zahlungsbedingungen:",
        (De, PaymentInstructions) => "Bitte überweisen Sie den Betrag auf folgendes Konto",
        (De, Bank) => "Bank:",
        (De, AccountName) => "Kontoinhaber:",
        (De, AccountNumber) => "Kontonummer:",
        (De, ContactInfo) => "Bei Fragen zu dieser Rechnung verwenden Sie bitte die folgenden Kontaktdaten:",
        (De, Signature) => "Unterschrift:",

        (Ar, Invoice) => "فاتورة",
        (Ar, BillTo) => "فاتورة إلى:",
        (Ar, InvoiceDate) => "تاريخ الفاتورة:",
        (Ar, DueDate) => "تاريخ الاستحقاق:",
        (Ar, PoNumber) => "رقم أمر الشراء:",
        (Ar, Item) => "البند",
        (Ar, Quantity) => "الكمية",
        (Ar, Rate) => "السعر",
        (Ar, Amount) => "المبلغ",
        (Ar, Subtotal) => "المجموع الفرعي:",
        (Ar, Discount) => "الخصم:",
        (Ar, Tax) => "الضريبة:",
        (Ar, TaxId) => "الرقم الضريبي:",
        (Ar, Shipping) => "الشحن:",
        (Ar, Total) => "الإجمالي:",
        (Ar, TotalInWords) => "الإجمالي كتابة:",
        (Ar, AdditionalNotes) => "ملاحظات إضافية:",
        (Ar, PaymentTerms) => "شروط الدفع:",
        (Ar, PaymentInstructions) => "يرجى إرسال الدفعة إلى هذا الحساب",
        (Ar, Bank) => "البنك:",
        (Ar, AccountName) => "اسم الحساب:",
        (Ar, AccountNumber) => "رقم الحساب:",
        (Ar, ContactInfo) => "إذا كان لديك أي استفسار بخصوص هذه الفاتورة، يرجى استخدام معلومات الاتصال التالية:",
        (Ar, Signature) => "التوقيع:",

        (He, Invoice) => "חשבונית",
        (He, BillTo) => "לכבוד:",
        (He, InvoiceDate) => "תאריך החשבונית:",
        (He, DueDate) => "תאריך לתשלום:",
        (He, PoNumber) => "מספר הזמנה:",
        (He, Item) => "פריט",
        (He, Quantity) => "כמות",
        (He, Rate) => "מחיר",
        (He, Amount) => "סכום",
        (He, Subtotal) => "סכום ביניים:",
        (He, Discount) => "הנחה:",
        (He, Tax) => "מס:",
        (He, TaxId) => "מספר עוסק:",
        (He, Shipping) => "משלוח:",
        (He, Total) => "סה\"כ:",
        (He, TotalInWords) => "סה\"כ במילים:",
        (He, AdditionalNotes) => "הערות נוספות:",
        (He, PaymentTerms) => "תנאי תשלום:",
        (He, PaymentInstructions) => "נא להעביר את התשלום לחשבון הבא",
        (He, Bank) => "בנק:",
        (He, AccountName) => "שם החשבון:",
        (He, AccountNumber) => "מספר חשבון:",
        (He, ContactInfo) => "לשאלות בנוגע לחשבונית זו, ניתן לפנות בפרטי הקשר הבאים:",
        (He, Signature) => "חתימה:",
    }
}

/// String-keyed lookup used by templates.
pub fn translate_key(language: Language, key: &str) -> Result<&'static str, TranslationError> {
    TranslationKey::from_name(key)
        .map(|key| translate(language, key))
        .ok_or_else(|| TranslationError::MissingKey {
            language: language.code().to_string(),
            key: key.to_string(),
        })
}

/// Visible stand-in for a missing key when translations run in lenient mode.
pub fn missing_placeholder(key: &str) -> String {
    format!("[missing: {key}]")
}
