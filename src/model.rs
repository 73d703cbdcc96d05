use serde::{Deserialize, Serialize};

use crate::error::FormatError;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomInput {
    pub key: String,
    pub value: String,
}

/// Sender or receiver block. Both share the same shape.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Party {
    pub name: String,
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub country: String,
    pub email: String,
    pub phone: String,
    pub custom_inputs: Vec<CustomInput>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: NumericInput,
    pub unit_price: NumericInput,
    // Computed upstream as quantity * unit_price, often stored as fixed-point text.
    pub total: NumericInput,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmountType {
    #[default]
    Amount,
    Percentage,
}

/// Discount or tax entry. `amount` stays `None` when the form never set it.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentDetail {
    pub amount: Option<NumericInput>,
    #[serde(default)]
    pub amount_type: AmountType,
    #[serde(default, rename = "taxID", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetail {
    pub cost: Option<NumericInput>,
    #[serde(default)]
    pub cost_type: AmountType,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInformation {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub data: String,
    pub font_family: Option<String>,
}

/// Amounts come out of the form either as numbers or as the raw text of a
/// numeric input.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    pub fn value(&self) -> Result<f64, FormatError> {
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| FormatError::InvalidNumber(s.clone()))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormatError::InvalidNumber(value.to_string()))
        }
    }

    /// A cleared text input, which counts as "not set".
    pub fn is_blank(&self) -> bool {
        matches!(self, NumericInput::Text(s) if s.trim().is_empty())
    }

    /// Text as entered, numbers in their shortest form. Text must still parse.
    pub fn display(&self) -> Result<String, FormatError> {
        let value = self.value()?;
        Ok(match self {
            NumericInput::Number(_) => value.to_string(),
            NumericInput::Text(s) => s.trim().to_string(),
        })
    }
}

impl Default for NumericInput {
    fn default() -> Self {
        NumericInput::Number(0.0)
    }
}

impl From<f64> for NumericInput {
    fn from(n: f64) -> Self {
        NumericInput::Number(n)
    }
}

/// Template preference stored with the invoice, either `2` or `"2"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TemplateRef {
    Number(u32),
    Text(String),
}

impl std::fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateRef::Number(n) => write!(f, "{n}"),
            TemplateRef::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    pub invoice_logo: Option<String>,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub purchase_order_number: Option<String>,
    pub currency: String,
    pub language: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub payment_information: Option<PaymentInformation>,
    pub tax_details: Option<AdjustmentDetail>,
    pub discount_details: Option<AdjustmentDetail>,
    pub shipping_details: Option<ShippingDetail>,
    #[serde(default)]
    pub sub_total: NumericInput,
    #[serde(default)]
    pub total_amount: NumericInput,
    pub total_amount_in_words: Option<String>,
    pub additional_notes: Option<String>,
    pub payment_terms: Option<String>,
    pub signature: Option<Signature>,
    pub pdf_template: Option<TemplateRef>,
}

/// Snapshot of the invoice form.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub sender: Party,
    pub receiver: Party,
    pub details: InvoiceDetails,
}

impl Invoice {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_form_snapshot() {
        let json = r#"{
            "sender": { "name": "Acme", "address": "1 Main St", "zipCode": "10001",
                        "city": "New York", "country": "USA", "email": "a@acme.io",
                        "phone": "555", "customInputs": [{ "key": "VAT", "value": "123" }] },
            "receiver": { "name": "Globex" },
            "details": {
                "invoiceNumber": "INV-7",
                "invoiceDate": "2024-01-15",
                "dueDate": "2024-02-15",
                "currency": "USD",
                "items": [{ "name": "Work", "quantity": 2, "unitPrice": 50, "total": 100 }],
                "taxDetails": { "amount": 10, "amountType": "percentage", "taxID": "T-1" },
                "shippingDetails": { "cost": 5, "costType": "amount" },
                "subTotal": "100",
                "totalAmount": 115.5,
                "pdfTemplate": 2
            }
        }"#;

        let invoice = Invoice::from_json(json).unwrap();
        assert_eq!(invoice.sender.zip_code, "10001");
        assert_eq!(invoice.sender.custom_inputs[0].key, "VAT");
        assert_eq!(invoice.receiver.city, "");
        let tax = invoice.details.tax_details.unwrap();
        assert_eq!(tax.amount, Some(NumericInput::Number(10.0)));
        assert_eq!(tax.amount_type, AmountType::Percentage);
        assert_eq!(tax.tax_id.as_deref(), Some("T-1"));
        assert!(invoice.details.discount_details.is_none());
        assert_eq!(invoice.details.sub_total.value().unwrap(), 100.0);
        assert_eq!(invoice.details.total_amount.value().unwrap(), 115.5);
        assert_eq!(invoice.details.pdf_template, Some(TemplateRef::Number(2)));
    }

    #[test]
    fn numeric_text_must_parse() {
        let bad = NumericInput::Text("12abc".into());
        assert!(matches!(bad.value(), Err(FormatError::InvalidNumber(_))));
        assert!(NumericInput::Number(f64::NAN).value().is_err());
        assert_eq!(NumericInput::Text(" 3.5 ".into()).value().unwrap(), 3.5);
    }

    #[test]
    fn item_and_adjustment_amounts_accept_text() {
        let json = r#"{
            "sender": { "name": "Acme" },
            "receiver": { "name": "Globex" },
            "details": {
                "invoiceNumber": "INV-8",
                "invoiceDate": "2024-01-15",
                "dueDate": "2024-02-15",
                "currency": "EUR",
                "items": [{ "name": "Design", "quantity": "3", "unitPrice": "12.50", "total": "37.50" }],
                "discountDetails": { "amount": "", "amountType": "amount" },
                "taxDetails": { "amount": "10", "amountType": "percentage" },
                "shippingDetails": { "cost": "4.5", "costType": "amount" }
            }
        }"#;

        let invoice = Invoice::from_json(json).unwrap();
        let item = &invoice.details.items[0];
        assert_eq!(item.total, NumericInput::Text("37.50".into()));
        assert_eq!(item.total.display().unwrap(), "37.50");
        assert_eq!(item.quantity.value().unwrap(), 3.0);
        let tax = invoice.details.tax_details.unwrap();
        assert_eq!(tax.amount.unwrap().value().unwrap(), 10.0);
        assert!(invoice.details.discount_details.unwrap().amount.unwrap().is_blank());
        assert_eq!(invoice.details.shipping_details.unwrap().cost.unwrap().value().unwrap(), 4.5);
    }

    #[test]
    fn display_keeps_entered_text() {
        assert_eq!(NumericInput::Number(10.0).display().unwrap(), "10");
        assert_eq!(NumericInput::Text(" 7.25 ".into()).display().unwrap(), "7.25");
        assert!(NumericInput::Text("ten".into()).display().is_err());
    }
}
