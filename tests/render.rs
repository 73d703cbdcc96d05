use invoice_templates::model::{AdjustmentDetail, AmountType, Signature, TemplateRef};
use invoice_templates::page::{self, RouteContext, SnapshotFormState};
use invoice_templates::{EmbeddedSource, Invoice, Language, RenderError, TemplateError, TemplateLoader, TemplateResolver};

const SNAPSHOT: &str = r#"{
    "sender": {
        "name": "Northwind Studio",
        "address": "12 Harbour Rd",
        "zipCode": "94107",
        "city": "San Francisco",
        "country": "USA",
        "email": "billing@northwind.test",
        "phone": "+1 555 0100"
    },
    "receiver": {
        "name": "Contoso Ltd",
        "address": "4 Market St",
        "zipCode": "10001",
        "city": "New York",
        "country": "USA",
        "email": "ap@contoso.test",
        "phone": "+1 555 0199"
    },
    "details": {
        "invoiceNumber": "INV-2024-001",
        "invoiceDate": "2024-01-15",
        "dueDate": "2024-02-14",
        "currency": "USD",
        "items": [
            { "name": "Website redesign", "description": "Landing page", "quantity": 1, "unitPrice": 2500, "total": 2500 },
            { "name": "Hosting", "description": "", "quantity": 12, "unitPrice": 20, "total": 240 }
        ],
        "discountDetails": { "amount": 0, "amountType": "amount" },
        "taxDetails": { "amount": 10, "amountType": "percentage", "taxID": "US-123" },
        "subTotal": 2740,
        "totalAmount": 3014,
        "totalAmountInWords": "Three thousand fourteen",
        "additionalNotes": "Thank you for your business",
        "paymentTerms": "Net 30",
        "paymentInformation": { "bankName": "First Bank", "accountName": "Northwind", "accountNumber": "000123" },
        "pdfTemplate": 1
    }
}"#;

fn snapshot() -> Invoice {
    Invoice::from_json(SNAPSHOT).unwrap()
}

fn resolver() -> TemplateResolver<EmbeddedSource> {
    TemplateResolver::new(TemplateLoader::new(EmbeddedSource).strict_translations(true))
}

async fn render(invoice: Invoice, template: &str, lang: &str) -> Result<String, RenderError> {
    let route = RouteContext::new(template, Some(lang));
    page::render_document(&resolver(), &route, &SnapshotFormState::new(invoice)).await
}

#[tokio::test]
async fn zero_discount_hidden_and_percentage_tax_shown() {
    for template in ["1", "2"] {
        let html = render(snapshot(), template, "en").await.unwrap();
        assert!(!html.contains("Discount:"), "template {template}");
        assert!(!html.contains(r#"class="discount""#), "template {template}");
        assert!(html.contains("Tax:"), "template {template}");
        assert!(html.contains("+ 10%"), "template {template}");
        assert!(html.contains("2,740.00 USD"), "template {template}");
        assert!(html.contains("3,014.00 USD"), "template {template}");
        assert!(html.contains("Three thousand fourteen USD"), "template {template}");
        assert!(html.contains("January 15, 2024"), "template {template}");
    }
}

#[tokio::test]
async fn positive_discount_uses_minus_and_currency() {
    let mut invoice = snapshot();
    invoice.details.discount_details = Some(AdjustmentDetail {
        amount: Some(50.0.into()),
        amount_type: AmountType::Amount,
        tax_id: None,
    });
    let html = render(invoice, "1", "en").await.unwrap();
    assert!(html.contains("Discount:"));
    assert!(html.contains("- 50 USD"));
}

#[tokio::test]
async fn text_amounts_from_the_form_render() {
    let json = SNAPSHOT
        .replace(r#""total": 240"#, r#""total": "240.00""#)
        .replace(r#""amount": 10,"#, r#""amount": "10","#);
    let invoice = Invoice::from_json(&json).unwrap();
    let html = render(invoice, "1", "en").await.unwrap();
    assert!(html.contains("240.00 USD"));
    assert!(html.contains("+ 10%"));
}

#[tokio::test]
async fn image_signature_renders_img() {
    let mut invoice = snapshot();
    invoice.details.signature = Some(Signature {
        data: "data:image/png;base64,AAAA".into(),
        font_family: None,
    });
    let html = render(invoice, "1", "en").await.unwrap();
    assert!(html.contains(r#"<img class="signature-image" src="data:image/png;base64,AAAA""#));
    assert!(!html.contains("signature-text"));
}

#[tokio::test]
async fn text_signature_renders_styled_text() {
    let mut invoice = snapshot();
    invoice.details.signature = Some(Signature {
        data: "John Doe".into(),
        font_family: Some("Caveat".into()),
    });
    let html = render(invoice, "2", "en").await.unwrap();
    assert!(html.contains("font-family: Caveat, cursive;"));
    assert!(html.contains(">John Doe</p>"));
    assert!(!html.contains("signature-image"));
}

#[tokio::test]
async fn no_signature_block_without_data() {
    let html = render(snapshot(), "1", "en").await.unwrap();
    assert!(!html.contains(r#"class="signature""#));
}

#[tokio::test]
async fn hebrew_is_right_to_left_with_hebrew_dates() {
    let html = render(snapshot(), "1", "he").await.unwrap();
    assert!(html.contains(r#"dir="rtl""#));
    assert!(!html.contains(r#"dir="ltr""#));
    assert!(html.contains(r#"data-date-locale="he-IL""#));
    assert!(html.contains("ינואר"));
    assert!(html.contains("חשבונית"));
}

#[tokio::test]
async fn unsupported_locale_falls_back_to_english() {
    let html = render(snapshot(), "2", "xx").await.unwrap();
    assert!(html.contains(r#"dir="ltr""#));
    assert!(html.contains("Bill to:"));
}

#[tokio::test]
async fn every_language_renders_every_template() {
    for template in ["1", "2"] {
        for lang in Language::ALL {
            let html = render(snapshot(), template, lang.code()).await.unwrap();
            assert!(html.contains(&format!(r#"dir="{}""#, lang.direction().as_str())));
        }
    }
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let err = render(snapshot(), "7", "en").await.unwrap_err();
    assert!(matches!(err, RenderError::Template(TemplateError::NotFound(ref id)) if id == "7"));
}

#[tokio::test]
async fn stored_template_preference_is_used_without_route_id() {
    let mut invoice = snapshot();
    invoice.details.pdf_template = Some(TemplateRef::Number(2));
    let route = RouteContext {
        template: None,
        locale: Some("de".into()),
    };
    let html = page::render_document(&resolver(), &route, &SnapshotFormState::new(invoice))
        .await
        .unwrap();
    assert!(html.contains("invoice-template-2"));
    assert!(html.contains("Rechnung"));
}

#[tokio::test]
async fn invalid_date_surfaces_format_error() {
    let mut invoice = snapshot();
    invoice.details.invoice_date = "31/31/2024".into();
    let err = render(invoice, "1", "en").await.unwrap_err();
    assert!(matches!(err, RenderError::Format(_)));
}

#[tokio::test]
async fn markup_is_escaped() {
    let mut invoice = snapshot();
    invoice.receiver.name = "<script>alert(1)</script>".into();
    let html = render(invoice, "1", "en").await.unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}
