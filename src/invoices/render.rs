use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::models::{BillingContact, Invoice};

pub const INVOICE_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const INVOICE_EXTENSION: &str = "html";
const TAX_RATE_LABEL: &str = "Tax (0%)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Invoices carry a single line item and a flat 0% tax, so the grand total
/// always equals the subtotal.
pub fn totals(invoice: &Invoice) -> InvoiceTotals {
    InvoiceTotals {
        subtotal_cents: invoice.amount_cents,
        tax_cents: 0,
        total_cents: invoice.amount_cents,
    }
}

/// key: invoice-artifact -> standalone printable document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl InvoiceArtifact {
    pub fn file_name_for(invoice_number: &str) -> String {
        let safe: String = invoice_number
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '-'
                }
            })
            .collect();
        format!("invoice-{safe}.{INVOICE_EXTENSION}")
    }

    /// Writes the artifact into `dir`. This is the only step that touches
    /// storage; rendering stays pure.
    pub async fn download(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create download directory {}", dir.display()))?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.body.as_bytes())
            .await
            .with_context(|| format!("failed to write invoice artifact {}", path.display()))?;
        info!(path = %path.display(), bytes = self.body.len(), "invoice artifact written");
        Ok(path)
    }
}

/// Renders one invoice. Output depends only on the arguments, so the same
/// invoice rendered with the same `generated_at` is byte-identical.
pub fn render(
    invoice: &Invoice,
    contact: &BillingContact,
    generated_at: DateTime<Utc>,
) -> InvoiceArtifact {
    let totals = totals(invoice);
    let currency = invoice.currency.as_str();
    let number = escape_html(&invoice.invoice_number);

    let mut body = String::with_capacity(2048);
    body.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    body.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(body, "<title>Invoice {number}</title>");
    body.push_str(STYLESHEET);
    body.push_str("</head>\n<body>\n");

    body.push_str("<header>\n<h1>Invoice</h1>\n");
    let _ = writeln!(body, "<p class=\"invoice-number\">{number}</p>");
    let _ = writeln!(
        body,
        "<p class=\"issued\">Issued {}</p>",
        invoice.created_at.format("%B %-d, %Y")
    );
    let _ = writeln!(
        body,
        "<p class=\"status\">Status: {}</p>",
        escape_html(&invoice.status)
    );
    body.push_str("</header>\n");

    body.push_str("<section class=\"bill-to\">\n<h2>Bill to</h2>\n");
    let _ = writeln!(body, "<p>{}</p>", escape_html(&contact.display_name));
    let _ = writeln!(body, "<p>{}</p>", escape_html(&contact.email));
    body.push_str("</section>\n");

    body.push_str("<table class=\"line-items\">\n");
    body.push_str("<thead><tr><th>Description</th><th>Billing period</th><th>Amount</th></tr></thead>\n");
    let _ = writeln!(
        body,
        "<tbody><tr><td>{} plan</td><td>{} &ndash; {}</td><td>{}</td></tr></tbody>",
        escape_html(&invoice.plan_name),
        invoice.billing_start.format("%b %-d, %Y"),
        invoice.billing_end.format("%b %-d, %Y"),
        format_amount(invoice.amount_cents, currency),
    );
    body.push_str("</table>\n");

    body.push_str("<section class=\"totals\">\n");
    let _ = writeln!(
        body,
        "<p><span>Subtotal</span><span>{}</span></p>",
        format_amount(totals.subtotal_cents, currency)
    );
    let _ = writeln!(
        body,
        "<p><span>{TAX_RATE_LABEL}</span><span>{}</span></p>",
        format_amount(totals.tax_cents, currency)
    );
    let _ = writeln!(
        body,
        "<p class=\"grand-total\"><span>Total</span><span>{}</span></p>",
        format_amount(totals.total_cents, currency)
    );
    body.push_str("</section>\n");

    let _ = writeln!(
        body,
        "<footer>Generated {} from billing record {}. Payment already settled; no action required.</footer>",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        escape_html(&invoice.id),
    );
    body.push_str("</body>\n</html>\n");

    InvoiceArtifact {
        file_name: InvoiceArtifact::file_name_for(&invoice.invoice_number),
        content_type: INVOICE_CONTENT_TYPE,
        body,
    }
}

/// ISO 4217 currencies without a minor unit. Amounts in these are already
/// whole units.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// Formats integer minor units, e.g. `3900, "usd"` as `$39.00` and
/// `1200, "jpy"` as `1200 JPY`.
pub fn format_amount(amount_cents: i64, currency: &str) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.unsigned_abs();
    let code = currency.trim().to_ascii_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) {
        return format!("{sign}{abs} {code}");
    }

    let major = abs / 100;
    let minor = abs % 100;
    match code.as_str() {
        "USD" => format!("{sign}${major}.{minor:02}"),
        "EUR" => format!("{sign}\u{20ac}{major}.{minor:02}"),
        "GBP" => format!("{sign}\u{a3}{major}.{minor:02}"),
        _ => format!("{sign}{major}.{minor:02} {code}"),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const STYLESHEET: &str = "<style>\n\
body { font-family: -apple-system, 'Segoe UI', sans-serif; color: #1f2933; margin: 40px; }\n\
header { border-bottom: 2px solid #e4e7eb; margin-bottom: 24px; }\n\
table { width: 100%; border-collapse: collapse; margin: 24px 0; }\n\
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e4e7eb; }\n\
.totals p { display: flex; justify-content: space-between; max-width: 320px; margin-left: auto; }\n\
.grand-total { font-weight: bold; }\n\
footer { margin-top: 40px; font-size: 12px; color: #7b8794; }\n\
</style>\n";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_invoice() -> Invoice {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().unwrap();
        Invoice {
            id: "inv_123".to_string(),
            invoice_number: "INV-2024-0042".to_string(),
            amount_cents: 3900,
            currency: "usd".to_string(),
            status: "paid".to_string(),
            plan_name: "Pro <24x7>".to_string(),
            billing_start: created_at - Duration::days(29),
            billing_end: created_at,
            created_at,
        }
    }

    fn contact() -> BillingContact {
        BillingContact {
            display_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn without_footer(body: &str) -> &str {
        body.split("<footer>").next().unwrap_or(body)
    }

    #[test]
    fn rendering_is_deterministic_apart_from_footer() {
        let invoice = sample_invoice();
        let first = render(&invoice, &contact(), Utc::now());
        let second = render(&invoice, &contact(), Utc::now() + Duration::hours(3));
        assert_eq!(without_footer(&first.body), without_footer(&second.body));
        assert_eq!(first.file_name, "invoice-INV-2024-0042.html");
    }

    #[test]
    fn artifact_contains_required_sections() {
        let artifact = render(&sample_invoice(), &contact(), Utc::now());
        let body = artifact.body.as_str();
        assert!(body.contains("Ada Lovelace"));
        assert!(body.contains("ada@example.com"));
        assert!(body.contains("INV-2024-0042"));
        assert!(body.contains("Issued March 1, 2024"));
        assert!(body.contains("Pro &lt;24x7&gt; plan"));
        assert!(body.contains("Feb 1, 2024 &ndash; Mar 1, 2024"));
        assert!(body.contains("<span>Subtotal</span><span>$39.00</span>"));
        assert!(body.contains("<span>Tax (0%)</span><span>$0.00</span>"));
        assert!(body.contains("<span>Total</span><span>$39.00</span>"));
        assert!(body.contains("<footer>Generated"));
    }

    #[test]
    fn grand_total_matches_subtotal() {
        let totals = totals(&sample_invoice());
        assert_eq!(totals.total_cents, totals.subtotal_cents);
        assert_eq!(totals.tax_cents, 0);
    }

    #[test]
    fn amounts_format_from_minor_units() {
        assert_eq!(format_amount(3900, "USD"), "$39.00");
        assert_eq!(format_amount(5, "eur"), "\u{20ac}0.05");
        assert_eq!(format_amount(-1250, "usd"), "-$12.50");
        assert_eq!(format_amount(1999, "chf"), "19.99 CHF");
    }

    #[test]
    fn zero_decimal_currencies_are_not_scaled() {
        assert_eq!(format_amount(100000, "JPY"), "100000 JPY");
        assert_eq!(format_amount(-4500, "krw"), "-4500 KRW");
    }

    #[test]
    fn file_names_are_path_safe() {
        assert_eq!(
            InvoiceArtifact::file_name_for("2024/03 #7"),
            "invoice-2024-03--7.html"
        );
    }
}
