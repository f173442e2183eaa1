pub mod archive;
pub mod models;
pub mod render;

pub use archive::InvoiceArchive;
pub use models::{BillingContact, Invoice};
pub use render::{format_amount, render, totals, InvoiceArtifact, InvoiceTotals};
