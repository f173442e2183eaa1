use super::models::Invoice;

/// Billing history as last fetched, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceArchive {
    invoices: Vec<Invoice>,
}

impl InvoiceArchive {
    pub fn new(mut invoices: Vec<Invoice>) -> Self {
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { invoices }
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn get(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id == id)
    }
}
