use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{DocumentKind, Province, PurchaseType, RegistrationStatus, TaxableDocument};

/// A customer or supplier as needed for the annexures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyRecord {
    pub name: String,
    pub registration: Option<RegistrationStatus>,
    /// NTN / STRN.
    pub tax_id: Option<String>,
    /// National identity card number.
    pub cnic: Option<String>,
    /// Name of the party's primary (billing) address.
    pub primary_address: Option<String>,
}

impl PartyRecord {
    /// Registration number reported to FBR: the tax id of a registered
    /// party, the CNIC otherwise.
    pub fn registration_number(&self) -> Option<&str> {
        match self.registration {
            Some(RegistrationStatus::Registered) => self.tax_id.as_deref(),
            _ => self.cnic.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub name: String,
    pub province: Option<Province>,
}

/// A Pakistan Customs Tariff (PCT) heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HsCodeRecord {
    pub code: String,
    pub description: Option<String>,
}

/// Selection of submitted documents.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery<'a> {
    pub kind: DocumentKind,
    /// Inclusive range, applied only when both ends are given.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub company: Option<&'a str>,
    pub purchase_type: Option<PurchaseType>,
}

impl DocumentQuery<'_> {
    /// Whether a document falls inside this selection. Drafts never do.
    pub fn matches(&self, doc: &TaxableDocument) -> bool {
        doc.submitted
            && doc.kind == self.kind
            && self
                .date_range
                .is_none_or(|(from, to)| doc.posting_date >= from && doc.posting_date <= to)
            && self.company.is_none_or(|c| doc.company == c)
            && self
                .purchase_type
                .is_none_or(|t| doc.purchase_type == Some(t))
    }
}

/// Batch lookups behind the annexures. Missing records are left out of
/// results rather than reported as errors.
pub trait ComplianceSource {
    fn submitted_documents(&self, query: &DocumentQuery<'_>) -> Vec<TaxableDocument>;

    fn parties(&self, kind: DocumentKind, names: &[&str]) -> Vec<PartyRecord>;

    fn addresses(&self, names: &[&str]) -> Vec<AddressRecord>;

    /// Billing address of the company, or of any company when `None`.
    fn company_billing_address(&self, company: Option<&str>) -> Option<AddressRecord>;

    fn hs_codes(&self, codes: &[&str]) -> Vec<HsCodeRecord>;
}

/// In-memory [`ComplianceSource`], loadable with serde.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySource {
    pub documents: Vec<TaxableDocument>,
    pub customers: BTreeMap<String, PartyRecord>,
    pub suppliers: BTreeMap<String, PartyRecord>,
    pub addresses: BTreeMap<String, AddressRecord>,
    /// Company name to billing address name.
    pub company_addresses: BTreeMap<String, String>,
    pub hs_codes: BTreeMap<String, HsCodeRecord>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, doc: TaxableDocument) -> Self {
        self.documents.push(doc);
        self
    }

    pub fn with_customer(mut self, party: PartyRecord) -> Self {
        self.customers.insert(party.name.clone(), party);
        self
    }

    pub fn with_supplier(mut self, party: PartyRecord) -> Self {
        self.suppliers.insert(party.name.clone(), party);
        self
    }

    pub fn with_address(mut self, address: AddressRecord) -> Self {
        self.addresses.insert(address.name.clone(), address);
        self
    }

    pub fn with_company_address(
        mut self,
        company: impl Into<String>,
        address: AddressRecord,
    ) -> Self {
        self.company_addresses
            .insert(company.into(), address.name.clone());
        self.with_address(address)
    }

    pub fn with_hs_code(mut self, code: impl Into<String>, description: Option<&str>) -> Self {
        let code = code.into();
        self.hs_codes.insert(
            code.clone(),
            HsCodeRecord {
                code,
                description: description.map(str::to_string),
            },
        );
        self
    }
}

impl ComplianceSource for InMemorySource {
    fn submitted_documents(&self, query: &DocumentQuery<'_>) -> Vec<TaxableDocument> {
        let mut docs: Vec<TaxableDocument> = self
            .documents
            .iter()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        docs.sort_by(|a, b| {
            a.posting_date
                .cmp(&b.posting_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        docs
    }

    fn parties(&self, kind: DocumentKind, names: &[&str]) -> Vec<PartyRecord> {
        let table = match kind {
            DocumentKind::SalesInvoice => &self.customers,
            DocumentKind::PurchaseInvoice => &self.suppliers,
        };
        names
            .iter()
            .filter_map(|n| table.get(*n).cloned())
            .collect()
    }

    fn addresses(&self, names: &[&str]) -> Vec<AddressRecord> {
        names
            .iter()
            .filter_map(|n| self.addresses.get(*n).cloned())
            .collect()
    }

    fn company_billing_address(&self, company: Option<&str>) -> Option<AddressRecord> {
        let address = match company {
            Some(c) => self.company_addresses.get(c)?,
            None => self.company_addresses.values().next()?,
        };
        self.addresses.get(address).cloned()
    }

    fn hs_codes(&self, codes: &[&str]) -> Vec<HsCodeRecord> {
        codes
            .iter()
            .filter_map(|c| self.hs_codes.get(*c).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(status: Option<RegistrationStatus>) -> PartyRecord {
        PartyRecord {
            name: "Lahore Steel".into(),
            registration: status,
            tax_id: Some("1234567-8".into()),
            cnic: Some("35202-1234567-1".into()),
            primary_address: None,
        }
    }

    #[test]
    fn registered_reports_tax_id() {
        let p = party(Some(RegistrationStatus::Registered));
        assert_eq!(p.registration_number(), Some("1234567-8"));
    }

    #[test]
    fn unregistered_falls_back_to_cnic() {
        assert_eq!(
            party(Some(RegistrationStatus::Unregistered)).registration_number(),
            Some("35202-1234567-1")
        );
        assert_eq!(party(None).registration_number(), Some("35202-1234567-1"));
    }

    #[test]
    fn company_address_lookup() {
        let src = InMemorySource::new().with_company_address(
            "ACME",
            AddressRecord {
                name: "ACME-Billing".into(),
                province: Some(Province::Punjab),
            },
        );
        assert_eq!(
            src.company_billing_address(Some("ACME"))
                .and_then(|a| a.province),
            Some(Province::Punjab)
        );
        assert!(src.company_billing_address(None).is_some());
        assert!(src.company_billing_address(Some("Other")).is_none());
    }
}
