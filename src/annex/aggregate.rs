use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{DocumentKind, LineItem, Province, PurchaseType, TaxableDocument};

use super::report::{Column, ExportRow, FieldType, Indicator, Report, SummaryCard};
use super::source::{AddressRecord, ComplianceSource, DocumentQuery, HsCodeRecord, PartyRecord};

/// Report run parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilters {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub company: Option<String>,
}

impl ReportFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from_date = Some(from);
        self.to_date = Some(to);
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.from_date.zip(self.to_date)
    }
}

/// Annex A: local purchases, one row per invoice and PCT code.
///
/// Origin is the supplier's province, destination the company's.
pub fn annex_a<S: ComplianceSource + ?Sized>(source: &S, filters: &ReportFilters) -> Report {
    let docs = source.submitted_documents(&DocumentQuery {
        kind: DocumentKind::PurchaseInvoice,
        date_range: filters.date_range(),
        company: filters.company.as_deref(),
        purchase_type: Some(PurchaseType::Local),
    });
    let lookups = Lookups::fetch(source, DocumentKind::PurchaseInvoice, &docs);
    let company_province = source
        .company_billing_address(filters.company.as_deref())
        .and_then(|a| a.province);

    let rows: Vec<ExportRow> = docs
        .iter()
        .flat_map(|doc| {
            let party_province = lookups.party_province(&doc.party);
            lookups.rows(doc, party_province, company_province)
        })
        .collect();

    Report {
        columns: annex_a_columns(),
        summary: summary(&rows),
        rows,
    }
}

/// Annex C: sales, one row per invoice and PCT code.
///
/// Origin is the province of the invoice's company address (the company
/// billing address when the invoice has none), destination the customer's.
pub fn annex_c<S: ComplianceSource + ?Sized>(source: &S, filters: &ReportFilters) -> Report {
    let docs = source.submitted_documents(&DocumentQuery {
        kind: DocumentKind::SalesInvoice,
        date_range: filters.date_range(),
        company: filters.company.as_deref(),
        purchase_type: None,
    });
    let lookups = Lookups::fetch(source, DocumentKind::SalesInvoice, &docs);
    let billing_province = source
        .company_billing_address(filters.company.as_deref())
        .and_then(|a| a.province);

    let rows: Vec<ExportRow> = docs
        .iter()
        .flat_map(|doc| {
            let origin = doc
                .company_address
                .as_deref()
                .and_then(|a| lookups.province(a))
                .or(billing_province);
            lookups.rows(doc, origin, lookups.party_province(&doc.party))
        })
        .collect();

    Report {
        columns: annex_c_columns(),
        summary: summary(&rows),
        rows,
    }
}

/// Everything a report needs besides the documents, fetched in one batch
/// per record kind.
struct Lookups {
    parties: BTreeMap<String, PartyRecord>,
    addresses: BTreeMap<String, AddressRecord>,
    hs_codes: BTreeMap<String, HsCodeRecord>,
}

impl Lookups {
    fn fetch<S: ComplianceSource + ?Sized>(
        source: &S,
        kind: DocumentKind,
        docs: &[TaxableDocument],
    ) -> Self {
        let party_names = distinct(docs.iter().map(|d| d.party.as_str()));
        let parties: BTreeMap<String, PartyRecord> = source
            .parties(kind, &party_names)
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        let address_names = distinct(
            parties
                .values()
                .filter_map(|p| p.primary_address.as_deref())
                .chain(docs.iter().filter_map(|d| d.company_address.as_deref())),
        );
        let addresses = source
            .addresses(&address_names)
            .into_iter()
            .map(|a| (a.name.clone(), a))
            .collect();

        let codes = distinct(
            docs.iter()
                .flat_map(|d| d.items.iter())
                .filter_map(|i| i.hs_code.as_deref()),
        );
        let hs_codes = source
            .hs_codes(&codes)
            .into_iter()
            .map(|h| (h.code.clone(), h))
            .collect();

        log::debug!(
            "annex lookups: {} documents, {} parties, {} codes",
            docs.len(),
            party_names.len(),
            codes.len()
        );
        Self {
            parties,
            addresses,
            hs_codes,
        }
    }

    fn province(&self, address: &str) -> Option<Province> {
        self.addresses.get(address).and_then(|a| a.province)
    }

    fn party_province(&self, party: &str) -> Option<Province> {
        self.parties
            .get(party)
            .and_then(|p| p.primary_address.as_deref())
            .and_then(|a| self.province(a))
    }

    fn describe(&self, code: Option<&str>) -> String {
        let Some(code) = code else {
            return "Missing HS Code".to_string();
        };
        match self
            .hs_codes
            .get(code)
            .and_then(|h| h.description.as_deref())
            .filter(|d| !d.trim().is_empty())
        {
            Some(description) => format!("{code}: {description}"),
            None => format!("{code}: Description Missing"),
        }
    }

    fn rows(
        &self,
        doc: &TaxableDocument,
        origin: Option<Province>,
        destination: Option<Province>,
    ) -> Vec<ExportRow> {
        let party = self.parties.get(&doc.party);
        if party.is_none() {
            log::debug!("{}: party '{}' not found", doc.name, doc.party);
        }

        group_by_code(&doc.items)
            .into_iter()
            .map(|group| ExportRow {
                registration_no: party
                    .and_then(PartyRecord::registration_number)
                    .map(str::to_string),
                party_name: doc.party.clone(),
                registration: party.and_then(|p| p.registration).or(doc.party_status),
                origin_province: origin,
                destination_province: destination,
                doc_type: doc.kind.document_type(doc.is_return).to_string(),
                doc_name: doc.name.clone(),
                posting_date: doc.posting_date,
                hs_description: self.describe(group.code.as_deref()),
                hs_code: group.code,
                classification: group.classification,
                sales_tax_rate: group.sales_tax_rate,
                qty: group.qty.abs(),
                uom: group.uom,
                amount: group.amount.abs(),
                st_amount: group.st_amount.abs(),
                further_tax: group.further_tax.abs(),
            })
            .collect()
    }
}

struct CodeGroup {
    code: Option<String>,
    classification: Option<String>,
    sales_tax_rate: Decimal,
    uom: String,
    qty: Decimal,
    amount: Decimal,
    st_amount: Decimal,
    further_tax: Decimal,
}

/// Sum lines per PCT code in order of first appearance. Lines without a
/// code form one group. Rate, UOM and classification come from the first
/// line of each group.
fn group_by_code(items: &[LineItem]) -> Vec<CodeGroup> {
    let mut groups: Vec<CodeGroup> = Vec::new();
    for item in items {
        let group = match groups.iter().position(|g| g.code == item.hs_code) {
            Some(i) => &mut groups[i],
            None => {
                groups.push(CodeGroup {
                    code: item.hs_code.clone(),
                    classification: item.item_group.clone(),
                    sales_tax_rate: item.st_rate,
                    uom: item.uom.clone(),
                    qty: Decimal::ZERO,
                    amount: Decimal::ZERO,
                    st_amount: Decimal::ZERO,
                    further_tax: Decimal::ZERO,
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        group.qty += item.qty;
        group.amount += item.amount;
        group.st_amount += item.st;
        group.further_tax += item.further_tax;
    }
    groups
}

fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut names: Vec<&str> = names.collect();
    names.sort_unstable();
    names.dedup();
    names
}

fn summary(rows: &[ExportRow]) -> Vec<SummaryCard> {
    let total = |f: fn(&ExportRow) -> Decimal| rows.iter().map(f).sum::<Decimal>();
    vec![
        SummaryCard {
            label: "Total Value Excl. Sales Tax".into(),
            value: total(|r| r.amount),
            indicator: Indicator::Blue,
        },
        SummaryCard {
            label: "Total Sales Tax".into(),
            value: total(|r| r.st_amount),
            indicator: Indicator::Green,
        },
        SummaryCard {
            label: "Total Further Tax".into(),
            value: total(|r| r.further_tax),
            indicator: Indicator::Orange,
        },
    ]
}

fn annex_a_columns() -> Vec<Column> {
    use FieldType::*;
    vec![
        Column::new("Registration No", "supplier_tax_id", Data, 150),
        Column::new("Supplier Name", "supplier_name", Data, 200),
        Column::new("Type", "tax_category", Data, 100),
        Column::new("Purchase Origination Province", "supplier_province", Data, 150),
        Column::new("Destination of Supply", "company_province", Data, 150),
        Column::new("Document Type", "doc_type", Data, 120),
        Column::new("Invoice Number", "doc_name", Data, 150),
        Column::new("Date", "posting_date", Date, 100),
        Column::new("HS Code Description", "hs_code", Data, 150),
        Column::new("Purchase Type", "tax_classification", Data, 120),
        Column::new("Rate", "sales_tax_rate", Percent, 100),
        Column::new("Qty", "qty", Float, 100),
        Column::new("UOM", "uom", Data, 100),
        Column::new("Value Excl. Sales Tax", "amount", Currency, 150),
        Column::new("Sales Tax/ FED in ST Mode", "st_amount", Currency, 150),
        Column::new(
            "Fixed / notified value or Retail Price / \
             Higher of actual and minimum fixed value of supplies",
            "fixed_notified_rate",
            Currency,
            150,
        ),
        Column::new("Extra Tax", "extra_tax", Currency, 100),
        Column::new("Further Tax", "further_tax", Currency, 120),
        Column::new(
            "Total Value of Sales (In case of PFAD only)",
            "total_value_of_sales_pfad_only",
            Currency,
            120,
        ),
        Column::new("ST Withheld at Source", "st_wh_at_source", Currency, 120),
        Column::new("Exemption SRO No./ Schedule No.", "exemption_sro_schedule", Data, 120),
        Column::new("Exemption Item S. No.", "exemption_item_sr_no", Data, 100),
    ]
}

fn annex_c_columns() -> Vec<Column> {
    use FieldType::*;
    vec![
        Column::new("Registration No", "customer_tax_id", Data, 150),
        Column::new("Customer Name", "customer_name", Data, 200),
        Column::new("Type", "tax_category", Data, 100),
        Column::new("Sale Origination Province", "supplier_province", Data, 150),
        Column::new("Destination of Supply", "customer_province", Data, 150),
        Column::new("Document Type", "doc_type", Data, 120),
        Column::new("Invoice Number", "doc_name", Data, 150),
        Column::new("Date", "posting_date", Date, 100),
        Column::new("HS Code Description", "hs_code", Data, 150),
        Column::new("Sale Type", "tax_classification", Data, 120),
        Column::new("Rate", "sales_tax_rate", Percent, 100),
        Column::new("Qty", "qty", Float, 100),
        Column::new("UOM", "uom", Data, 100),
        Column::new("Value Excl. Sales Tax", "amount", Currency, 150),
        Column::new("Sales Tax/ FED in ST Mode", "st_amount", Currency, 150),
        Column::new("Further Tax", "further_tax", Currency, 120),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LineItemBuilder;
    use rust_decimal_macros::dec;

    fn line(code: Option<&str>, qty: Decimal, amount: Decimal) -> LineItem {
        let mut b = LineItemBuilder::new("X", qty, "Kg", dec!(1))
            .amount(amount)
            .taxes(dec!(18), amount * dec!(0.18), dec!(0), dec!(0));
        if let Some(code) = code {
            b = b.hs_code(code);
        }
        b.build()
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let items = vec![
            line(Some("7214.1000"), dec!(2), dec!(200)),
            line(None, dec!(1), dec!(50)),
            line(Some("7214.1000"), dec!(3), dec!(300)),
        ];
        let groups = group_by_code(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].code.as_deref(), Some("7214.1000"));
        assert_eq!(groups[0].qty, dec!(5));
        assert_eq!(groups[0].amount, dec!(500));
        assert_eq!(groups[0].st_amount, dec!(90));
        assert_eq!(groups[1].code, None);
    }

    #[test]
    fn descriptions_fall_back() {
        let lookups = Lookups {
            parties: BTreeMap::new(),
            addresses: BTreeMap::new(),
            hs_codes: BTreeMap::from([(
                "7214.1000".to_string(),
                HsCodeRecord {
                    code: "7214.1000".into(),
                    description: Some("Bars and rods of iron".into()),
                },
            )]),
        };
        assert_eq!(
            lookups.describe(Some("7214.1000")),
            "7214.1000: Bars and rods of iron"
        );
        assert_eq!(
            lookups.describe(Some("9999.0000")),
            "9999.0000: Description Missing"
        );
        assert_eq!(lookups.describe(None), "Missing HS Code");
    }

    #[test]
    fn range_needs_both_ends() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut filters = ReportFilters::new();
        filters.from_date = Some(from);
        assert_eq!(filters.date_range(), None);
        let filters = filters.between(from, from);
        assert_eq!(filters.date_range(), Some((from, from)));
    }
}
