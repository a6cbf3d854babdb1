//! Report shape shared by Annex A and Annex C, with CSV and JSON rendering.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{MahsoolError, Province, RegistrationStatus};

/// Display type of a report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Data,
    Date,
    Percent,
    Float,
    Currency,
}

impl FieldType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Data => "Data",
            Self::Date => "Date",
            Self::Percent => "Percent",
            Self::Float => "Float",
            Self::Currency => "Currency",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub label: String,
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub width: u32,
}

impl Column {
    pub(crate) fn new(label: &str, field: &str, field_type: FieldType, width: u32) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
            field_type,
            width,
        }
    }
}

/// Colour of a summary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    Blue,
    Green,
    Orange,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCard {
    pub label: String,
    pub value: Decimal,
    pub indicator: Indicator,
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportValue {
    Text(String),
    Date(NaiveDate),
    Number(Decimal),
    Empty,
}

/// One export row: a (document, classification code) group.
///
/// Quantities and amounts are absolute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub registration_no: Option<String>,
    pub party_name: String,
    pub registration: Option<RegistrationStatus>,
    pub origin_province: Option<Province>,
    pub destination_province: Option<Province>,
    /// "Sales Invoice", "Credit Note", "Purchase Invoice" or "Debit Note".
    pub doc_type: String,
    pub doc_name: String,
    pub posting_date: NaiveDate,
    pub hs_code: Option<String>,
    pub hs_description: String,
    /// Item group of the first line in the group.
    pub classification: Option<String>,
    pub sales_tax_rate: Decimal,
    pub qty: Decimal,
    pub uom: String,
    pub amount: Decimal,
    pub st_amount: Decimal,
    pub further_tax: Decimal,
}

impl ExportRow {
    /// Cell for a column field name of either annexure.
    pub fn value(&self, field: &str) -> ReportValue {
        fn text(v: Option<&str>) -> ReportValue {
            v.map_or(ReportValue::Empty, |s| ReportValue::Text(s.to_string()))
        }
        match field {
            "supplier_tax_id" | "customer_tax_id" => text(self.registration_no.as_deref()),
            "supplier_name" | "customer_name" => ReportValue::Text(self.party_name.clone()),
            "tax_category" => text(self.registration.map(|r| r.code())),
            "supplier_province" => text(self.origin_province.map(|p| p.name())),
            "company_province" | "customer_province" => {
                text(self.destination_province.map(|p| p.name()))
            }
            "doc_type" => ReportValue::Text(self.doc_type.clone()),
            "doc_name" => ReportValue::Text(self.doc_name.clone()),
            "posting_date" => ReportValue::Date(self.posting_date),
            "hs_code" => ReportValue::Text(self.hs_description.clone()),
            "tax_classification" => text(self.classification.as_deref()),
            "sales_tax_rate" => ReportValue::Number(self.sales_tax_rate),
            "qty" => ReportValue::Number(self.qty),
            "uom" => ReportValue::Text(self.uom.clone()),
            "amount" => ReportValue::Number(self.amount),
            "st_amount" => ReportValue::Number(self.st_amount),
            "further_tax" => ReportValue::Number(self.further_tax),
            _ => ReportValue::Empty,
        }
    }
}

/// Column set, rows and summary cards of a report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub columns: Vec<Column>,
    pub rows: Vec<ExportRow>,
    pub summary: Vec<SummaryCard>,
}

impl Report {
    /// Render as comma-separated values with a header row of column labels.
    ///
    /// Text is always quoted, amounts carry two decimals, dates are ISO 8601.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            csv_field_str(&mut out, &col.label);
        }
        out.push('\n');

        for row in &self.rows {
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                match row.value(&col.field) {
                    ReportValue::Text(s) => csv_field_str(&mut out, &s),
                    ReportValue::Date(d) => out.push_str(&d.format("%Y-%m-%d").to_string()),
                    ReportValue::Number(n) => csv_field_decimal(&mut out, n, col.field_type),
                    ReportValue::Empty => {}
                }
            }
            out.push('\n');
        }
        out
    }

    /// Render rows as JSON objects keyed by column field, alongside the
    /// column descriptors and summary cards.
    pub fn to_json(&self) -> Result<String, MahsoolError> {
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|col| {
                        let value = serde_json::to_value(row.value(&col.field))
                            .unwrap_or(serde_json::Value::Null);
                        (col.field.clone(), value)
                    })
                    .collect()
            })
            .collect();

        serde_json::to_string_pretty(&serde_json::json!({
            "columns": self.columns,
            "rows": rows,
            "summary": self.summary,
        }))
        .map_err(|e| MahsoolError::Export(e.to_string()))
    }
}

fn csv_field_str(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

fn csv_field_decimal(out: &mut String, d: Decimal, field_type: FieldType) {
    match field_type {
        FieldType::Currency => out.push_str(&format!("{:.2}", d.round_dp(2))),
        _ => out.push_str(&d.normalize().to_string()),
    }
}
