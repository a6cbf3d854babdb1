use thiserror::Error;

use super::types::TaxTag;

/// Errors that abort a tax or posting operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MahsoolError {
    /// A tax account is not denominated in company currency.
    #[error("currency for {account} must be {expected}, found {found}")]
    CurrencyMismatch {
        account: String,
        expected: String,
        found: String,
    },

    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing input.
    #[error("builder error: {0}")]
    Builder(String),

    /// Report rendering failed.
    #[error("export error: {0}")]
    Export(String),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "items[0].hs_code").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Rule identifier if applicable (e.g. "PK-HS-01").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

/// Why a row or reference was left out. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The company has no account configured for this tag.
    AccountNotConfigured { tag: TaxTag },
    /// The referenced company does not exist in configuration.
    CompanyNotConfigured { company: String },
    /// The referenced taxes and charges template does not exist.
    TemplateNotFound { template: String },
    /// The template has no usable line for this tag.
    TemplateLineMissing { template: String, tag: TaxTag },
    /// The document's freight rule does not put freight on the invoice.
    FreightNotApplicable,
    /// Withholding does not apply to this party type.
    PartyNotSubjectToWht,
    /// The reference has no withholding section.
    NoWhtSection { reference: String },
    /// The reference names a section that is not configured.
    UnknownWhtSection { reference: String, section: String },
    /// The party's filer status yields no rate for this section.
    RateNotApplicable { reference: String, section: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountNotConfigured { tag } => {
                write!(f, "no account configured for {}", tag.code())
            }
            Self::CompanyNotConfigured { company } => {
                write!(f, "company '{company}' is not configured")
            }
            Self::TemplateNotFound { template } => {
                write!(f, "tax template '{template}' not found")
            }
            Self::TemplateLineMissing { template, tag } => {
                write!(f, "tax template '{template}' has no {} line", tag.code())
            }
            Self::FreightNotApplicable => write!(f, "freight is not charged on this document"),
            Self::PartyNotSubjectToWht => write!(f, "party type is not subject to withholding"),
            Self::NoWhtSection { reference } => {
                write!(f, "{reference}: no withholding section")
            }
            Self::UnknownWhtSection { reference, section } => {
                write!(f, "{reference}: withholding section '{section}' not found")
            }
            Self::RateNotApplicable { reference, section } => {
                write!(f, "{reference}: no applicable rate in section '{section}'")
            }
        }
    }
}
