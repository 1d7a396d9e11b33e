//! Flat output rows derived from finalized records

use serde::Serialize;

use shared::CandidateRecord;

/// Output column order
pub const OUTPUT_COLUMNS: [&str; 13] = [
    "inn",
    "name",
    "employees",
    "okved_main",
    "source",
    "revenue_year",
    "revenue",
    "site",
    "email",
    "phone",
    "phones_other",
    "description",
    "region",
];

/// Structured pieces of a free-text contacts blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub site: String,
    pub email: String,
    pub phone: String,
    /// Further phones, comma joined
    pub phones_other: String,
}

/// Split a comma separated contacts blob.
///
/// Tokens with `@` are emails; tokens starting with `http`, or containing a
/// dot and not all digits once dots are removed, are sites; all-digit tokens
/// are phones. Later emails and sites overwrite earlier ones. Anything else
/// is dropped.
pub fn split_contacts(blob: &str) -> ContactFields {
    let mut fields = ContactFields::default();
    let mut other_phones: Vec<&str> = Vec::new();

    for token in blob.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        if token.contains('@') {
            fields.email = token.to_string();
        } else if token.starts_with("http") || (token.contains('.') && !is_digits(&token.replace('.', ""))) {
            fields.site = token.to_string();
        } else if is_digits(token) {
            if fields.phone.is_empty() {
                fields.phone = token.to_string();
            } else {
                other_phones.push(token);
            }
        }
    }

    fields.phones_other = other_phones.join(",");
    fields
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Trim and collapse internal whitespace runs to single spaces
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One output line; field order matches [`OUTPUT_COLUMNS`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub inn: String,
    pub name: String,
    pub employees: u64,
    pub okved_main: String,
    pub source: String,
    pub revenue_year: String,
    pub revenue: String,
    pub site: String,
    pub email: String,
    pub phone: String,
    pub phones_other: String,
    pub description: String,
    pub region: String,
}

impl OutputRow {
    pub fn from_record(record: &CandidateRecord) -> Self {
        let contacts = split_contacts(&clean_text(&record.contacts));
        let site = if contacts.site.is_empty() {
            clean_text(&record.site)
        } else {
            contacts.site
        };

        Self {
            inn: clean_text(&record.identifier),
            name: clean_text(&record.name),
            employees: record.employees,
            okved_main: clean_text(&record.category_code),
            source: clean_text(&record.source),
            revenue_year: clean_text(&record.revenue_year),
            revenue: clean_text(&record.revenue_amount),
            site,
            email: contacts.email,
            phone: contacts.phone,
            phones_other: contacts.phones_other,
            description: clean_text(&record.description),
            region: clean_text(&record.region),
        }
    }
}
