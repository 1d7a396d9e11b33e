//! Pure record parsing for upstream responses
//!
//! Each logical field is an ordered list of field paths; the first present
//! value wins. Keys are the registry's own (Cyrillic) names with a few Latin
//! fallbacks seen on the search endpoint.

use serde_json::Value;

use shared::extract::{extract_items, int_at, int_of, pick, text_at, FieldPath};
use shared::{CandidateRecord, EnrichmentCard};

/// Source tag of rows discovered by search
pub const SEARCH_SOURCE: &str = "api-fns/search";

/// Source tag of rows produced by the per-identifier strategy
pub const SINGLE_SOURCE: &str = "api-fns/egr";

/// Legal entity / individual entrepreneur wrappers, in probe order
const ENTITY_KEYS: &[&str] = &["ЮЛ", "ИП"];

const SEARCH_IDENTIFIER: &[FieldPath] = &[&["ИНН"], &["inn"], &["ЮЛ", "ИНН"], &["ul", "inn"]];

const SEARCH_NAME: &[FieldPath] = &[
    &["НаимСокрЮЛ"],
    &["НаимПолнЮЛ"],
    &["name"],
    &["ЮЛ", "НаимСокрЮЛ"],
    &["ЮЛ", "НаимПолнЮЛ"],
];

const SEARCH_CATEGORY: &[FieldPath] = &[
    &["ОснВидДеят", "Код"],
    &["okved_main"],
    &["ОКВЭД"],
    &["ЮЛ", "ОснВидДеят", "Код"],
];

const SEARCH_EMPLOYEES: &[FieldPath] = &[
    &["КолРаб"],
    &["ССЧР"],
    &["employees"],
    &["ЮЛ", "КолРаб"],
    &["ЮЛ", "ССЧР"],
];

const REGION: &[FieldPath] = &[&["Адрес", "АдресПолн"], &["region"]];

const CARD_EMPLOYEES: &[FieldPath] = &[
    &["КолРаб"],
    &["ССЧР"],
    &["ОткрСведения", "КолРаб"],
    &["ОткрСведения", "ССЧР"],
];

const CATEGORY: &[FieldPath] = &[&["ОснВидДеят", "Код"]];
const CONTACTS: &[FieldPath] = &[&["Контакты"]];
const REVENUE_YEAR: &[FieldPath] = &[&["Год"]];

const DETAIL_EMPLOYEES: &[FieldPath] = &[&["КолРаб"], &["ССЧР"]];
const DETAIL_NAME: &[FieldPath] = &[&["НаимСокрЮЛ"], &["НаимПолнЮЛ"]];
const DETAIL_PHONE: &[FieldPath] = &[&["НомТел"]];
const DETAIL_EMAIL: &[FieldPath] = &[&["E-mail"]];

/// A search hit as a candidate; hits without an identifier yield nothing
pub fn parse_search_item(item: &Value) -> Option<CandidateRecord> {
    let identifier = text_at(item, SEARCH_IDENTIFIER);
    if identifier.is_empty() {
        return None;
    }

    let mut record = CandidateRecord::new(identifier, SEARCH_SOURCE);
    record.name = text_at(item, SEARCH_NAME);
    record.employees = int_at(item, SEARCH_EMPLOYEES);
    record.category_code = text_at(item, SEARCH_CATEGORY);
    record.region = text_at(item, REGION);
    Some(record)
}

/// The entity object inside a detail item: its `ЮЛ`/`ИП` wrapper if present
fn entity_of(item: &Value) -> &Value {
    ENTITY_KEYS
        .iter()
        .filter_map(|key| pick(item, &[*key]))
        .find(|inner| inner.as_object().map_or(false, |fields| !fields.is_empty()))
        .unwrap_or(item)
}

/// Parse every card of a batch lookup response
pub fn parse_batch_cards(payload: &Value) -> Vec<EnrichmentCard> {
    extract_items(payload)
        .into_iter()
        .filter_map(parse_card)
        .collect()
}

pub fn parse_card(item: &Value) -> Option<EnrichmentCard> {
    let entity = entity_of(item);

    let mut identifier = text_at(entity, &[&["ИНН"]]);
    if identifier.is_empty() {
        identifier = text_at(item, &[&["ИНН"]]);
    }
    if identifier.is_empty() {
        return None;
    }

    let finances = pick(entity, &["Финансы"]).filter(|value| value.is_object());
    let (revenue_year, revenue_amount) = match finances {
        Some(finances) => (
            text_at(finances, REVENUE_YEAR),
            revenue_units(finances.get("Выручка")),
        ),
        None => (String::new(), String::new()),
    };

    Some(EnrichmentCard {
        identifier,
        employees: int_at(entity, CARD_EMPLOYEES),
        category_code: text_at(entity, CATEGORY),
        region: text_at(entity, REGION),
        contacts: text_at(entity, CONTACTS),
        revenue_year,
        revenue_amount,
    })
}

/// Revenue is reported in thousands; store whole units, empty when unknown
pub fn revenue_units(raw: Option<&Value>) -> String {
    let negative = raw
        .and_then(Value::as_str)
        .map_or(false, |text| text.trim_start().starts_with('-'));
    let thousands = match raw {
        Some(value) if !negative => int_of(value, 0),
        _ => 0,
    };
    match thousands.checked_mul(1000) {
        Some(units) if units > 0 => units.to_string(),
        _ => String::new(),
    }
}

/// Parse a single-identifier registry extract into a full record.
///
/// The extract is either the record itself or a container whose first item
/// is the record. The requested identifier is used when the body lacks one.
pub fn parse_detail(identifier: &str, payload: &Value) -> Option<CandidateRecord> {
    let item = match extract_items(payload).first() {
        Some(first) => *first,
        None if payload.as_object().map_or(false, |fields| !fields.is_empty()) => payload,
        None => return None,
    };
    let entity = entity_of(item);

    let contacts: Vec<String> = [text_at(entity, DETAIL_PHONE), text_at(entity, DETAIL_EMAIL)]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

    let mut record = CandidateRecord::new(identifier, SINGLE_SOURCE);
    record.name = text_at(entity, DETAIL_NAME);
    record.employees = int_at(entity, DETAIL_EMPLOYEES);
    record.category_code = text_at(entity, CATEGORY);
    record.region = text_at(entity, REGION);
    record.contacts = contacts.join(", ");
    Some(record)
}
