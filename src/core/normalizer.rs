//! Cleans the nested CP code columns (`contracts`, `overrideTimezone`,
//! `products`, `accessGroup`) into flat display strings.
//!
//! Parsing never fails: anything that does not have the expected shape is
//! returned unchanged.

use crate::core::repr::cell_text;
use crate::domain::model::Row;
use serde_json::Value;
use std::fmt;

const GMT_SUFFIX: &str = " (Greenwich Mean Time)";
const PRODUCT_NAMESPACE_DELIMITER: &str = "::";
const ACCESS_GROUP_MARKER: &str = "'contractId': '";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Contracts,
    Timezone,
    Products,
    AccessGroup,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Timezone,
        FieldKind::Contracts,
        FieldKind::Products,
        FieldKind::AccessGroup,
    ];

    /// CSV column holding this field in the CP code listing.
    pub fn column(self) -> &'static str {
        match self {
            FieldKind::Contracts => "contracts",
            FieldKind::Timezone => "overrideTimezone",
            FieldKind::Products => "products",
            FieldKind::AccessGroup => "accessGroup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractStatus {
    pub status: String,
    pub contract_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedField {
    Contracts(Vec<ContractStatus>),
    Timezone(String),
    Products(Vec<String>),
    AccessGroup(String),
    /// Input that did not match the expected shape, kept verbatim.
    Raw(String),
}

impl NormalizedField {
    pub fn parse(kind: FieldKind, raw: &str) -> Self {
        let parsed = parse_relaxed(raw);
        let normalized = match kind {
            FieldKind::Contracts => parsed.as_ref().and_then(parse_contracts),
            FieldKind::Timezone => parsed.as_ref().and_then(|v| parse_timezone(v, raw)),
            FieldKind::Products => parsed.as_ref().and_then(parse_products),
            FieldKind::AccessGroup => match parsed {
                Some(value) => parse_access_group(&value),
                None => extract_access_group(raw),
            },
        };
        normalized.unwrap_or_else(|| NormalizedField::Raw(raw.to_string()))
    }
}

impl fmt::Display for NormalizedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedField::Contracts(contracts) => {
                let tokens: Vec<String> = contracts
                    .iter()
                    .map(|c| format!("{}:{}", capitalize(&c.status), c.contract_id))
                    .collect();
                f.write_str(&tokens.join(","))
            }
            NormalizedField::Products(names) => f.write_str(&names.join(", ")),
            NormalizedField::Timezone(value)
            | NormalizedField::AccessGroup(value)
            | NormalizedField::Raw(value) => f.write_str(value),
        }
    }
}

pub fn normalize(kind: FieldKind, raw: &str) -> String {
    NormalizedField::parse(kind, raw).to_string()
}

pub fn clean_contracts(raw: &str) -> String {
    normalize(FieldKind::Contracts, raw)
}

pub fn clean_timezone(raw: &str) -> String {
    normalize(FieldKind::Timezone, raw)
}

pub fn clean_products(raw: &str) -> String {
    normalize(FieldKind::Products, raw)
}

pub fn clean_access_group(raw: &str) -> String {
    normalize(FieldKind::AccessGroup, raw)
}

/// Copy of `row` with every known nested column cleaned. Columns the row
/// does not have are left out.
pub fn normalize_row(row: &Row) -> Row {
    let mut cleaned = row.clone();
    for kind in FieldKind::ALL {
        if let Some(raw) = row.get(kind.column()) {
            cleaned.insert(kind.column(), normalize(kind, raw));
        }
    }
    cleaned
}

/// Cells hold Python-style literals, so single quotes are turned into
/// double quotes before handing the text to the JSON parser.
fn parse_relaxed(raw: &str) -> Option<Value> {
    serde_json::from_str(&raw.replace('\'', "\"")).ok()
}

fn parse_contracts(value: &Value) -> Option<NormalizedField> {
    let entries = value.as_array()?;
    let contracts = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let status = entry.get("status")?.as_str()?;
            let contract_id = entry.get("contractId")?;
            Some(ContractStatus {
                status: status.to_string(),
                contract_id: cell_text(contract_id, "None"),
            })
        })
        .collect();
    Some(NormalizedField::Contracts(contracts))
}

fn parse_timezone(value: &Value, raw: &str) -> Option<NormalizedField> {
    let object = value.as_object()?;
    let timezone = match object.get("timezoneValue") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return None,
        None => raw,
    };
    Some(NormalizedField::Timezone(timezone.replace(GMT_SUFFIX, "")))
}

/// A `productId` that is present but not a string makes the whole cell
/// unparseable.
fn parse_products(value: &Value) -> Option<NormalizedField> {
    let Some(entries) = value.as_array() else {
        return Some(NormalizedField::Products(Vec::new()));
    };

    let mut names = Vec::new();
    for entry in entries {
        match entry.get("productId") {
            None | Some(Value::Null) => {}
            Some(Value::String(id)) if id.is_empty() => {}
            Some(Value::String(id)) => names.push(
                id.rsplit(PRODUCT_NAMESPACE_DELIMITER)
                    .next()
                    .unwrap_or(id.as_str())
                    .to_string(),
            ),
            Some(_) => return None,
        }
    }
    Some(NormalizedField::Products(names))
}

fn parse_access_group(value: &Value) -> Option<NormalizedField> {
    match value.as_object()?.get("contractId")? {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        id => Some(NormalizedField::AccessGroup(cell_text(id, ""))),
    }
}

/// Fallback for cells the JSON parser rejects, e.g. ones containing `None`.
fn extract_access_group(raw: &str) -> Option<NormalizedField> {
    let start = raw.find(ACCESS_GROUP_MARKER)? + ACCESS_GROUP_MARKER.len();
    let end = raw[start..].find('\'')? + start;
    Some(NormalizedField::AccessGroup(raw[start..end].to_string()))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
