mod from_graph;
mod to_graph;

use birthdays365_core::SourceResult;

/// Convert from Graph API types to birthdays365 types
pub trait FromGraph<T> {
    fn from_graph(value: T) -> SourceResult<Self>
    where
        Self: Sized;
}

/// Convert to Graph API types from birthdays365 types
pub trait ToGraph<T> {
    fn to_graph(&self) -> T;
}

/// Namespace GUID for the extended properties written on synced events.
const PROPERTY_SET: &str = "{8c1f5a3e-2d47-4b6a-9e0f-b36512d4c7a9}";

pub fn contact_id_property() -> String {
    format!("String {PROPERTY_SET} Name Birthdays365ContactId")
}

pub fn birth_year_property() -> String {
    format!("String {PROPERTY_SET} Name Birthdays365BirthYear")
}

/// `$expand` clause that returns both extended properties with each event.
pub fn extended_properties_expand() -> String {
    format!(
        "singleValueExtendedProperties($filter=id eq '{}' or id eq '{}')",
        contact_id_property(),
        birth_year_property()
    )
}
