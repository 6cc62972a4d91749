//! Composite record predicate
//!
//! A record passes when all three hold:
//! - text: the trimmed, lower-cased term is empty or a substring of at least
//!   one lower-cased searchable field
//! - facet: the filter is "all" or equals the record's category/status exactly
//! - visibility: the record has no party field for the viewer's role, or that
//!   field contains the viewer's company name, case-insensitively
//!
//! The visibility rule is plain string containment on display text. It hides
//! other companies' rows in a view; it does not authenticate anything.

use crate::core::query::{FacetFilter, RecordQuery};
use crate::core::record::{Record, SortKey};
use crate::core::user::Role;

/// Predicate built once per query and applied to every record
#[derive(Debug, Clone)]
pub struct RecordPredicate<'q> {
    needle: String,
    filter: &'q FacetFilter,
    viewer: Option<(Role, String)>,
}

impl<'q> RecordPredicate<'q> {
    pub fn build<S: SortKey>(query: &'q RecordQuery<S>) -> Self {
        Self {
            needle: query.search_term.trim().to_lowercase(),
            filter: &query.filter,
            viewer: query
                .viewer
                .as_ref()
                .map(|v| (v.role, v.company_name.to_lowercase())),
        }
    }

    pub fn matches_text<T: Record>(&self, record: &T) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        record
            .searchable_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    pub fn matches_facet<T: Record>(&self, record: &T) -> bool {
        self.filter.matches(record.facet())
    }

    pub fn matches_visibility<T: Record>(&self, record: &T) -> bool {
        let Some((role, company)) = &self.viewer else {
            return true;
        };
        match record.party(*role) {
            Some(party) => party.to_lowercase().contains(company.as_str()),
            None => true,
        }
    }

    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.matches_text(record) && self.matches_facet(record) && self.matches_visibility(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures;
    use crate::core::listing::ListingSort;
    use crate::core::transaction::TransactionSort;
    use crate::core::user::ViewerIdentity;

    #[test]
    fn test_empty_term_matches_everything() {
        let query = RecordQuery::<ListingSort>::new().search("   ");
        let predicate = RecordPredicate::build(&query);
        assert!(fixtures::listings().iter().all(|l| predicate.matches(l)));
    }

    #[test]
    fn test_term_is_trimmed_and_case_insensitive() {
        let query = RecordQuery::<ListingSort>::new().search("  GELATIN ");
        let predicate = RecordPredicate::build(&query);
        let names: Vec<String> = fixtures::listings()
            .into_iter()
            .filter(|l| predicate.matches_text(l))
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Gelatin Capsules".to_string()]);
    }

    #[test]
    fn test_transaction_item_is_searchable() {
        let query = RecordQuery::<TransactionSort>::new().search("cellulose");
        let predicate = RecordPredicate::build(&query);
        let ids: Vec<String> = fixtures::transactions()
            .into_iter()
            .filter(|t| predicate.matches(t))
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["4".to_string()]);
    }

    #[test]
    fn test_seller_visibility_uses_seller_field() {
        let query = RecordQuery::<TransactionSort>::new()
            .viewer(ViewerIdentity::new(Role::Seller, "pharmacorp"));
        let predicate = RecordPredicate::build(&query);
        let ids: Vec<String> = fixtures::transactions()
            .into_iter()
            .filter(|t| predicate.matches_visibility(t))
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["1".to_string()]);
    }

    #[test]
    fn test_listings_ignore_viewer() {
        let query = RecordQuery::<ListingSort>::new()
            .viewer(ViewerIdentity::new(Role::Buyer, "Nobody In Particular"));
        let predicate = RecordPredicate::build(&query);
        assert!(
            fixtures::listings()
                .iter()
                .all(|l| predicate.matches_visibility(l))
        );
    }

    #[test]
    fn test_empty_company_name_sees_every_row() {
        let query =
            RecordQuery::<TransactionSort>::new().viewer(ViewerIdentity::new(Role::Buyer, ""));
        let predicate = RecordPredicate::build(&query);
        assert!(
            fixtures::transactions()
                .iter()
                .all(|t| predicate.matches_visibility(t))
        );
    }
}
