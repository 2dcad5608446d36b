//! Query parameter encoding for the list endpoint
//!
//! `pageSize`, `lastKey`, `search`, one `<field>` / `<field>.<matchMode>` key
//! per active filter, then `sortField` and `sortOrder`.

use crate::domain::{MatchMode, Operator, PageRequest};

impl PageRequest {
    /// Encode the request as ordered query parameters
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("pageSize".to_string(), self.page_size.to_string())];

        if let Some(cursor) = &self.cursor {
            params.push(("lastKey".to_string(), cursor.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }

        for (field, predicate) in &self.filters {
            let key = match predicate.match_mode {
                MatchMode::Equals => field.clone(),
                mode => format!("{field}.{mode}"),
            };
            params.push((key, predicate.value.to_param()));

            // `and` is what the endpoint assumes
            if predicate.operator == Operator::Or {
                params.push((format!("{field}.operator"), Operator::Or.as_str().to_string()));
            }
        }

        if let Some(field) = &self.sort_field {
            params.push(("sortField".to_string(), field.clone()));
            if let Some(order) = self.sort_order {
                params.push(("sortOrder".to_string(), order.as_str().to_string()));
            }
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use crate::domain::{Cursor, FilterPredicate, FilterValue, SortOrder};

    use super::*;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn first_page_sends_only_page_size() {
        let request = PageRequest::first(NonZeroUsize::new(25).expect("non-zero"));
        assert_eq!(pairs(&request.query_params()), vec![("pageSize", "25")]);
    }

    #[test]
    fn full_request_encoding() {
        let mut request = PageRequest::first(NonZeroUsize::new(10).expect("non-zero"));
        request.cursor = Some(Cursor::new("abc123"));
        request.search = Some("smith".into());
        request.filters.insert(
            "gender".into(),
            FilterPredicate {
                value: FilterValue::Text("Female".into()),
                match_mode: MatchMode::Equals,
                operator: Operator::And,
            },
        );
        request.filters.insert(
            "name".into(),
            FilterPredicate {
                value: FilterValue::Text("ad".into()),
                match_mode: MatchMode::StartsWith,
                operator: Operator::Or,
            },
        );
        request.sort_field = Some("dob".into());
        request.sort_order = Some(SortOrder::Desc);

        assert_eq!(
            pairs(&request.query_params()),
            vec![
                ("pageSize", "10"),
                ("lastKey", "abc123"),
                ("search", "smith"),
                ("gender", "Female"),
                ("name.startsWith", "ad"),
                ("name.operator", "or"),
                ("sortField", "dob"),
                ("sortOrder", "desc"),
            ]
        );
    }
}
