//! Augmented retrieval query and its GraphQL rendering.

use crate::types::Query;
use serde_json::Value;

/// A grouped-generation similarity query against one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerativeQuery {
    pub collection: String,
    pub similarity_concepts: Vec<String>,
    pub generation_prompt: String,
    pub result_limit: usize,
    pub fields: Vec<String>,
}

impl GenerativeQuery {
    /// Build the backend query for a question whose concepts are filled in.
    ///
    /// The domain id is the collection name and the question is the task for
    /// grouped generation.
    pub fn for_query(query: &Query, result_limit: usize, source_field: &str) -> Self {
        Self {
            collection: query.domain_id.clone(),
            similarity_concepts: query
                .concepts
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            generation_prompt: query.question.clone(),
            result_limit,
            fields: vec![source_field.to_string()],
        }
    }

    /// Render as a GraphQL `Get` query.
    ///
    /// String literals are JSON-escaped. Collection and field names are
    /// written as-is and must be validated by the caller.
    pub fn to_graphql(&self) -> String {
        let concepts = self
            .similarity_concepts
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{{ Get {{ {collection}(limit: {limit}, nearText: {{concepts: [{concepts}]}}) {{ \
             {fields} _additional {{ generate(groupedResult: {{task: {task}}}) \
             {{ groupedResult error }} }} }} }} }}",
            collection = self.collection,
            limit = self.result_limit,
            concepts = concepts,
            fields = self.fields.join(" "),
            task = quote(&self.generation_prompt),
        )
    }
}

fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Concept;

    fn tax_query() -> Query {
        let mut query = Query::new("Tax_Agent", "What is section 54?");
        query.concepts = vec![Concept::from("section 54"), Concept::from("capital gains")];
        query
    }

    #[test]
    fn test_for_query_maps_fields() {
        let q = GenerativeQuery::for_query(&tax_query(), 5, "source");

        assert_eq!(q.collection, "Tax_Agent");
        assert_eq!(q.similarity_concepts, vec!["section 54", "capital gains"]);
        assert_eq!(q.generation_prompt, "What is section 54?");
        assert_eq!(q.result_limit, 5);
        assert_eq!(q.fields, vec!["source"]);
    }

    #[test]
    fn test_graphql_rendering() {
        let graphql = GenerativeQuery::for_query(&tax_query(), 5, "source").to_graphql();

        assert!(graphql.starts_with("{ Get { Tax_Agent(limit: 5, "));
        assert!(graphql.contains(r#"nearText: {concepts: ["section 54", "capital gains"]}"#));
        assert!(graphql.contains(r#"generate(groupedResult: {task: "What is section 54?"})"#));
        assert!(graphql.contains("source _additional"));
        assert!(graphql.contains("{ groupedResult error }"));
    }

    #[test]
    fn test_graphql_escapes_string_literals() {
        let mut query = Query::new("Tax_Agent", r#"Is "section 54" valid?"#);
        query.concepts = vec![Concept::from("a\"b")];
        let graphql = GenerativeQuery::for_query(&query, 1, "source").to_graphql();

        assert!(graphql.contains(r#"task: "Is \"section 54\" valid?""#));
        assert!(graphql.contains(r#"concepts: ["a\"b"]"#));
    }
}
