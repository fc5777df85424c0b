//! Mapping from index input to Tantivy documents.

use tantivy::TantivyDocument;

use markdump_types::IndexDocument;

use crate::schema::SearchSchema;

/// Convert an IndexDocument to a Tantivy document.
///
/// The composite `all` field receives the name and, for documents, the body.
pub fn index_document_to_doc(schema: &SearchSchema, input: &IndexDocument) -> TantivyDocument {
    let mut doc = TantivyDocument::default();
    doc.add_text(schema.id, &input.id);
    doc.add_text(schema.path, &input.path);
    doc.add_text(schema.name, &input.name);
    doc.add_text(schema.all, &input.name);
    if let Some(body) = &input.body {
        doc.add_text(schema.body, body);
        doc.add_text(schema.all, body);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_search_schema;
    use tantivy::schema::Value;

    #[test]
    fn test_document_to_doc() {
        let schema = build_search_schema();
        let input = IndexDocument {
            id: "/guides/setup".to_string(),
            path: "Home / Guides / ".to_string(),
            name: "Setup".to_string(),
            body: Some("Install the thing".to_string()),
        };

        let doc = index_document_to_doc(&schema, &input);

        assert_eq!(doc.get_first(schema.id).unwrap().as_str(), Some("/guides/setup"));
        assert_eq!(doc.get_first(schema.path).unwrap().as_str(), Some("Home / Guides / "));
        assert_eq!(doc.get_first(schema.body).unwrap().as_str(), Some("Install the thing"));

        let all: Vec<&str> = doc.get_all(schema.all).filter_map(|v| v.as_str()).collect();
        assert_eq!(all, vec!["Setup", "Install the thing"]);
    }

    #[test]
    fn test_directory_has_no_body() {
        let schema = build_search_schema();
        let input = IndexDocument {
            id: "/guides".to_string(),
            path: "Home / ".to_string(),
            name: "Guides".to_string(),
            body: None,
        };

        let doc = index_document_to_doc(&schema, &input);

        assert!(doc.get_first(schema.body).is_none());
        assert_eq!(doc.get_all(schema.all).count(), 1);
    }
}
