// region:    --- Imports
use crate::admin::model::Record;
use crate::database::DatabaseManager;
use crate::error::BackendError;
use crate::store::{Direction, Document, Query, CREATED_AT};
use serde_json::Value;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Query Handlers

/// Fetches a collection newest first.
///
/// The ordered query runs first. If it fails for any reason (typically a
/// `createdAt` field that the store cannot order) the same filter is re-run
/// without ordering. Either way the records are sorted by their normalized
/// creation time before being returned.
pub async fn list_newest_first<R: Record>(
    db_manager: &DatabaseManager,
    filter: Option<(&str, Value)>,
) -> Result<Vec<R>, BackendError> {
    info!("{:<12} --> list {} filter: {:?}", "Query", R::COLLECTION, filter);

    let mut unordered = Query::collection(R::COLLECTION);
    if let Some((field, value)) = filter {
        unordered = unordered.where_eq(field, value);
    }
    let ordered = unordered.clone().order_by(CREATED_AT, Direction::Descending);

    let store = db_manager.store();
    let docs = match db_manager.retry(|| store.query(&ordered)).await {
        Ok(docs) => docs,
        Err(e) => {
            warn!(
                "{:<12} --> could not order {} by {}, fetching without order: {}",
                "Query",
                R::COLLECTION,
                CREATED_AT,
                e
            );
            db_manager.retry(|| store.query(&unordered)).await?
        }
    };

    let mut records = decode_all::<R>(&docs);
    sort_newest_first(&mut records);
    Ok(records)
}

/// Fetches one record by id.
pub async fn get_record<R: Record>(
    db_manager: &DatabaseManager,
    id: &str,
) -> Result<Option<R>, BackendError> {
    info!("{:<12} --> get {}/{}", "Query", R::COLLECTION, id);
    let store = db_manager.store();
    let doc = db_manager.retry(|| store.get(R::COLLECTION, id)).await?;
    doc.as_ref().map(R::from_document).transpose()
}

/// Decodes every document that fits `R`. Documents that do not are logged and left out,
/// so one malformed record never hides the rest of the collection.
pub fn decode_all<R: Record>(docs: &[Document]) -> Vec<R> {
    docs.iter()
        .filter_map(|doc| match R::from_document(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("{:<12} --> skipping {}/{}: {}", "Query", R::COLLECTION, doc.id, e);
                None
            }
        })
        .collect()
}

/// Stable descending sort by creation time.
pub fn sort_newest_first<R: Record>(records: &mut [R]) {
    records.sort_by_key(|record| std::cmp::Reverse(record.created_at()));
}

// endregion: --- Query Handlers

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::model::{Product, ProductStatus};
    use serde_json::json;

    fn document(id: &str, value: Value) -> Document {
        match value {
            Value::Object(data) => Document::new(id, data),
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let docs = vec![
            document("good", json!({ "title": "Lamp", "status": "approved" })),
            document("archived", json!({ "title": "Old", "status": "archived" })),
            document("bad-price", json!({ "title": "Desk", "price": "twelve" })),
            document("nulls", json!({ "title": null, "status": null })),
        ];

        let products: Vec<Product> = decode_all(&docs);

        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "nulls"]);
        assert_eq!(products[1].status, ProductStatus::Pending);
    }
}
// endregion: --- Tests
