use mongodb::bson::{doc, Bson, DateTime, Document};
use serde_json::Value;

/// One mutation reported by a collection watch, kept in the raw shape the
/// store emitted so it can be relayed to clients untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent(Document);

impl ChangeEvent {
    pub fn from_raw(raw: Document) -> Self {
        Self(raw)
    }

    /// Insert event in MongoDB's change-stream layout.
    pub fn insert(db: &str, coll: &str, sequence: u64, full_document: &Document) -> Self {
        let id = full_document.get("_id").cloned().unwrap_or(Bson::Null);
        Self(doc! {
            "_id": { "_data": format!("{:016X}", sequence) },
            "operationType": "insert",
            "wallTime": DateTime::now(),
            "fullDocument": full_document.clone(),
            "ns": { "db": db, "coll": coll },
            "documentKey": { "_id": id },
        })
    }

    pub fn operation_type(&self) -> Option<&str> {
        self.0.get_str("operationType").ok()
    }

    pub fn full_document(&self) -> Option<&Document> {
        self.0.get_document("fullDocument").ok()
    }

    pub fn document_key(&self) -> Option<&Bson> {
        self.0.get_document("documentKey").ok().and_then(|key| key.get("_id"))
    }

    pub fn to_json(&self) -> Value {
        Bson::Document(self.0.clone()).into_relaxed_extjson()
    }
}
