// src/pipeline/publish.rs

//! Final document publication.

use crate::error::Result;
use crate::models::{AnchorDocument, PublishKeyPolicy};
use crate::storage::ObjectStore;

pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Storage key of the published document.
pub fn publish_key(policy: &PublishKeyPolicy, job_id: &str, anchor: &AnchorDocument) -> String {
    match policy {
        PublishKeyPolicy::JobScoped => format!("{}/{}", job_id, anchor.file_name()),
        PublishKeyPolicy::Fixed { key } => key.clone(),
    }
}

/// Upload the final document and return its public URL.
pub async fn publish_document(store: &dyn ObjectStore, key: &str, html: &str) -> Result<String> {
    store
        .put(key, html.as_bytes().to_vec(), HTML_CONTENT_TYPE)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArchiveEntry;
    use crate::storage::MemoryStorage;

    fn anchor() -> AnchorDocument {
        AnchorDocument::new(ArchiveEntry::new("site/home.html", "site/home.html", 0))
    }

    #[test]
    fn test_publish_keys() {
        assert_eq!(publish_key(&PublishKeyPolicy::JobScoped, "job_1", &anchor()), "job_1/home.html");
        assert_eq!(publish_key(&PublishKeyPolicy::fixed(), "job_1", &anchor()), "index.html");
    }

    #[tokio::test]
    async fn test_publish_document() {
        let storage = MemoryStorage::default();
        let url = publish_document(&storage, "job_1/home.html", "<p>olá</p>").await.unwrap();

        assert_eq!(url, "memory://bucket/job_1/home.html");
        let object = storage.object("job_1/home.html").await.unwrap();
        assert_eq!(object.content_type, "text/html");
        assert_eq!(String::from_utf8(object.bytes).unwrap(), "<p>olá</p>");
    }
}
