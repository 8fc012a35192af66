use reqwest::{header::CONTENT_TYPE, Client, Url};
use shuttle_runtime::async_trait;
use uuid::Uuid;

use super::{parse_cursor, CursorStore};
use crate::error::StorageError;

/// Cursor kept as a block blob, reached through a SAS URL that grants read and write.
pub struct BlobCursorStore {
    client: Client,
    url: Url,
}

impl BlobCursorStore {
    pub fn new(url: Url) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl CursorStore for BlobCursorStore {
    async fn read(&self) -> Result<Uuid, StorageError> {
        let response = self.client.get(self.url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(StorageError::Status(response.status()));
        }

        parse_cursor(&response.text().await?)
    }

    async fn write(&self, flight_id: Uuid) -> Result<(), StorageError> {
        let response = self
            .client
            .put(self.url.clone())
            .header("x-ms-blob-type", "BlockBlob")
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(flight_id.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Status(response.status()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use reqwest::StatusCode;
    use warp::{hyper::body::Bytes, Filter};

    use super::*;

    #[derive(Clone, Default)]
    struct Blob {
        content: Arc<Mutex<String>>,
        uploads: Arc<Mutex<Vec<(Option<String>, String)>>>,
    }

    async fn serve(blob: Blob) -> Url {
        let download = {
            let blob = blob.clone();
            warp::get()
                .and(warp::path!("state" / "last-flight.txt"))
                .map(move || blob.content.lock().unwrap().clone())
        };
        let upload = warp::put()
            .and(warp::path!("state" / "last-flight.txt"))
            .and(warp::header::optional::<String>("x-ms-blob-type"))
            .and(warp::body::bytes())
            .map(move |blob_type: Option<String>, body: Bytes| {
                let body = String::from_utf8_lossy(&body).to_string();
                blob.uploads.lock().unwrap().push((blob_type, body.clone()));
                *blob.content.lock().unwrap() = body;
                warp::reply::with_status(String::new(), warp::http::StatusCode::CREATED)
            });

        let (addr, server) =
            warp::serve(download.or(upload)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Url::parse(&format!("http://{addr}/state/last-flight.txt?sv=2022&sig=abc")).unwrap()
    }

    #[tokio::test]
    async fn test_write_uploads_block_blob() {
        let blob = Blob::default();
        let store = BlobCursorStore::new(serve(blob.clone()).await);
        let flight_id = Uuid::parse_str("7d8f3c2e-1b4a-4c6d-9e0f-112233445566").unwrap();

        store.write(flight_id).await.unwrap();

        assert_eq!(
            *blob.uploads.lock().unwrap(),
            vec![(
                Some("BlockBlob".to_string()),
                "7d8f3c2e-1b4a-4c6d-9e0f-112233445566".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_read_after_write() {
        let blob = Blob::default();
        *blob.content.lock().unwrap() = "1c0ffee0-0000-4000-8000-000000000001\n".to_string();
        let store = BlobCursorStore::new(serve(blob.clone()).await);

        assert_eq!(
            store.read().await.unwrap().to_string(),
            "1c0ffee0-0000-4000-8000-000000000001"
        );

        let next = Uuid::new_v4();
        store.write(next).await.unwrap();

        assert_eq!(store.read().await.unwrap(), next);
    }

    #[tokio::test]
    async fn test_missing_blob_is_a_status_error() {
        let mut url = serve(Blob::default()).await;
        url.set_path("/state/missing.txt");
        let store = BlobCursorStore::new(url);

        assert!(matches!(
            store.read().await,
            Err(StorageError::Status(status)) if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_empty_blob() {
        let store = BlobCursorStore::new(serve(Blob::default()).await);

        assert!(matches!(store.read().await, Err(StorageError::Empty)));
    }
}
