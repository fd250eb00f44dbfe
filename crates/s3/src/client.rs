//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from xfer-core.

use std::path::Path;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use xfer_core::{
    Error, ListOptions, ListResult, ObjectInfo, ObjectStore, RemotePath, Result, StorageConfig,
};

/// Region used when neither the flags, the config file nor the environment name one
const FALLBACK_REGION: &str = "us-east-1";

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client from the storage settings.
    ///
    /// Credentials come from the SDK default provider chain.
    pub async fn new(storage: &StorageConfig) -> Result<Self> {
        storage.validate()?;

        let region = RegionProviderChain::first_try(storage.region.clone().map(aws_config::Region::new))
            .or_default_provider()
            .or_else(aws_config::Region::new(FALLBACK_REGION));

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);
        if let Some(endpoint) = &storage.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(storage.force_path_style)
            .build();

        tracing::debug!(
            endpoint = ?storage.endpoint,
            force_path_style = storage.force_path_style,
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    async fn head_object(&self, path: &RemotePath) -> Result<ObjectInfo> {
        let response = self
            .inner
            .head_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .send()
            .await
            .map_err(|e| transfer_error(path, &e))?;

        let mut info = ObjectInfo::file(&path.key, response.content_length().unwrap_or(0));
        if let Some(modified) = response.last_modified() {
            info.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
        }
        if let Some(etag) = response.e_tag() {
            info.etag = Some(etag.trim_matches('"').to_string());
        }
        Ok(info)
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<ListResult> {
        let mut request = self.inner.list_objects_v2().bucket(bucket);

        if let Some(prefix) = &options.prefix {
            request = request.prefix(prefix);
        }
        if let Some(max) = options.max_keys {
            request = request.max_keys(max);
        }
        if let Some(token) = &options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            let text = error_text(&e);
            if text.contains("NoSuchBucket") {
                Error::NotFound(format!("Bucket not found: {bucket}"))
            } else {
                Error::ListingFailure(format!("{bucket}: {text}"))
            }
        })?;

        let items = response
            .contents()
            .iter()
            .map(|object| {
                let mut info =
                    ObjectInfo::file(object.key().unwrap_or_default(), object.size().unwrap_or(0));
                if let Some(modified) = object.last_modified() {
                    info.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
                }
                if let Some(etag) = object.e_tag() {
                    info.etag = Some(etag.trim_matches('"').to_string());
                }
                info
            })
            .collect();

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn upload_file(&self, source: &Path, target: &RemotePath) -> Result<ObjectInfo> {
        let size = tokio::fs::metadata(source)
            .await
            .map_err(|e| Error::TransferFailure(format!("{}: {e}", source.display())))?
            .len();

        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| Error::TransferFailure(format!("{}: {e}", source.display())))?;

        let mut request = self
            .inner
            .put_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .body(body);

        if let Some(content_type) = content_type(source) {
            request = request.content_type(content_type);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transfer_error(target, &e))?;

        let mut info = ObjectInfo::file(&target.key, size as i64);
        if let Some(etag) = response.e_tag() {
            info.etag = Some(etag.trim_matches('"').to_string());
        }
        info.last_modified = Some(jiff::Timestamp::now());

        Ok(info)
    }

    async fn download_file(&self, source: &RemotePath, target: &Path) -> Result<ObjectInfo> {
        let response = self
            .inner
            .get_object()
            .bucket(&source.bucket)
            .key(&source.key)
            .send()
            .await
            .map_err(|e| transfer_error(source, &e))?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(target)
            .await
            .map_err(|e| Error::TransferFailure(format!("{}: {e}", target.display())))?;
        let mut reader = response.body.into_async_read();
        let written = tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| Error::TransferFailure(format!("{source}: {e}")))?;

        let mut info = ObjectInfo::file(&source.key, written as i64);
        if let Some(modified) = response.last_modified {
            info.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
        }
        if let Some(etag) = response.e_tag {
            info.etag = Some(etag.trim_matches('"').to_string());
        }

        Ok(info)
    }

    async fn copy_object(&self, source: &RemotePath, target: &RemotePath) -> Result<ObjectInfo> {
        let response = self
            .inner
            .copy_object()
            .copy_source(copy_source(source))
            .bucket(&target.bucket)
            .key(&target.key)
            .send()
            .await
            .map_err(|e| transfer_error(source, &e))?;

        // Copy responses carry no size
        let mut info = self.head_object(target).await?;
        if let Some(etag) = response.copy_object_result().and_then(|r| r.e_tag()) {
            info.etag = Some(etag.trim_matches('"').to_string());
        }

        Ok(info)
    }

    async fn delete_object(&self, target: &RemotePath) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .send()
            .await
            .map_err(|e| transfer_error(target, &e))?;

        Ok(())
    }
}

/// Full error chain of an SDK error, including the service error code
fn error_text<E: std::error::Error>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}

fn is_not_found(text: &str) -> bool {
    text.contains("NotFound") || text.contains("NoSuchKey") || text.contains("NoSuchBucket")
}

fn transfer_error<E: std::error::Error>(path: &RemotePath, err: &E) -> Error {
    let text = error_text(err);
    if is_not_found(&text) {
        Error::NotFound(path.to_string())
    } else {
        Error::TransferFailure(format!("{path}: {text}"))
    }
}

/// `bucket/key` for CopyObject, with each key segment percent-encoded
fn copy_source(source: &RemotePath) -> String {
    let key = source
        .key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", source.bucket, key)
}

fn content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source_encodes_segments() {
        let source = RemotePath::raw("bucket", "cats/my file+1.txt");
        assert_eq!(copy_source(&source), "bucket/cats/my%20file%2B1.txt");
    }

    #[test]
    fn test_copy_source_keeps_marker_slash() {
        let source = RemotePath::raw("bucket", "cats/dir/");
        assert_eq!(copy_source(&source), "bucket/cats/dir/");
    }

    #[test]
    fn test_is_not_found() {
        assert!(is_not_found("service error: NoSuchKey: The specified key does not exist."));
        assert!(is_not_found("NotFound"));
        assert!(!is_not_found("AccessDenied: Access Denied"));
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(content_type(Path::new("a/b.json")).as_deref(), Some("application/json"));
        assert_eq!(content_type(Path::new("noext")), None);
    }

    #[test]
    fn test_transfer_error_mapping() {
        let path = RemotePath::new("b", "k");
        let missing = std::io::Error::other("NoSuchKey: gone");
        assert!(matches!(transfer_error(&path, &missing), Error::NotFound(_)));

        let denied = std::io::Error::other("AccessDenied");
        let err = transfer_error(&path, &denied);
        assert!(matches!(err, Error::TransferFailure(ref m) if m.starts_with("s3://b/k")));
    }
}
