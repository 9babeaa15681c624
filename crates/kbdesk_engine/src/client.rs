use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    ApiError, ChatMessage, ChatReply, DocumentRequest, EmbedProgressReply, FailureKind, FileEntry,
    FileId, KbStatusReply, PreviewResponse,
};
use crate::types::FileListResponse;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Endpoints used by the admin dashboard.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    async fn list_files(&self) -> Result<Vec<FileEntry>, ApiError>;

    async fn delete_file(&self, file_id: FileId) -> Result<(), ApiError>;

    async fn kb_status(&self) -> Result<KbStatusReply, ApiError>;

    async fn embed_progress(&self) -> Result<EmbedProgressReply, ApiError>;

    /// `all` re-embeds every file instead of only the changed ones.
    async fn start_embedding(&self, all: bool) -> Result<(), ApiError>;

    async fn preview_chunking(&self, request: &DocumentRequest)
        -> Result<PreviewResponse, ApiError>;

    async fn upload_document(&self, request: &DocumentRequest) -> Result<(), ApiError>;
}

/// Endpoint used by the chat widget.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_chat(&self, message: &ChatMessage) -> Result<ChatReply, ApiError>;
}

/// Everything the engine talks to.
pub trait BackendApi: DashboardApi + ChatApi {}

impl<T: DashboardApi + ChatApi> BackendApi for T {}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        // `Url::join` replaces the last segment unless the base ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(map_reqwest_error)
    }

    async fn send_expecting_success(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send_expecting_success(self.client.get(url)).await?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }

    async fn document_form(request: &DocumentRequest) -> Result<Form, ApiError> {
        let bytes = tokio::fs::read(&request.file).await.map_err(|err| {
            ApiError::new(
                FailureKind::Io,
                format!("{}: {}", request.file.display(), err),
            )
        })?;
        let file_name = request
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("chunk_size", request.chunk_size.to_string())
            .text("chunk_overlap", request.chunk_overlap.to_string()))
    }
}

#[async_trait::async_trait]
impl DashboardApi for ReqwestApi {
    async fn list_files(&self) -> Result<Vec<FileEntry>, ApiError> {
        let listing: FileListResponse = self.get_json("api/files").await?;
        Ok(listing.files)
    }

    async fn delete_file(&self, file_id: FileId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/admin/delete/{file_id}"))?;
        // The JSON content type makes the server answer with a status code
        // instead of a redirect to the dashboard page.
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json");
        self.send_expecting_success(request).await?;
        Ok(())
    }

    async fn kb_status(&self) -> Result<KbStatusReply, ApiError> {
        self.get_json("api/kb_status").await
    }

    async fn embed_progress(&self) -> Result<EmbedProgressReply, ApiError> {
        self.get_json("api/admin/embed_progress").await
    }

    async fn start_embedding(&self, all: bool) -> Result<(), ApiError> {
        let path = if all {
            "api/admin/embed_all"
        } else {
            "api/admin/embed"
        };
        let url = self.endpoint(path)?;
        self.send_expecting_success(self.client.post(url)).await?;
        Ok(())
    }

    async fn preview_chunking(
        &self,
        request: &DocumentRequest,
    ) -> Result<PreviewResponse, ApiError> {
        let url = self.endpoint("api/preview-chunking")?;
        let form = Self::document_form(request).await?;
        let response = self.send(self.client.post(url).multipart(form)).await?;

        // Semantic failures come back as 4xx/5xx with a JSON body explaining them.
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        match serde_json::from_slice::<PreviewResponse>(&body) {
            Ok(reply) => Ok(reply),
            Err(_) if !status.is_success() => Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            )),
            Err(err) => Err(ApiError::new(FailureKind::Decode, err.to_string())),
        }
    }

    async fn upload_document(&self, request: &DocumentRequest) -> Result<(), ApiError> {
        let url = self.endpoint("admin")?;
        let form = Self::document_form(request).await?;
        self.send_expecting_success(self.client.post(url).multipart(form))
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatApi for ReqwestApi {
    async fn send_chat(&self, message: &ChatMessage) -> Result<ChatReply, ApiError> {
        let url = self.endpoint("api/chat")?;
        let response = self
            .send_expecting_success(self.client.post(url).json(message))
            .await?;
        response.json::<ChatReply>().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
