//! HTTP engagement client

use std::sync::Arc;

use adda_common::ApiConfig;
use adda_core::{
    Comment, DomainError, DomainResult, EngagementApi, EntityKind, EntityRef, IdentityProvider,
    ReactionCheck, ReactionCounts, ReactionKind, Reactor,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::wire::{
    self, CommentDto, CommentRequest, DataEnvelope, ErrorBody, LikeMutationResponse, LikeRequest,
    ReactionMutationResponse, ReactionRequest, ReactorsResponse,
};

/// Stateless client for the engagement endpoints.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct HttpEngagementClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_ms: u128,
    identity: Arc<dyn IdentityProvider>,
}

impl HttpEngagementClient {
    /// Create a client for `config.base_url` authenticating through `identity`
    pub fn new(config: &ApiConfig, identity: Arc<dyn IdentityProvider>) -> DomainResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| DomainError::Internal(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::Internal(format!(
                "base url cannot carry paths: {base_url}"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            timeout_ms: config.request_timeout.as_millis(),
            identity,
        })
    }

    /// Base URL joined with percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start an authenticated request; fails before sending when signed out
    async fn request(&self, method: Method, url: Url) -> DomainResult<RequestBuilder> {
        let token = self
            .identity
            .token()
            .await
            .filter(|t| !t.is_empty())
            .ok_or(DomainError::AuthRequired)?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send(&self, builder: RequestBuilder) -> DomainResult<Vec<u8>> {
        let response = builder.send().await.map_err(|e| self.transport_error(&e))?;
        self.read_body(response).await
    }

    async fn read_body(&self, response: Response) -> DomainResult<Vec<u8>> {
        let status = response.status();
        let url = response.url().path().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        debug!(status = status.as_u16(), path = %url, message = %message, "API request rejected");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DomainError::AuthRequired);
        }
        Err(DomainError::api(status.as_u16(), message))
    }

    fn transport_error(&self, err: &reqwest::Error) -> DomainError {
        if err.is_timeout() {
            warn!(timeout_ms = %self.timeout_ms, "Request timed out");
            DomainError::network(format!("request timed out after {}ms", self.timeout_ms))
        } else if err.is_decode() {
            DomainError::Decode(err.to_string())
        } else {
            warn!(error = %err, "Request failed");
            DomainError::network(err.to_string())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> DomainResult<T> {
        let builder = self.request(Method::GET, url).await?;
        wire::decode(&self.send(builder).await?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> DomainResult<T> {
        let builder = self.request(Method::POST, url).await?.json(body);
        wire::decode(&self.send(builder).await?)
    }

    fn with_entity_query(mut url: Url, entity: &EntityRef) -> Url {
        url.query_pairs_mut()
            .append_pair("type", entity.kind.as_str())
            .append_pair("id", &entity.id);
        url
    }

    fn feed_segment(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Post => "posts",
            EntityKind::Meme => "memes",
        }
    }
}

#[async_trait]
impl EngagementApi for HttpEngagementClient {
    #[instrument(skip(self, entity), fields(entity = %entity))]
    async fn check_reaction(&self, entity: &EntityRef) -> DomainResult<ReactionCheck> {
        let url = Self::with_entity_query(self.endpoint(&["reactions", "check-reaction"]), entity);
        let builder = self.request(Method::GET, url).await?;
        wire::normalize_check(&self.send(builder).await?)
    }

    #[instrument(skip(self, entity), fields(entity = %entity))]
    async fn set_reaction(
        &self,
        entity: &EntityRef,
        kind: Option<ReactionKind>,
    ) -> DomainResult<Option<ReactionCounts>> {
        let action = if kind.is_some() {
            "add-reaction"
        } else {
            "remove-reaction"
        };
        let response: ReactionMutationResponse = self
            .post(
                self.endpoint(&["reactions", action]),
                &ReactionRequest::new(entity, kind),
            )
            .await?;
        Ok(response.reaction_counts)
    }

    #[instrument(skip(self, entity), fields(entity = %entity))]
    async fn set_liked(&self, entity: &EntityRef, liked: bool) -> DomainResult<Option<u64>> {
        let action = if liked { "add-like" } else { "remove-like" };
        let response: LikeMutationResponse = self
            .post(self.endpoint(&["likes", action]), &LikeRequest::new(entity))
            .await?;
        Ok(response.like_count)
    }

    #[instrument(skip(self, entity), fields(entity = %entity))]
    async fn list_reactors(&self, entity: &EntityRef) -> DomainResult<Vec<Reactor>> {
        let url = Self::with_entity_query(self.endpoint(&["reactions", "get-reactions"]), entity);
        let response: ReactorsResponse = self.get(url).await?;
        Ok(response.reactions)
    }

    #[instrument(skip(self, entity, body), fields(entity = %entity))]
    async fn add_comment(&self, entity: &EntityRef, body: &str) -> DomainResult<Comment> {
        let response: DataEnvelope<CommentDto> = self
            .post(self.endpoint(&["comments"]), &CommentRequest::new(entity, body))
            .await?;
        Ok(response.data.into())
    }

    #[instrument(skip(self, entity), fields(entity = %entity))]
    async fn list_comments(&self, entity: &EntityRef) -> DomainResult<Vec<Comment>> {
        let url = self.endpoint(&["comments", entity.kind.as_str(), &entity.id]);
        let response: DataEnvelope<Vec<CommentDto>> = self.get(url).await?;
        Ok(response.data.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self, entity), fields(entity = %entity))]
    async fn set_saved(&self, entity: &EntityRef, saved: bool) -> DomainResult<()> {
        let action = if saved { "save" } else { "unsave" };
        let url = self.endpoint(&["feeds", Self::feed_segment(entity.kind), &entity.id, action]);
        let builder = self.request(Method::POST, url).await?;
        self.send(builder).await?;
        Ok(())
    }
}
