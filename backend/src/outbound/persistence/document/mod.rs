//! Remote document store adapter.
//!
//! Speaks the Firebase Realtime Database REST dialect over reqwest: every
//! node is addressed as `<base>/<namespace>/<path>.json` and reads are `GET`.
//! Record writes are `PUT`s guarded by the ETag of the copy they replace.
//! The completion commit is one multi-path `PATCH` against the namespace root
//! so the project status and every credit land together. Balances are
//! credited with server-side increments, so two completions touching the same
//! member never overwrite each other.
//!
//! The completion status check is a read followed by the commit; two
//! concurrent completions of one project can both pass it.

mod dto;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;
use zeroize::Zeroizing;

use self::dto::{ProjectDocument, UserDocument, decode_collection};
use crate::domain::points::{self, PointsError};
use crate::domain::ports::{
    ProjectPersistenceError, ProjectRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{NewProject, Project, ProjectId, User, UserDraft, UserId};

/// Namespace the dashboard has always stored its collections under.
pub const DEFAULT_NAMESPACE: &str = "user-credit";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USERS: &str = "users";
const PROJECTS: &str = "projects";
const MAX_WRITE_ATTEMPTS: u64 = 5;
const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";

/// Connection settings for [`DocumentStore`].
pub struct DocumentStoreConfig {
    /// Database root, e.g. `https://example-rtdb.firebaseio.com/`.
    pub base_url: Url,
    /// Top-level node holding the `users` and `projects` collections.
    pub namespace: String,
    /// Database secret or ID token sent as the `auth` query parameter.
    pub auth_token: Option<Zeroizing<String>>,
    pub timeout: Duration,
}

impl DocumentStoreConfig {
    /// Settings for `base_url` with the default namespace and timeout and no
    /// auth token.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            namespace: DEFAULT_NAMESPACE.to_owned(),
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Reasons a [`DocumentStore`] cannot be built.
#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreConfigError {
    #[error("store url {url} cannot carry a path")]
    UnusableBaseUrl { url: Url },
    #[error("store namespace must not be blank")]
    BlankNamespace,
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Transport-level failures before they are mapped onto a port error.
#[derive(Debug, thiserror::Error)]
enum RemoteError {
    /// The store could not be reached or is temporarily failing.
    #[error("{0}")]
    Unreachable(String),
    /// The store refused the request.
    #[error("{0}")]
    Rejected(String),
    /// A conditional write lost against a concurrent writer.
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    Decode(String),
}

impl From<RemoteError> for UserPersistenceError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Unreachable(message) => Self::connection(message),
            other => Self::query(other.to_string()),
        }
    }
}

impl From<RemoteError> for ProjectPersistenceError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Unreachable(message) => Self::connection(message),
            other => Self::query(other.to_string()),
        }
    }
}

/// Document store client implementing both repository ports.
#[derive(Clone)]
pub struct DocumentStore {
    client: Client,
    base_url: Url,
    namespace: Vec<String>,
    auth_token: Option<Zeroizing<String>>,
}

impl DocumentStore {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base url cannot hold a path, the namespace
    /// is blank or the reqwest client cannot be constructed.
    pub fn new(config: DocumentStoreConfig) -> Result<Self, DocumentStoreConfigError> {
        if config.base_url.cannot_be_a_base() {
            return Err(DocumentStoreConfigError::UnusableBaseUrl {
                url: config.base_url,
            });
        }
        let namespace: Vec<String> = config
            .namespace
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        if namespace.is_empty() {
            return Err(DocumentStoreConfigError::BlankNamespace);
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            namespace,
            auth_token: config.auth_token,
        })
    }

    /// Url of the node at `path` below the namespace; an empty path addresses
    /// the namespace root.
    fn node_url(&self, path: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        let mut segments: Vec<&str> = self.namespace.iter().map(String::as_str).collect();
        segments.extend_from_slice(path);
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| RemoteError::Rejected("empty document path".to_owned()))?;
        url.path_segments_mut()
            .map_err(|()| RemoteError::Rejected(format!("store url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(parents)
            .push(&format!("{last}.json"));
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, RemoteError> {
        let body = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice(body.as_ref())
            .map_err(|err| RemoteError::Decode(format!("invalid store payload: {err}")))
    }

    async fn get_node(&self, path: &[&str]) -> Result<Value, RemoteError> {
        let url = self.node_url(path)?;
        let response = self.send(self.client.get(url)).await?;
        Self::read_json(response).await
    }

    /// Read a node together with the ETag guarding it.
    async fn get_node_with_etag(&self, path: &[&str]) -> Result<(Value, String), RemoteError> {
        let url = self.node_url(path)?;
        let response = self
            .send(self.client.get(url).header(ETAG_REQUEST_HEADER, "true"))
            .await?;
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| RemoteError::Decode("store response is missing an ETag".to_owned()))?;
        Ok((Self::read_json(response).await?, etag))
    }

    async fn put_node(
        &self,
        path: &[&str],
        body: &impl Serialize,
        if_match: Option<&str>,
    ) -> Result<(), RemoteError> {
        let url = self.node_url(path)?;
        let mut request = self.client.put(url).json(body);
        if let Some(etag) = if_match {
            request = request.header(IF_MATCH, etag);
        }
        self.send(request).await.map(drop)
    }

    async fn patch_root(&self, update: &Map<String, Value>) -> Result<(), RemoteError> {
        let url = self.node_url(&[])?;
        self.send(self.client.patch(url).json(update)).await.map(drop)
    }

    async fn load_users(&self) -> Result<Vec<User>, RemoteError> {
        let node = self.get_node(&[USERS]).await?;
        decode_collection::<UserDocument>(node)
            .map_err(RemoteError::Decode)?
            .into_values()
            .map(|doc| doc.into_domain().map_err(RemoteError::Decode))
            .collect()
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>, RemoteError> {
        let node = self.get_node(&[USERS, &id.to_string()]).await?;
        if node.is_null() {
            return Ok(None);
        }
        let doc: UserDocument = serde_json::from_value(node)
            .map_err(|err| RemoteError::Decode(format!("user {id}: {err}")))?;
        doc.into_domain().map(Some).map_err(RemoteError::Decode)
    }

    async fn load_projects(&self) -> Result<Vec<Project>, RemoteError> {
        let node = self.get_node(&[PROJECTS]).await?;
        Ok(decode_collection::<ProjectDocument>(node)
            .map_err(RemoteError::Decode)?
            .into_values()
            .map(ProjectDocument::into_domain)
            .collect())
    }

    async fn load_project(&self, id: ProjectId) -> Result<Option<Project>, RemoteError> {
        let node = self.get_node(&[PROJECTS, &id.to_string()]).await?;
        if node.is_null() {
            return Ok(None);
        }
        decode_project(id, node).map(Some)
    }

    async fn highest_id(&self, collection: &str) -> Result<u64, RemoteError> {
        let node = self.get_node(&[collection]).await?;
        let ids = decode_collection::<Value>(node).map_err(RemoteError::Decode)?;
        Ok(ids.keys().next_back().copied().unwrap_or(0))
    }

    /// Write a new record under the first free id above the collection's
    /// current maximum.
    ///
    /// Each candidate slot is written with `if-match` on the ETag read for
    /// it, so a slot taken concurrently fails the write and the next id is
    /// tried.
    async fn claim_slot<D: Serialize>(
        &self,
        collection: &str,
        document_for: impl Fn(u64) -> D,
    ) -> Result<u64, RemoteError> {
        let highest = self.highest_id(collection).await?;
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let candidate = highest
                .checked_add(attempt)
                .ok_or_else(|| RemoteError::Rejected(format!("{collection} id space exhausted")))?;
            let key = candidate.to_string();
            let (existing, etag) = self.get_node_with_etag(&[collection, &key]).await?;
            if !existing.is_null() {
                debug!(collection, candidate, "id slot already taken");
                continue;
            }
            match self
                .put_node(&[collection, &key], &document_for(candidate), Some(&etag))
                .await
            {
                Ok(()) => return Ok(candidate),
                Err(RemoteError::PreconditionFailed(_)) => {
                    debug!(collection, candidate, "lost id slot to a concurrent writer");
                }
                Err(err) => return Err(err),
            }
        }
        Err(RemoteError::Rejected(format!(
            "no free {collection} id after {MAX_WRITE_ATTEMPTS} attempts"
        )))
    }
}

fn decode_project(id: ProjectId, node: Value) -> Result<Project, RemoteError> {
    serde_json::from_value::<ProjectDocument>(node)
        .map(ProjectDocument::into_domain)
        .map_err(|err| RemoteError::Decode(format!("project {id}: {err}")))
}

/// Multi-path update that stores `project` and increments every roster
/// member's balance by its reward.
fn completion_update(project: &Project) -> Result<Map<String, Value>, RemoteError> {
    let document = serde_json::to_value(ProjectDocument::from(project))
        .map_err(|err| RemoteError::Decode(format!("project {}: {err}", project.id())))?;
    let mut update = Map::new();
    update.insert(format!("{PROJECTS}/{}", project.id()), document);
    for member in project.team_members() {
        update.insert(
            format!("{USERS}/{member}/points"),
            json!({ ".sv": { "increment": project.reward_points() } }),
        );
    }
    Ok(update)
}

#[async_trait]
impl UserRepository for DocumentStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.load_user(id).await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .load_users()
            .await?
            .into_iter()
            .find(|user| user.username().as_ref() == username))
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.load_users().await?)
    }

    async fn insert(&self, draft: UserDraft) -> Result<User, UserPersistenceError> {
        let users = self.load_users().await?;
        if users.iter().any(|user| user.username() == &draft.username) {
            return Err(UserPersistenceError::duplicate_username(
                draft.username.to_string(),
            ));
        }
        let id = self
            .claim_slot(USERS, |id| {
                UserDocument::from(&draft.clone().into_user(UserId::new(id)))
            })
            .await?;
        Ok(draft.into_user(UserId::new(id)))
    }
}

#[async_trait]
impl ProjectRepository for DocumentStore {
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self.load_project(id).await?)
    }

    async fn list(&self) -> Result<Vec<Project>, ProjectPersistenceError> {
        Ok(self.load_projects().await?)
    }

    async fn insert(
        &self,
        draft: NewProject,
        created_at: DateTime<Utc>,
    ) -> Result<Project, ProjectPersistenceError> {
        let id = self
            .claim_slot(PROJECTS, |id| {
                ProjectDocument::from(&Project::create(ProjectId::new(id), draft.clone(), created_at))
            })
            .await?;
        Ok(Project::create(ProjectId::new(id), draft, created_at))
    }

    async fn save_progress(
        &self,
        id: ProjectId,
        progress: i32,
    ) -> Result<Project, ProjectPersistenceError> {
        let key = id.to_string();
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let (node, etag) = self.get_node_with_etag(&[PROJECTS, &key]).await?;
            if node.is_null() {
                return Err(ProjectPersistenceError::missing(id.get()));
            }
            let stored = decode_project(id, node)?;
            let updated = stored
                .with_progress(progress)
                .map_err(|_| ProjectPersistenceError::already_completed(id.get()))?;
            match self
                .put_node(
                    &[PROJECTS, &key],
                    &ProjectDocument::from(&updated),
                    Some(&etag),
                )
                .await
            {
                Ok(()) => return Ok(updated),
                Err(RemoteError::PreconditionFailed(_)) => {
                    debug!(project_id = %id, attempt, "project changed during progress write");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(ProjectPersistenceError::query(format!(
            "project {id} kept changing during {MAX_WRITE_ATTEMPTS} progress writes"
        )))
    }

    async fn commit_completion(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let Some(stored) = self.load_project(project.id()).await? else {
            return Err(ProjectPersistenceError::missing(project.id().get()));
        };
        if stored.is_completed() {
            return Err(ProjectPersistenceError::already_completed(project.id().get()));
        }
        let mut team = Vec::with_capacity(project.team_members().len());
        for &member in project.team_members() {
            let user = self
                .load_user(member)
                .await?
                .ok_or_else(|| ProjectPersistenceError::missing_member(member.get()))?;
            team.push(user);
        }
        points::distribute(project, &team).map_err(|err| match err {
            PointsError::MissingMember { member } => {
                ProjectPersistenceError::missing_member(member.get())
            }
            PointsError::Overflow { .. } => ProjectPersistenceError::query(err.to_string()),
        })?;
        self.patch_root(&completion_update(project)?).await?;
        Ok(())
    }
}

/// The request url carries the `auth` token, so it is stripped before the
/// error text reaches a port error or a log line.
fn map_transport_error(error: reqwest::Error) -> RemoteError {
    let error = error.without_url();
    if error.is_timeout() {
        RemoteError::Unreachable(format!("store request timed out: {error}"))
    } else if error.is_decode() {
        RemoteError::Decode(error.to_string())
    } else {
        RemoteError::Unreachable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RemoteError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::PRECONDITION_FAILED => RemoteError::PreconditionFailed(message),
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::REQUEST_TIMEOUT
        | StatusCode::GATEWAY_TIMEOUT => RemoteError::Unreachable(message),
        _ if status.is_server_error() => RemoteError::Unreachable(message),
        _ => RemoteError::Rejected(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
