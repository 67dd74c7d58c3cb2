use crate::config::RestConfig;
use crate::session::SessionStore;
use axum::extract::FromRef;
use carepoint_core::{AuthService, CoreConfig, UserService};
use carepoint_files::{MediaStore, UploadPolicy, Uploader};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state for the REST API server
///
/// Contains the core services, the upload pipeline and the session map shared by every
/// request handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub auth: Arc<AuthService>,
    pub uploader: Uploader,
    pub image_policy: Arc<UploadPolicy>,
    pub audio_policy: Arc<UploadPolicy>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        cfg: Arc<CoreConfig>,
        media_store: Arc<dyn MediaStore>,
        upload_folder: impl Into<String>,
        audio_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(cfg.clone())),
            auth: Arc::new(AuthService::new(cfg)),
            uploader: Uploader::new(media_store),
            image_policy: Arc::new(UploadPolicy::image(upload_folder)),
            audio_policy: Arc::new(UploadPolicy::audio(audio_dir)),
            sessions: SessionStore::new(),
        }
    }

    /// Builds state from a resolved [`RestConfig`] with the given media store.
    pub fn from_config(
        cfg: &RestConfig,
        media_store: Arc<dyn MediaStore>,
    ) -> anyhow::Result<Self> {
        let core = Arc::new(CoreConfig::new(cfg.data_dir.clone())?);
        Ok(Self::new(
            core,
            media_store,
            cfg.upload_folder.clone(),
            cfg.audio_dir.clone(),
        ))
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
