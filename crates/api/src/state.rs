use std::sync::Arc;
use std::time::Duration;

use infra::repos::{BuildTaskRepo, ClubRepo, UserRepo};
use infra::{BuildQueue, Db};
use site::Labels;

use crate::auth::{AuthConfig, JwtService};
use crate::config::{ServerConfig, SiteConfig};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    auth_config: AuthConfig,
    jwt_service: JwtService,
    build_queue: Arc<dyn BuildQueue>,
    build_debounce: Duration,
    site: SiteConfig,
    labels: Labels,
}

impl AppState {
    pub fn new(db: Db, auth_config: AuthConfig, server: &ServerConfig, site: SiteConfig) -> Self {
        let jwt_service = JwtService::new(&auth_config);
        let build_queue: Arc<dyn BuildQueue> = Arc::new(BuildTaskRepo::new(db.clone()));
        let labels = site.labels();

        Self {
            db,
            auth_config,
            jwt_service,
            build_queue,
            build_debounce: server.build_debounce,
            site,
            labels,
        }
    }

    /// Swap the build queue, e.g. for an in-memory one.
    pub fn with_build_queue(mut self, build_queue: Arc<dyn BuildQueue>) -> Self {
        self.build_queue = build_queue;
        self
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth_config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn build_queue(&self) -> &Arc<dyn BuildQueue> {
        &self.build_queue
    }

    pub fn build_debounce(&self) -> Duration {
        self.build_debounce
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn users(&self) -> UserRepo {
        UserRepo::new(self.db.clone())
    }

    pub fn clubs(&self) -> ClubRepo {
        ClubRepo::new(self.db.clone())
    }
}
