use std::sync::Arc;

use crate::application::defaults::DefaultsService;
use crate::application::preferences::PreferenceService;
use crate::application::sites::SiteService;

#[derive(Clone)]
pub struct ApiState {
    pub preferences: Arc<PreferenceService>,
    pub sites: Arc<SiteService>,
    pub defaults: Arc<DefaultsService>,
    /// Shared secret for the admin write surface; `None` disables it.
    pub admin_token: Option<Arc<str>>,
}
