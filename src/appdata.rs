use crate::cache::{OnceCache, SystemClock, TimedCache};
use crate::config::Config;
use crate::inventory::declaration::Declarations;
use crate::inventory::host::Host;
use crate::inventory::migration::MigrationEntry;
use crate::inventory::{self, BuildError};
use crate::services::Lookups;
use actix_web::web;
use std::sync::Arc;

pub type WebData = web::Data<Arc<ApplicationData>>;

pub struct ApplicationData {
    pub config: Config,
    pub servers: TimedCache<Vec<Host>, BuildError>,
    pub upgrades: OnceCache<Vec<MigrationEntry>, BuildError>,
}

impl ApplicationData {
    pub fn new(config: Config, declarations: Declarations, lookups: Lookups) -> Arc<Self> {
        let declarations = Arc::new(declarations);

        let servers = {
            let lookups = lookups.clone();
            let declarations = declarations.clone();
            TimedCache::new(
                "servers",
                config.refresh_interval(),
                Arc::new(SystemClock),
                move || inventory::build_inventory(&lookups, &declarations.inventory),
            )
        };

        let upgrades = OnceCache::new("upgrade tracklist", move || {
            inventory::build_tracklist(&lookups, &declarations.upgrades)
        });

        Arc::new(Self {
            config,
            servers,
            upgrades,
        })
    }
}
