//! Menu background rotation backed by the persisted recent window.

use geofinder_core::background::pick_background;
use geofinder_core::config::BackgroundConfig;
use geofinder_infrastructure::BackgroundCacheRepository;
use rand::Rng;
use tracing::warn;

pub struct BackgroundRotationService {
    cache: BackgroundCacheRepository,
    image_count: usize,
    recent_window: usize,
}

impl BackgroundRotationService {
    pub fn new(cache: BackgroundCacheRepository, config: &BackgroundConfig) -> Self {
        Self {
            cache,
            image_count: config.image_count,
            recent_window: config.recent_window,
        }
    }

    /// Picks the next background index and records it.
    pub fn next_with<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        let recent = self.cache.load_recent();
        let pick = pick_background(self.image_count, &recent, self.recent_window, rng)?;
        if let Err(e) = self.cache.save_recent(&pick.recent) {
            warn!(error = %e, "[Background] Failed to save recent backgrounds");
        }
        Some(pick.index)
    }

    pub fn next(&self) -> Option<usize> {
        self.next_with(&mut rand::thread_rng())
    }
}
