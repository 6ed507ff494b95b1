use super::context::KickContext;
use crate::domain::Image;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Pulls the newest content of an image and records its digest
pub struct ImageRefresher<'a> {
    ctx: &'a KickContext,
}

impl<'a> ImageRefresher<'a> {
    pub fn new(ctx: &'a KickContext) -> Self {
        Self { ctx }
    }

    pub fn refresh(&self, image: &mut Image) -> Result<()> {
        debug!(image = %image, "Pulling image");

        self.ctx
            .runtime
            .pull_image(&image.id)
            .with_context(|| format!("failed to pull image {}", image.id))?;

        let info = self
            .ctx
            .runtime
            .inspect_image(&image.id)
            .with_context(|| format!("failed to inspect image {}", image.id))?;

        info!(image = %image, digest = %info.digest, "Image updated");
        image.current_digest = Some(info.digest);

        Ok(())
    }
}
