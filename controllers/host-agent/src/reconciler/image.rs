//! Discovery-image assignment.
//!
//! Once the DiscoveryEnv a host is labeled with exposes a built ISO, four
//! fields move together: the image URL, the inspection-disable annotation,
//! the cleaning mode and the online flag. Applying them when already
//! correct produces no update.

use crds::{
    BareMetalHost, CleaningMode, HostImage, HOST_INSPECT_ANNOTATION, HOST_INSPECT_DISABLED,
};
use tracing::info;

use super::annotations::set_annotation;

/// Applies the discovery image to a host. Returns whether the host changed.
pub fn apply_discovery_image(host: &mut BareMetalHost, iso_url: &str) -> bool {
    let mut dirty = false;

    if host.spec.image.as_ref().map(|image| image.url.as_str()) != Some(iso_url) {
        host.spec.image = Some(HostImage {
            url: iso_url.to_string(),
            checksum: None,
            checksum_type: None,
        });
        dirty = true;
    }

    dirty |= set_annotation(host, HOST_INSPECT_ANNOTATION, HOST_INSPECT_DISABLED);

    if host.spec.automated_cleaning_mode != CleaningMode::Disabled {
        host.spec.automated_cleaning_mode = CleaningMode::Disabled;
        dirty = true;
    }

    if !host.spec.online {
        host.spec.online = true;
        dirty = true;
    }

    if dirty {
        info!(
            "Assigned discovery image {} to BareMetalHost {}",
            iso_url,
            host.metadata.name.as_deref().unwrap_or_default()
        );
    }
    dirty
}
