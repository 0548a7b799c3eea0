//! Plain-text rendering of a [`MapView`].

use std::fmt;

use localmart_map::{LocationSource, MapAnnotation, MapView, ViewStatus};

const METERS_PER_MILE: f64 = 1_609.344;

/// Human-readable report of a settled map view.
pub(crate) struct ViewReport<'a>(pub(crate) &'a MapView);

impl fmt::Display for ViewReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        let source = match view.location_source {
            Some(LocationSource::Resolved) => "your location",
            Some(LocationSource::Defaulted) => "default location",
            None => "unknown location",
        };
        writeln!(
            f,
            "Map centered on {} ({source}), zoom {}",
            view.viewport.center, view.viewport.zoom
        )?;
        writeln!(
            f,
            "Search radius: {:.0} mi",
            view.markers.radius.meters() / METERS_PER_MILE
        )?;

        if let Some(banner) = &view.banner {
            writeln!(f, "! {}", banner.message)?;
        }

        match &view.markers.status {
            ViewStatus::Loading => writeln!(f, "Still loading nearby listings.")?,
            ViewStatus::Ready if view.markers.entities.is_empty() => {
                writeln!(f, "No products or workshops nearby.")?;
            }
            ViewStatus::Ready | ViewStatus::Errored(_) => {}
        }

        for annotation in view.markers.annotations() {
            match annotation {
                MapAnnotation::UserMarker { coordinate, label } => {
                    writeln!(f, "  [user]     {label} {coordinate}")?;
                }
                MapAnnotation::RadiusOverlay { .. } => {}
                MapAnnotation::EntityMarker {
                    key,
                    coordinate,
                    popup,
                    ..
                } => {
                    writeln!(
                        f,
                        "  [{}] {} {} at {coordinate} ({key})",
                        popup.kind_label.to_lowercase(),
                        popup.title,
                        popup.price_label,
                    )?;
                }
            }
        }

        Ok(())
    }
}
