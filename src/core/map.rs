//! # Map Geometry
//!
//! Pure view planning for geographic results: which region a map shows, where
//! each numbered marker lands on a grid of terminal cells, and the detail
//! projection for a selected marker. The TUI draws what this module decides.
//!
//! Zoom levels follow web-map conventions (a 256px tile spans `360 / 2^zoom`
//! degrees of longitude). A terminal cell is treated as `PIXELS_PER_COL` x
//! `PIXELS_PER_ROW` pixels so the same zoom and padding values read the same
//! on screen as they would in a browser map.

use std::time::{Duration, Instant};

use crate::core::config::MapSettings;
use crate::core::message::Marker;

const PIXELS_PER_COL: f64 = 8.0;
const PIXELS_PER_ROW: f64 = 16.0;
const TILE_SIZE: f64 = 256.0;
/// Smallest span (degrees) a fitted view may have. Keeps coincident markers drawable.
const MIN_SPAN_DEG: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Bounding region of all markers. `None` when there are none.
    pub fn of_markers(markers: &[Marker]) -> Option<Self> {
        let first = markers.first()?;
        let init = Bounds {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(markers.iter().skip(1).fold(init, |b, m| Bounds {
            south: b.south.min(m.lat),
            west: b.west.min(m.lng),
            north: b.north.max(m.lat),
            east: b.east.max(m.lng),
        }))
    }
}

/// What the map should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapViewport {
    Centered { center: (f64, f64), zoom: u8 },
    Fitted { bounds: Bounds, padding: u16 },
}

/// Decide the view for a geographic result.
///
/// One marker: centered on it at the close zoom. Several: fitted to their
/// bounds with padding. None: the result's center (or the regional default) at
/// the wide zoom.
pub fn plan_viewport(
    markers: &[Marker],
    center: Option<(f64, f64)>,
    settings: &MapSettings,
) -> MapViewport {
    match markers {
        [] => MapViewport::Centered {
            center: center.unwrap_or(settings.default_center),
            zoom: settings.wide_zoom,
        },
        [only] => MapViewport::Centered {
            center: (only.lat, only.lng),
            zoom: settings.close_zoom,
        },
        many => match Bounds::of_markers(many) {
            Some(bounds) => MapViewport::Fitted {
                bounds,
                padding: settings.fit_padding,
            },
            None => MapViewport::Centered {
                center: settings.default_center,
                zoom: settings.wide_zoom,
            },
        },
    }
}

/// Degree ranges handed to the canvas: `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl MapViewport {
    /// Resolve the viewport to concrete degree ranges for a `cols` x `rows` area.
    pub fn canvas_bounds(&self, cols: u16, rows: u16) -> CanvasBounds {
        let cols = f64::from(cols.max(1));
        let rows = f64::from(rows.max(1));
        match *self {
            MapViewport::Centered {
                center: (lat, lng),
                zoom,
            } => {
                let deg_per_px = 360.0 / (TILE_SIZE * 2f64.powi(i32::from(zoom)));
                let lng_half = cols * PIXELS_PER_COL * deg_per_px / 2.0;
                // Mercator shrinks latitude degrees away from the equator.
                let lat_half = rows * PIXELS_PER_ROW * deg_per_px * lat.to_radians().cos() / 2.0;
                CanvasBounds {
                    x: [lng - lng_half, lng + lng_half],
                    y: [lat - lat_half, lat + lat_half],
                }
            }
            MapViewport::Fitted { bounds, padding } => {
                let pad_cols = f64::from(padding) / PIXELS_PER_COL;
                let pad_rows = f64::from(padding) / PIXELS_PER_ROW;
                let usable_cols = (cols - 2.0 * pad_cols).max(1.0);
                let usable_rows = (rows - 2.0 * pad_rows).max(1.0);

                let lng_span = (bounds.east - bounds.west).max(MIN_SPAN_DEG);
                let lat_span = (bounds.north - bounds.south).max(MIN_SPAN_DEG);
                let lng_mid = (bounds.east + bounds.west) / 2.0;
                let lat_mid = (bounds.north + bounds.south) / 2.0;

                let lng_half = lng_span / 2.0 + pad_cols * lng_span / usable_cols;
                let lat_half = lat_span / 2.0 + pad_rows * lat_span / usable_rows;
                CanvasBounds {
                    x: [lng_mid - lng_half, lng_mid + lng_half],
                    y: [lat_mid - lat_half, lat_mid + lat_half],
                }
            }
        }
    }
}

impl CanvasBounds {
    /// Cell (column, row) relative to the canvas area where a label printed at
    /// `(lng, lat)` starts. Uses the same truncating projection the canvas
    /// applies to labels. `None` when the point is outside the view.
    pub fn cell_of(&self, lat: f64, lng: f64, cols: u16, rows: u16) -> Option<(u16, u16)> {
        let [left, right] = self.x;
        let [bottom, top] = self.y;
        if !(left..=right).contains(&lng) || !(bottom..=top).contains(&lat) {
            return None;
        }
        let width = right - left;
        let height = top - bottom;
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let res_x = f64::from(cols.max(1)) - 1.0;
        let res_y = f64::from(rows.max(1)) - 1.0;
        let col = ((lng - left) * res_x / width) as u16;
        let row = ((top - lat) * res_y / height) as u16;
        Some((col, row))
    }
}

/// Numbered badge drawn on the map for marker `index` (0-based).
pub fn badge(index: usize) -> String {
    format!("●{}", index + 1)
}

/// What the detail overlay shows for one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    /// 1-based number matching the marker's badge.
    pub badge: usize,
    pub name: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
}

impl DetailView {
    pub fn from_marker(index: usize, marker: &Marker) -> Self {
        Self {
            badge: index + 1,
            name: marker.name.clone(),
            address: marker.address.clone(),
            image_url: marker.image_url.clone(),
        }
    }
}

/// Whether the "tap a marker" hint is still up for a map first drawn at `first_shown`.
pub fn hint_visible(first_shown: Instant, now: Instant, duration: Duration) -> bool {
    now.saturating_duration_since(first_shown) < duration
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(name: &str, lat: f64, lng: f64) -> Marker {
        Marker {
            name: name.to_string(),
            address: None,
            lat,
            lng,
            image_url: None,
        }
    }

    #[test]
    fn test_single_marker_centers_at_close_zoom() {
        let settings = MapSettings::default();
        let view = plan_viewport(&[marker("Farmácia A", 1.0, 2.0)], None, &settings);
        assert_eq!(
            view,
            MapViewport::Centered {
                center: (1.0, 2.0),
                zoom: 15
            }
        );
    }

    #[test]
    fn test_several_markers_fit_bounds() {
        let settings = MapSettings::default();
        let markers = [
            marker("A", -29.70, -53.80),
            marker("B", -29.68, -53.85),
            marker("C", -29.65, -53.78),
        ];
        match plan_viewport(&markers, Some((0.0, 0.0)), &settings) {
            MapViewport::Fitted { bounds, padding } => {
                assert_eq!(padding, 30);
                assert_eq!(bounds.south, -29.70);
                assert_eq!(bounds.north, -29.65);
                assert_eq!(bounds.west, -53.85);
                assert_eq!(bounds.east, -53.78);
            }
            other => panic!("expected fitted view, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_markers_use_center_then_default() {
        let settings = MapSettings::default();
        assert_eq!(
            plan_viewport(&[], Some((-30.0, -51.0)), &settings),
            MapViewport::Centered {
                center: (-30.0, -51.0),
                zoom: 13
            }
        );
        assert_eq!(
            plan_viewport(&[], None, &settings),
            MapViewport::Centered {
                center: (-29.684, -53.806),
                zoom: 13
            }
        );
    }

    #[test]
    fn test_fitted_bounds_contain_every_marker_with_margin() {
        let markers = [marker("A", -29.70, -53.80), marker("B", -29.60, -53.70)];
        let view = MapViewport::Fitted {
            bounds: Bounds::of_markers(&markers).unwrap(),
            padding: 30,
        };
        let cb = view.canvas_bounds(60, 14);
        assert!(cb.x[0] < -53.80 && cb.x[1] > -53.70);
        assert!(cb.y[0] < -29.70 && cb.y[1] > -29.60);
        for m in &markers {
            assert!(cb.cell_of(m.lat, m.lng, 60, 14).is_some());
        }
    }

    #[test]
    fn test_coincident_markers_still_have_a_span() {
        let markers = [marker("A", 1.0, 2.0), marker("B", 1.0, 2.0)];
        let view = MapViewport::Fitted {
            bounds: Bounds::of_markers(&markers).unwrap(),
            padding: 0,
        };
        let cb = view.canvas_bounds(40, 10);
        assert!(cb.x[1] > cb.x[0]);
        assert!(cb.y[1] > cb.y[0]);
    }

    #[test]
    fn test_centered_marker_lands_mid_canvas() {
        let view = MapViewport::Centered {
            center: (1.0, 2.0),
            zoom: 15,
        };
        let cb = view.canvas_bounds(41, 11);
        let (col, row) = cb.cell_of(1.0, 2.0, 41, 11).unwrap();
        // Truncation may land one cell short of the exact middle.
        assert!((19..=20).contains(&col), "col = {col}");
        assert!((4..=5).contains(&row), "row = {row}");
    }

    #[test]
    fn test_cell_of_outside_view_is_none() {
        let cb = CanvasBounds {
            x: [0.0, 10.0],
            y: [0.0, 10.0],
        };
        assert_eq!(cb.cell_of(11.0, 5.0, 20, 10), None);
        assert_eq!(cb.cell_of(10.0, 0.0, 20, 10), Some((0, 0)));
        assert_eq!(cb.cell_of(0.0, 10.0, 20, 10), Some((19, 9)));
    }

    #[test]
    fn test_detail_view_badge_is_one_based() {
        let mut m = marker("Farmácia Central", 0.0, 0.0);
        m.address = Some("Rua do Acampamento, 100".into());
        let detail = DetailView::from_marker(2, &m);
        assert_eq!(detail.badge, 3);
        assert_eq!(detail.name, "Farmácia Central");
        assert_eq!(detail.address.as_deref(), Some("Rua do Acampamento, 100"));
        assert_eq!(badge(2), "●3");
    }

    #[test]
    fn test_hint_expires_after_duration() {
        let start = Instant::now();
        let d = Duration::from_secs(4);
        assert!(hint_visible(start, start + Duration::from_secs(1), d));
        assert!(!hint_visible(start, start + Duration::from_secs(4), d));
    }
}
