//! Props in the arena and their planar footprints.
use serde::{Deserialize, Serialize};

/// Index of a prop in the registry of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropId(pub usize);

/// Kind of prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropCategory {
    /// Desk, 4 x 2.
    Desk,
    /// Chair, 1 x 1.
    Chair,
    /// Potted plant, a pot and its leaves at one position.
    Plant,
    /// Monitor, 1.5 x 0.2.
    Monitor,
    /// Partition wall, 0.2 x 8.
    Partition,
}

impl PropCategory {
    /// Full extents `(x, z)` of the parts of a prop of this category.
    ///
    /// Every part is centred on the prop position.
    pub fn part_extents(self) -> &'static [(f32, f32)] {
        match self {
            PropCategory::Desk => &[(4.0, 2.0)],
            PropCategory::Chair => &[(1.0, 1.0)],
            // pot, leaves
            PropCategory::Plant => &[(1.5, 1.5), (1.2, 1.2)],
            PropCategory::Monitor => &[(1.5, 0.2)],
            PropCategory::Partition => &[(0.2, 8.0)],
        }
    }
}

/// Axis-aligned box footprint of a prop part on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    /// Centre `(x, z)`.
    pub center: (f32, f32),

    /// Half extents `(x, z)`.
    pub half_extents: (f32, f32),
}

impl Part {
    /// Distance along the ray `origin + t * dir` to the first point inside the
    /// footprint, or `None` if the ray misses it.
    ///
    /// A ray starting inside the footprint hits it at distance 0.
    pub fn ray_distance(&self, origin: (f32, f32), dir: (f32, f32)) -> Option<f32> {
        self.ray_interval(origin, dir).map(|(t_enter, _)| t_enter)
    }

    /// Distances `(enter, exit)` along the ray over which it is inside the
    /// footprint.
    pub fn ray_interval(&self, origin: (f32, f32), dir: (f32, f32)) -> Option<(f32, f32)> {
        let mut t_min = 0f32;
        let mut t_max = f32::INFINITY;
        let axes = [
            (origin.0, dir.0, self.center.0, self.half_extents.0),
            (origin.1, dir.1, self.center.1, self.half_extents.1),
        ];

        for (o, d, c, h) in axes {
            let (lo, hi) = (c - h, c + h);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
            } else {
                let t1 = (lo - o) / d;
                let t2 = (hi - o) / d;
                t_min = t_min.max(t1.min(t2));
                t_max = t_max.min(t1.max(t2));
                if t_min > t_max {
                    return None;
                }
            }
        }
        Some((t_min, t_max))
    }

    /// Returns `true` if `other` lies entirely within this footprint.
    pub fn contains(&self, other: &Part) -> bool {
        let inside = |c: f32, h: f32, oc: f32, oh: f32| c - h <= oc - oh && oc + oh <= c + h;
        inside(self.center.0, self.half_extents.0, other.center.0, other.half_extents.0)
            && inside(self.center.1, self.half_extents.1, other.center.1, other.half_extents.1)
    }
}

/// A prop slot of the registry.
///
/// Slots are built once from the layout. Only the episode flags change
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    /// Index in the registry.
    pub id: PropId,

    /// Kind of prop.
    pub category: PropCategory,

    /// Position `(x, z)`.
    pub position: (f32, f32),

    /// Footprints of the parts.
    pub parts: Vec<Part>,

    /// If the prop is a hider in the current episode.
    pub is_hider: bool,

    /// If the prop is a hider that has been hit.
    pub shot: bool,

    /// If any fire action resolved against the prop.
    pub checked: bool,

    /// The prop this one stands on, such as the desk under a monitor.
    pub resting_on: Option<PropId>,
}

impl Prop {
    pub(crate) fn new(id: PropId, category: PropCategory, position: (f32, f32)) -> Self {
        let parts = category
            .part_extents()
            .iter()
            .map(|&(w, d)| Part {
                center: position,
                half_extents: (w / 2.0, d / 2.0),
            })
            .collect();
        Self {
            id,
            category,
            position,
            parts,
            is_hider: false,
            shot: false,
            checked: false,
            resting_on: None,
        }
    }

    pub(crate) fn clear_flags(&mut self) {
        self.is_hider = false;
        self.shot = false;
        self.checked = false;
    }

    /// Returns `true` if every part of this prop lies within the footprint of
    /// `base`, a different prop.
    pub fn fits_on(&self, base: &Prop) -> bool {
        self.id != base.id
            && self
                .parts
                .iter()
                .all(|part| base.parts.iter().any(|b| b.contains(part)))
    }

    /// Nearest hit distance over all parts.
    pub fn ray_distance(&self, origin: (f32, f32), dir: (f32, f32)) -> Option<f32> {
        self.parts
            .iter()
            .filter_map(|p| p.ray_distance(origin, dir))
            .fold(None, |acc: Option<f32>, t| match acc {
                Some(a) if a <= t => Some(a),
                _ => Some(t),
            })
    }
}
