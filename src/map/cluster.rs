/// Marker clustering
///
/// Greedy radius grouping in screen pixels: markers within the cluster
/// radius of an earlier marker join its group, everything else opens a new
/// one. Past the disable zoom every marker stands on its own. Pure function
/// of the marker set and the camera zoom, recomputed per frame.

use super::controller::{Marker, MarkerStyle};
use super::projection;

/// Geographic extent of a cluster, used for zoom-to-bounds on click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    fn from_point(lat: f64, lon: f64) -> Self {
        Self {
            min_lat: lat,
            max_lat: lat,
            min_lon: lon,
            max_lon: lon,
        }
    }

    fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

/// One drawable node on the map: a lone pin or a merged group
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterNode {
    Single {
        id: i64,
        position: (f64, f64),
        style: MarkerStyle,
        highlighted: bool,
    },
    Cluster {
        count: usize,
        position: (f64, f64),
        bounds: GeoBounds,
    },
}

struct Group {
    origin_px: (f64, f64),
    members: Vec<usize>,
    bounds: GeoBounds,
}

/// Group markers for the given camera zoom
pub fn cluster_markers(
    markers: &[Marker],
    zoom: f64,
    radius: f32,
    disable_zoom: f64,
) -> Vec<ClusterNode> {
    if zoom >= disable_zoom {
        return markers.iter().map(single).collect();
    }

    let scale = 2.0f64.powf(zoom);
    let radius = radius as f64;
    let mut groups: Vec<Group> = Vec::new();

    for (index, marker) in markers.iter().enumerate() {
        let (lat, lon) = marker.position;
        let (wx, wy) = projection::project(lat, lon);
        let px = (wx * scale, wy * scale);

        let existing = groups.iter_mut().find(|group| {
            let dx = group.origin_px.0 - px.0;
            let dy = group.origin_px.1 - px.1;
            (dx * dx + dy * dy).sqrt() < radius
        });

        match existing {
            Some(group) => {
                group.members.push(index);
                group.bounds.extend(lat, lon);
            }
            None => groups.push(Group {
                origin_px: px,
                members: vec![index],
                bounds: GeoBounds::from_point(lat, lon),
            }),
        }
    }

    groups
        .into_iter()
        .map(|group| {
            if group.members.len() == 1 {
                single(&markers[group.members[0]])
            } else {
                ClusterNode::Cluster {
                    count: group.members.len(),
                    position: group.bounds.center(),
                    bounds: group.bounds,
                }
            }
        })
        .collect()
}

fn single(marker: &Marker) -> ClusterNode {
    ClusterNode::Single {
        id: marker.id,
        position: marker.position,
        style: marker.style,
        highlighted: marker.highlighted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: i64, lat: f64, lon: f64) -> Marker {
        Marker {
            id,
            position: (lat, lon),
            style: MarkerStyle::Default,
            highlighted: false,
        }
    }

    #[test]
    fn nearby_markers_merge_into_one_cluster() {
        // A couple hundred meters apart: well within 60px at zoom 7
        let markers = vec![
            marker(1, 52.1000, 5.1000),
            marker(2, 52.1010, 5.1010),
            marker(3, 52.1020, 5.0990),
        ];

        let nodes = cluster_markers(&markers, 7.0, 60.0, 14.0);
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            ClusterNode::Cluster { count, bounds, .. } => {
                assert_eq!(*count, 3);
                assert!(bounds.min_lat <= 52.1000 && bounds.max_lat >= 52.1020);
            }
            other => panic!("expected a cluster, got {:?}", other),
        }
    }

    #[test]
    fn distant_markers_stay_single() {
        // Utrecht vs Groningen, far beyond 60px at zoom 7
        let markers = vec![marker(1, 52.09, 5.12), marker(2, 53.22, 6.57)];

        let nodes = cluster_markers(&markers, 7.0, 60.0, 14.0);
        assert_eq!(nodes.len(), 2);
        assert!(nodes
            .iter()
            .all(|node| matches!(node, ClusterNode::Single { .. })));
    }

    #[test]
    fn clustering_is_disabled_past_the_threshold_zoom() {
        let markers = vec![marker(1, 52.1000, 5.1000), marker(2, 52.1001, 5.1001)];

        let nodes = cluster_markers(&markers, 14.0, 60.0, 14.0);
        assert_eq!(nodes.len(), 2);
        assert!(nodes
            .iter()
            .all(|node| matches!(node, ClusterNode::Single { .. })));
    }

    #[test]
    fn single_member_groups_keep_marker_identity() {
        let mut lone = marker(7, 52.0, 5.0);
        lone.style = MarkerStyle::Recent;
        lone.highlighted = true;

        let nodes = cluster_markers(&[lone], 7.0, 60.0, 14.0);
        match &nodes[0] {
            ClusterNode::Single {
                id,
                style,
                highlighted,
                ..
            } => {
                assert_eq!(*id, 7);
                assert_eq!(*style, MarkerStyle::Recent);
                assert!(*highlighted);
            }
            other => panic!("expected a single, got {:?}", other),
        }
    }

    #[test]
    fn no_markers_no_nodes() {
        assert!(cluster_markers(&[], 7.0, 60.0, 14.0).is_empty());
    }
}
