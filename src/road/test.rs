#![cfg(test)]

use geo::{point, LineString};

use super::*;
use crate::spatial;

fn line(points: &[(f64, f64)]) -> LineString {
    points.iter().map(|(x, y)| geo::coord! { x: *x, y: *y }).collect()
}

fn base(id: i64, source: i64, target: i64, direction: Direction, geometry: LineString) -> BaseRoad {
    BaseRoad::new(id, id, source, target, direction, 1, 1.0, 50.0, 50.0, geometry)
        .expect("valid base road")
}

/// Three vertices in a row: 0 --(1)-- 1 --(2)-- 2, both roads two-way.
fn corridor() -> RoadMap {
    RoadMap::build(vec![
        base(1, 0, 1, Direction::Both, line(&[(0.0, 0.0), (0.0, 0.001)])),
        base(2, 1, 2, Direction::Both, line(&[(0.0, 0.001), (0.0, 0.002)])),
    ])
    .expect("valid map")
}

#[test]
fn two_way_roads_split_into_sibling_pairs() {
    let map = corridor();
    assert_eq!(map.size(), 4, "two two-way roads make four edges");

    let forward = map.edge(2).expect("forward edge of road 1");
    let backward = map.edge(3).expect("backward edge of road 1");

    assert_eq!(forward.heading(), Heading::Forward);
    assert_eq!(backward.heading(), Heading::Backward);
    assert_eq!(forward.sibling(), Some(3));
    assert_eq!(backward.sibling(), Some(2));
    assert_eq!(forward.base().id, backward.base().id);

    // Sibling geometries are exact reverses of equal length.
    let fwd = forward.geometry().points().collect::<Vec<_>>();
    let mut bwd = backward.geometry().points().collect::<Vec<_>>();
    bwd.reverse();
    assert_eq!(fwd, bwd);
    assert_eq!(forward.length(), backward.length());
}

#[test]
fn one_way_roads_emit_a_single_edge() {
    let map = RoadMap::build(vec![
        base(1, 0, 1, Direction::Forward, line(&[(0.0, 0.0), (0.0, 0.001)])),
        base(2, 1, 0, Direction::Backward, line(&[(0.0, 0.002), (0.0, 0.001)])),
    ])
    .expect("valid map");

    assert_eq!(map.size(), 2);
    assert!(map.edge(2).is_some(), "forward edge of road 1");
    assert!(map.edge(3).is_none(), "no backward edge for a forward one-way");
    assert!(map.edge(4).is_none(), "no forward edge for a backward one-way");
    assert!(map.edge(5).is_some(), "backward edge of road 2");

    let reversed = map.edge(5).unwrap();
    assert_eq!(reversed.source(), 0, "backward edge travels target to source");
    assert_eq!(reversed.target(), 1);
    assert_eq!(reversed.sibling(), None);
}

#[test]
fn edge_id_convention_is_a_bijection() {
    assert_eq!(Road::decompose(14), (7, Heading::Forward));
    assert_eq!(Road::decompose(15), (7, Heading::Backward));

    let map = corridor();
    for id in [2, 3, 4, 5] {
        let road = map.edge(id).unwrap();
        let (b, h) = Road::decompose(id);
        assert_eq!(road.base().id, b);
        assert_eq!(road.heading(), h);
    }
}

#[test]
fn direction_decodes_the_provider_encoding() {
    assert_eq!(Direction::from_value(1), Some(Direction::Forward));
    assert_eq!(Direction::from_value(2), Some(Direction::Backward));
    assert_eq!(Direction::from_value(3), Some(Direction::Both));
    assert_eq!(Direction::from_value(0), None);

    assert!(Direction::Forward.oneway());
    assert!(Direction::Backward.oneway());
    assert!(!Direction::Both.oneway());
}

#[test]
fn maxspeed_follows_heading() {
    let road = BaseRoad::new(
        9,
        9,
        0,
        1,
        Direction::Both,
        1,
        1.0,
        100.0,
        30.0,
        line(&[(0.0, 0.0), (0.0, 0.001)]),
    )
    .unwrap();

    assert_eq!(road.maxspeed(Heading::Forward), 100.0);
    assert_eq!(road.maxspeed(Heading::Backward), 30.0);

    let map = RoadMap::build(vec![road]).unwrap();
    assert_eq!(map.edge(18).unwrap().maxspeed(), 100.0);
    assert_eq!(map.edge(19).unwrap().maxspeed(), 30.0);
}

#[test]
fn successors_share_the_junction_vertex() {
    let map = corridor();

    let first = map.edge(2).unwrap();
    let successors = map.successors(first).map(|road| road.id()).collect::<Vec<_>>();

    // Out of vertex 1: forward continuation (4) and the u-turn sibling (3).
    assert_eq!(successors, vec![3, 4]);
    for successor in map.successors(first) {
        assert_eq!(successor.source(), first.target());
    }
}

#[test]
fn degenerate_base_roads_are_rejected() {
    let single_vertex = LineString::from(vec![point! { x: 0.0, y: 0.0 }]);
    assert!(matches!(
        BaseRoad::new(1, 1, 0, 1, Direction::Both, 1, 1.0, 50.0, 50.0, single_vertex),
        Err(RoadError::TruncatedGeometry(1))
    ));

    let zero_length = line(&[(0.0, 0.0), (0.0, 0.0)]);
    assert!(matches!(
        BaseRoad::new(2, 2, 0, 1, Direction::Both, 1, 1.0, 50.0, 50.0, zero_length),
        Err(RoadError::DegenerateGeometry(2))
    ));

    assert!(matches!(
        BaseRoad::new(3, 3, 0, 1, Direction::Both, 1, 1.0, 0.0, 50.0, line(&[(0.0, 0.0), (0.0, 0.001)])),
        Err(RoadError::InvalidMaxspeed(3))
    ));

    assert!(matches!(
        BaseRoad::new(4, 4, 0, 1, Direction::Both, 1, 0.5, 50.0, 50.0, line(&[(0.0, 0.0), (0.0, 0.001)])),
        Err(RoadError::InvalidPriority(4))
    ));
}

#[test]
fn duplicate_identifiers_are_fatal() {
    let result = RoadMap::build(vec![
        base(1, 0, 1, Direction::Both, line(&[(0.0, 0.0), (0.0, 0.001)])),
        base(1, 1, 2, Direction::Both, line(&[(0.0, 0.001), (0.0, 0.002)])),
    ]);

    assert!(matches!(result, Err(RoadError::DuplicateRoad(1))));
}

#[test]
fn radius_returns_projections_on_both_siblings() {
    let map = corridor();
    let q = point! { x: 0.00001, y: 0.0005 };

    let points = map.radius(q, 50.0);
    let ids = points.iter().map(|p| p.edge().id()).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 3], "one projection per directed edge");

    let forward = &points[0];
    let backward = &points[1];

    assert!((forward.fraction() - 0.5).abs() < 1e-3);
    assert!((backward.fraction() - 0.5).abs() < 1e-3);
    assert!(
        spatial::distance(forward.position(), backward.position()) < 0.5,
        "sibling projections agree geometrically"
    );
}

#[test]
fn radius_excludes_distant_edges() {
    let map = corridor();

    // ~111m east of the corridor.
    let q = point! { x: 0.001, y: 0.0005 };
    assert!(map.radius(q, 50.0).is_empty());
    assert!(!map.radius(q, 200.0).is_empty());
}

#[test]
fn road_point_interpolates_and_orients() {
    let map = corridor();
    let forward = RoadPoint::new(map.edge(2).unwrap().clone(), 0.5);
    let backward = RoadPoint::new(map.edge(3).unwrap().clone(), 0.5);

    assert!((forward.position().y() - 0.0005).abs() < 1e-7);
    assert!((forward.azimuth() - 0.0).abs() < 0.1, "forward edge runs north");
    assert!((backward.azimuth() - 180.0).abs() < 0.1, "sibling runs south");
}
