use crate::geo::haversine_km;
use crate::models::delivery::PlannedRoute;
use crate::models::point::GeoPoint;

/// Orders `stops` with the greedy nearest-neighbour heuristic, starting at
/// `start`.
///
/// Each step moves to the closest unvisited stop; ties go to the stop that
/// comes first in `stops`. This is O(n²) and not an optimal tour: on
/// adversarial layouts it can be around 25% longer than the best route. It is
/// meant for delivery batches of a few dozen stops at most.
///
/// The returned route begins with `start`, and `total_distance_km` sums the
/// legs between consecutive points.
pub fn optimize_route(start: GeoPoint, stops: &[GeoPoint]) -> PlannedRoute {
    let mut visited = vec![false; stops.len()];
    let mut route = Vec::with_capacity(stops.len() + 1);
    route.push(start);

    let mut current = start;
    let mut total_distance_km = 0.0;

    for _ in 0..stops.len() {
        let mut next: Option<(usize, f64)> = None;

        for (idx, candidate) in stops.iter().enumerate() {
            if visited[idx] {
                continue;
            }

            let distance = haversine_km(&current, candidate);
            match next {
                Some((_, best)) if distance >= best => {}
                _ => next = Some((idx, distance)),
            }
        }

        let Some((idx, distance)) = next else {
            break;
        };

        visited[idx] = true;
        current = stops[idx];
        route.push(current);
        total_distance_km += distance;
    }

    PlannedRoute {
        route,
        total_distance_km,
    }
}

#[cfg(test)]
mod tests {
    use super::optimize_route;
    use crate::geo::haversine_km;
    use crate::models::point::GeoPoint;

    const DEPOT: GeoPoint = GeoPoint::new(52.52, 13.40);

    #[test]
    fn empty_stops_yield_start_only() {
        let planned = optimize_route(DEPOT, &[]);
        assert_eq!(planned.route, vec![DEPOT]);
        assert_eq!(planned.total_distance_km, 0.0);
    }

    #[test]
    fn single_stop_is_one_leg() {
        let stop = GeoPoint::new(52.53, 13.42);
        let planned = optimize_route(DEPOT, &[stop]);
        assert_eq!(planned.route, vec![DEPOT, stop]);
        assert!((planned.total_distance_km - haversine_km(&DEPOT, &stop)).abs() < 1e-12);
    }

    #[test]
    fn stops_along_the_equator_are_visited_in_order() {
        let start = GeoPoint::new(0.0, 0.0);
        let far = GeoPoint::new(0.0, 0.3);
        let near = GeoPoint::new(0.0, 0.1);
        let mid = GeoPoint::new(0.0, 0.2);

        let planned = optimize_route(start, &[far, near, mid]);

        assert_eq!(planned.route, vec![start, near, mid, far]);
        assert!((planned.total_distance_km - haversine_km(&start, &far)).abs() < 1e-6);
    }

    #[test]
    fn ties_break_by_input_order() {
        let start = GeoPoint::new(0.0, 0.0);
        let north = GeoPoint::new(1.0, 0.0);
        let south = GeoPoint::new(-1.0, 0.0);
        assert_eq!(haversine_km(&start, &north), haversine_km(&start, &south));

        let planned = optimize_route(start, &[south, north]);
        assert_eq!(planned.route[1], south);

        let planned = optimize_route(start, &[north, south]);
        assert_eq!(planned.route[1], north);
    }

    #[test]
    fn every_stop_is_visited_once_and_total_matches_legs() {
        let stops = vec![
            GeoPoint::new(52.50, 13.30),
            GeoPoint::new(52.55, 13.45),
            GeoPoint::new(52.48, 13.41),
            GeoPoint::new(52.52, 13.40),
            GeoPoint::new(52.60, 13.35),
        ];

        let planned = optimize_route(DEPOT, &stops);

        assert_eq!(planned.route.len(), stops.len() + 1);
        for stop in &stops {
            assert_eq!(planned.route[1..].iter().filter(|p| *p == stop).count(), 1);
        }

        let legs: f64 = planned
            .route
            .windows(2)
            .map(|leg| haversine_km(&leg[0], &leg[1]))
            .sum();
        assert!((planned.total_distance_km - legs).abs() < 1e-9);
    }
}
