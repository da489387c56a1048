//! Region queries checked against brute-force evaluation of every pixel
//! center.

use hpgeo::{Grid, Pointing, RangeSet, Scheme, Vec3d};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

fn members(set: &RangeSet) -> Vec<i64> {
    let mut buf = vec![0; set.npix() as usize];
    set.fill_buffer(&mut buf);
    buf
}

/// All pixels whose center passes `inside`.
fn brute_force(grid: &Grid, inside: impl Fn(Vec3d) -> bool) -> Vec<i64> {
    (0..grid.npix())
        .filter(|&pix| inside(grid.pix2vec(pix)))
        .collect()
}

fn wrap_width(phi0: f64, phi1: f64) -> f64 {
    let w = (phi1 - phi0) % TAU;
    if w < 0. {
        w + TAU
    } else {
        w
    }
}

// -----------------------------------------------------------------------------
// Disc.

#[test]
fn disc_exclusive_matches_brute_force() {
    let cases = [
        (4, FRAC_PI_2, 0., 0.1),
        (16, 1.1, 0.7, 0.25),
        (16, FRAC_PI_2, 0., 0.1),
        (32, 0.05, 3.3, 0.2),       // disc over the north pole
        (32, PI - 0.02, 1.0, 0.15), // disc over the south pole
        (8, 2.2, 5.9, 1.4),         // arc crossing φ = 0
    ];
    for scheme in [Scheme::Ring, Scheme::Nest] {
        for &(nside, theta, phi, radius) in &cases {
            let grid = Grid::new(nside, scheme).expect("grid");
            let center = Pointing::new(theta, phi);
            let set = grid
                .query_disc(center, radius, 0)
                .expect("query_disc");

            let cv = Vec3d::from(center);
            let expected =
                brute_force(&grid, |v| cv.angle(&v) <= radius);
            assert_eq!(
                members(&set),
                expected,
                "{scheme} nside={nside} r={radius}"
            );
        }
    }
}

#[test]
fn disc_inclusive_is_a_superset() {
    for scheme in [Scheme::Ring, Scheme::Nest] {
        for fact in [1, 2, 4, 8] {
            let grid = Grid::new(16, scheme).expect("grid");
            let center = Pointing::new(1.234, 2.345);
            let radius = 0.27;

            let exact =
                grid.query_disc(center, radius, 0).expect("exclusive");
            let inclusive =
                grid.query_disc(center, radius, fact).expect("inclusive");

            assert!(inclusive.npix() >= exact.npix());
            for pix in members(&exact) {
                assert!(
                    inclusive.contains(pix),
                    "{scheme} fact={fact} pix={pix}"
                );
            }

            // Every pixel whose boundary dips into the disc is covered.
            let cv = Vec3d::from(center);
            for pix in 0..grid.npix() {
                let overlaps = grid
                    .boundaries(pix, 8)
                    .into_iter()
                    .any(|p| cv.angle(&Vec3d::from(p)) <= radius);
                if overlaps {
                    assert!(
                        inclusive.contains(pix),
                        "{scheme} fact={fact} pix={pix} missed"
                    );
                }
            }
        }
    }
}

#[test]
fn disc_ring_fact_need_not_be_pow2() {
    let grid = Grid::new(16, Scheme::Ring).expect("grid");
    let center = Pointing::new(1.0, 1.0);
    let exact = grid.query_disc(center, 0.2, 0).expect("exclusive");
    let inclusive = grid.query_disc(center, 0.2, 3).expect("inclusive");
    assert!(inclusive.npix() >= exact.npix());

    // NEST rejects a non-power-of-two factor.
    let nest = Grid::new(16, Scheme::Nest).expect("grid");
    assert!(nest.query_disc(center, 0.2, 3).is_err());
}

#[test]
fn disc_covering_whole_sphere() {
    for scheme in [Scheme::Ring, Scheme::Nest] {
        let grid = Grid::new(4, scheme).expect("grid");
        let set = grid
            .query_disc(Pointing::new(0.4, 0.4), PI, 0)
            .expect("query_disc");
        assert_eq!(set.npix(), grid.npix());
        assert_eq!(set.num_ranges(), 1);
    }
}

#[test]
fn disc_schemes_agree() {
    let ring = Grid::new(32, Scheme::Ring).expect("grid");
    let nest = Grid::new(32, Scheme::Nest).expect("grid");
    let center = Pointing::new(0.8, 4.0);

    let from_ring = members(&ring.query_disc(center, 0.3, 0).expect("set"));
    let mut from_nest: Vec<i64> =
        members(&nest.query_disc(center, 0.3, 0).expect("set"))
            .into_iter()
            .map(|pix| nest.nest2ring(pix))
            .collect();
    from_nest.sort_unstable();

    assert_eq!(from_ring, from_nest);
}

#[test]
fn disc_invalid_arguments() {
    let grid = Grid::new(16, Scheme::Ring).expect("grid");
    let center = Pointing::new(1., 1.);
    assert!(grid.query_disc(center, 0., 0).is_err());
    assert!(grid.query_disc(center, -1., 0).is_err());
    assert!(grid.query_disc(center, 3.2, 0).is_err());
    assert!(grid.query_disc(Pointing::new(-0.1, 0.), 1., 0).is_err());
    assert!(grid.query_disc(center, 1., -2).is_err());
}

// -----------------------------------------------------------------------------
// Polygon.

fn square_vertices(
    lon0: f64,
    lat0: f64,
    side: f64,
) -> Vec<Pointing> {
    [
        (lon0, lat0),
        (lon0 + side, lat0),
        (lon0 + side, lat0 + side),
        (lon0, lat0 + side),
    ]
    .iter()
    .map(|&(lon, lat)| {
        Pointing::new(
            (90. - lat).to_radians(),
            lon.to_radians(),
        )
    })
    .collect()
}

fn polygon_normals(vertices: &[Pointing]) -> Vec<Vec3d> {
    let vv: Vec<Vec3d> =
        vertices.iter().map(|&p| Vec3d::from(p)).collect();
    let n = vv.len();
    let mut normals = Vec::with_capacity(n);
    let flip = {
        let normal = vv[0].cross(&vv[1]).normalized();
        normal.dot(&vv[2]) < 0.
    };
    for i in 0..n {
        let normal = vv[i].cross(&vv[(i + 1) % n]).normalized();
        normals.push(if flip { -normal } else { normal });
    }
    normals
}

#[test]
fn polygon_exclusive_matches_brute_force() {
    let polygons = [
        square_vertices(-5.3, -4.8, 10.),
        square_vertices(40., 35., 20.),
        // A triangle around the north pole.
        vec![
            Pointing::new(0.2, 0.1),
            Pointing::new(0.2, 2.2),
            Pointing::new(0.2, 4.4),
        ],
    ];
    for scheme in [Scheme::Ring, Scheme::Nest] {
        for vertices in &polygons {
            let grid = Grid::new(16, scheme).expect("grid");
            let set = grid.query_polygon(vertices, 0).expect("polygon");

            let normals = polygon_normals(vertices);
            let expected = brute_force(&grid, |v| {
                normals.iter().all(|n| n.dot(&v) >= 0.)
            });
            assert_eq!(members(&set), expected, "{scheme}");
        }
    }
}

#[test]
fn polygon_square_area() {
    // A 10 x 10 degree square at the equator covers roughly 100 deg².
    let grid = Grid::new(16, Scheme::Nest).expect("grid");
    let set = grid
        .query_polygon(&square_vertices(-5., -5., 10.), 0)
        .expect("polygon");

    assert!(!set.is_empty());
    let pixarea = 4. * PI / grid.npix() as f64;
    let area_deg2 =
        set.npix() as f64 * pixarea * (180. / PI) * (180. / PI);
    // Coarse pixels make the coverage lumpy; the count must still be in
    // the right ballpark.
    assert!(
        (40.0..180.0).contains(&area_deg2),
        "area {area_deg2} deg2"
    );

    // At a finer resolution the estimate tightens.
    let fine = Grid::new(256, Scheme::Nest).expect("grid");
    let set = fine
        .query_polygon(&square_vertices(-5., -5., 10.), 0)
        .expect("polygon");
    let pixarea = 4. * PI / fine.npix() as f64;
    let area_deg2 =
        set.npix() as f64 * pixarea * (180. / PI) * (180. / PI);
    assert!(
        (95.0..105.0).contains(&area_deg2),
        "area {area_deg2} deg2"
    );
}

#[test]
fn polygon_inclusive_is_a_superset() {
    let vertices = square_vertices(10., 10., 7.);
    let grid = Grid::new(32, Scheme::Nest).expect("grid");

    let exact = grid.query_polygon(&vertices, 0).expect("exclusive");
    let inclusive = grid.query_polygon(&vertices, 4).expect("inclusive");

    for pix in members(&exact) {
        assert!(inclusive.contains(pix));
    }

    let normals = polygon_normals(&vertices);
    for pix in 0..grid.npix() {
        let overlaps = grid.boundaries(pix, 8).into_iter().any(|p| {
            let v = Vec3d::from(p);
            normals.iter().all(|n| n.dot(&v) >= 0.)
        });
        if overlaps {
            assert!(inclusive.contains(pix), "pixel {pix} missed");
        }
    }
}

#[test]
fn polygon_rejects_bad_input() {
    let grid = Grid::new(16, Scheme::Nest).expect("grid");

    // Too few vertices.
    let two = vec![Pointing::new(1., 1.), Pointing::new(1., 2.)];
    assert!(grid.query_polygon(&two, 0).is_err());

    // Repeated vertex.
    let degenerate = vec![
        Pointing::new(1., 1.),
        Pointing::new(1., 1.),
        Pointing::new(1.2, 2.),
    ];
    assert!(grid.query_polygon(&degenerate, 0).is_err());

    // Non-convex quadrilateral (one vertex pushed inwards).
    let mut dented = square_vertices(0., 0., 20.);
    dented[1] = Pointing::new(
        (90_f64 - 8.).to_radians(),
        8_f64.to_radians(),
    );
    assert!(grid.query_polygon(&dented, 0).is_err());
}

#[test]
fn polygon_ring_grid_requires_pow2() {
    let grid = Grid::new(12, Scheme::Ring).expect("grid");
    let vertices = square_vertices(0., 0., 10.);
    assert!(grid.query_polygon(&vertices, 0).is_err());
}

// -----------------------------------------------------------------------------
// Ellipse.

#[test]
fn ellipse_exclusive_matches_brute_force() {
    let cases = [
        (1.2, 2.0, 0.3, 0.15, 0.0),
        (1.2, 2.0, 0.3, 0.15, 0.8),
        (0.4, 5.5, 0.25, 0.25, 0.3), // circle as a degenerate ellipse
        (2.6, 0.1, 0.5, 0.2, -1.1),
    ];
    for scheme in [Scheme::Ring, Scheme::Nest] {
        for &(theta, phi, a, b, alpha) in &cases {
            let grid = Grid::new(16, scheme).expect("grid");
            let center = Pointing::new(theta, phi);
            let set = grid
                .query_ellipse(center, a, b, alpha, 0)
                .expect("ellipse");

            // Rebuild the foci exactly as the definition states.
            let c = (a.cos() / b.cos()).acos();
            let (f1, f2) = foci(center, alpha, c);
            let expected = brute_force(&grid, |v| {
                v.angle(&f1) + v.angle(&f2) <= 2. * a
            });
            assert_eq!(members(&set), expected, "{scheme} α={alpha}");
        }
    }
}

/// Foci via the direct geodesic from the center along/against the bearing.
fn foci(center: Pointing, alpha: f64, dist: f64) -> (Vec3d, Vec3d) {
    let lat = FRAC_PI_2 - center.theta;
    let dest = |az: f64| {
        let sin_lat = lat.sin() * dist.cos()
            + lat.cos() * dist.sin() * az.cos();
        let lat2 = sin_lat.clamp(-1., 1.).asin();
        let dlon = (az.sin() * dist.sin() * lat.cos())
            .atan2(dist.cos() - lat.sin() * lat2.sin());
        Vec3d::from(Pointing::new(
            FRAC_PI_2 - lat2,
            (center.phi + dlon).rem_euclid(TAU),
        ))
    };
    (dest(alpha), dest(alpha + PI))
}

#[test]
fn ellipse_degenerate_circle_matches_disc() {
    // Equal semi-axes make the ellipse a disc.
    let grid = Grid::new(32, Scheme::Nest).expect("grid");
    let center = Pointing::new(1.0, 0.5);
    let radius = 0.2;

    let ellipse = grid
        .query_ellipse(center, radius, radius, 0.7, 0)
        .expect("ellipse");
    let disc = grid.query_disc(center, radius, 0).expect("disc");
    assert_eq!(members(&ellipse), members(&disc));
}

#[test]
fn ellipse_inclusive_is_a_superset() {
    let grid = Grid::new(32, Scheme::Nest).expect("grid");
    let center = Pointing::new(1.5, 3.0);

    let exact = grid
        .query_ellipse(center, 0.3, 0.1, 0.5, 0)
        .expect("exclusive");
    let inclusive = grid
        .query_ellipse(center, 0.3, 0.1, 0.5, 4)
        .expect("inclusive");

    assert!(inclusive.npix() >= exact.npix());
    for pix in members(&exact) {
        assert!(inclusive.contains(pix));
    }
}

#[test]
fn ellipse_rejects_bad_axes() {
    let grid = Grid::new(16, Scheme::Nest).expect("grid");
    let center = Pointing::new(1., 1.);
    assert!(grid.query_ellipse(center, 0.1, 0.2, 0., 0).is_err());
    assert!(grid.query_ellipse(center, 0.2, 0., 0., 0).is_err());
    assert!(grid.query_ellipse(center, 1.6, 0.2, 0., 0).is_err());
}

// -----------------------------------------------------------------------------
// Box.

#[test]
fn box_exclusive_matches_brute_force() {
    let cases = [
        // (theta0, theta1, phi0, phi1, full_longitude)
        (0.4, 0.9, 0.3, 1.2, false),
        (1.4, 1.9, 5.8, 0.4, false), // wraps over φ = 0
        (0.0, 0.3, 0.0, 0.0, true),  // polar cap, all longitudes
        (1.0, 2.0, 0.0, 0.0, true),  // full belt
        (2.8, PI, 2.0, 2.6, false),  // touches the south pole
    ];
    for scheme in [Scheme::Ring, Scheme::Nest] {
        for &(theta0, theta1, phi0, phi1, full) in &cases {
            let grid = Grid::new(16, scheme).expect("grid");
            let set = grid
                .query_box(theta0, theta1, phi0, phi1, full, 0)
                .expect("box");

            let width = wrap_width(phi0, phi1);
            let expected = brute_force(&grid, |v| {
                let ptg = Pointing::from(v);
                let in_theta =
                    ptg.theta >= theta0 && ptg.theta <= theta1;
                let in_phi = full
                    || wrap_width(phi0, ptg.phi) <= width;
                in_theta && in_phi
            });
            assert_eq!(
                members(&set),
                expected,
                "{scheme} θ=[{theta0},{theta1}] φ=[{phi0},{phi1}]"
            );
        }
    }
}

#[test]
fn box_inclusive_is_a_superset() {
    let grid = Grid::new(32, Scheme::Nest).expect("grid");
    let bounds = (0.7, 1.1, 2.0, 2.9);

    let exact = grid
        .query_box(bounds.0, bounds.1, bounds.2, bounds.3, false, 0)
        .expect("exclusive");
    let inclusive = grid
        .query_box(bounds.0, bounds.1, bounds.2, bounds.3, false, 4)
        .expect("inclusive");

    for pix in members(&exact) {
        assert!(inclusive.contains(pix));
    }

    let width = wrap_width(bounds.2, bounds.3);
    for pix in 0..grid.npix() {
        let overlaps = grid.boundaries(pix, 8).into_iter().any(|p| {
            p.theta >= bounds.0
                && p.theta <= bounds.1
                && wrap_width(bounds.2, p.phi) <= width
        });
        if overlaps {
            assert!(inclusive.contains(pix), "pixel {pix} missed");
        }
    }
}

#[test]
fn box_rejects_reversed_colatitudes() {
    let grid = Grid::new(16, Scheme::Nest).expect("grid");
    assert!(grid.query_box(1.2, 0.8, 0., 1., false, 0).is_err());
}

// -----------------------------------------------------------------------------
// Cross-engine consistency.

#[test]
fn rangeset_identities_on_query_results() {
    let grid = Grid::new(32, Scheme::Nest).expect("grid");
    let a = grid
        .query_disc(Pointing::new(1.0, 1.0), 0.4, 0)
        .expect("disc");
    let b = grid
        .query_disc(Pointing::new(1.2, 1.3), 0.4, 0)
        .expect("disc");

    let union = a.union(&b);
    let intersection = a.intersection(&b);
    assert_eq!(
        union.npix() + intersection.npix(),
        a.npix() + b.npix()
    );
    assert!(!intersection.is_empty(), "discs overlap");

    let diff = a.difference(&b);
    assert_eq!(diff.npix(), a.npix() - intersection.npix());
}
