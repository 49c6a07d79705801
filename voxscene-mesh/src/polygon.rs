//! The polygon meshifier: per-slab flood fill of color-connected visible
//! faces, boundary extraction with hole detection, and ear-clip
//! triangulation.
//!
//! Unlike greedy rectangle merging, boundary vertices are kept only where
//! the color across the boundary changes, so two adjacent regions tessellate
//! against the same vertices and no T-junctions form between them.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use euclid::default::Point2D;
use voxscene::Palette;

use crate::Mesh;
use crate::grid::{Face, Grid};

type Point = Point2D<i32>;

/// Mesh a paletted voxel grid by tracing each color-connected region of
/// visible faces as an orthogonal polygon (with holes) and ear-clipping it.
///
/// # Panics
///
/// Panics if `voxels.len()` does not equal `size_x * size_y * size_z`.
pub fn mesh_from_paletted_voxels_polygon(
    voxels: &[u8],
    size: [u32; 3],
    palette: &Palette,
) -> Mesh {
    let grid = Grid::new(voxels, size);
    let mut mesh = Mesh::default();

    for face in Face::ALL {
        let (slabs, u_extent, v_extent) = grid.slab_dimensions(face);
        let cells = (u_extent * v_extent) as usize;
        let mut mask = SlabMask {
            colors: vec![None; cells],
            u_extent,
            v_extent,
        };
        for slab in 0..slabs {
            for v in 0..v_extent {
                for u in 0..u_extent {
                    mask.colors[(u + v * u_extent) as usize] =
                        grid.visible_face_color(face, slab, u, v);
                }
            }
            mesh_slab(&mask, face, slab, palette, &mut mesh);
        }
    }
    mesh
}

/// The visible-face colors of one slab, indexed by in-plane coordinates.
struct SlabMask {
    colors: Vec<Option<u8>>,
    u_extent: u32,
    v_extent: u32,
}

impl SlabMask {
    fn get(&self, u: i32, v: i32) -> Option<u8> {
        if u < 0 || v < 0 || u >= self.u_extent as i32 || v >= self.v_extent as i32 {
            return None;
        }
        self.colors[(u + v * self.u_extent as i32) as usize]
    }

    fn cell(&self, u: i32, v: i32) -> usize {
        (u + v * self.u_extent as i32) as usize
    }
}

fn mesh_slab(mask: &SlabMask, face: Face, slab: u32, palette: &Palette, mesh: &mut Mesh) {
    let cells = mask.colors.len();
    let mut claimed = vec![false; cells];

    for start_v in 0..mask.v_extent as i32 {
        for start_u in 0..mask.u_extent as i32 {
            if claimed[mask.cell(start_u, start_v)] {
                continue;
            }
            let Some(color) = mask.get(start_u, start_v) else {
                continue;
            };

            let region = flood_fill(mask, &mut claimed, start_u, start_v, color);
            let loops = trace_boundaries(mask, &region);
            let triangles = triangulate(loops);

            for [a, b, c] in triangles {
                let corners = [
                    face.lattice_position(slab, a.x, a.y),
                    face.lattice_position(slab, b.x, b.y),
                    face.lattice_position(slab, c.x, c.y),
                ];
                let corners = if face.is_positive() {
                    corners
                } else {
                    [corners[2], corners[1], corners[0]]
                };
                mesh.push_triangle(corners, face.normal(), palette.colors[color as usize]);
            }
        }
    }
}

/// A 4-connected set of equal-color visible cells.
struct Region {
    membership: Vec<bool>,
}

fn flood_fill(
    mask: &SlabMask,
    claimed: &mut [bool],
    start_u: i32,
    start_v: i32,
    color: u8,
) -> Region {
    let mut membership = vec![false; mask.colors.len()];
    let mut queue = VecDeque::new();
    claimed[mask.cell(start_u, start_v)] = true;
    membership[mask.cell(start_u, start_v)] = true;
    queue.push_back((start_u, start_v));

    while let Some((u, v)) = queue.pop_front() {
        for (nu, nv) in [(u + 1, v), (u - 1, v), (u, v + 1), (u, v - 1)] {
            if mask.get(nu, nv) != Some(color) {
                continue;
            }
            let cell = mask.cell(nu, nv);
            if !claimed[cell] {
                claimed[cell] = true;
                membership[cell] = true;
                queue.push_back((nu, nv));
            }
        }
    }
    Region { membership }
}

/// A closed boundary loop in lattice coordinates. Counterclockwise loops
/// are outer contours; clockwise ones are holes.
struct Loop {
    points: Vec<Point>,
}

impl Loop {
    /// Twice the signed area (shoelace); positive for counterclockwise.
    fn signed_area_2(&self) -> i64 {
        let mut area = 0i64;
        for (i, a) in self.points.iter().enumerate() {
            let b = self.points[(i + 1) % self.points.len()];
            area += i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y);
        }
        area
    }
}

/// One unit-length directed boundary edge, keeping the region to its left,
/// tagged with the visible-face color of the cell on its outside (if any).
/// The outside color decides which collinear vertices may be dropped: a
/// vertex between two collinear edges survives only if the outside color
/// changes there, so neighboring regions keep matching vertices.
struct BoundaryEdge {
    from: Point,
    to: Point,
    outside: Option<u8>,
    used: bool,
}

fn trace_boundaries(mask: &SlabMask, region: &Region) -> Vec<Loop> {
    let in_region =
        |u: i32, v: i32| mask.get(u, v).is_some() && region.membership[mask.cell(u, v)];

    // Collect directed unit edges, region to the left.
    let mut edges: Vec<BoundaryEdge> = Vec::new();
    for v in 0..mask.v_extent as i32 {
        for u in 0..mask.u_extent as i32 {
            if !in_region(u, v) {
                continue;
            }
            let sides: [((i32, i32), Point, Point); 4] = [
                ((u, v - 1), Point::new(u, v), Point::new(u + 1, v)),
                ((u + 1, v), Point::new(u + 1, v), Point::new(u + 1, v + 1)),
                ((u, v + 1), Point::new(u + 1, v + 1), Point::new(u, v + 1)),
                ((u - 1, v), Point::new(u, v + 1), Point::new(u, v)),
            ];
            for ((nu, nv), from, to) in sides {
                if !in_region(nu, nv) {
                    edges.push(BoundaryEdge {
                        from,
                        to,
                        outside: mask.get(nu, nv),
                        used: false,
                    });
                }
            }
        }
    }

    // Index edges by start point for the walk.
    let mut by_start: hashbrown::HashMap<(i32, i32), Vec<usize>> = hashbrown::HashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        by_start
            .entry((edge.from.x, edge.from.y))
            .or_default()
            .push(index);
    }

    let mut loops = Vec::new();
    for start in 0..edges.len() {
        if edges[start].used {
            continue;
        }
        let origin = edges[start].from;
        let mut walk: Vec<usize> = vec![start];
        edges[start].used = true;

        loop {
            let current = walk[walk.len() - 1];
            let at = edges[current].to;
            if at == origin {
                break;
            }
            let incoming = direction(&edges[current]);
            // Among unused edges leaving this point, take the sharpest
            // left turn; this keeps each loop simple where boundaries
            // pinch together at a single lattice point.
            let next = by_start
                .get(&(at.x, at.y))
                .into_iter()
                .flatten()
                .copied()
                .filter(|&candidate| !edges[candidate].used)
                .max_by_key(|&candidate| turn_score(incoming, direction(&edges[candidate])));
            match next {
                Some(next) => {
                    edges[next].used = true;
                    walk.push(next);
                }
                None => {
                    // Cannot happen for a well-formed boundary; bail out
                    // rather than loop forever.
                    log::warn!("open boundary chain while tracing a face region");
                    break;
                }
            }
        }

        loops.push(simplify_loop(&edges, &walk));
    }
    loops
}

fn direction(edge: &BoundaryEdge) -> (i32, i32) {
    (edge.to.x - edge.from.x, edge.to.y - edge.from.y)
}

/// Rank an outgoing direction relative to the incoming one: left turn
/// first, then straight, then right; doubling straight back last.
fn turn_score(incoming: (i32, i32), outgoing: (i32, i32)) -> i32 {
    let cross = incoming.0 * outgoing.1 - incoming.1 * outgoing.0;
    let dot = incoming.0 * outgoing.0 + incoming.1 * outgoing.1;
    match (cross, dot) {
        (1, _) => 3,           // left
        (0, 1) => 2,           // straight on
        (-1, _) => 1,          // right
        _ => 0,                // U-turn
    }
}

/// Collapse runs of collinear unit edges into single segments, keeping the
/// intermediate vertex wherever the outside color changes.
fn simplify_loop(edges: &[BoundaryEdge], walk: &[usize]) -> Loop {
    let mut points = Vec::new();
    for (position, &index) in walk.iter().enumerate() {
        let previous = &edges[walk[(position + walk.len() - 1) % walk.len()]];
        let current = &edges[index];
        if direction(previous) != direction(current) || previous.outside != current.outside {
            points.push(current.from);
        }
    }
    Loop { points }
}

// -------------------------------------------------------------------------------------------------
// Triangulation.

/// Triangulate a region's boundary loops: bridge each hole into its
/// containing outer contour, then ear-clip.
fn triangulate(loops: Vec<Loop>) -> Vec<[Point; 3]> {
    let (outers, holes): (Vec<Loop>, Vec<Loop>) =
        loops.into_iter().partition(|l| l.signed_area_2() > 0);

    let mut triangles = Vec::new();
    for outer in outers {
        let mut polygon = outer.points;
        // Holes inside this outer contour, rightmost first.
        let mut contained: Vec<&Loop> = holes
            .iter()
            .filter(|hole| {
                !hole.points.is_empty() && point_in_polygon(rightmost(&hole.points), &polygon)
            })
            .collect();
        contained.sort_by_key(|hole| core::cmp::Reverse(rightmost(&hole.points).x));

        for index in 0..contained.len() {
            // A bridge may not cross the outer boundary, its own hole, or
            // any sibling hole (bridged ones are already part of the
            // polygon, but re-testing their original ring is harmless).
            let obstacles: Vec<&[Point]> =
                contained.iter().map(|hole| hole.points.as_slice()).collect();
            bridge_hole(&mut polygon, contained[index].points.as_slice(), &obstacles);
        }
        ear_clip(&polygon, &mut triangles);
    }
    triangles
}

fn rightmost(points: &[Point]) -> Point {
    *points
        .iter()
        .max_by_key(|p| (p.x, p.y))
        .expect("boundary loop cannot be empty")
}

/// Ray-cast point-in-polygon test. Boundary points count as outside, which
/// suits its one use: a hole vertex never lies on its own outer contour
/// except at pinch points, where skipping the bridge is the safe choice.
fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        if (a.y > point.y) != (b.y > point.y) {
            // Exact for the axis-aligned edges this sees: only vertical
            // edges reach this branch, so the division never truncates.
            let crossing_x = a.x + (b.x - a.x) * (point.y - a.y) / (b.y - a.y);
            if point.x < crossing_x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Join a hole into `polygon` through a zero-area bridge: find a hole
/// vertex and an outer vertex that see each other, then splice the hole's
/// loop (still clockwise) into the outer one, duplicating both bridge
/// endpoints.
fn bridge_hole(polygon: &mut Vec<Point>, hole: &[Point], obstacles: &[&[Point]]) {
    let m_index = hole
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| (p.x, p.y))
        .map(|(i, _)| i)
        .expect("hole loop cannot be empty");
    let m = hole[m_index];

    // Outer vertices by distance from the bridge start; the first one the
    // bridge segment can reach without crossing any boundary wins.
    let mut candidates: Vec<usize> = (0..polygon.len()).collect();
    candidates.sort_by_key(|&i| {
        let d = polygon[i] - m;
        i64::from(d.x) * i64::from(d.x) + i64::from(d.y) * i64::from(d.y)
    });

    let visible = |p: Point| -> bool {
        segment_clear(m, p, polygon)
            && obstacles.iter().all(|ring| segment_clear(m, p, ring))
    };
    let Some(&p_index) = candidates.iter().find(|&&i| visible(polygon[i])) else {
        log::warn!("no visible bridge for hole; leaving it unfilled");
        return;
    };

    // polygon[..=p] ++ hole[m..] ++ hole[..=m] ++ polygon[p..]
    let mut merged = Vec::with_capacity(polygon.len() + hole.len() + 2);
    merged.extend_from_slice(&polygon[..=p_index]);
    merged.extend_from_slice(&hole[m_index..]);
    merged.extend_from_slice(&hole[..=m_index]);
    merged.extend_from_slice(&polygon[p_index..]);
    *polygon = merged;
}

/// Whether the open segment `a`–`b` crosses or touches any edge of `ring`,
/// other than at `a` and `b` themselves.
fn segment_clear(a: Point, b: Point, ring: &[Point]) -> bool {
    for (i, &e0) in ring.iter().enumerate() {
        let e1 = ring[(i + 1) % ring.len()];
        if segments_cross(a, b, e0, e1) {
            return false;
        }
    }
    true
}

/// Proper or touching intersection of segment `a`–`b` with segment
/// `c`–`d`, ignoring contact that happens exactly at `a` or `b`.
fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    fn orient(a: Point, b: Point, c: Point) -> i64 {
        i64::from(b.x - a.x) * i64::from(c.y - a.y) - i64::from(b.y - a.y) * i64::from(c.x - a.x)
    }
    fn on_segment(a: Point, b: Point, q: Point) -> bool {
        orient(a, b, q) == 0
            && q.x >= a.x.min(b.x)
            && q.x <= a.x.max(b.x)
            && q.y >= a.y.min(b.y)
            && q.y <= a.y.max(b.y)
    }

    // Contact at the bridge endpoints is expected, not a crossing —
    // except when the tested edge runs along the bridge itself.
    if c == a || c == b || d == a || d == b {
        let (shared, other) = if c == a || c == b { (c, d) } else { (d, c) };
        let endpoint = if shared == a { b } else { a };
        if other == endpoint {
            // The edge coincides with the whole bridge.
            return true;
        }
        // Collinear overlap: the edge's far end inside the bridge span, or
        // the bridge's far end inside the edge span.
        return orient(a, b, other) == 0
            && (on_segment(a, b, other) || on_segment(shared, other, endpoint));
    }

    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if ((o1 > 0) != (o2 > 0)) && ((o3 > 0) != (o4 > 0)) && o1 != 0 && o2 != 0 && o3 != 0 && o4 != 0
    {
        return true;
    }
    // Touching cases: an endpoint of one segment lying on the other.
    on_segment(a, b, c) || on_segment(a, b, d) || on_segment(c, d, a) || on_segment(c, d, b)
}

/// Classic O(n²) ear clipping over a counterclockwise simple polygon
/// (bridge-duplicated vertices allowed). Degenerate (zero-area) ears are
/// clipped without emitting a triangle.
fn ear_clip(polygon: &[Point], triangles: &mut Vec<[Point; 3]>) {
    if polygon.len() < 3 {
        return;
    }
    let mut ring: VecDeque<Point> = polygon.iter().copied().collect();

    'clip: while ring.len() > 3 {
        // First pass wants strictly convex ears; a second pass accepts
        // collinear ones so spikes left by bridges still resolve.
        for allow_degenerate in [false, true] {
            for i in 0..ring.len() {
                if is_ear(&ring, i, allow_degenerate) {
                    emit(&ring, i, triangles);
                    ring.remove(i);
                    continue 'clip;
                }
            }
        }
        // No ear at all: numerically impossible for a simple polygon, but
        // malformed pinch cases deserve a fallback rather than a hang.
        log::warn!("ear clipping stalled on a {}-vertex ring; fanning remainder", ring.len());
        for i in 1..ring.len() - 1 {
            push_nondegenerate([ring[0], ring[i], ring[i + 1]], triangles);
        }
        return;
    }
    if ring.len() == 3 {
        push_nondegenerate([ring[0], ring[1], ring[2]], triangles);
    }
}

fn emit(ring: &VecDeque<Point>, i: usize, triangles: &mut Vec<[Point; 3]>) {
    let n = ring.len();
    let triangle = [ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]];
    push_nondegenerate(triangle, triangles);
}

fn push_nondegenerate(triangle: [Point; 3], triangles: &mut Vec<[Point; 3]>) {
    let [a, b, c] = triangle;
    let area2 = i64::from(b.x - a.x) * i64::from(c.y - a.y)
        - i64::from(b.y - a.y) * i64::from(c.x - a.x);
    if area2 != 0 {
        triangles.push(triangle);
    }
}

fn is_ear(ring: &VecDeque<Point>, i: usize, allow_degenerate: bool) -> bool {
    let n = ring.len();
    let a = ring[(i + n - 1) % n];
    let b = ring[i];
    let c = ring[(i + 1) % n];

    let cross = i64::from(b.x - a.x) * i64::from(c.y - a.y)
        - i64::from(b.y - a.y) * i64::from(c.x - a.x);
    if cross < 0 || (cross == 0 && !allow_degenerate) {
        return false;
    }
    if cross == 0 {
        // A zero-area ear is safe to drop only if nothing else sits on it.
        return !ring.iter().enumerate().any(|(j, &q)| {
            j != (i + n - 1) % n
                && j != i
                && j != (i + 1) % n
                && q != a
                && q != b
                && q != c
                && point_on_triangle_boundary(a, b, c, q)
        });
    }

    // Reject the ear if any other vertex lies inside (or on) the triangle;
    // vertices coincident with a corner are bridge duplicates and fine.
    !ring.iter().enumerate().any(|(j, &q)| {
        j != (i + n - 1) % n
            && j != i
            && j != (i + 1) % n
            && q != a
            && q != b
            && q != c
            && point_in_triangle(a, b, c, q)
    })
}

/// Inside-or-on test for a counterclockwise triangle.
fn point_in_triangle(a: Point, b: Point, c: Point, q: Point) -> bool {
    fn orient(a: Point, b: Point, c: Point) -> i64 {
        i64::from(b.x - a.x) * i64::from(c.y - a.y) - i64::from(b.y - a.y) * i64::from(c.x - a.x)
    }
    orient(a, b, q) >= 0 && orient(b, c, q) >= 0 && orient(c, a, q) >= 0
}

/// For degenerate (collinear) triangles: whether `q` lies on the segment
/// span.
fn point_on_triangle_boundary(a: Point, b: Point, c: Point, q: Point) -> bool {
    fn on_segment(a: Point, b: Point, q: Point) -> bool {
        let orient = i64::from(b.x - a.x) * i64::from(q.y - a.y)
            - i64::from(b.y - a.y) * i64::from(q.x - a.x);
        orient == 0
            && q.x >= a.x.min(b.x)
            && q.x <= a.x.max(b.x)
            && q.y >= a.y.min(b.y)
            && q.y <= a.y.max(b.y)
    }
    on_segment(a, b, q) || on_segment(b, c, q) || on_segment(c, a, q)
}
