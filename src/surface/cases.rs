//! Marching cubes case table
//!
//! Corner and edge numbering:
//!
//! ```text
//!        7 ------6-------- 6
//!       /|                /|
//!     11 |              10 |
//!     /  7              /  5
//!    3 -------2------- 2   |
//!    |   |             |   |
//!    |   4 ------4-----|-- 5
//!    3  /              1  /
//!    | 8               | 9
//!    |/                |/
//!    0 -------0------- 1
//! ```
//!
//! The 256 triangulations are derived rather than tabulated. On each cube
//! face the iso-contour connects the crossing where a run of inside corners
//! begins to the crossing where it ends (walking counter-clockwise seen from
//! outside the cube). Diagonal faces therefore always separate the two inside
//! corners, a choice that depends only on the face's own corners, so the two
//! cubes sharing a face agree and the surface has no cracks. Chaining the face
//! segments yields closed loops, which are fan-triangulated. Loop direction
//! makes every triangle wind with its normal pointing away from the inside.

use std::sync::OnceLock;

/// Corner offsets (x, y, z) within a cube
pub(crate) const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Edge endpoints, lower corner first
pub(crate) const EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (3, 2), (0, 3),
    (4, 5), (5, 6), (7, 6), (4, 7),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Cube faces, corners counter-clockwise as seen from outside
const FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // z = 0
    [4, 5, 6, 7], // z = 1
    [0, 1, 5, 4], // y = 0
    [3, 7, 6, 2], // y = 1
    [0, 4, 7, 3], // x = 0
    [1, 2, 6, 5], // x = 1
];

/// FACE_EDGES[f][i] joins FACES[f][i] and FACES[f][(i + 1) % 4]
const FACE_EDGES: [[usize; 4]; 6] = [
    [3, 2, 1, 0],
    [4, 5, 6, 7],
    [0, 9, 4, 8],
    [11, 6, 10, 2],
    [8, 7, 11, 3],
    [1, 10, 5, 9],
];

static CASE_TABLE: OnceLock<Vec<Vec<[u8; 3]>>> = OnceLock::new();

/// Triangles (as cube edge indices) for a corner configuration
///
/// Bit `c` of `case` is set when corner `c` lies inside the surface.
pub(crate) fn case_triangles(case: u8) -> &'static [[u8; 3]] {
    let table = CASE_TABLE.get_or_init(|| (0..256).map(triangulate_case).collect());
    &table[case as usize]
}

fn triangulate_case(case: usize) -> Vec<[u8; 3]> {
    let inside = |corner: usize| case & (1 << corner) != 0;

    // next[e] = edge where the contour leaving crossing e arrives
    let mut next: [Option<usize>; 12] = [None; 12];
    for (face, edges) in FACES.iter().zip(FACE_EDGES.iter()) {
        for i in 0..4 {
            if !inside(face[i]) || inside(face[(i + 3) % 4]) {
                continue;
            }
            let mut j = i;
            while inside(face[(j + 1) % 4]) {
                j = (j + 1) % 4;
            }
            next[edges[(i + 3) % 4]] = Some(edges[j]);
        }
    }

    let mut visited = [false; 12];
    let mut triangles = Vec::new();
    for start in 0..12 {
        if visited[start] || next[start].is_none() {
            continue;
        }

        let mut contour = Vec::with_capacity(12);
        let mut edge = start;
        while !visited[edge] {
            visited[edge] = true;
            contour.push(edge);
            match next[edge] {
                Some(n) => edge = n,
                None => break,
            }
        }

        for k in 1..contour.len().saturating_sub(1) {
            triangles.push([contour[0] as u8, contour[k] as u8, contour[k + 1] as u8]);
        }
    }
    triangles
}
