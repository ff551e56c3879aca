use core::ops::Range;
use crate::grid::{copy_space, Layout};
use crate::index_space::{range2d, IndexSpace};




/// Fill the ghost margin of a whole-domain buffer from its own interior,
/// assuming periodic boundaries on both axes. Ghost columns are filled over
/// the full padded height first, then ghost rows over the full padded width,
/// so the corners pick up the diagonally opposite interior block.
/// 
pub fn periodic_wrap(u: &mut [f32], layout: &Layout) {
    let (nx, ny, ng) = (layout.nx(), layout.ny(), layout.ng());
    let w = layout.nx_all();

    assert!(ng <= nx && ng <= ny, "ghost margin is wider than the domain");

    for k in 0..layout.nfield() {
        for y in 0..layout.ny_all() {
            let row = layout.index(k, 0, y);
            u.copy_within(row + nx..row + nx + ng, row);
            u.copy_within(row + ng..row + 2 * ng, row + nx + ng);
        }
        let bottom = layout.index(k, 0, ny);
        let top = layout.index(k, 0, ng);
        u.copy_within(bottom..bottom + ng * w, layout.index(k, 0, 0));
        u.copy_within(top..top + ng * w, layout.index(k, 0, ny + ng));
    }
}




/// The three source/destination spans along one axis for tile `p` of
/// `count` tiles of `n` cells each: lower ghost, interior, upper ghost. The
/// destination is in the tile's padded coordinates, the source in the
/// global interior coordinates (zero at the first interior cell).
/// 
fn axis_spans(p: usize, count: usize, n: usize, ng: usize) -> [(Range<i64>, Range<i64>); 3] {
    let below = ((p + count - 1) % count) * n;
    let own = p * n;
    let above = ((p + 1) % count) * n;
    let (n, ng) = (n as i64, ng as i64);
    let (below, own, above) = (below as i64, own as i64, above as i64);

    [
        (0..ng, below + n - ng..below + n),
        (ng..ng + n, own..own + n),
        (ng + n..2 * ng + n, above..above + ng),
    ]
}




/// Return the nine (destination, source) regions which populate the padded
/// buffer of tile `index` in a `counts` partition of the global grid. The
/// source regions are given in the padded coordinates of `global_layout`,
/// and always lie inside its interior: the global ghost margin is never
/// read, and neighbours across the domain edge are found by wrapping tile
/// indexes around.
/// 
pub fn halo_regions(
    index: (usize, usize),
    counts: (usize, usize),
    tile_layout: &Layout,
    global_layout: &Layout) -> Vec<(IndexSpace, IndexSpace)>
{
    assert!(tile_layout.ng() <= tile_layout.nx() && tile_layout.ng() <= tile_layout.ny(),
        "tiles must be at least as wide as the ghost margin");

    let ng = global_layout.ng() as i64;
    let xs = axis_spans(index.0, counts.0, tile_layout.nx(), tile_layout.ng());
    let ys = axis_spans(index.1, counts.1, tile_layout.ny(), tile_layout.ng());

    ys.iter()
        .flat_map(|(dy, sy)| {
            xs.iter().map(move |(dx, sx)| {
                let dst = range2d(dx.clone(), dy.clone());
                let src = range2d(sx.start + ng..sx.end + ng, sy.start + ng..sy.end + ng);
                (dst, src)
            })
        })
        .collect()
}




/// Populate every cell of a tile's padded buffer, ghost cells included, from
/// the interior of the global state.
/// 
pub fn extend_tile(
    tile: &mut [f32],
    index: (usize, usize),
    counts: (usize, usize),
    tile_layout: &Layout,
    global: &[f32],
    global_layout: &Layout)
{
    for (dst, src) in halo_regions(index, counts, tile_layout, global_layout) {
        copy_space(tile, tile_layout, &dst, global, global_layout, &src);
    }
}
