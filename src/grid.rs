use core::ops::Range;
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::index_space::{range2d, IndexSpace};




/// The smallest ghost width for which both parity sub-steps of a
/// macro-iteration can run without a second exchange.
pub const MIN_GHOST_WIDTH: usize = 4;

/// Rows of padded width held in the scratch buffer: two for limited
/// derivatives, four for the corrector's rolling `s, d` pairs.
pub const SCRATCH_ROWS: usize = 6;




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]


/**
 * Describes the memory layout of a padded, multi-field 2D grid: `nfield`
 * planes of `(nx + 2 ng) x (ny + 2 ng)` values, field-major, then row-major
 * with x varying fastest. Every kernel computes flat indexes through this
 * type.
 */
pub struct Layout {
    nx: usize,
    ny: usize,
    ng: usize,
    nfield: usize,
}




// ============================================================================
impl Layout {

    pub fn new(nx: usize, ny: usize, ng: usize, nfield: usize) -> Self {
        Self { nx, ny, ng, nfield }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn ng(&self) -> usize {
        self.ng
    }

    pub fn nfield(&self) -> usize {
        self.nfield
    }

    /// Padded row width.
    pub fn nx_all(&self) -> usize {
        self.nx + 2 * self.ng
    }

    /// Padded column height.
    pub fn ny_all(&self) -> usize {
        self.ny + 2 * self.ng
    }

    /// Distance between the same cell in consecutive fields.
    pub fn field_stride(&self) -> usize {
        self.nx_all() * self.ny_all()
    }

    /// Total number of values over all fields, including ghost cells.
    pub fn len(&self) -> usize {
        self.nfield * self.field_stride()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Like `len`, but `None` if the buffer size is not representable.
    pub fn try_len(&self) -> Option<usize> {
        let w = self.nx.checked_add(self.ng.checked_mul(2)?)?;
        let h = self.ny.checked_add(self.ng.checked_mul(2)?)?;
        w.checked_mul(h)?.checked_mul(self.nfield)
    }

    /// Flat index of field `k` at padded coordinates `(x, y)`, where `(0, 0)`
    /// is the lower-left ghost cell.
    #[inline]
    pub fn index(&self, k: usize, x: usize, y: usize) -> usize {
        debug_assert!(k < self.nfield && x < self.nx_all() && y < self.ny_all());
        (k * self.ny_all() + y) * self.nx_all() + x
    }

    /// Flat index of field `k` at interior coordinates `(ix, iy)`; ghost cells
    /// have negative coordinates or coordinates at or beyond `(nx, ny)`.
    #[inline]
    pub fn offset(&self, k: usize, ix: i64, iy: i64) -> usize {
        let ng = self.ng as i64;
        self.index(k, (ix + ng) as usize, (iy + ng) as usize)
    }

    /// The index range of one padded row of field `k`.
    #[inline]
    pub fn row(&self, k: usize, y: usize) -> Range<usize> {
        let start = self.index(k, 0, y);
        start..start + self.nx_all()
    }

    /// The index range of the whole plane of field `k`.
    pub fn plane(&self, k: usize) -> Range<usize> {
        let start = k * self.field_stride();
        start..start + self.field_stride()
    }

    /// Reinterpret the same memory with `delta` more interior cells on each
    /// side and `delta` fewer ghost cells.
    pub fn expand(&self, delta: usize) -> Self {
        assert!(delta <= self.ng, "cannot expand past the ghost margin");
        Self {
            nx: self.nx + 2 * delta,
            ny: self.ny + 2 * delta,
            ng: self.ng - delta,
            nfield: self.nfield,
        }
    }

    /// The interior cells, in padded coordinates.
    pub fn interior(&self) -> IndexSpace {
        let ng = self.ng as i64;
        range2d(ng..ng + self.nx as i64, ng..ng + self.ny as i64)
    }

    /// The full padded extent.
    pub fn padded(&self) -> IndexSpace {
        self.interior().extend_all(self.ng as i64)
    }
}




/**
 * Copy the values in `src_space` of a `src` buffer into `dst_space` of a
 * `dst` buffer, for every field. The two spaces are given in the padded
 * coordinates of their respective layouts and must have the same shape.
 */
pub fn copy_space(
    dst: &mut [f32],
    dst_layout: &Layout,
    dst_space: &IndexSpace,
    src: &[f32],
    src_layout: &Layout,
    src_space: &IndexSpace)
{
    assert_eq!(dst_layout.nfield(), src_layout.nfield());

    for k in 0..dst_layout.nfield() {
        copy_plane(
            &mut dst[dst_layout.plane(k)], dst_layout, dst_space,
            &src[src_layout.plane(k)], src_layout, src_space);
    }
}




/**
 * Single-field version of `copy_space`: `dst` and `src` are field planes
 * (slices of length `field_stride`) of their layouts.
 */
pub fn copy_plane(
    dst: &mut [f32],
    dst_layout: &Layout,
    dst_space: &IndexSpace,
    src: &[f32],
    src_layout: &Layout,
    src_space: &IndexSpace)
{
    assert_eq!(dst_space.dim(), src_space.dim(), "copy regions differ in shape");
    assert!(dst_layout.padded().contains_space(dst_space));
    assert!(src_layout.padded().contains_space(src_space));

    let (count, rows) = dst_space.dim();
    let (dx0, dy0) = dst_space.start();
    let (sx0, sy0) = src_space.start();

    for r in 0..rows {
        let d = dst_layout.index(0, dx0 as usize, dy0 as usize + r);
        let s = src_layout.index(0, sx0 as usize, sy0 as usize + r);
        dst[d..d + count].copy_from_slice(&src[s..s + count]);
    }
}




/**
 * The buffer set owned by a simulation or by one tile: the current state,
 * the staged state written by each sub-step, the two flux buffers, and the
 * kernel scratch rows. All are allocated together and dropped together.
 */
pub struct StepBuffers {
    pub current: Vec<f32>,
    pub staged: Vec<f32>,
    pub f: Vec<f32>,
    pub g: Vec<f32>,
    pub scratch: Vec<f32>,
}




// ============================================================================
impl StepBuffers {

    /// Allocate zeroed buffers for the given layout. Allocation failure is
    /// reported rather than aborting the process.
    pub fn allocate(layout: &Layout) -> Result<Self, Error> {
        let len = layout.try_len().ok_or(Error::Allocation { bytes: usize::MAX })?;
        let scratch = layout.nx_all().checked_mul(SCRATCH_ROWS).ok_or(Error::Allocation { bytes: usize::MAX })?;

        Ok(Self {
            current: zeroed(len)?,
            staged: zeroed(len)?,
            f: zeroed(len)?,
            g: zeroed(len)?,
            scratch: zeroed(scratch)?,
        })
    }

    /// Exchange the roles of the current and staged buffers.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.staged)
    }
}

fn zeroed(len: usize) -> Result<Vec<f32>, Error> {
    let bytes = len.saturating_mul(std::mem::size_of::<f32>());
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| Error::Allocation { bytes })?;
    data.resize(len, 0.0);
    Ok(data)
}
