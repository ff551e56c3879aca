use core::ops::Range;




#[derive(Clone, Debug, PartialEq, Eq)]


/**
 * Represents a rectangular region in a discrete 2D index space. The first
 * coordinate runs along x (the fastest-varying memory direction), the second
 * along y.
 */
pub struct IndexSpace {
    x: Range<i64>,
    y: Range<i64>,
}




// ============================================================================
impl IndexSpace {


    pub fn new(x: Range<i64>, y: Range<i64>) -> Self {

        assert!(
            x.start <= x.end && y.start <= y.end,
            "index space has negative volume");

        Self { x, y }
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> (usize, usize) {
        ((self.x.end - self.x.start) as usize,
         (self.y.end - self.y.start) as usize)
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        let (l, m) = self.dim();
        l * m
    }


    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn start(&self) -> (i64, i64) {
        (self.x.start, self.y.start)
    }


    /**
     * Determine whether another index space is a subset of this one.
     */
    pub fn contains_space(&self, other: &Self) -> bool {
        other.x.start >= self.x.start && other.x.end <= self.x.end &&
        other.y.start >= self.y.start && other.y.end <= self.y.end
    }


    /**
     * Expand this index space by the given number of elements on each side.
     */
    pub fn extend_all(&self, delta: i64) -> Self {
        Self::new(
            self.x.start - delta .. self.x.end + delta,
            self.y.start - delta .. self.y.end + delta)
    }


    /**
     * Return an iterator which traverses the index space in memory order
     * (y slowest, x fastest).
     */
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.y.clone().flat_map(move |j| self.x.clone().map(move |i| (i, j)))
    }
}




/**
 * Less imposing factory function to construct an IndexSpace object.
 */
pub fn range2d(x: Range<i64>, y: Range<i64>) -> IndexSpace {
    IndexSpace::new(x, y)
}
