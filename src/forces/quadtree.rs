//! Barnes-Hut quadtree
//!
//! Square cells subdivide until each leaf holds one point, or several points
//! that share a position, or the depth limit is reached. Every cell tracks the
//! number of points and their centroid so distant cells can stand in for all
//! of their points.

/// Depth limit guarding against runaway subdivision of near-coincident points
const MAX_DEPTH: usize = 32;

/// A square region of the tree
#[derive(Debug, Clone)]
pub struct Cell {
    /// Left edge
    pub x0: f64,
    /// Top edge
    pub y0: f64,
    /// Side length
    pub size: f64,
    count: usize,
    sum_x: f64,
    sum_y: f64,
    children: Option<[usize; 4]>,
    points: Vec<usize>,
}

impl Cell {
    fn new(x0: f64, y0: f64, size: f64) -> Self {
        Self {
            x0,
            y0,
            size,
            count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            children: None,
            points: Vec::new(),
        }
    }

    /// Number of points in this cell and its descendants
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean position of the contained points
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.count.max(1) as f64;
        (self.sum_x / n, self.sum_y / n)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Point indices stored directly in this cell (leaves only)
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    fn quadrant(&self, x: f64, y: f64) -> usize {
        let half = self.size / 2.0;
        let right = x >= self.x0 + half;
        let bottom = y >= self.y0 + half;
        usize::from(right) + 2 * usize::from(bottom)
    }
}

/// Quadtree over a set of points, stored as an arena of cells
#[derive(Debug, Clone, Default)]
pub struct QuadTree {
    cells: Vec<Cell>,
}

impl QuadTree {
    /// Build a tree over `points`; non-finite points are skipped
    pub fn build(points: &[(f64, f64)]) -> Self {
        let finite = || points.iter().filter(|(x, y)| x.is_finite() && y.is_finite());

        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for &(x, y) in finite() {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }

        let mut tree = Self::default();
        if x0 > x1 {
            return tree;
        }

        let size = (x1 - x0).max(y1 - y0).max(1.0);
        tree.cells.push(Cell::new(x0, y0, size));
        for (index, &(x, y)) in points.iter().enumerate() {
            if x.is_finite() && y.is_finite() {
                tree.insert(0, index, points, 0);
            }
        }
        tree
    }

    pub fn root(&self) -> Option<&Cell> {
        self.cells.first()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Pre-order traversal; returning `true` from `visit` skips the children
    pub fn visit(&self, mut visit: impl FnMut(&Cell) -> bool) {
        if self.cells.is_empty() {
            return;
        }
        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            let cell = &self.cells[index];
            if visit(cell) {
                continue;
            }
            if let Some(children) = cell.children {
                stack.extend(children.iter().rev());
            }
        }
    }

    fn insert(&mut self, cell: usize, index: usize, points: &[(f64, f64)], depth: usize) {
        let (x, y) = points[index];
        let c = &mut self.cells[cell];
        c.count += 1;
        c.sum_x += x;
        c.sum_y += y;

        if let Some(children) = c.children {
            let q = c.quadrant(x, y);
            self.insert(children[q], index, points, depth + 1);
            return;
        }

        let coincident = c.points.first().is_none_or(|&p| points[p] == (x, y));
        if coincident || depth >= MAX_DEPTH {
            c.points.push(index);
            return;
        }

        // Split the leaf and push its points one level down
        let existing = std::mem::take(&mut c.points);
        let children = self.subdivide(cell);
        for p in existing.into_iter().chain(std::iter::once(index)) {
            let (px, py) = points[p];
            let q = self.cells[cell].quadrant(px, py);
            self.insert(children[q], p, points, depth + 1);
        }
    }

    fn subdivide(&mut self, cell: usize) -> [usize; 4] {
        let Cell { x0, y0, size, .. } = self.cells[cell];
        let half = size / 2.0;
        let base = self.cells.len();
        self.cells.push(Cell::new(x0, y0, half));
        self.cells.push(Cell::new(x0 + half, y0, half));
        self.cells.push(Cell::new(x0, y0 + half, half));
        self.cells.push(Cell::new(x0 + half, y0 + half, half));
        let children = [base, base + 1, base + 2, base + 3];
        self.cells[cell].children = Some(children);
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(tree: &QuadTree) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        tree.visit(|cell| {
            if cell.is_leaf() && !cell.points().is_empty() {
                out.push(cell.points().to_vec());
            }
            false
        });
        out
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        let tree = QuadTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
    }

    #[test]
    fn root_aggregates_all_points() {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let tree = QuadTree::build(&points);
        let root = tree.root().unwrap();

        assert_eq!(root.count(), 4);
        assert_eq!(root.centroid(), (5.0, 5.0));
        assert!(!root.is_leaf());
    }

    #[test]
    fn each_distinct_point_gets_its_own_leaf() {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (2.0, 3.0)];
        let tree = QuadTree::build(&points);

        let mut found: Vec<usize> = leaves(&tree).into_iter().flatten().collect();
        found.sort_unstable();
        assert_eq!(found, vec![0, 1, 2, 3, 4]);
        assert!(leaves(&tree).iter().all(|leaf| leaf.len() == 1));
    }

    #[test]
    fn coincident_points_share_a_leaf() {
        let points = [(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)];
        let tree = QuadTree::build(&points);

        assert_eq!(leaves(&tree), vec![vec![0, 1, 2]]);
        assert_eq!(tree.root().unwrap().count(), 3);
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let points = [(0.0, 0.0), (f64::NAN, 1.0), (4.0, 4.0)];
        let tree = QuadTree::build(&points);
        assert_eq!(tree.root().unwrap().count(), 2);
    }

    #[test]
    fn visit_can_prune_subtrees() {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let tree = QuadTree::build(&points);

        let mut visited = 0;
        tree.visit(|_| {
            visited += 1;
            true
        });
        assert_eq!(visited, 1);
    }
}
