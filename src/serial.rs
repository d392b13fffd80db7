use crate::matrix::DenseMatrix;

/// In-place Gaussian elimination without pivoting, single address space.
///
/// The oracle the distributed engine is measured against: same update
/// order per row, no pivot search, so a zero pivot propagates inf/NaN
/// exactly as the distributed runs would.
pub fn eliminate(a: &mut DenseMatrix) {
    let n = a.rows();
    for k in 0..n.saturating_sub(1) {
        let (head, tail) = a.split_at_row_mut(k + 1);
        let pivot = &head[k * n..(k + 1) * n];
        for i in 0..(n - k - 1) {
            let row = &mut tail[i * n..(i + 1) * n];
            let m = row[k] / pivot[k];
            for j in k..n {
                row[j] -= m * pivot[j];
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn fixed_example() -> DenseMatrix {
    let mut m = DenseMatrix::zeros(4, 4);
    m.row_mut(0).copy_from_slice(&[4.0, 3.0, 2.0, 1.0]);
    m.row_mut(1).copy_from_slice(&[3.0, 4.0, 3.0, 2.0]);
    m.row_mut(2).copy_from_slice(&[2.0, 3.0, 4.0, 3.0]);
    m.row_mut(3).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_four_by_four() {
        let mut m = fixed_example();
        eliminate(&mut m);
        let expected = [
            [4.0, 3.0, 2.0, 1.0],
            [0.0, 1.75, 1.5, 1.25],
            [0.0, 0.0, 12.0 / 7.0, 10.0 / 7.0],
            [0.0, 0.0, 0.0, 5.0 / 3.0],
        ];
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (m.row(i)[j] - expected[i][j]).abs() <= 1e-9,
                    "({i},{j}): got {} expected {}",
                    m.row(i)[j],
                    expected[i][j]
                );
            }
        }
    }

    #[test]
    fn subdiagonal_is_eliminated() {
        let mut m = DenseMatrix::zeros(5, 5);
        m.fill_random(5, &mut rand::prelude::SeedableRng::seed_from_u64(3));
        eliminate(&mut m);
        for i in 1..5 {
            for j in 0..i {
                assert!(m.row(i)[j].abs() <= 1e-9, "({i},{j}) = {}", m.row(i)[j]);
            }
        }
    }

    #[test]
    fn one_by_one_is_untouched() {
        let mut m = DenseMatrix::zeros(1, 1);
        m.row_mut(0)[0] = 3.25;
        eliminate(&mut m);
        assert_eq!(m.row(0)[0], 3.25);
    }
}
