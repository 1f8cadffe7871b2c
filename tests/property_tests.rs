//! Property-based tests for transpose, partitioning and multiplication
//!
//! Every backend must agree bit for bit with the sequential product, and
//! all of them must stay within tolerance of a dense product.

#[cfg(test)]
mod property_tests {
    use ccs_spgemm::{
        multiply_distributed, multiply_parallel, multiply_sequential, partition_columns,
        reference_dense_product, CscMatrix,
    };
    use proptest::prelude::*;

    /// Random CSC matrix; entries may repeat a row and arrive unordered
    fn csc_matrix(rows: usize, cols: usize) -> impl Strategy<Value = CscMatrix> {
        prop::collection::vec((0..rows, 0..cols, -10.0f64..10.0), 0..=rows * cols)
            .prop_map(move |entries| {
                let mut col_ptrs = vec![0; cols + 1];
                for &(_, col, _) in &entries {
                    col_ptrs[col + 1] += 1;
                }
                for j in 0..cols {
                    col_ptrs[j + 1] += col_ptrs[j];
                }

                let mut next = col_ptrs.clone();
                let mut row_indices = vec![0; entries.len()];
                let mut values = vec![0.0; entries.len()];
                for (row, col, value) in entries {
                    row_indices[next[col]] = row;
                    values[next[col]] = value;
                    next[col] += 1;
                }

                CscMatrix::new(rows, cols, col_ptrs, row_indices, values)
            })
    }

    /// Pair of matrices with compatible shapes
    fn operands() -> impl Strategy<Value = (CscMatrix, CscMatrix)> {
        (1usize..8, 1usize..8, 1usize..8)
            .prop_flat_map(|(m, k, n)| (csc_matrix(m, k), csc_matrix(k, n)))
    }

    fn sorted_column(matrix: &CscMatrix, j: usize) -> Vec<(usize, f64)> {
        let mut col: Vec<_> = matrix.col_iter(j).collect();
        col.sort_by(|x, y| x.0.cmp(&y.0).then(x.1.total_cmp(&y.1)));
        col
    }

    fn assert_well_formed(c: &CscMatrix) -> Result<(), TestCaseError> {
        prop_assert_eq!(c.col_ptrs.len(), c.cols + 1);
        prop_assert_eq!(c.col_ptrs[0], 0);
        prop_assert_eq!(c.col_ptrs[c.cols], c.nnz());
        prop_assert!(c.col_ptrs.windows(2).all(|w| w[0] <= w[1]));
        for j in 0..c.cols {
            let rows: Vec<usize> = c.col_iter(j).map(|(i, _)| i).collect();
            prop_assert!(rows.windows(2).all(|w| w[0] < w[1]), "column {} not increasing", j);
            prop_assert!(rows.iter().all(|&i| i < c.rows));
        }
        prop_assert!(c.values.iter().all(|v| v.abs() > 1e-10));
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        // Property: transposing twice restores every column's entries
        #[test]
        fn prop_double_transpose(m in (1usize..8, 1usize..8).prop_flat_map(|(r, c)| csc_matrix(r, c))) {
            let back = m.transpose().transpose();

            prop_assert_eq!(back.shape(), m.shape());
            prop_assert_eq!(&back.col_ptrs, &m.col_ptrs);
            for j in 0..m.cols {
                prop_assert_eq!(sorted_column(&back, j), sorted_column(&m, j));
            }
        }

        // Property: partitions tile the columns with sizes differing by at most one
        #[test]
        fn prop_partition_coverage(total in 0usize..100, count in 1usize..16) {
            let parts = partition_columns(total, count);

            prop_assert_eq!(parts.len(), count);
            prop_assert_eq!(parts[0].start, 0);
            prop_assert_eq!(parts[count - 1].end, total);
            for pair in parts.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            let max = parts.iter().map(|p| p.len()).max().unwrap_or(0);
            let min = parts.iter().map(|p| p.len()).min().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }

        // Property: the product is well formed and matches the dense product
        #[test]
        fn prop_sequential_matches_dense((a, b) in operands()) {
            let c = multiply_sequential(&a, &b).unwrap();
            let dense = reference_dense_product(&a, &b);

            prop_assert_eq!(c.shape(), (a.rows, b.cols));
            assert_well_formed(&c)?;
            for ((i, j), &expected) in dense.indexed_iter() {
                prop_assert!((c.get(i, j) - expected).abs() <= 1e-6,
                    "entry ({}, {}): {} vs {}", i, j, c.get(i, j), expected);
            }
        }

        // Property: worker count never changes the result
        #[test]
        fn prop_backends_agree((a, b) in operands(), workers in 1usize..10) {
            let expected = multiply_sequential(&a, &b).unwrap();

            prop_assert_eq!(&multiply_distributed(&a, &b, workers).unwrap(), &expected);
            prop_assert_eq!(&multiply_parallel(&a, &b, workers).unwrap(), &expected);
        }
    }
}
