//! Memory-order conversion between MATLAB's column-major layout and the
//! row-major (C order) layout used for every in-memory array in this crate.

/// Checked element count for a shape. `None` on overflow.
pub(crate) fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// For each row-major position, the matching column-major offset.
fn column_major_offsets(dims: &[usize]) -> Vec<usize> {
    let total: usize = dims.iter().product();
    let mut strides = vec![1usize; dims.len()];
    for k in 1..dims.len() {
        strides[k] = strides[k - 1] * dims[k - 1];
    }

    let mut offsets = Vec::with_capacity(total);
    let mut index = vec![0usize; dims.len()];
    for _ in 0..total {
        offsets.push(index.iter().zip(&strides).map(|(i, s)| i * s).sum());
        // Last axis varies fastest in row-major order
        for k in (0..dims.len()).rev() {
            index[k] += 1;
            if index[k] < dims[k] {
                break;
            }
            index[k] = 0;
        }
    }
    offsets
}

/// Whether reordering can be skipped (at most one non-singleton axis).
fn is_layout_neutral(dims: &[usize]) -> bool {
    dims.iter().filter(|&&d| d > 1).count() <= 1
}

/// Reorder column-major values into row-major order.
///
/// `values.len()` must equal the product of `dims`.
pub(crate) fn column_major_to_row_major<T: Copy>(dims: &[usize], values: &[T]) -> Vec<T> {
    if is_layout_neutral(dims) {
        return values.to_vec();
    }
    column_major_offsets(dims)
        .into_iter()
        .map(|offset| values[offset])
        .collect()
}

/// Reorder row-major values into column-major order.
///
/// `values.len()` must equal the product of `dims`.
pub(crate) fn row_major_to_column_major<T: Copy + Default>(dims: &[usize], values: &[T]) -> Vec<T> {
    if is_layout_neutral(dims) {
        return values.to_vec();
    }
    let mut out = vec![T::default(); values.len()];
    for (row, offset) in column_major_offsets(dims).into_iter().enumerate() {
        out[offset] = values[row];
    }
    out
}
