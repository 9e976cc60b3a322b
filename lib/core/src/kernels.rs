// Distance kernels over f32 slices.
// Two accumulators per loop so the adds pipeline; callers guarantee equal lengths.

/// Dot product of two equal-length slices.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc0 = 0.0f32;
    let mut acc1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let tail = chunks.remainder().len();
    for (x, y) in chunks.zip(b.chunks_exact(4)) {
        acc0 += x[0] * y[0] + x[1] * y[1];
        acc1 += x[2] * y[2] + x[3] * y[3];
    }
    for i in (a.len() - tail)..a.len() {
        acc0 += a[i] * b[i];
    }

    acc0 + acc1
}

/// Squared Euclidean distance.
#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc0 = 0.0f32;
    let mut acc1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let tail = chunks.remainder().len();
    for (x, y) in chunks.zip(b.chunks_exact(4)) {
        let d0 = x[0] - y[0];
        let d1 = x[1] - y[1];
        let d2 = x[2] - y[2];
        let d3 = x[3] - y[3];
        acc0 += d0 * d0 + d1 * d1;
        acc1 += d2 * d2 + d3 * d3;
    }
    for i in (a.len() - tail)..a.len() {
        let d = a[i] - b[i];
        acc0 += d * d;
    }

    acc0 + acc1
}

#[inline]
pub fn l2(a: &[f32], b: &[f32]) -> f32 {
    l2_squared(a, b).sqrt()
}

#[inline]
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Cosine similarity; 0.0 when either operand has zero norm.
#[inline]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}
