use crate::options::StacksOrder;

/// One measure's intervals across every category.
#[derive(Debug, Clone, PartialEq)]
pub struct StackLayer {
    pub key: String,
    /// Position of this layer in the stacking order (0 = innermost).
    pub order: usize,
    /// (baseline, top) per category.
    pub intervals: Vec<(f64, f64)>,
}

/// Index of the first category holding the layer's largest value.
fn peak(values: &[f64]) -> usize {
    let mut best = usize::MAX;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best_value = v;
            best = i;
        }
    }
    best
}

fn sum(values: &[f64]) -> f64 {
    values.iter().filter(|v| !v.is_nan()).sum()
}

fn identity(layers: &[Vec<f64>]) -> Vec<usize> {
    (0..layers.len()).collect()
}

/// Layers sorted by the category of their peak value.
fn appearance(layers: &[Vec<f64>]) -> Vec<usize> {
    let peaks: Vec<usize> = layers.iter().map(|l| peak(l)).collect();
    let mut indices = identity(layers);
    indices.sort_by_key(|&j| peaks[j]);
    indices
}

/// Layers sorted by their total, smallest first.
fn ascending(layers: &[Vec<f64>]) -> Vec<usize> {
    let sums: Vec<f64> = layers.iter().map(|l| sum(l)).collect();
    let mut indices = identity(layers);
    indices.sort_by(|&a, &b| sums[a].total_cmp(&sums[b]));
    indices
}

/// Largest layers in the middle, alternating outwards in appearance order.
fn inside_out(layers: &[Vec<f64>]) -> Vec<usize> {
    let sums: Vec<f64> = layers.iter().map(|l| sum(l)).collect();
    let (mut top, mut bottom) = (0.0, 0.0);
    let (mut tops, mut bottoms) = (Vec::new(), Vec::new());
    for j in appearance(layers) {
        if top < bottom {
            top += sums[j];
            tops.push(j);
        } else {
            bottom += sums[j];
            bottoms.push(j);
        }
    }
    bottoms.reverse();
    bottoms.extend(tops);
    bottoms
}

/// Permutation of layer indices, innermost first. `layers[j][i]` is the
/// value of layer `j` in category `i`.
pub fn order_layers(layers: &[Vec<f64>], order: StacksOrder) -> Vec<usize> {
    match order {
        StacksOrder::None => identity(layers),
        StacksOrder::Reverse => identity(layers).into_iter().rev().collect(),
        StacksOrder::Earliest => appearance(layers),
        StacksOrder::Ascending => ascending(layers),
        StacksOrder::Descending => ascending(layers).into_iter().rev().collect(),
        StacksOrder::InsideOut => inside_out(layers),
    }
}

/// Stack `values[category][layer]` with zero baseline. Layers come back in
/// `keys` order; each interval starts where the previous layer in the
/// stacking order ends.
pub fn stack(keys: &[String], values: &[Vec<f64>], order: StacksOrder) -> Vec<StackLayer> {
    let layers: Vec<Vec<f64>> = (0..keys.len())
        .map(|j| {
            values
                .iter()
                .map(|row| row.get(j).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    let permutation = order_layers(&layers, order);
    let mut stacked: Vec<StackLayer> = keys
        .iter()
        .map(|key| StackLayer {
            key: key.clone(),
            order: 0,
            intervals: Vec::with_capacity(values.len()),
        })
        .collect();

    let mut baselines = vec![0.0; values.len()];
    let mut results: Vec<Vec<(f64, f64)>> = vec![Vec::new(); keys.len()];
    for (position, &j) in permutation.iter().enumerate() {
        stacked[j].order = position;
        results[j] = layers[j]
            .iter()
            .zip(baselines.iter_mut())
            .map(|(&value, base)| {
                let baseline = *base;
                let value = if value.is_nan() { 0.0 } else { value };
                *base = baseline + value;
                (baseline, baseline + value)
            })
            .collect();
    }
    for (layer, intervals) in stacked.iter_mut().zip(results) {
        layer.intervals = intervals;
    }
    stacked
}
