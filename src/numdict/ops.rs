//! Pure combinators over frozen activation maps.

use crate::numdict::{ActivationMap, Key};
use std::collections::BTreeSet;

/// Drop explicit entries equal to the default.
pub fn squeeze(d: &ActivationMap) -> ActivationMap {
    let default = d.default_value();
    ActivationMap::from_pairs(
        d.iter().filter(|(_, v)| *v != default).map(|(k, v)| (k.clone(), v)),
        default,
    )
}

/// Restrict `d` to `keys`.
pub fn keep<'a>(d: &ActivationMap, keys: impl IntoIterator<Item = &'a Key>) -> ActivationMap {
    let keys: BTreeSet<&Key> = keys.into_iter().collect();
    ActivationMap::from_pairs(
        d.iter().filter(|(k, _)| keys.contains(k)).map(|(k, v)| (k.clone(), v)),
        d.default_value(),
    )
}

/// Remove `keys` from `d`.
pub fn drop_keys<'a>(d: &ActivationMap, keys: impl IntoIterator<Item = &'a Key>) -> ActivationMap {
    let keys: BTreeSet<&Key> = keys.into_iter().collect();
    ActivationMap::from_pairs(
        d.iter().filter(|(k, _)| !keys.contains(k)).map(|(k, v)| (k.clone(), v)),
        d.default_value(),
    )
}

/// Keep entries strictly above `th`.
///
/// The default survives if `keep_default` is set or it is itself above `th`;
/// otherwise it becomes 0.
pub fn threshold(d: &ActivationMap, th: f64, keep_default: bool) -> ActivationMap {
    let default = if keep_default || d.default_value() > th {
        d.default_value()
    } else {
        0.0
    };
    ActivationMap::from_pairs(
        d.iter().filter(|(_, v)| *v > th).map(|(k, v)| (k.clone(), v)),
        default,
    )
}

fn elementwise(a: &ActivationMap, b: &ActivationMap, f: impl Fn(f64, f64) -> f64) -> ActivationMap {
    let keys: BTreeSet<&Key> = a.keys().chain(b.keys()).collect();
    ActivationMap::from_pairs(
        keys.into_iter().map(|k| (k.clone(), f(a.get(k), b.get(k)))),
        f(a.default_value(), b.default_value()),
    )
}

pub fn max(a: &ActivationMap, b: &ActivationMap) -> ActivationMap {
    elementwise(a, b, f64::max)
}

pub fn sum(a: &ActivationMap, b: &ActivationMap) -> ActivationMap {
    elementwise(a, b, |x, y| x + y)
}

pub fn product(a: &ActivationMap, b: &ActivationMap) -> ActivationMap {
    elementwise(a, b, |x, y| x * y)
}

/// Sum of explicit values (the default is not counted).
pub fn val_sum(d: &ActivationMap) -> f64 {
    d.iter().map(|(_, v)| v).sum()
}

/// Scale explicit values so they sum to 1. Maps summing to 0 come back as-is.
pub fn renormalize(d: &ActivationMap) -> ActivationMap {
    let total = val_sum(d);
    if total == 0.0 {
        return d.clone();
    }
    ActivationMap::from_pairs(d.iter().map(|(k, v)| (k.clone(), v / total)), d.default_value())
}

const REL_TOL: f64 = 1e-9;
const ABS_TOL: f64 = 1e-12;

fn close(x: f64, y: f64) -> bool {
    (x - y).abs() <= (REL_TOL * x.abs().max(y.abs())).max(ABS_TOL)
}

/// Value-wise approximate equality over the union of keys and the defaults.
pub fn isclose(a: &ActivationMap, b: &ActivationMap) -> bool {
    close(a.default_value(), b.default_value())
        && a.keys().chain(b.keys()).all(|k| close(a.get(k), b.get(k)))
}
