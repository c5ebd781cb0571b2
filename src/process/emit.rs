use crate::error::{GraphError, Result};
use crate::numdict::{ActivationMap, MutableActivationMap, ops};

/// Raw result of a process's core logic, validated by `emit` before it
/// leaves the process.
#[derive(Debug, Clone, PartialEq)]
pub enum Emitted {
    Map(ActivationMap),
    Mutable(MutableActivationMap),
    Scalar(f64),
}

impl From<ActivationMap> for Emitted {
    fn from(d: ActivationMap) -> Self {
        Emitted::Map(d)
    }
}

impl From<MutableActivationMap> for Emitted {
    fn from(d: MutableActivationMap) -> Self {
        Emitted::Mutable(d)
    }
}

impl From<f64> for Emitted {
    fn from(v: f64) -> Self {
        Emitted::Scalar(v)
    }
}

/// Validate and freeze a process result.
///
/// `None` becomes an empty map with default 0. Maps must have default 0
/// and come back squeezed.
pub fn emit(process: &'static str, raw: Option<Emitted>) -> Result<ActivationMap> {
    let frozen = match raw {
        None => return Ok(ActivationMap::empty()),
        Some(Emitted::Scalar(_)) => {
            return Err(GraphError::InvalidOutputType(process, "a scalar"));
        }
        Some(Emitted::Map(d)) => d,
        Some(Emitted::Mutable(d)) => d.freeze(),
    };

    if frozen.default_value() != 0.0 {
        return Err(GraphError::InvalidDefault(process, frozen.default_value()));
    }
    Ok(ops::squeeze(&frozen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nothing_becomes_empty_map() {
        let d = emit("Test", None).unwrap();
        assert_eq!(d, ActivationMap::empty());
        assert_eq!(d.default_value(), 0.0);
    }

    #[test]
    fn non_zero_default_is_rejected() {
        let raw = ActivationMap::from_pairs([("a", 1.0)], 0.5);
        assert!(matches!(
            emit("Test", Some(raw.into())),
            Err(GraphError::InvalidDefault("Test", d)) if d == 0.5
        ));

        let raw = MutableActivationMap::new(-1.0);
        assert!(matches!(
            emit("Test", Some(raw.into())),
            Err(GraphError::InvalidDefault(..))
        ));
    }

    #[test]
    fn scalars_are_not_activation_maps() {
        assert!(matches!(
            emit("Test", Some(1.0_f64.into())),
            Err(GraphError::InvalidOutputType("Test", _))
        ));
    }

    #[test]
    fn emitted_maps_are_squeezed() {
        let mut raw = MutableActivationMap::new(0.0);
        raw.set("a", 0.0);
        raw.set("b", 0.3);

        assert_eq!(
            emit("Test", Some(raw.into())).unwrap(),
            ActivationMap::from_pairs([("b", 0.3)], 0.0)
        );
    }
}
