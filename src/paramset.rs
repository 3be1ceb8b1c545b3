//! Parameter Sets

use crate::pbrt::*;
use std::collections::HashMap;

/// Stores a single parameter with one or more values.
#[derive(Clone)]
pub struct ParamSetItem<T> {
    /// The values.
    pub values: Vec<T>,
}

impl<T> ParamSetItem<T> {
    /// Create a new `ParamSetItem`.
    ///
    /// * `values` - The values.
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }
}

/// A hashmap of parameter sets stored by name.
pub type ParamSetMap<T> = HashMap<String, ParamSetItem<T>>;

/// Stores parameter set items of different types in hashmaps.
#[derive(Clone, Default)]
pub struct ParamSet {
    pub bools: ParamSetMap<bool>,
    pub ints: ParamSetMap<Int>,
    pub floats: ParamSetMap<Float>,
    pub strings: ParamSetMap<String>,
}

/// Define a macro that can be used to generate a function for adding/replacing
/// parameter set item.
macro_rules! paramset_add {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&mut self, name: &str, values: &[$t]) {
            let n = String::from(name);
            self.$paramset.insert(n, ParamSetItem::new(values.to_vec()));
        }
    };
}

/// Define a macro that can be used to generate a function for removing
/// parameter set item.
macro_rules! paramset_erase {
    ($func: ident, $paramset: ident) => {
        pub fn $func(&mut self, name: &str) -> bool {
            let n = String::from(name);
            self.$paramset.remove(&n).is_some()
        }
    };
}

/// Define a macro that can be used to generate a function for finding
/// parameter set item that is stored as a single item.
macro_rules! paramset_find_one {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            let n = String::from(name);
            match self.$paramset.get(&n) {
                Some(param) => {
                    if param.values.len() == 1 {
                        param.values[0].clone()
                    } else {
                        default.clone()
                    }
                }
                None => default.clone(),
            }
        }
    };
}

impl ParamSet {
    /// Returns a new `ParamSet`.
    pub fn new() -> Self {
        Self {
            bools: HashMap::new(),
            ints: HashMap::new(),
            floats: HashMap::new(),
            strings: HashMap::new(),
        }
    }

    paramset_erase!(erase_int, ints);
    paramset_find_one!(find_one_int, Int, ints);
    paramset_add!(add_int, Int, ints);

    paramset_erase!(erase_bool, bools);
    paramset_find_one!(find_one_bool, bool, bools);
    paramset_add!(add_bool, bool, bools);

    paramset_erase!(erase_float, floats);
    paramset_find_one!(find_one_float, Float, floats);
    paramset_add!(add_float, Float, floats);

    paramset_erase!(erase_string, strings);
    paramset_find_one!(find_one_string, String, strings);
    paramset_add!(add_string, String, strings);
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_one_returns_default_when_absent() {
        let params = ParamSet::new();
        assert_eq!(params.find_one_int("photonCount", 100000), 100000);
        assert_eq!(params.find_one_float("intSmooth", 1.0), 1.0);
        assert!(params.find_one_bool("knn", true));
        assert_eq!(
            params.find_one_string("interpolation", String::from("shepard")),
            "shepard"
        );
    }

    #[test]
    fn find_one_returns_stored_value() {
        let mut params = ParamSet::new();
        params.add_int("maxVoxels", &[4]);
        params.add_float("minContributionScale", &[0.01]);
        params.add_bool("interpolateCdf", &[false]);
        params.add_string("photonsampling", &[String::from("power")]);

        assert_eq!(params.find_one_int("maxVoxels", 64), 4);
        assert_eq!(params.find_one_float("minContributionScale", 0.001), 0.01);
        assert!(!params.find_one_bool("interpolateCdf", true));
        assert_eq!(
            params.find_one_string("photonsampling", String::from("uni")),
            "power"
        );
    }

    #[test]
    fn erase_removes_values() {
        let mut params = ParamSet::new();
        params.add_int("cdfCount", &[8]);
        assert!(params.erase_int("cdfCount"));
        assert!(!params.erase_int("cdfCount"));
        assert_eq!(params.find_one_int("cdfCount", 264), 264);
    }
}
