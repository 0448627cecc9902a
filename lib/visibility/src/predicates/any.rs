//! `satisfies_any`: the trivial predicate used by callers that have already
//! established visibility some other way (e.g. a catalog scan under a
//! dedicated lock) and just need every version handed back, including ones
//! an ordinary reader could never see.

use storage::tuple::Tuple;

pub fn satisfies_any(tuple: &Tuple) -> Tuple {
    tuple.clone()
}
