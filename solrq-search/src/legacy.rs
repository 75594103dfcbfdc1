//! Quirks of the indexed documents
//!
//! Some facet values exist under several spellings in the index
//! ("Compte rendu" and "Compterendu"). A correspondence table maps each
//! canonical value to its variants.

use std::collections::HashMap;

use crate::aggregations::Aggregations;
use crate::params::QueryParams;

/// Canonical value → variant spellings.
pub type Correspondences = HashMap<String, Vec<String>>;

/// Add the counts of the variants to their canonical value, then drop the
/// variants from the aggregation.
///
/// Variants are only added to a canonical value that is itself present.
pub fn group_results_by_field_correspondence(
    aggregations: &mut Aggregations,
    field: &str,
    correspondences: &Correspondences,
) {
    let Some(counts) = aggregations.get_mut(field) else {
        return;
    };

    for (canonical, variants) in correspondences {
        if !counts.contains_key(canonical) {
            continue;
        }
        let extra: u64 = variants.iter().filter_map(|v| counts.get(v)).sum();
        if let Some(count) = counts.get_mut(canonical) {
            *count += extra;
        }
    }

    for variant in correspondences.values().flatten() {
        counts.remove(variant);
    }
}

/// Copy of `params` where every value of `param` is followed by its
/// non-empty variants.
pub fn add_correspondences_to_search_query(
    params: &QueryParams,
    param: &str,
    correspondences: &Correspondences,
) -> QueryParams {
    let mut values = Vec::new();
    for value in params.get_list(param) {
        values.push(value.to_string());
        if let Some(variants) = correspondences.get(value) {
            values.extend(variants.iter().filter(|v| !v.is_empty()).cloned());
        }
    }

    let mut params = params.clone();
    params.set_list(param, values);
    params
}
