use std::collections::HashMap;
use thiserror::Error;

use crate::builders::bundle::Bundle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Bundle `{bundle}` excludes `{excluded}`, which is not a bundle")]
    UnknownBundle { bundle: String, excluded: String },

    #[error("Bundle `{0}` is defined more than once")]
    DuplicateBundle(String),

    #[error("Bundles exclude each other in a cycle: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Orders bundles so that every bundle comes after all the bundles it excludes.
///
/// The sort is stable: whenever several bundles are ready, the one listed
/// first in `bundles` goes first, so a list that is already consistent comes
/// back unchanged. Self exclusions are ignored here; the validator reports them.
pub fn resolve_build_order(bundles: &[Bundle]) -> Result<Vec<Bundle>, OrderError> {
    let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(bundles.len());
    for (i, bundle) in bundles.iter().enumerate() {
        if index_of.insert(bundle.name.as_str(), i).is_some() {
            return Err(OrderError::DuplicateBundle(bundle.name.clone()));
        }
    }

    // pending[i] counts the distinct bundles i still waits for.
    let mut pending = vec![0usize; bundles.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); bundles.len()];
    for (i, bundle) in bundles.iter().enumerate() {
        let mut deps: Vec<usize> = Vec::with_capacity(bundle.exclude.len());
        for excluded in &bundle.exclude {
            let &dep = index_of
                .get(excluded.as_str())
                .ok_or_else(|| OrderError::UnknownBundle {
                    bundle: bundle.name.clone(),
                    excluded: excluded.clone(),
                })?;
            if dep != i && !deps.contains(&dep) {
                deps.push(dep);
            }
        }
        pending[i] = deps.len();
        for dep in deps {
            dependents[dep].push(i);
        }
    }

    let mut placed = vec![false; bundles.len()];
    let mut ordered = Vec::with_capacity(bundles.len());
    while ordered.len() < bundles.len() {
        let Some(next) = (0..bundles.len()).find(|&i| !placed[i] && pending[i] == 0) else {
            let stuck = (0..bundles.len())
                .filter(|&i| !placed[i])
                .map(|i| bundles[i].name.clone())
                .collect();
            return Err(OrderError::Cycle(stuck));
        };

        placed[next] = true;
        for &dependent in &dependents[next] {
            pending[dependent] -= 1;
        }
        ordered.push(bundles[next].clone());
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(name: &str, exclude: &[&str]) -> Bundle {
        Bundle {
            name: name.to_string(),
            exclude: exclude.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn names(bundles: &[Bundle]) -> Vec<&str> {
        bundles.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn consistent_order_is_kept() {
        let bundles = vec![
            bundle("hqwebapp/js/common", &[]),
            bundle("hqwebapp/js/jquery-ui", &["hqwebapp/js/common"]),
            bundle("hqwebapp/js/built", &["hqwebapp/js/common"]),
            bundle(
                "fixtures/js/built",
                &["hqwebapp/js/common", "hqwebapp/js/built"],
            ),
        ];
        assert_eq!(resolve_build_order(&bundles).unwrap(), bundles);
    }

    #[test]
    fn dependents_move_after_their_exclusions() {
        let bundles = vec![
            bundle("app", &["common", "ui"]),
            bundle("ui", &["common"]),
            bundle("common", &[]),
            bundle("standalone", &[]),
        ];
        let ordered = resolve_build_order(&bundles).unwrap();
        assert_eq!(names(&ordered), vec!["common", "ui", "app", "standalone"]);
    }

    #[test]
    fn cycle_is_reported() {
        let bundles = vec![
            bundle("base", &[]),
            bundle("a", &["b"]),
            bundle("b", &["a"]),
        ];
        assert_eq!(
            resolve_build_order(&bundles),
            Err(OrderError::Cycle(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn unknown_reference_is_reported() {
        let bundles = vec![bundle("app", &["vendor"])];
        assert!(matches!(
            resolve_build_order(&bundles),
            Err(OrderError::UnknownBundle { excluded, .. }) if excluded == "vendor"
        ));
    }

    #[test]
    fn duplicate_name_is_reported() {
        let bundles = vec![
            bundle("common", &[]),
            bundle("app", &["common"]),
            bundle("common", &[]),
        ];
        assert_eq!(
            resolve_build_order(&bundles),
            Err(OrderError::DuplicateBundle("common".to_string()))
        );
    }
}
