use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{config::Settings, error::SweepError};

/// Family whose benchmarks run in sparse-key mode.
pub const SPARSE_FAMILY: &str = "sets";

const FAMILIES: &[(&str, &[&str])] = &[
    (
        "lists",
        &[
            "list-trylock-lb",
            "dlist-trylock-lb",
            "list-trylock-lf",
            "dlist-trylock-lf",
            "harris_list",
            "harris_list_opt",
        ],
    ),
    (
        "trees",
        &[
            "chromatic",
            "leaftree-trylock-lb",
            "leaftree-trylock-lf",
            "bronson",
            "drachsler",
            "natarajan",
            "ellen",
        ],
    ),
    (
        "sets",
        &[
            "leaftree-trylock-lb",
            "leaftree-trylock-lf",
            "arttree-trylock-lb",
            "blockleaftree-b-trylock-lb",
            "arttree-trylock-lf",
            "blockleaftree-b-trylock-lf",
            "hash_optimistic-trylock-lf",
            "hash_optimistic-trylock-lb",
            "btree-trylock-lf",
            "btree-trylock-lb",
            "sri_abtree_pub",
        ],
    ),
    ("btrees", &["sri_abtree", "sri_abtree_mcs", "sri_abtree_pub"]),
    (
        "with-vs-try-lock",
        &[
            "leaftree-trylock-lb",
            "leaftree-trylock-lf",
            "leaftree-lf",
            "leaftree-lb",
        ],
    ),
];

const BINARIES: &[(&str, &str)] = &[
    ("list-trylock-lb", "list_trylock_lb"),
    ("dlist-trylock-lb", "dlist_trylock_lb"),
    ("list-trylock-lf", "list_trylock_lf"),
    ("dlist-trylock-lf", "dlist_trylock_lf"),
    ("harris_list", "harris_list"),
    ("harris_list_opt", "harris_list_opt"),
    ("chromatic", "chromatic"),
    ("leaftree-trylock-lb", "leaftree_trylock_lb"),
    ("leaftree-trylock-lf", "leaftree_trylock_lf"),
    ("leaftree-lb", "leaftree_lb"),
    ("leaftree-lf", "leaftree_lf"),
    ("bronson", "bronson"),
    ("drachsler", "drachsler"),
    ("natarajan", "natarajan"),
    ("ellen", "ellen"),
    ("arttree-trylock-lb", "arttree_trylock_lb"),
    ("arttree-trylock-lf", "arttree_trylock_lf"),
    ("blockleaftree-b-trylock-lb", "blockleaftree_b_trylock_lb"),
    ("blockleaftree-b-trylock-lf", "blockleaftree_b_trylock_lf"),
    ("hash_optimistic-trylock-lb", "hash_optimistic_trylock_lb"),
    ("hash_optimistic-trylock-lf", "hash_optimistic_trylock_lf"),
    ("btree-trylock-lb", "btree_trylock_lb"),
    ("btree-trylock-lf", "btree_trylock_lf"),
    ("sri_abtree", "sri_abtree"),
    ("sri_abtree_mcs", "sri_abtree_mcs"),
    ("sri_abtree_pub", "sri_abtree_pub"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub name: String,
    pub algorithms: Vec<String>,
    pub sparse: bool,
}

/// Immutable family and executable lookup, built once per sweep.
#[derive(Debug, Clone)]
pub struct Registry {
    families: Vec<Family>,
    binaries: HashMap<String, PathBuf>,
}

impl Registry {
    pub fn new(families: Vec<Family>, binaries: HashMap<String, PathBuf>) -> Self {
        Self {
            families,
            binaries,
        }
    }

    /// The built-in tables, with executables under `settings.bin_dir` and
    /// `settings.binaries` layered on top.
    pub fn builtin(settings: &Settings) -> Self {
        let families = FAMILIES
            .iter()
            .map(|(name, algorithms)| Family {
                name: name.to_string(),
                algorithms: algorithms.iter().map(|a| a.to_string()).collect(),
                sparse: *name == SPARSE_FAMILY,
            })
            .collect();

        let mut binaries = BINARIES
            .iter()
            .map(|(alg, file)| (alg.to_string(), settings.bin_dir.join(file)))
            .collect::<HashMap<_, _>>();
        binaries.extend(
            settings
                .binaries
                .iter()
                .map(|(alg, path)| (alg.clone(), path.clone())),
        );

        Self::new(families, binaries)
    }

    pub fn family(&self, name: &str) -> Result<&Family, SweepError> {
        self.families
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| SweepError::UnknownFamily(name.to_owned()))
    }

    pub fn family_names(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(|f| f.name.as_str())
    }

    pub fn binary(&self, algorithm: &str) -> Result<&Path, SweepError> {
        self.binaries
            .get(algorithm)
            .map(PathBuf::as_path)
            .ok_or_else(|| SweepError::UnknownAlgorithm(algorithm.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_algorithm_has_a_binary() {
        let registry = Registry::builtin(&Settings::default());
        for family in registry.family_names() {
            for alg in &registry.family(family).unwrap().algorithms {
                assert!(registry.binary(alg).is_ok(), "{alg} has no executable");
            }
        }
    }

    #[test]
    fn only_sets_is_sparse() {
        let registry = Registry::builtin(&Settings::default());
        for name in registry.family_names() {
            assert_eq!(registry.family(name).unwrap().sparse, name == "sets");
        }
        assert_eq!(registry.family("lists").unwrap().algorithms.len(), 6);
    }

    #[test]
    fn unknown_lookups_are_typed() {
        let registry = Registry::builtin(&Settings::default());
        assert!(matches!(
            registry.family("queues"),
            Err(SweepError::UnknownFamily(name)) if name == "queues"
        ));
        assert!(matches!(
            registry.binary("skiplist"),
            Err(SweepError::UnknownAlgorithm(name)) if name == "skiplist"
        ));
    }

    #[test]
    fn binaries_follow_bin_dir_and_overrides() {
        let mut settings = Settings {
            bin_dir: PathBuf::from("build/benchmark"),
            ..Default::default()
        };
        settings
            .binaries
            .insert("ellen".to_owned(), PathBuf::from("/opt/ellen"));
        let registry = Registry::builtin(&settings);
        assert_eq!(
            registry.binary("bronson").unwrap(),
            Path::new("build/benchmark/bronson")
        );
        assert_eq!(registry.binary("ellen").unwrap(), Path::new("/opt/ellen"));
    }
}
