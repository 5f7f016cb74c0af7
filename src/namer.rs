//! Human-readable names for palette colors.
//!
//! Naming sits behind [`NameCandidates`] so any reference table can be
//! plugged in. The built-in [`ColorNameTable`] ranks one of the tables in
//! [`crate::names`] by CIEDE2000 in Lab or by plain RGB distance.

use std::collections::HashMap;
use std::sync::Mutex;

use palette::color_difference::Ciede2000;
use palette::{IntoColor, Lab};
use serde::{Deserialize, Serialize};

use crate::color::{Rgb, hex_to_rgb, rgb_distance};
use crate::config::ExtractConfig;
use crate::names;

/// Name returned when a namer has no candidates at all.
pub const UNKNOWN_NAME: &str = "Unknown";

/// One ranked match from a reference table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameCandidate {
    pub name: String,
    pub hex: String,
    pub distance: f32,
}

/// A source of color names.
pub trait NameCandidates {
    /// Candidates for `hex`, closest first. Empty when nothing matches.
    fn name_candidates(&self, hex: &str) -> Vec<NameCandidate>;

    /// Top-ranked name, or [`UNKNOWN_NAME`].
    fn best_name(&self, hex: &str) -> String {
        self.name_candidates(hex)
            .into_iter()
            .next()
            .map(|c| c.name)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }
}

impl<N: NameCandidates + ?Sized> NameCandidates for &N {
    fn name_candidates(&self, hex: &str) -> Vec<NameCandidate> {
        (**self).name_candidates(hex)
    }

    fn best_name(&self, hex: &str) -> String {
        (**self).best_name(hex)
    }
}

/// Which built-in reference table to name against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum NameList {
    Basic,
    Html,
    Roygbiv,
}

impl NameList {
    fn entries(self) -> &'static [(&'static str, &'static str)] {
        match self {
            NameList::Basic => names::BASIC,
            NameList::Html => names::HTML,
            NameList::Roygbiv => names::ROYGBIV,
        }
    }
}

/// How table entries are ranked against the query color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMetric {
    /// CIEDE2000 in CIE Lab
    DeltaE,
    /// Straight-line distance in RGB
    Euclidean,
}

struct TableEntry {
    name: &'static str,
    hex: &'static str,
    rgb: Rgb,
    lab: Lab,
}

/// A reference table ranked by one metric.
pub struct ColorNameTable {
    entries: Vec<TableEntry>,
    metric: DistanceMetric,
}

impl ColorNameTable {
    pub fn new(list: NameList, metric: DistanceMetric) -> Self {
        let entries = list
            .entries()
            .iter()
            .filter_map(|&(name, hex)| {
                let rgb = hex_to_rgb(hex).ok()?;
                Some(TableEntry {
                    name,
                    hex,
                    rgb,
                    lab: to_lab(rgb),
                })
            })
            .collect();
        Self { entries, metric }
    }

    /// Table and metric named by `config.name_list` and `config.distance`.
    pub fn from_config(config: &ExtractConfig) -> Self {
        Self::new(config.name_list, config.distance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ColorNameTable {
    fn default() -> Self {
        Self::new(NameList::Html, DistanceMetric::DeltaE)
    }
}

impl NameCandidates for ColorNameTable {
    fn name_candidates(&self, hex: &str) -> Vec<NameCandidate> {
        let Ok(query) = hex_to_rgb(hex) else {
            return Vec::new();
        };
        let query_lab = to_lab(query);

        let mut ranked: Vec<NameCandidate> = self
            .entries
            .iter()
            .map(|entry| {
                let distance = match self.metric {
                    DistanceMetric::DeltaE => query_lab.difference(entry.lab),
                    DistanceMetric::Euclidean => rgb_distance(query, entry.rgb),
                };
                NameCandidate {
                    name: entry.name.to_string(),
                    hex: entry.hex.to_string(),
                    distance,
                }
            })
            .collect();
        // stable: equal distances keep table order
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked
    }
}

fn to_lab(color: Rgb) -> Lab {
    color.into_format::<f32>().into_linear().into_color()
}

/// Caches the chosen name per hex value; the wrapped namer must be pure.
pub struct MemoNamer<N> {
    inner: N,
    cache: Mutex<HashMap<String, String>>,
}

impl<N: NameCandidates> MemoNamer<N> {
    pub fn new(inner: N) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<N: NameCandidates> NameCandidates for MemoNamer<N> {
    fn name_candidates(&self, hex: &str) -> Vec<NameCandidate> {
        self.inner.name_candidates(hex)
    }

    fn best_name(&self, hex: &str) -> String {
        let key = hex.to_ascii_uppercase();
        if let Ok(cache) = self.cache.lock() {
            if let Some(name) = cache.get(&key) {
                return name.clone();
            }
        }
        let name = self.inner.best_name(hex);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, name.clone());
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Nothing;

    impl NameCandidates for Nothing {
        fn name_candidates(&self, _hex: &str) -> Vec<NameCandidate> {
            Vec::new()
        }
    }

    struct Counting(AtomicUsize);

    impl NameCandidates for Counting {
        fn name_candidates(&self, hex: &str) -> Vec<NameCandidate> {
            self.0.fetch_add(1, Ordering::SeqCst);
            vec![NameCandidate {
                name: format!("name of {hex}"),
                hex: hex.to_string(),
                distance: 0.0,
            }]
        }
    }

    #[test]
    fn every_table_entry_parses() {
        for list in [NameList::Basic, NameList::Html, NameList::Roygbiv] {
            let table = ColorNameTable::new(list, DistanceMetric::Euclidean);
            assert_eq!(table.len(), list.entries().len());
        }
    }

    #[test]
    fn exact_matches_rank_first() {
        let table = ColorNameTable::default();
        assert_eq!(table.best_name("#FF0000"), "Red");
        assert_eq!(table.best_name("#4682B4"), "Steel Blue");

        let candidates = table.name_candidates("#FF0000");
        assert_eq!(candidates[0].hex, "#FF0000");
        assert!(candidates[0].distance.abs() < 1e-3);
    }

    #[test]
    fn candidates_are_sorted_by_distance() {
        let table = ColorNameTable::new(NameList::Html, DistanceMetric::Euclidean);
        let candidates = table.name_candidates("#3A7BC0");
        assert_eq!(candidates.len(), table.len());
        assert!(candidates.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn near_colors_get_the_neighbouring_name() {
        let table = ColorNameTable::new(NameList::Roygbiv, DistanceMetric::DeltaE);
        assert_eq!(table.best_name("#F01010"), "Red");
        assert_eq!(table.best_name("#FFF020"), "Yellow");
    }

    #[test]
    fn empty_candidates_fall_back_to_unknown() {
        assert_eq!(Nothing.best_name("#123456"), UNKNOWN_NAME);
        assert_eq!(ColorNameTable::default().best_name("not a color"), UNKNOWN_NAME);
    }

    #[test]
    fn config_selects_table_and_metric() {
        let html = ColorNameTable::from_config(&ExtractConfig {
            distance: DistanceMetric::Euclidean,
            ..Default::default()
        });
        let rainbow = ColorNameTable::from_config(&ExtractConfig {
            name_list: NameList::Roygbiv,
            distance: DistanceMetric::Euclidean,
            ..Default::default()
        });
        assert_eq!(html.len(), names::HTML.len());
        assert_eq!(rainbow.len(), names::ROYGBIV.len());
        assert_eq!(html.best_name("#8B0000"), "Dark Red");
        assert_eq!(rainbow.best_name("#8B0000"), "Red");
    }

    #[test]
    fn memo_namer_asks_once_per_hex() {
        let memo = MemoNamer::new(Counting(AtomicUsize::new(0)));
        assert_eq!(memo.best_name("#abcdef"), "name of #abcdef");
        assert_eq!(memo.best_name("#ABCDEF"), "name of #abcdef");
        memo.best_name("#000001");

        assert_eq!(memo.inner.0.load(Ordering::SeqCst), 2);
        assert_eq!(memo.cached(), 2);
    }
}
