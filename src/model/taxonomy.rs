//! Taxonomic labels of the form `d:Bacteria g:Escherichia s:Escherichia_coli`.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Taxonomy {
    ranks: Vec<(String, String)>,
}

impl Taxonomy {
    /// Tokens without a `rank:` prefix are ignored.
    pub fn parse(raw: &str) -> Self {
        let ranks = raw
            .split_whitespace()
            .filter_map(|token| token.split_once(':'))
            .filter(|(rank, name)| !rank.is_empty() && !name.is_empty())
            .map(|(rank, name)| (rank.to_ascii_lowercase(), name.to_string()))
            .collect();
        Self { ranks }
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn rank(&self, rank: &str) -> Option<&str> {
        self.ranks
            .iter()
            .find(|(candidate, _)| candidate == rank)
            .map(|(_, name)| name.as_str())
    }

    /// True when every rank of `taxon` is present here with the same name.
    pub fn is_in(&self, taxon: &Taxonomy) -> bool {
        !taxon.is_empty()
            && taxon
                .ranks
                .iter()
                .all(|(rank, name)| self.rank(rank) == Some(name.as_str()))
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .ranks
            .iter()
            .map(|(rank, name)| format!("{rank}:{name}"))
            .collect();
        f.write_str(&rendered.join(" "))
    }
}
