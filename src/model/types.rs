//! Static type registries for projects, datasets and result categories.
//!
//! Lookups are plain enum matches; an unknown name is always an
//! `UnknownType` error, never a silent default.
use crate::error::PipelineError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectType {
    Generic,
    Genomes,
    Clade,
    Metagenomes,
    Mixed,
    Plasmids,
}

impl ProjectType {
    pub const ALL: [ProjectType; 6] = [
        ProjectType::Generic,
        ProjectType::Genomes,
        ProjectType::Clade,
        ProjectType::Metagenomes,
        ProjectType::Mixed,
        ProjectType::Plasmids,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Generic => "generic",
            ProjectType::Genomes => "genomes",
            ProjectType::Clade => "clade",
            ProjectType::Metagenomes => "metagenomes",
            ProjectType::Mixed => "mixed",
            ProjectType::Plasmids => "plasmids",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProjectType::Generic => "Unspecified collection of datasets",
            ProjectType::Genomes => "Collection of genomes",
            ProjectType::Clade => "Collection of closely-related genomes (ANI >= 90%)",
            ProjectType::Metagenomes => "Collection of metagenomes and/or viromes",
            ProjectType::Mixed => "Mixed collection of genomes, metagenomes, and viromes",
            ProjectType::Plasmids => "Collection of plasmids",
        }
    }

    pub fn multi(&self) -> bool {
        matches!(self, ProjectType::Metagenomes | ProjectType::Mixed)
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = PipelineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| PipelineError::UnknownType {
                kind: "project",
                value: raw.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetType {
    Genome,
    Scaffold,
    Popgenome,
    Plasmid,
    Metagenome,
    Virome,
}

impl DatasetType {
    pub const ALL: [DatasetType; 6] = [
        DatasetType::Genome,
        DatasetType::Scaffold,
        DatasetType::Popgenome,
        DatasetType::Plasmid,
        DatasetType::Metagenome,
        DatasetType::Virome,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetType::Genome => "genome",
            DatasetType::Scaffold => "scaffold",
            DatasetType::Popgenome => "popgenome",
            DatasetType::Plasmid => "plasmid",
            DatasetType::Metagenome => "metagenome",
            DatasetType::Virome => "virome",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DatasetType::Genome => "The genome from an isolate",
            DatasetType::Scaffold => "A genome scaffold, possibly incomplete",
            DatasetType::Popgenome => "The genome of a population (including microdiversity)",
            DatasetType::Plasmid => "A plasmid",
            DatasetType::Metagenome => "A metagenome (excluding viromes)",
            DatasetType::Virome => "A viral metagenome",
        }
    }

    /// Whether the type describes a multi-organism sample.
    pub fn multi(&self) -> bool {
        matches!(self, DatasetType::Metagenome | DatasetType::Virome)
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetType {
    type Err = PipelineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| PipelineError::UnknownType {
                kind: "dataset",
                value: raw.to_string(),
            })
    }
}

/// Result categories a dataset can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    RawReads,
    TrimmedReads,
    Assembly,
    Cds,
    EssentialGenes,
    Ssu,
    Distances,
    Taxonomy,
}

impl ResultKind {
    pub const ALL: [ResultKind; 8] = [
        ResultKind::RawReads,
        ResultKind::TrimmedReads,
        ResultKind::Assembly,
        ResultKind::Cds,
        ResultKind::EssentialGenes,
        ResultKind::Ssu,
        ResultKind::Distances,
        ResultKind::Taxonomy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::RawReads => "raw_reads",
            ResultKind::TrimmedReads => "trimmed_reads",
            ResultKind::Assembly => "assembly",
            ResultKind::Cds => "cds",
            ResultKind::EssentialGenes => "essential_genes",
            ResultKind::Ssu => "ssu",
            ResultKind::Distances => "distances",
            ResultKind::Taxonomy => "taxonomy",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultKind {
    type Err = PipelineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| PipelineError::UnknownType {
                kind: "result",
                value: raw.to_string(),
            })
    }
}
