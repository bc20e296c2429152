use std::fmt::{self, Display};
use std::str::FromStr;

use derive_more::Constructor;
use itertools::Itertools;
use thiserror::Error;

/// Invalid fragment length bin configuration. Group indices are 0-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("resolution in bin group {group} is not a positive integer")]
    Resolution { group: usize },

    #[error("bin {bin} in group {group} is malformed")]
    MalformedBin { group: usize, bin: usize },

    #[error("bin group {group} does not contain any bins")]
    EmptyGroup { group: usize },

    #[error("bins in group {group} don't share the same resolution")]
    MixedResolution { group: usize },

    #[error("bin {current} in group {group} overlaps {previous}")]
    Overlap {
        group: usize,
        current: Bin,
        previous: Bin,
    },

    #[error("malformed bin groups: {0}")]
    Syntax(String),
}

/// Fragment length range (both ends inclusive) and the resolution used to score it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Constructor)]
pub struct Bin {
    pub min_length: u64,
    pub max_length: u64,
    pub resolution: usize,
}

impl Bin {
    pub fn contains(&self, fragment_length: u64) -> bool {
        self.min_length <= fragment_length && fragment_length <= self.max_length
    }

    pub fn key(&self) -> String {
        if self.max_length == 0 {
            self.min_length.to_string()
        } else {
            format!("{}_{}", self.min_length, self.max_length)
        }
    }
}

impl Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min_length, self.max_length)
    }
}

/// Bins whose scores are summed together after the spatial reduction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinGroup {
    bins: Vec<Bin>,
    key: String,
}

impl BinGroup {
    pub fn new(bins: Vec<Bin>) -> Self {
        let key = bins.iter().map(Bin::key).join(",");
        Self { bins, key }
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Label of the group in the aggregate tree, e.g. `36_149,150_224`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn resolution(&self) -> Option<usize> {
        self.bins.first().map(|x| x.resolution)
    }
}

/// Non-fatal configuration issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    MixedResolutions(Vec<usize>),
    UnevenResolution { bin: Bin, extension: u64 },
}

impl Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::MixedResolutions(resolutions) => write!(
                f,
                "Bins use different resolutions ({}), the same resolution in each bin usually gives better results",
                resolutions.iter().join(", ")
            ),
            Advisory::UnevenResolution { bin, extension } => write!(
                f,
                "Bin {bin} resolution {} is not a divisor of extension {extension}",
                bin.resolution
            ),
        }
    }
}

/// Validated fragment length bin groups.
///
/// The textual form is a whitespace-separated list of parenthesised groups. Each group lists one or
/// more `start-end` fragment length ranges and ends with the resolution shared by its bins:
/// `(36-149 1) (150-224 225-324 2) (325-400 5)`. An empty `BinSpec` has no groups, in which case
/// reads are scored without any fragment length binning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinSpec {
    groups: Vec<BinGroup>,
}

impl BinSpec {
    /// Validate programmatically constructed groups.
    pub fn new(groups: Vec<BinGroup>) -> Result<Self, ConfigError> {
        for (ind, group) in groups.iter().enumerate() {
            let resolution = group
                .resolution()
                .ok_or(ConfigError::EmptyGroup { group: ind })?;
            if resolution == 0 {
                return Err(ConfigError::Resolution { group: ind });
            }
            if group.bins().iter().any(|x| x.resolution != resolution) {
                return Err(ConfigError::MixedResolution { group: ind });
            }
            if let Some(bin) = group.bins().iter().position(|x| x.min_length > x.max_length) {
                return Err(ConfigError::MalformedBin { group: ind, bin });
            }
        }

        // Flattened bins sorted by their boundaries must not overlap
        let bins = groups
            .iter()
            .enumerate()
            .flat_map(|(ind, group)| group.bins().iter().map(move |bin| (*bin, ind)))
            .sorted_by_key(|(bin, _)| (bin.min_length, bin.max_length))
            .collect_vec();

        for ((previous, _), (current, group)) in bins.into_iter().tuple_windows() {
            if current.min_length <= previous.max_length {
                return Err(ConfigError::Overlap {
                    group,
                    current,
                    previous,
                });
            }
        }

        Ok(Self { groups })
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut groups = Vec::new();
        for (ind, tokens) in split_groups(text)?.into_iter().enumerate() {
            groups.push(parse_group(ind, &tokens)?);
        }
        Self::new(groups)
    }

    pub fn groups(&self) -> &[BinGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn bins(&self) -> impl Iterator<Item = &Bin> {
        self.groups.iter().flat_map(|x| x.bins().iter())
    }

    /// Largest fragment length accepted by any bin.
    pub fn max_length(&self) -> Option<u64> {
        self.bins().map(|x| x.max_length).max()
    }

    /// Report (and log) configurations that are valid but usually give suboptimal matrices.
    pub fn advise(&self, extension: u64) -> Vec<Advisory> {
        let mut advisories = Vec::new();

        let resolutions = self.bins().map(|x| x.resolution).unique().sorted().collect_vec();
        if resolutions.len() > 1 {
            advisories.push(Advisory::MixedResolutions(resolutions));
        }

        for bin in self.bins() {
            if extension % bin.resolution as u64 != 0 {
                advisories.push(Advisory::UnevenResolution {
                    bin: *bin,
                    extension,
                });
            }
        }

        for advisory in &advisories {
            log::warn!("{advisory}");
        }
        advisories
    }
}

impl FromStr for BinSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split_groups(text: &str) -> Result<Vec<Vec<&str>>, ConfigError> {
    let mut groups = Vec::new();
    let mut current: Option<Vec<&str>> = None;
    let mut token_start = None;

    for (ind, char) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        let delimiter = char.is_whitespace() || char == '(' || char == ')';
        if !delimiter {
            token_start.get_or_insert(ind);
            continue;
        }

        if let Some(start) = token_start.take() {
            let token = &text[start..ind];
            match current.as_mut() {
                Some(group) => group.push(token),
                None => {
                    return Err(ConfigError::Syntax(format!(
                        "{token:?} is outside of any group"
                    )))
                }
            }
        }

        match char {
            '(' if current.is_some() => {
                return Err(ConfigError::Syntax("nested groups are not allowed".to_owned()))
            }
            '(' => current = Some(Vec::new()),
            ')' => match current.take() {
                Some(group) => groups.push(group),
                None => {
                    return Err(ConfigError::Syntax(
                        "unbalanced closing parenthesis".to_owned(),
                    ))
                }
            },
            _ => {}
        }
    }

    if current.is_some() {
        return Err(ConfigError::Syntax("unclosed group".to_owned()));
    }
    Ok(groups)
}

fn parse_group(group: usize, tokens: &[&str]) -> Result<BinGroup, ConfigError> {
    let (resolution, ranges) = tokens
        .split_last()
        .ok_or(ConfigError::Resolution { group })?;
    let resolution = match resolution.parse::<usize>() {
        Ok(resolution) if resolution > 0 => resolution,
        _ => return Err(ConfigError::Resolution { group }),
    };
    if ranges.is_empty() {
        return Err(ConfigError::EmptyGroup { group });
    }

    let mut bins = Vec::with_capacity(ranges.len());
    for (ind, range) in ranges.iter().enumerate() {
        let malformed = ConfigError::MalformedBin { group, bin: ind };
        let (start, end) = match range.split('-').collect_tuple() {
            Some((start, end)) => (start, end),
            None => return Err(malformed),
        };
        let (mut start, mut end) = match (start.parse::<u64>(), end.parse::<u64>()) {
            (Ok(start), Ok(end)) => (start, end),
            _ => return Err(malformed),
        };
        if start > end {
            std::mem::swap(&mut start, &mut end);
            log::warn!("Bin {range} specified backward; corrected to {start}-{end}");
        }
        bins.push(Bin::new(start, end, resolution));
    }
    Ok(BinGroup::new(bins))
}
