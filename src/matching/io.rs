//! Text serialization of pairwise matches.
//!
//! The file is a sequence of blocks, one per view pair:
//!
//! ```text
//! I J
//! count
//! i_0 j_0
//! ...
//! ```
//!
//! Blocks may repeat a pair; their matches are appended.
use super::ind_match::{IndMatch, IndexT, PairWiseMatches};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchIoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: only the text match format is supported")]
    UnsupportedFormat { path: PathBuf },
    #[error("{path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn parse_matches(data: &str) -> Result<PairWiseMatches, String> {
    let mut tokens = data.split_whitespace();
    let mut next_index = |what: &str| -> Result<Option<IndexT>, String> {
        match tokens.next() {
            None => Ok(None),
            Some(tok) => tok
                .parse::<IndexT>()
                .map(Some)
                .map_err(|_| format!("invalid {what} '{tok}'")),
        }
    };

    let mut out = PairWiseMatches::new();
    loop {
        let Some(view_i) = next_index("view index")? else {
            break;
        };
        let view_j = next_index("view index")?.ok_or("truncated pair header")?;
        let count = next_index("match count")?.ok_or("missing match count")?;
        let entry = out.entry((view_i, view_j)).or_default();
        for _ in 0..count {
            let i = next_index("feature index")?.ok_or("truncated match list")?;
            let j = next_index("feature index")?.ok_or("truncated match list")?;
            entry.push(IndMatch::new(i, j));
        }
    }
    Ok(out)
}

pub fn load_matches(path: &Path) -> Result<PairWiseMatches, MatchIoError> {
    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if !is_text {
        return Err(MatchIoError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    let data = fs::read_to_string(path).map_err(|source| MatchIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_matches(&data).map_err(|reason| MatchIoError::Malformed {
        path: path.to_path_buf(),
        reason,
    })
}

pub fn save_matches(path: &Path, matches: &PairWiseMatches) -> Result<(), MatchIoError> {
    let mut out = String::new();
    for (&(i, j), list) in matches {
        let _ = writeln!(out, "{i} {j}");
        let _ = writeln!(out, "{}", list.len());
        for m in list {
            let _ = writeln!(out, "{} {}", m.i, m.j);
        }
    }
    fs::write(path, out).map_err(|source| MatchIoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
