use std::{fmt, io::BufRead, str::FromStr};

use clap::ArgMatches;

/// LogLevel
///
/// Minimum level of messages that will be logged.  `None` switches logging off
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    None,
}

const LEVEL_NAMES: [(&str, LogLevel); 6] = [
    ("error", LogLevel::Error),
    ("warn", LogLevel::Warn),
    ("info", LogLevel::Info),
    ("debug", LogLevel::Debug),
    ("trace", LogLevel::Trace),
    ("none", LogLevel::None),
];

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        LEVEL_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, l)| *l)
            .ok_or("no match")
    }
}

impl LogLevel {
    /// Verbosity as understood by stderrlog (0 = errors only)
    pub fn verbosity(&self) -> Option<usize> {
        match self {
            Self::None => None,
            l => Some(*l as usize),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = LEVEL_NAMES
            .iter()
            .find(|(_, l)| l == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown");
        write!(f, "{}", name)
    }
}

/// Initialize logging from command line arguments
///
/// Expects the options `loglevel`, `quiet` and `timestamp` to be defined in the clap model
pub fn init_log(m: &ArgMatches) -> anyhow::Result<()> {
    let level = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel::Info);
    let quiet = level.verbosity().is_none() || m.get_flag("quiet");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .copied()
        .unwrap_or(stderrlog::Timestamp::Off);

    stderrlog::new()
        .quiet(quiet)
        .verbosity(level.verbosity().unwrap_or(0))
        .timestamp(ts)
        .init()?;
    Ok(())
}

/// Read in next line and split on tabs after trimming white space
pub fn get_next_line<'a, R: BufRead>(
    rdr: &mut R,
    buf: &'a mut String,
) -> anyhow::Result<Option<Vec<&'a str>>> {
    buf.clear();
    if rdr.read_line(buf)? == 0 {
        Ok(None)
    } else {
        Ok(Some(buf.trim().split('\t').collect()))
    }
}
