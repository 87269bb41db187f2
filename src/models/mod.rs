use serde::{Deserialize, Serialize};

/// Published on the track pipe when nothing is playing.
pub const NO_TRACK: &str = "No track currently playing";

const ARTIST_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackDetails {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub progress: f64,
}

impl TrackDetails {
    pub fn new<I, S>(
        name: String,
        artists: I,
        album: String,
        position_ms: u64,
        duration_ms: u64,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name,
            artists: join_artists(artists),
            album,
            progress: progress_fraction(position_ms, duration_ms),
        }
    }
}

pub fn join_artists<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, name) in names.into_iter().enumerate() {
        if i > 0 {
            joined.push_str(ARTIST_SEPARATOR);
        }
        joined.push_str(name.as_ref());
    }
    joined
}

pub fn progress_fraction(position_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `<name> - <artists>`
    #[default]
    Line,
    /// Multi-line block with album and progress.
    Detailed,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Line => write!(f, "line"),
            OutputFormat::Detailed => write!(f, "detailed"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(OutputFormat::Line),
            "detailed" => Ok(OutputFormat::Detailed),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

pub fn format_track(details: Option<&TrackDetails>, format: OutputFormat) -> String {
    match (details, format) {
        (Some(d), OutputFormat::Line) => format!("{} - {}", d.name, d.artists),
        (Some(d), OutputFormat::Detailed) => format!(
            "Track: {}\nArtists: {}\nAlbum: {}\nProgress: {:.2}\n",
            d.name, d.artists, d.album, d.progress
        ),
        (None, OutputFormat::Line) => NO_TRACK.to_string(),
        (None, OutputFormat::Detailed) => format!("{NO_TRACK}\n"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Play,
    Pause,
    Next,
}

impl ControlCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlCommand::Play => "play",
            ControlCommand::Pause => "pause",
            ControlCommand::Next => "next",
        }
    }

    pub fn from_message(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl std::fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(ControlCommand::Play),
            "pause" => Ok(ControlCommand::Pause),
            "next" => Ok(ControlCommand::Next),
            _ => Err(format!("Invalid control command: {s}")),
        }
    }
}
