//! # Field Resolution
//!
//! Attribute names in the playlist dataset are not fixed, so every consumer
//! asks this module which attribute plays which role. Resolution is a plain
//! case-insensitive substring match where the first matching attribute wins.

use serde::Serialize;
use std::fmt;

/// Fallback attribute names of the Kaggle Spotify playlist dataset, used by
/// aggregate queries when no attribute matches.
pub const DEFAULT_USER_FIELD: &str = "user_id";
pub const DEFAULT_ARTIST_FIELD: &str = "_artistname";
pub const DEFAULT_TRACK_FIELD: &str = "_trackname";
pub const DEFAULT_PLAYLIST_FIELD: &str = "_playlistname";

/// Role an attribute can play in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    User,
    Artist,
    Track,
    Playlist,
}

impl FieldRole {
    /// Substring looked for in attribute names.
    #[must_use]
    pub const fn needle(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Artist => "artist",
            Self::Track => "track",
            Self::Playlist => "playlist",
        }
    }

    /// Conventional attribute name when nothing matches.
    #[must_use]
    pub const fn default_field(self) -> &'static str {
        match self {
            Self::User => DEFAULT_USER_FIELD,
            Self::Artist => DEFAULT_ARTIST_FIELD,
            Self::Track => DEFAULT_TRACK_FIELD,
            Self::Playlist => DEFAULT_PLAYLIST_FIELD,
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.needle())
    }
}

/// First name whose lowercase form contains `needle`.
#[must_use]
pub fn resolve_field<'a, I>(names: I, needle: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = needle.to_lowercase();
    names
        .into_iter()
        .find(|name| name.to_lowercase().contains(&needle))
}

/// Attribute for `role`, or the conventional dataset name if none matches.
#[must_use]
pub fn resolve_or_default<S: AsRef<str>>(names: &[S], role: FieldRole) -> String {
    resolve_field(names.iter().map(AsRef::<str>::as_ref), role.needle())
        .unwrap_or(role.default_field())
        .to_string()
}

/// The two attributes the co-occurrence network needs, resolved once per
/// sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchema {
    pub artist: String,
    pub playlist: String,
}

impl ResolvedSchema {
    /// Resolve the artist and playlist attributes from `names`.
    ///
    /// The playlist search skips whichever attribute was picked as artist, so
    /// one attribute never plays both roles.
    ///
    /// # Errors
    ///
    /// Returns the role that could not be resolved.
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Self, FieldRole> {
        let names: Vec<&str> = names.iter().map(AsRef::<str>::as_ref).collect();

        let artist = resolve_field(names.iter().copied(), FieldRole::Artist.needle())
            .ok_or(FieldRole::Artist)?;
        let playlist = resolve_field(
            names.iter().copied().filter(|name| *name != artist),
            FieldRole::Playlist.needle(),
        )
        .ok_or(FieldRole::Playlist)?;

        Ok(Self {
            artist: artist.to_string(),
            playlist: playlist.to_string(),
        })
    }
}

/// Attributes used by the dataset-wide statistics.
///
/// Every attribute is assigned to at most one role, checked in the order
/// user, artist, track, playlist (so `user_playlist` counts as a user
/// attribute). Within a role the first classified attribute wins; roles with
/// no match fall back to the conventional dataset names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetFields {
    pub user: String,
    pub artist: String,
    pub track: String,
    pub playlist: String,
}

impl DatasetFields {
    const PRECEDENCE: [FieldRole; 4] = [
        FieldRole::User,
        FieldRole::Artist,
        FieldRole::Track,
        FieldRole::Playlist,
    ];

    #[must_use]
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Self {
        let mut found: [Option<&str>; 4] = [None; 4];

        for name in names.iter().map(AsRef::<str>::as_ref) {
            let lower = name.to_lowercase();
            let Some(slot) = Self::PRECEDENCE
                .iter()
                .position(|role| lower.contains(role.needle()))
            else {
                continue;
            };
            found[slot].get_or_insert(name);
        }

        let pick = |slot: usize| {
            found[slot]
                .unwrap_or(Self::PRECEDENCE[slot].default_field())
                .to_string()
        };

        Self {
            user: pick(0),
            artist: pick(1),
            track: pick(2),
            playlist: pick(3),
        }
    }

    #[must_use]
    pub fn field(&self, role: FieldRole) -> &str {
        match role {
            FieldRole::User => &self.user,
            FieldRole::Artist => &self.artist,
            FieldRole::Track => &self.track,
            FieldRole::Playlist => &self.playlist,
        }
    }
}
