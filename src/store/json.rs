//! JSON snapshot files on disk, one per collection.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use super::{SnapshotStore, StoreResult};
use crate::tournament::models::{Team, TeamId, Tournament, TournamentId};

const TOURNAMENTS_FILE: &str = "tournaments.json";
const TEAMS_FILE: &str = "teams.json";

/// Snapshot store backed by pretty-printed JSON files in one directory.
///
/// Layout matches the bot's data directory: `tournaments.json` and
/// `teams.json`, each a mapping of id to record. Saves overwrite the whole
/// file; loads of a missing file yield an empty collection.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn load_file<T: DeserializeOwned>(&self, name: &str) -> StoreResult<HashMap<uuid::Uuid, T>> {
        let path = self.dir.join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save_file<T: Serialize>(&self, name: &str, data: &HashMap<uuid::Uuid, T>) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(data)?;
        fs::write(self.dir.join(name), json)?;
        Ok(())
    }

    /// Directory holding the snapshot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotStore for JsonFileStore {
    fn load_tournaments(&self) -> StoreResult<HashMap<TournamentId, Tournament>> {
        self.load_file(TOURNAMENTS_FILE)
    }

    fn save_tournaments(
        &self,
        tournaments: &HashMap<TournamentId, Tournament>,
    ) -> StoreResult<()> {
        self.save_file(TOURNAMENTS_FILE, tournaments)
    }

    fn load_teams(&self) -> StoreResult<HashMap<TeamId, Team>> {
        self.load_file(TEAMS_FILE)
    }

    fn save_teams(&self, teams: &HashMap<TeamId, Team>) -> StoreResult<()> {
        self.save_file(TEAMS_FILE, teams)
    }
}
