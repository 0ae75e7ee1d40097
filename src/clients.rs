use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StoreError;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ClientProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.company {
            Some(company) => write!(f, "{} ({})", self.name, company),
            None => write!(f, "{}", self.name),
        }
    }
}

// Profiles keyed by a short name. A plain map type would lose the order
// entries were first saved in, so the file's object order is kept as is.
#[derive(Debug, PartialEq, Clone, Default)]
struct ProfileMap(Vec<(String, ClientProfile)>);

impl Serialize for ProfileMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, profile) in self.0.iter() {
            map.serialize_entry(key, profile)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProfileMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ProfileMapVisitor;

        impl<'de> Visitor<'de> for ProfileMapVisitor {
            type Value = ProfileMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a map of client keys to profiles")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, ClientProfile)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, profile)) = access.next_entry()? {
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, existing)) => *existing = profile,
                        None => entries.push((key, profile)),
                    }
                }
                Ok(ProfileMap(entries))
            }
        }

        deserializer.deserialize_map(ProfileMapVisitor)
    }
}

pub struct ClientStore {
    path: PathBuf,
    profiles: ProfileMap,
}

impl ClientStore {
    pub fn load(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("clients.json");
        let profiles = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader).map_err(|source| {
                StoreError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?
        } else {
            ProfileMap::default()
        };
        Ok(Self { path, profiles })
    }

    pub fn get(&self, key: &str) -> Result<&ClientProfile, StoreError> {
        self.profiles
            .0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, profile)| profile)
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    pub fn save(
        &mut self,
        key: &str,
        profile: ClientProfile,
    ) -> Result<(), StoreError> {
        match self.profiles.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = profile,
            None => self.profiles.0.push((key.to_string(), profile)),
        }
        self.persist()
    }

    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let before = self.profiles.0.len();
        self.profiles.0.retain(|(k, _)| k != key);
        if self.profiles.0.len() == before {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        self.persist()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClientProfile)> {
        self.profiles.0.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.0.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let updated_path = self.path.with_extension("updated");
        let f = File::create(&updated_path)?;

        serde_json::to_writer_pretty(f, &self.profiles)
            .map_err(io::Error::from)?;
        fs::rename(updated_path, &self.path)?;
        Ok(())
    }
}
