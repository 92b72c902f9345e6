use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub dial_code: String,
}

#[derive(Deserialize)]
struct RawCountry {
    cca2: String,
    name: RawName,
    #[serde(default)]
    idd: Option<RawIdd>,
}

#[derive(Deserialize)]
struct RawName {
    common: String,
}

#[derive(Deserialize)]
struct RawIdd {
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    suffixes: Vec<String>,
}

/// Turns a directory listing into selectable countries: entries without a
/// dialing root are dropped, the first suffix is appended, and the result is
/// sorted by name.
pub fn parse_directory(body: &str) -> serde_json::Result<Vec<Country>> {
    let raw: Vec<RawCountry> = serde_json::from_str(body)?;

    let mut countries: Vec<Country> = raw
        .into_iter()
        .filter_map(|c| {
            let idd = c.idd?;
            let root = idd.root.filter(|root| !root.is_empty())?;
            let suffix = idd.suffixes.into_iter().next().unwrap_or_default();
            Some(Country {
                code: c.cca2,
                name: c.name.common,
                dial_code: root + &suffix,
            })
        })
        .collect();
    countries.sort_by_cached_key(|c| sort_key(&c.name));

    Ok(countries)
}

/// Lowercased with accents stripped, so "Åland Islands" files under A.
fn sort_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The preferred country when listed, otherwise the first entry.
pub fn default_country<'a>(countries: &'a [Country], preferred: &str) -> Option<&'a Country> {
    find(countries, preferred).or_else(|| countries.first())
}

pub fn find<'a>(countries: &'a [Country], code: &str) -> Option<&'a Country> {
    countries.iter().find(|c| c.code == code)
}

/// Lazily fetched country/dial-code list.
///
/// A failed fetch yields an empty list and is only logged; the next login page
/// load simply tries again. A successful fetch is kept for the process.
pub struct CountryDirectory {
    url: String,
    http_client: reqwest::Client,
    cache: RwLock<Option<Arc<[Country]>>>,
}

impl CountryDirectory {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http_client: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    /// A directory that never touches the network.
    pub fn preloaded(countries: Vec<Country>) -> Self {
        Self {
            url: String::new(),
            http_client: reqwest::Client::new(),
            cache: RwLock::new(Some(countries.into())),
        }
    }

    pub async fn countries(&self) -> Arc<[Country]> {
        if let Ok(cache) = self.cache.read() {
            if let Some(countries) = cache.as_ref() {
                return countries.clone();
            }
        }

        match self.fetch().await {
            Ok(countries) => {
                tracing::info!(count = countries.len(), "country directory loaded");
                let countries: Arc<[Country]> = countries.into();
                if let Ok(mut cache) = self.cache.write() {
                    *cache = Some(countries.clone());
                }
                countries
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "country directory fetch failed");
                Arc::from(Vec::new())
            }
        }
    }

    async fn fetch(&self) -> anyhow::Result<Vec<Country>> {
        let body = self.http_client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_directory(&body)?)
    }
}
